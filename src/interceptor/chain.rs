//! Interceptor trait and chain composition.

use std::sync::Arc;

use crate::mvi::{Intent, StoreState};
use crate::store::{Dispatch, GetState};

/// Wraps the next dispatcher in the chain.
///
/// `wrap` runs once per chain build, not per action. It receives:
/// - `full`: re-enters the whole chain from the top (for follow-up actions)
/// - `get_state`: reads the state current at call time
/// - `next`: continues past this interceptor
///
/// and returns the dispatcher that replaces `next` for everything above it.
/// Anything that must survive a rebuild belongs in `self`, not in the
/// returned closure.
pub trait Interceptor<S, A>: Send + Sync + 'static {
    fn wrap(
        &self,
        full: Dispatch<S, A>,
        get_state: GetState<S>,
        next: Dispatch<S, A>,
    ) -> Dispatch<S, A>;
}

impl<S, A, F> Interceptor<S, A> for F
where
    F: Fn(Dispatch<S, A>, GetState<S>, Dispatch<S, A>) -> Dispatch<S, A> + Send + Sync + 'static,
{
    fn wrap(
        &self,
        full: Dispatch<S, A>,
        get_state: GetState<S>,
        next: Dispatch<S, A>,
    ) -> Dispatch<S, A> {
        self(full, get_state, next)
    }
}

/// Build one dispatcher from `interceptors` around `base`.
///
/// The first interceptor is outermost and sees every action first.
pub fn compose<S: StoreState, A: Intent>(
    interceptors: &[Arc<dyn Interceptor<S, A>>],
    full: &Dispatch<S, A>,
    get_state: &GetState<S>,
    base: Dispatch<S, A>,
) -> Dispatch<S, A> {
    interceptors.iter().rev().fold(base, |next, interceptor| {
        interceptor.wrap(full.clone(), get_state.clone(), next)
    })
}
