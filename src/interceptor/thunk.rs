//! Runs [`Thunk`](crate::store::Thunk) actions.

use crate::interceptor::Interceptor;
use crate::mvi::{Intent, StoreState};
use crate::store::{Action, Dispatch, GetState};

/// Executes thunk bodies with the full dispatcher and swallows the action.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThunkInterceptor;

impl<S: StoreState, A: Intent> Interceptor<S, A> for ThunkInterceptor {
    fn wrap(
        &self,
        full: Dispatch<S, A>,
        get_state: GetState<S>,
        next: Dispatch<S, A>,
    ) -> Dispatch<S, A> {
        Dispatch::new(move |action| match action {
            Action::Thunk(thunk) => thunk.run(&full, &get_state),
            other => next.dispatch(other),
        })
    }
}
