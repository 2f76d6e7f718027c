//! Dispatch and state-reader handles passed through the interceptor chain.

use std::fmt;
use std::sync::Arc;

use crate::mvi::{Intent, StoreState};
use crate::store::action::Action;

type DispatchFn<S, A> = dyn Fn(Action<S, A>) + Send + Sync;
type GetStateFn<S> = dyn Fn() -> Option<Arc<S>> + Send + Sync;

/// A dispatch function.
///
/// Cheap to clone and safe to move into async task work. The handle given
/// to interceptors and task bodies re-enters the whole chain from the top
/// and holds only a non-owning reference to its store.
pub struct Dispatch<S, A> {
    inner: Arc<DispatchFn<S, A>>,
}

impl<S: StoreState, A: Intent> Dispatch<S, A> {
    pub fn new(f: impl Fn(Action<S, A>) + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    /// Dispatch any action variant.
    pub fn dispatch(&self, action: impl Into<Action<S, A>>) {
        (self.inner)(action.into())
    }

    /// Dispatch an application intent.
    pub fn send(&self, intent: A) {
        (self.inner)(Action::Intent(intent))
    }
}

impl<S, A> Clone for Dispatch<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, A> fmt::Debug for Dispatch<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dispatch")
    }
}

/// Reads the latest committed state at call time.
///
/// Returns `None` once the owning store has been dropped.
pub struct GetState<S> {
    inner: Arc<GetStateFn<S>>,
}

impl<S: StoreState> GetState<S> {
    pub fn new(f: impl Fn() -> Option<Arc<S>> + Send + Sync + 'static) -> Self {
        Self { inner: Arc::new(f) }
    }

    pub fn get(&self) -> Option<Arc<S>> {
        (self.inner)()
    }
}

impl<S> Clone for GetState<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for GetState<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GetState")
    }
}
