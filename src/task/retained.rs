//! Task action whose handles are owned by the store's registry.

use std::borrow::Cow;
use std::sync::Arc;

use crate::error::{run_body, TaskError};
use crate::mvi::{Intent, StoreState};
use crate::store::Action;
use crate::task::action::{FailureMap, TaskBody};
use crate::task::scope::TaskScope;

/// Async work that outlives the value that started it.
///
/// The task interceptor moves the handles into its registry under a fresh
/// [`TaskId`](super::TaskId) per dispatch. They stay alive until the body's
/// cleanups have fired once per handle, or until the store is dropped.
///
/// ```ignore
/// RetainedTaskAction::new(|scope| {
///     scope.spawn(|ctx| async move {
///         // ... dispatch progress through ctx.dispatch ...
///     })?;
///     Ok(())
/// })
/// ```
pub struct RetainedTaskAction<S, A> {
    label: Cow<'static, str>,
    body: TaskBody<S, A>,
    on_failure: Option<FailureMap<S, A>>,
}

impl<S: StoreState, A: Intent> RetainedTaskAction<S, A> {
    pub fn new(
        body: impl Fn(&mut TaskScope<S, A>) -> Result<(), TaskError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            label: Cow::Borrowed(""),
            body: Arc::new(body),
            on_failure: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Map a body error into a follow-up action.
    pub fn on_failure(
        mut self,
        map: impl Fn(TaskError) -> Action<S, A> + Send + Sync + 'static,
    ) -> Self {
        self.on_failure = Some(Arc::new(map));
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn label_cow(&self) -> Cow<'static, str> {
        self.label.clone()
    }

    pub(crate) fn execute(&self, scope: &mut TaskScope<S, A>) -> Result<(), TaskError> {
        run_body(|| (self.body)(scope))
    }

    pub(crate) fn failure_action(&self, error: TaskError) -> Option<Action<S, A>> {
        self.on_failure.as_ref().map(|map| map(error))
    }
}

impl<S, A> Clone for RetainedTaskAction<S, A> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            body: Arc::clone(&self.body),
            on_failure: self.on_failure.clone(),
        }
    }
}
