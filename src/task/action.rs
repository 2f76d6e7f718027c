//! Task action whose handles live on the action value.

use std::borrow::Cow;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{run_body, TaskError};
use crate::mvi::{Intent, StoreState};
use crate::store::{Action, Dispatch, GetState};
use crate::task::handle::CancellationHandle;
use crate::task::scope::TaskScope;

pub(crate) type TaskBody<S, A> =
    Arc<dyn Fn(&mut TaskScope<S, A>) -> Result<(), TaskError> + Send + Sync>;
pub(crate) type FailureMap<S, A> = Arc<dyn Fn(TaskError) -> Action<S, A> + Send + Sync>;

/// Async work owned by whoever holds the action.
///
/// Clones share one handle set. Dispatching runs the body and stores the
/// handles it retains on that set; dropping the last clone cancels them
/// all, so the caller decides how long the work may run.
pub struct TaskAction<S, A> {
    inner: Arc<Inner<S, A>>,
}

struct Inner<S, A> {
    label: Cow<'static, str>,
    body: TaskBody<S, A>,
    on_failure: Option<FailureMap<S, A>>,
    handles: Mutex<Vec<CancellationHandle>>,
}

impl<S: StoreState, A: Intent> TaskAction<S, A> {
    pub fn new(
        body: impl Fn(&mut TaskScope<S, A>) -> Result<(), TaskError> + Send + Sync + 'static,
    ) -> Self {
        Self::build(Cow::Borrowed(""), Arc::new(body), None)
    }

    pub fn with_label(self, label: impl Into<Cow<'static, str>>) -> Self {
        Self::build(label.into(), self.inner.body.clone(), self.inner.on_failure.clone())
    }

    /// Map a body error into a follow-up action.
    pub fn on_failure(
        self,
        map: impl Fn(TaskError) -> Action<S, A> + Send + Sync + 'static,
    ) -> Self {
        Self::build(self.inner.label.clone(), self.inner.body.clone(), Some(Arc::new(map)))
    }

    fn build(
        label: Cow<'static, str>,
        body: TaskBody<S, A>,
        on_failure: Option<FailureMap<S, A>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                label,
                body,
                on_failure,
                handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// Handles currently held by this action.
    pub fn handle_count(&self) -> usize {
        self.inner.handles.lock().len()
    }

    /// Cancel and drop every handle now.
    pub fn cancel(&self) {
        let handles = std::mem::take(&mut *self.inner.handles.lock());
        drop(handles);
    }

    /// Run the body and keep whatever it retained, even on error.
    pub(crate) fn execute(
        &self,
        dispatch: &Dispatch<S, A>,
        get_state: &GetState<S>,
    ) -> Result<(), TaskError> {
        let mut scope = TaskScope::detached(
            dispatch.clone(),
            get_state.clone(),
            self.inner.label.clone(),
        );
        let result = run_body(|| (self.inner.body)(&mut scope));
        self.inner.handles.lock().extend(scope.into_handles());
        result
    }

    pub(crate) fn failure_action(&self, error: TaskError) -> Option<Action<S, A>> {
        self.inner.on_failure.as_ref().map(|map| map(error))
    }
}

impl<S, A> Clone for TaskAction<S, A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
