//! Interceptor that executes task actions and owns the task registry.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::diagnostics::Diagnostics;
use crate::interceptor::Interceptor;
use crate::mvi::{Intent, StoreState};
use crate::store::{Action, Dispatch, GetState};
use crate::task::action::TaskAction;
use crate::task::registry::{Completion, TaskRegistry};
use crate::task::retained::RetainedTaskAction;
use crate::task::scope::TaskScope;

/// Recognizes [`Action::Task`] and [`Action::Retained`], runs their bodies
/// and never forwards them. Everything else goes to `next` unchanged.
///
/// The registry lives in the interceptor (not in the closures built by
/// `wrap`), so rebuilding the chain keeps retained work running.
pub struct TaskInterceptor<S, A> {
    registry: Arc<TaskRegistry>,
    _marker: PhantomData<fn(S, A)>,
}

impl<S: StoreState, A: Intent> TaskInterceptor<S, A> {
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Self {
        Self {
            registry: TaskRegistry::new(diagnostics),
            _marker: PhantomData,
        }
    }

    pub fn registry(&self) -> &Arc<TaskRegistry> {
        &self.registry
    }

    fn run_task(task: TaskAction<S, A>, full: &Dispatch<S, A>, get_state: &GetState<S>) {
        if let Err(error) = task.execute(full, get_state) {
            tracing::warn!(
                task = task.label(),
                handles = task.handle_count(),
                %error,
                "Task body failed"
            );
            if let Some(action) = task.failure_action(error) {
                full.dispatch(action);
            }
        }
        // `task` drops here; the caller's clones keep the handles alive.
    }

    fn run_retained(
        registry: &Arc<TaskRegistry>,
        task: RetainedTaskAction<S, A>,
        full: &Dispatch<S, A>,
        get_state: &GetState<S>,
    ) {
        let id = registry.open();
        let mut scope = TaskScope::retained(
            full.clone(),
            get_state.clone(),
            task.label_cow(),
            Arc::clone(registry),
            id,
        );
        let result = task.execute(&mut scope);
        let handles = scope.into_handles();
        let count = handles.len();

        match registry.seal(id, handles) {
            Completion::Pending(remaining) => tracing::debug!(
                task = task.label(),
                id = %id,
                handles = count,
                remaining,
                "Retained task running"
            ),
            Completion::Released | Completion::Deferred | Completion::Unknown => {
                tracing::debug!(task = task.label(), id = %id, "Retained task not retained")
            }
        }

        if let Err(error) = result {
            tracing::warn!(
                task = task.label(),
                id = %id,
                handles = count,
                %error,
                "Retained task body failed"
            );
            if let Some(action) = task.failure_action(error) {
                full.dispatch(action);
            }
        }
    }
}

impl<S: StoreState, A: Intent> Interceptor<S, A> for TaskInterceptor<S, A> {
    fn wrap(
        &self,
        full: Dispatch<S, A>,
        get_state: GetState<S>,
        next: Dispatch<S, A>,
    ) -> Dispatch<S, A> {
        let registry = Arc::clone(&self.registry);
        Dispatch::new(move |action| match action {
            Action::Task(task) => Self::run_task(task, &full, &get_state),
            Action::Retained(task) => Self::run_retained(&registry, task, &full, &get_state),
            other => next.dispatch(other),
        })
    }
}

impl<S, A> fmt::Debug for TaskInterceptor<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskInterceptor")
            .field("registry", &self.registry)
            .finish()
    }
}
