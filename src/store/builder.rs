//! Store assembly.

use std::sync::Arc;

use crate::config::StoreConfig;
use crate::diagnostics::{Diagnostics, SilentDiagnostics, TracingDiagnostics};
use crate::interceptor::{
    ActionRecorder, Interceptor, LogInterceptor, ThunkInterceptor, TracingRecorder,
};
use crate::mvi::{Intent, Reducer, StoreState};
use crate::store::container::{Store, StoreParts};
use crate::task::{TaskInterceptor, TaskRegistry};

/// Where an interceptor sits until `build` resolves it.
enum Slot<S, A> {
    Ready(Arc<dyn Interceptor<S, A>>),
    Tasks,
}

/// Builds a [`Store`].
///
/// Interceptors run in insertion order: the first one added sees every
/// action first.
///
/// ```ignore
/// let store = Store::builder(reducer, AppState::default())
///     .with_logging(TracingRecorder::default())
///     .with_tasks()
///     .build();
/// ```
pub struct StoreBuilder<S, A> {
    reducer: Box<dyn Reducer<State = S, Intent = A>>,
    state: S,
    slots: Vec<Slot<S, A>>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl<S: StoreState, A: Intent> StoreBuilder<S, A> {
    pub fn new(reducer: impl Reducer<State = S, Intent = A>, state: S) -> Self {
        Self {
            reducer: Box::new(reducer),
            state,
            slots: Vec::new(),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Append an interceptor (innermost so far).
    pub fn interceptor(self, interceptor: impl Interceptor<S, A>) -> Self {
        self.shared_interceptor(Arc::new(interceptor))
    }

    pub fn shared_interceptor(mut self, interceptor: Arc<dyn Interceptor<S, A>>) -> Self {
        self.slots.push(Slot::Ready(interceptor));
        self
    }

    /// Execute `TaskAction` and `RetainedTaskAction` values.
    ///
    /// The store gets a task registry; calling this twice adds nothing.
    pub fn with_tasks(mut self) -> Self {
        if !self.slots.iter().any(|slot| matches!(slot, Slot::Tasks)) {
            self.slots.push(Slot::Tasks);
        }
        self
    }

    /// Execute `Thunk` values.
    pub fn with_thunks(self) -> Self {
        self.interceptor(ThunkInterceptor)
    }

    /// Record every action before the rest of the chain sees it.
    pub fn with_logging(self, recorder: impl ActionRecorder) -> Self {
        self.interceptor(LogInterceptor::new(recorder))
    }

    /// Hook for ignored lifecycle anomalies. Defaults to `tracing` warnings.
    pub fn diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Apply file configuration.
    ///
    /// An enabled action log is placed in front of every interceptor added
    /// so far, so it records actions before anything can swallow them.
    pub fn config(mut self, config: &StoreConfig) -> Self {
        if config.logging.enabled {
            let recorder =
                TracingRecorder::new(config.logging.category.clone(), config.logging.level);
            self.slots
                .insert(0, Slot::Ready(Arc::new(LogInterceptor::new(recorder))));
        }
        self.diagnostics = if config.diagnostics.report_anomalies {
            Arc::new(TracingDiagnostics)
        } else {
            Arc::new(SilentDiagnostics)
        };
        self
    }

    pub fn build(self) -> Store<S, A> {
        let mut registry: Option<Arc<TaskRegistry>> = None;
        let interceptors = self
            .slots
            .into_iter()
            .map(|slot| match slot {
                Slot::Ready(interceptor) => interceptor,
                Slot::Tasks => {
                    let tasks = TaskInterceptor::<S, A>::new(Arc::clone(&self.diagnostics));
                    registry = Some(Arc::clone(tasks.registry()));
                    Arc::new(tasks) as Arc<dyn Interceptor<S, A>>
                }
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            interceptors = interceptors.len(),
            tasks = registry.is_some(),
            "Store built"
        );

        Store::from_parts(StoreParts {
            reducer: self.reducer,
            state: self.state,
            interceptors,
            registry,
            diagnostics: self.diagnostics,
        })
    }
}
