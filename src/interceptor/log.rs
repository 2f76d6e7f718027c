//! Action log: records a description of every action before forwarding it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::interceptor::Interceptor;
use crate::mvi::{Intent, StoreState};
use crate::store::{Dispatch, GetState};

/// Receives one textual description per dispatched action.
///
/// Called on the dispatching thread before the action moves on, so
/// implementations must be quick and must not dispatch.
pub trait ActionRecorder: Send + Sync + 'static {
    fn record(&self, description: &str);
}

impl<F> ActionRecorder for F
where
    F: Fn(&str) + Send + Sync + 'static,
{
    fn record(&self, description: &str) {
        self(description)
    }
}

/// Level of the `tracing` event emitted per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionLogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

/// Writes action descriptions to `tracing` under the `unistore::actions`
/// target, tagged with a category.
#[derive(Debug, Clone)]
pub struct TracingRecorder {
    category: String,
    level: ActionLogLevel,
}

impl TracingRecorder {
    pub fn new(category: impl Into<String>, level: ActionLogLevel) -> Self {
        Self {
            category: category.into(),
            level,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn level(&self) -> ActionLogLevel {
        self.level
    }
}

impl Default for TracingRecorder {
    fn default() -> Self {
        Self::new("unistore", ActionLogLevel::Info)
    }
}

impl ActionRecorder for TracingRecorder {
    fn record(&self, description: &str) {
        let category = self.category.as_str();
        match self.level {
            ActionLogLevel::Trace => {
                tracing::trace!(target: "unistore::actions", category, "{}", description)
            }
            ActionLogLevel::Debug => {
                tracing::debug!(target: "unistore::actions", category, "{}", description)
            }
            ActionLogLevel::Info => {
                tracing::info!(target: "unistore::actions", category, "{}", description)
            }
            ActionLogLevel::Warn => {
                tracing::warn!(target: "unistore::actions", category, "{}", description)
            }
            ActionLogLevel::Error => {
                tracing::error!(target: "unistore::actions", category, "{}", description)
            }
        }
    }
}

/// Records every action, then forwards it unchanged.
#[derive(Clone)]
pub struct LogInterceptor {
    recorder: Arc<dyn ActionRecorder>,
}

impl LogInterceptor {
    pub fn new(recorder: impl ActionRecorder) -> Self {
        Self {
            recorder: Arc::new(recorder),
        }
    }

    pub fn from_shared(recorder: Arc<dyn ActionRecorder>) -> Self {
        Self { recorder }
    }
}

impl Default for LogInterceptor {
    fn default() -> Self {
        Self::new(TracingRecorder::default())
    }
}

impl<S: StoreState, A: Intent> Interceptor<S, A> for LogInterceptor {
    fn wrap(
        &self,
        _full: Dispatch<S, A>,
        _get_state: GetState<S>,
        next: Dispatch<S, A>,
    ) -> Dispatch<S, A> {
        let recorder = Arc::clone(&self.recorder);
        Dispatch::new(move |action| {
            recorder.record(&action.describe());
            next.dispatch(action);
        })
    }
}
