//! Error types surfaced by task bodies and async sources.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use thiserror::Error;

/// Errors produced while starting or running task work.
///
/// `Clone + PartialEq` so the error can be stored inside state as
/// `TaskStatus::Failed` / `TaskState::Failed`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskError {
    /// Task work was spawned outside of a tokio runtime.
    #[error("No async runtime available to spawn task work")]
    NoRuntime,

    /// The asynchronous source reported a failure.
    #[error("Task source failed: {0}")]
    Source(String),

    /// The task body failed while registering its work.
    #[error("Task body failed: {0}")]
    Body(String),
}

impl TaskError {
    pub fn source_failed(message: impl Into<String>) -> Self {
        TaskError::Source(message.into())
    }

    pub fn body_failed(message: impl Into<String>) -> Self {
        TaskError::Body(message.into())
    }
}

/// Run a task body, turning a panic into [`TaskError::Body`].
///
/// Whatever the body registered before panicking stays with the caller.
pub(crate) fn run_body<F>(body: F) -> Result<(), TaskError>
where
    F: FnOnce() -> Result<(), TaskError>,
{
    panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|payload| {
        Err(TaskError::body_failed(format!(
            "panicked: {}",
            panic_message(payload.as_ref())
        )))
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_becomes_body_error() {
        let result = run_body(|| panic!("source table missing"));
        assert_eq!(
            result,
            Err(TaskError::Body("panicked: source table missing".into()))
        );
    }

    #[test]
    fn formatted_panic_message_is_kept() {
        let id = 7;
        let result = run_body(|| panic!("handle {} gone", id));
        assert_eq!(result, Err(TaskError::Body("panicked: handle 7 gone".into())));
    }

    #[test]
    fn ordinary_results_pass_through() {
        assert_eq!(run_body(|| Ok(())), Ok(()));
        assert_eq!(run_body(|| Err(TaskError::NoRuntime)), Err(TaskError::NoRuntime));
    }
}
