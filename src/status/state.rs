//! Lifecycle model that carries the stream's latest output.

use std::mem;

use crate::error::TaskError;
use crate::status::{Lifecycle, LifecycleEvent, Transition};

/// Progress of an observed stream together with its last output.
///
/// `Completed` holds the last value seen, or `None` if the stream finished
/// without producing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState<T, E = TaskError> {
    Initial,
    Loading,
    Active(T),
    Completed(Option<T>),
    Failed(E),
    Cancelled,
}

impl<T, E> Default for TaskState<T, E> {
    fn default() -> Self {
        TaskState::Initial
    }
}

impl<T, E> TaskState<T, E> {
    /// Started and not yet terminal.
    pub fn is_loading(&self) -> bool {
        matches!(self, TaskState::Loading | TaskState::Active(_))
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskState::Completed(_))
    }

    /// Completed, failed or cancelled.
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            TaskState::Completed(_) | TaskState::Failed(_) | TaskState::Cancelled
        )
    }

    /// Latest output, while active or after completion.
    pub fn value(&self) -> Option<&T> {
        match self {
            TaskState::Active(value) | TaskState::Completed(Some(value)) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            TaskState::Failed(error) => Some(error),
            _ => None,
        }
    }
}

impl<T, E> Lifecycle<T, E> for TaskState<T, E> {
    fn on_event(&mut self, event: LifecycleEvent<T, E>) -> Transition {
        if self.is_done() {
            return Transition::Ignored;
        }
        let next = match event {
            LifecycleEvent::Started => match self {
                TaskState::Initial => TaskState::Loading,
                _ => return Transition::Ignored,
            },
            LifecycleEvent::Value(value) => TaskState::Active(value),
            LifecycleEvent::Finished => match mem::replace(self, TaskState::Initial) {
                TaskState::Active(value) => TaskState::Completed(Some(value)),
                _ => TaskState::Completed(None),
            },
            LifecycleEvent::Failed(error) => TaskState::Failed(error),
            LifecycleEvent::Cancelled => TaskState::Cancelled,
        };
        *self = next;
        Transition::Applied
    }

    fn is_terminal(&self) -> bool {
        self.is_done()
    }
}
