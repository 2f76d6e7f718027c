//! Status-only lifecycle model.

use crate::error::TaskError;
use crate::status::{Lifecycle, LifecycleEvent, Transition};

/// Done-ness of an observed stream, without its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus<E = TaskError> {
    Initial,
    Loading,
    Active,
    Completed,
    Failed(E),
    Cancelled,
}

impl<E> Default for TaskStatus<E> {
    fn default() -> Self {
        TaskStatus::Initial
    }
}

impl<E> TaskStatus<E> {
    /// Started and not yet terminal.
    pub fn is_loading(&self) -> bool {
        matches!(self, TaskStatus::Loading | TaskStatus::Active)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TaskStatus::Completed)
    }

    /// Completed, failed or cancelled.
    pub fn is_done(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed(_) | TaskStatus::Cancelled
        )
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            TaskStatus::Failed(error) => Some(error),
            _ => None,
        }
    }
}

impl<T, E> Lifecycle<T, E> for TaskStatus<E> {
    fn on_event(&mut self, event: LifecycleEvent<T, E>) -> Transition {
        if self.is_done() {
            return Transition::Ignored;
        }
        let next = match event {
            LifecycleEvent::Started => match self {
                TaskStatus::Initial => TaskStatus::Loading,
                _ => return Transition::Ignored,
            },
            LifecycleEvent::Value(_) => TaskStatus::Active,
            LifecycleEvent::Finished => TaskStatus::Completed,
            LifecycleEvent::Failed(error) => TaskStatus::Failed(error),
            LifecycleEvent::Cancelled => TaskStatus::Cancelled,
        };
        *self = next;
        Transition::Applied
    }

    fn is_terminal(&self) -> bool {
        self.is_done()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Event = LifecycleEvent<u32, TaskError>;

    #[test]
    fn default_is_initial() {
        assert_eq!(TaskStatus::<TaskError>::default(), TaskStatus::Initial);
    }

    #[test]
    fn values_only_mark_active() {
        let mut status = TaskStatus::default();
        status.on_event(Event::Started);
        status.on_event(Event::Value(8));
        assert_eq!(status, TaskStatus::Active);
        assert!(status.is_loading());
        status.on_event(Event::Finished);
        assert_eq!(status, TaskStatus::Completed);
        assert!(status.is_done());
    }

    #[test]
    fn second_start_is_ignored() {
        let mut status = TaskStatus::default();
        assert_eq!(status.on_event(Event::Started), Transition::Applied);
        assert_eq!(status.on_event(Event::Started), Transition::Ignored);
        assert_eq!(status, TaskStatus::Loading);
    }

    #[test]
    fn cancelled_is_terminal() {
        let mut status = TaskStatus::default();
        status.on_event(Event::Started);
        status.on_event(Event::Cancelled);
        assert_eq!(status.on_event(Event::Finished), Transition::Ignored);
        assert_eq!(status, TaskStatus::Cancelled);
    }
}
