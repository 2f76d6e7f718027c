//! Lifecycle events reported by asynchronous sources.

use std::fmt;

/// One notification from an observed stream.
///
/// A source emits `Started` once, any number of `Value`s, then at most one
/// of `Finished`, `Failed` or `Cancelled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent<T, E> {
    Started,
    Value(T),
    Finished,
    Failed(E),
    Cancelled,
}

impl<T, E> LifecycleEvent<T, E> {
    pub fn kind(&self) -> EventKind {
        match self {
            LifecycleEvent::Started => EventKind::Started,
            LifecycleEvent::Value(_) => EventKind::Value,
            LifecycleEvent::Finished => EventKind::Finished,
            LifecycleEvent::Failed(_) => EventKind::Failed,
            LifecycleEvent::Cancelled => EventKind::Cancelled,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.kind().is_terminal()
    }
}

/// Payload-free tag of a [`LifecycleEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Started,
    Value,
    Finished,
    Failed,
    Cancelled,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Started => "started",
            EventKind::Value => "value",
            EventKind::Finished => "finished",
            EventKind::Failed => "failed",
            EventKind::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EventKind::Finished | EventKind::Failed | EventKind::Cancelled
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
