//! Progress of one observed asynchronous stream, surfaced into state.
//!
//! Two parallel models share one transition table:
//! [`TaskStatus`] tracks done-ness only, [`TaskState`] also carries the
//! last value the stream produced.
//!
//! ```text
//! Initial ──Started──► Loading ──Value──► Active(v) ──Value──► Active(v')
//!                         │                  │
//!                         ├──Finished──► Completed(None)
//!                         │                  └──Finished──► Completed(v)
//!                         └──Failed(e) / Cancelled (from any non-terminal)
//! ```
//!
//! Terminal states ignore every further event.

mod event;
mod state;
mod status;
mod tracker;

pub use event::{EventKind, LifecycleEvent};
pub use state::TaskState;
pub use status::TaskStatus;
pub use tracker::Tracker;

/// Outcome of feeding one event into a lifecycle model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Applied,
    Ignored,
}

/// A state machine driven by [`LifecycleEvent`]s.
pub trait Lifecycle<T, E> {
    /// Apply one event. Terminal models return [`Transition::Ignored`].
    fn on_event(&mut self, event: LifecycleEvent<T, E>) -> Transition;

    /// Completed, failed or cancelled.
    fn is_terminal(&self) -> bool;
}
