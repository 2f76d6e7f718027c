//! The closed action vocabulary understood by the store.
//!
//! Application intents travel as [`Action::Intent`]. The remaining
//! variants are recognized by interceptors (`Thunk`, `Task`, `Retained`)
//! or by the store's own update reducer (`Update`).

use std::borrow::Cow;
use std::fmt;

use crate::mvi::{Intent, StoreState};
use crate::status::EventKind;
use crate::store::dispatch::{Dispatch, GetState};
use crate::task::{RetainedTaskAction, TaskAction};

/// Every value that can be dispatched into a store.
pub enum Action<S, A> {
    /// Application intent, handled by the reducer.
    Intent(A),
    /// Carries its own state mutation.
    Update(Update<S>),
    /// Synchronous side effect with access to dispatch and state.
    Thunk(Thunk<S, A>),
    /// Async work whose handles live as long as the action value.
    Task(TaskAction<S, A>),
    /// Async work whose handles are owned by the store's task registry.
    Retained(RetainedTaskAction<S, A>),
}

impl<S: StoreState, A: Intent> Action<S, A> {
    pub fn intent(intent: A) -> Self {
        Action::Intent(intent)
    }

    /// Textual description used by the action log.
    pub fn describe(&self) -> String {
        match self {
            Action::Intent(intent) => format!("[Intent] {:?}", intent),
            Action::Update(update) => update.to_string(),
            Action::Thunk(thunk) => format!("[Thunk] {}", thunk.label()),
            Action::Task(task) => format!("[TaskAction] {}", task.label()),
            Action::Retained(task) => format!("[RetainedTaskAction] {}", task.label()),
        }
    }

    /// True for variants that carry executable work instead of reducer data.
    pub fn is_task(&self) -> bool {
        matches!(
            self,
            Action::Thunk(_) | Action::Task(_) | Action::Retained(_)
        )
    }
}

impl<S: StoreState, A: Intent> fmt::Debug for Action<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

impl<S, A> From<Update<S>> for Action<S, A> {
    fn from(update: Update<S>) -> Self {
        Action::Update(update)
    }
}

impl<S, A> From<Thunk<S, A>> for Action<S, A> {
    fn from(thunk: Thunk<S, A>) -> Self {
        Action::Thunk(thunk)
    }
}

impl<S, A> From<TaskAction<S, A>> for Action<S, A> {
    fn from(task: TaskAction<S, A>) -> Self {
        Action::Task(task)
    }
}

impl<S, A> From<RetainedTaskAction<S, A>> for Action<S, A> {
    fn from(task: RetainedTaskAction<S, A>) -> Self {
        Action::Retained(task)
    }
}

type UpdateFn<S> = Box<dyn FnOnce(&mut S) + Send>;

/// An action that carries its own state mutation.
///
/// Used in place of reflective "set this field" actions: the closure is
/// the field setter, applied by the store's update reducer. It runs while
/// the store commits and must not dispatch.
pub struct Update<S> {
    event: Option<EventKind>,
    label: Option<Cow<'static, str>>,
    apply: UpdateFn<S>,
}

impl<S: StoreState> Update<S> {
    pub fn new(apply: impl FnOnce(&mut S) + Send + 'static) -> Self {
        Self {
            event: None,
            label: None,
            apply: Box::new(apply),
        }
    }

    /// Tag the update with the lifecycle event that produced it.
    pub fn with_event(mut self, event: EventKind) -> Self {
        self.event = Some(event);
        self
    }

    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn event(&self) -> Option<EventKind> {
        self.event
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Apply the mutation to a state value.
    pub fn apply(self, mut state: S) -> S {
        (self.apply)(&mut state);
        state
    }
}

impl<S> fmt::Display for Update<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Update] {}", self.label.as_deref().unwrap_or(""))?;
        if let Some(event) = self.event {
            write!(f, " event:{}", event)?;
        }
        Ok(())
    }
}

type ThunkBody<S, A> = Box<dyn FnOnce(&Dispatch<S, A>, &GetState<S>) + Send>;

/// The classic thunk: a synchronous body run by the thunk interceptor.
pub struct Thunk<S, A> {
    label: Cow<'static, str>,
    body: ThunkBody<S, A>,
}

impl<S: StoreState, A: Intent> Thunk<S, A> {
    pub fn new(body: impl FnOnce(&Dispatch<S, A>, &GetState<S>) + Send + 'static) -> Self {
        Self {
            label: Cow::Borrowed(""),
            body: Box::new(body),
        }
    }

    pub fn with_label(mut self, label: impl Into<Cow<'static, str>>) -> Self {
        self.label = label.into();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn run(self, dispatch: &Dispatch<S, A>, get_state: &GetState<S>) {
        (self.body)(dispatch, get_state)
    }
}
