//! # Task registry - ref-counted owner of retained task handles.
//!
//! One entry per retained dispatch:
//! ```text
//! open()        → Entry { Open { early: 0 } }        body starts running
//! complete(id)  → early += 1                          cleanup during the body
//! seal(id, hs)  → Entry { Sealed { remaining } }      remaining = |hs| - early
//! complete(id)  → remaining -= 1 → 0 ⇒ entry removed, handles dropped
//! complete(id)  → Unknown (anomaly, no-op)
//! ```
//!
//! ## Rules
//! - Registry owns the handles (dropping them cancels their work)
//! - `remaining` never goes below zero and a released entry never comes back
//! - Handles are dropped after the table lock is released

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::diagnostics::{Anomaly, Diagnostics};
use crate::task::cleanup::Cleanup;
use crate::task::handle::CancellationHandle;

/// Identifier of one retained task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Result of one completion signal or of sealing an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Entry still alive with this many outstanding handles.
    Pending(usize),
    /// Counted before the body finished registering its handles.
    Deferred,
    /// Entry removed and its handles dropped.
    Released,
    /// No entry for this id.
    Unknown,
}

enum EntryState {
    Open { early: usize },
    Sealed { remaining: usize },
}

struct Entry {
    handles: Vec<CancellationHandle>,
    state: EntryState,
}

/// Ref-counted table of retained task handles.
pub struct TaskRegistry {
    entries: Mutex<HashMap<TaskId, Entry>>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl TaskRegistry {
    pub fn new(diagnostics: Arc<dyn Diagnostics>) -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(HashMap::new()),
            diagnostics,
        })
    }

    /// Reserve an entry before the body runs.
    pub fn open(&self) -> TaskId {
        let id = TaskId::new();
        self.entries.lock().insert(
            id,
            Entry {
                handles: Vec::new(),
                state: EntryState::Open { early: 0 },
            },
        );
        id
    }

    /// Hand the body's handles to the registry.
    ///
    /// Completions that arrived while the body ran are subtracted. If
    /// nothing is outstanding the entry is released immediately.
    pub fn seal(&self, id: TaskId, handles: Vec<CancellationHandle>) -> Completion {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(&id) else {
            // Registry was cleared while the body ran.
            drop(entries);
            drop(handles);
            return Completion::Unknown;
        };

        let early = match entry.state {
            EntryState::Open { early } => early,
            EntryState::Sealed { remaining } => {
                // Sealing twice only adds handles; the count is already fixed.
                entry.handles.extend(handles);
                return Completion::Pending(remaining);
            }
        };

        let count = handles.len();
        let remaining = count.saturating_sub(early);
        if remaining == 0 {
            let removed = entries.remove(&id);
            drop(entries);
            drop(removed);
            drop(handles);
            if early > count {
                self.diagnostics.anomaly(&Anomaly::ExcessCleanup {
                    task: id,
                    excess: early - count,
                });
            }
            tracing::debug!(task = %id, handles = count, "Retained task finished during registration");
            return Completion::Released;
        }

        entry.handles = handles;
        entry.state = EntryState::Sealed { remaining };
        tracing::debug!(task = %id, remaining, "Retained task registered");
        Completion::Pending(remaining)
    }

    /// Record that one handle's work has ended.
    pub fn complete(&self, id: TaskId) -> Completion {
        let mut entries = self.entries.lock();
        let Some(entry) = entries.get_mut(&id) else {
            drop(entries);
            self.diagnostics
                .anomaly(&Anomaly::CleanupAfterRelease { task: id });
            return Completion::Unknown;
        };

        match &mut entry.state {
            EntryState::Open { early } => {
                *early += 1;
                Completion::Deferred
            }
            EntryState::Sealed { remaining } => {
                *remaining = remaining.saturating_sub(1);
                if *remaining > 0 {
                    return Completion::Pending(*remaining);
                }
                let removed = entries.remove(&id);
                drop(entries);
                drop(removed);
                tracing::debug!(task = %id, "Retained task released");
                Completion::Released
            }
        }
    }

    /// A latch that completes one handle of `id` when fired or dropped.
    ///
    /// Holds only a weak reference, so pending cleanups never keep the
    /// registry (and the handles it owns) alive.
    pub(crate) fn cleanup_for(self: &Arc<Self>, id: TaskId) -> Cleanup {
        let registry = Arc::downgrade(self);
        Cleanup::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry.complete(id);
            }
        })
    }

    /// Outstanding handle count of a sealed entry.
    pub fn remaining(&self, id: TaskId) -> Option<usize> {
        match self.entries.lock().get(&id)?.state {
            EntryState::Sealed { remaining } => Some(remaining),
            EntryState::Open { .. } => None,
        }
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.entries.lock().contains_key(&id)
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Drop every entry, cancelling all retained work.
    pub fn release_all(&self) -> usize {
        let drained: Vec<Entry> = self.entries.lock().drain().map(|(_, e)| e).collect();
        let count = drained.len();
        drop(drained);
        count
    }
}

impl fmt::Debug for TaskRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRegistry")
            .field("entries", &self.len())
            .finish()
    }
}
