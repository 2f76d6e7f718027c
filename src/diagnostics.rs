//! Diagnostic hook for lifecycle protocol violations.
//!
//! Excess cleanups, cleanups for released tasks and events delivered to a
//! finished stream can all arise from legitimate races between completion
//! and cancellation. They are absorbed as no-ops and reported here.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::status::EventKind;
use crate::task::TaskId;

/// A lifecycle protocol violation that was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Anomaly {
    /// `cleanup` arrived for a task whose registry entry is already gone.
    CleanupAfterRelease { task: TaskId },
    /// More cleanups than registered handles arrived while the body ran.
    ExcessCleanup { task: TaskId, excess: usize },
    /// A lifecycle event reached a stream that is already terminal.
    TerminalEventIgnored { label: String, event: EventKind },
    /// A task action reached the reducer because no task interceptor ran.
    UnhandledTask { description: String },
    /// An action was dispatched after its store was dropped.
    DispatchAfterDrop { description: String },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::CleanupAfterRelease { task } => {
                write!(f, "cleanup for released task {}", task)
            }
            Anomaly::ExcessCleanup { task, excess } => {
                write!(f, "task {} received {} excess cleanup(s)", task, excess)
            }
            Anomaly::TerminalEventIgnored { label, event } => {
                write!(f, "'{}' is terminal, ignored {} event", label, event)
            }
            Anomaly::UnhandledTask { description } => {
                write!(f, "task action reached the reducer: {}", description)
            }
            Anomaly::DispatchAfterDrop { description } => {
                write!(f, "dispatch after store drop: {}", description)
            }
        }
    }
}

/// Observer for ignored protocol violations. Must never panic.
pub trait Diagnostics: Send + Sync + 'static {
    fn anomaly(&self, anomaly: &Anomaly);
}

/// Reports anomalies as `tracing` warnings.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn anomaly(&self, anomaly: &Anomaly) {
        tracing::warn!(target: "unistore::diagnostics", %anomaly, "Lifecycle anomaly ignored");
    }
}

/// Drops every anomaly.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentDiagnostics;

impl Diagnostics for SilentDiagnostics {
    fn anomaly(&self, _anomaly: &Anomaly) {}
}

/// Keeps every anomaly in memory for later inspection.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    seen: Mutex<Vec<Anomaly>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of everything reported so far.
    pub fn anomalies(&self) -> Vec<Anomaly> {
        self.seen.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.lock().is_empty()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn anomaly(&self, anomaly: &Anomaly) {
        self.seen.lock().push(anomaly.clone());
    }
}
