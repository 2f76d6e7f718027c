//! Single-shot completion latch for one task handle.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

type Release = Box<dyn Fn() + Send + Sync>;

/// Signals that one handle's work has ended.
///
/// Clones share one latch: the first [`call`](Self::call) releases, every
/// later call is a no-op. If all clones are dropped without a call the
/// release still fires, so panics and aborted work are covered too.
#[derive(Clone)]
pub struct Cleanup {
    inner: Arc<Latch>,
}

struct Latch {
    fired: AtomicBool,
    release: Release,
}

impl Cleanup {
    pub(crate) fn new(release: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(Latch {
                fired: AtomicBool::new(false),
                release: Box::new(release),
            }),
        }
    }

    /// A latch with nothing to release.
    pub fn detached() -> Self {
        Self::new(|| {})
    }

    /// Fire the latch. Returns `true` only for the call that released.
    pub fn call(&self) -> bool {
        self.inner.fire()
    }

    pub fn is_fired(&self) -> bool {
        self.inner.fired.load(Ordering::Acquire)
    }
}

impl Latch {
    fn fire(&self) -> bool {
        if self.fired.swap(true, Ordering::AcqRel) {
            return false;
        }
        (self.release)();
        true
    }
}

impl Drop for Latch {
    fn drop(&mut self) {
        self.fire();
    }
}

impl fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cleanup")
            .field("fired", &self.is_fired())
            .finish()
    }
}
