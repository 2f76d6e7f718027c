//! Ownership token for one running asynchronous subscription.

use tokio_util::sync::CancellationToken;

/// Cancels its work when cancelled explicitly or dropped.
///
/// The work side holds a clone of [`token`](Self::token) and stops once
/// it observes cancellation. Cancelling more than once is a no-op.
#[derive(Debug)]
pub struct CancellationHandle {
    token: CancellationToken,
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Token for the work side.
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for CancellationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl From<CancellationToken> for CancellationHandle {
    fn from(token: CancellationToken) -> Self {
        Self { token }
    }
}

impl Drop for CancellationHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_cancels_token() {
        let handle = CancellationHandle::new();
        let token = handle.token();
        assert!(!token.is_cancelled());
        drop(handle);
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_twice_is_noop() {
        let handle = CancellationHandle::new();
        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
    }
}
