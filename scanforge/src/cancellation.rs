//! Cooperative cancellation for in-flight runs.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

/// A token for cooperative cancellation.
///
/// Cancellation is idempotent: only the first reason is kept. The token can
/// be both polled synchronously and awaited, so a runner can race an
/// external process against it.
pub struct CancellationToken {
    cancelled: AtomicBool,
    reason: RwLock<Option<String>>,
    notify: watch::Sender<bool>,
}

impl Default for CancellationToken {
    fn default() -> Self {
        let (notify, _) = watch::channel(false);
        Self {
            cancelled: AtomicBool::new(false),
            reason: RwLock::new(None),
            notify,
        }
    }
}

impl CancellationToken {
    /// Creates a new, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation with a reason.
    ///
    /// Idempotent: only the first reason is stored; later calls are no-ops.
    pub fn cancel(&self, reason: impl Into<String>) {
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            *self.reason.write() = Some(reason.into());
            self.notify.send_replace(true);
        }
    }

    /// Returns true if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the cancellation reason, if cancelled.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.read().clone()
    }

    /// Suspends until cancellation is requested.
    ///
    /// Resolves immediately if the token is already cancelled.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        let mut rx = self.notify.subscribe();
        // The sender lives in self, so wait_for cannot observe a closed channel here.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_default_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.reason().is_none());
    }

    #[test]
    fn test_cancel_stores_reason() {
        let token = CancellationToken::new();
        token.cancel("operator abort");

        assert!(token.is_cancelled());
        assert_eq!(token.reason(), Some("operator abort".to_string()));
    }

    #[test]
    fn test_cancel_first_reason_wins() {
        let token = CancellationToken::new();
        token.cancel("first");
        token.cancel("second");

        assert_eq!(token.reason(), Some("first".to_string()));
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_cancel() {
        let token = Arc::new(CancellationToken::new());
        let waiter = token.clone();

        let handle = tokio::spawn(async move {
            waiter.cancelled().await;
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        token.cancel("shutting down");

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_resolves_immediately_when_already_cancelled() {
        let token = CancellationToken::new();
        token.cancel("done");

        tokio::time::timeout(Duration::from_millis(100), token.cancelled())
            .await
            .unwrap();
    }
}
