//! Shutdown coordination for the service.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::context::CallContext;

/// Coordinator for graceful shutdown.
///
/// Holds the cancellation signal every inbound request's [`CallContext`] is
/// derived from, so triggering shutdown also abandons in-flight upstream
/// calls and retry delays.
#[derive(Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    /// Create a new shutdown coordinator.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Subscribe to the shutdown signal.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    /// Context cancelled by shutdown and bounded by `timeout`.
    pub fn context(&self, timeout: Duration) -> CallContext {
        CallContext::background()
            .with_cancel(self.subscribe())
            .with_timeout(timeout)
    }

    /// Trigger the shutdown signal.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Wait until shutdown is triggered.
    pub async fn wait(&self) {
        let mut rx = self.subscribe();
        let _ = rx.wait_for(|triggered| *triggered).await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
