use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{PlStatsError, Result};

/// Cancellation signal owned by one page-level load.
///
/// Clones share the signal. Once cancelled, every [`CancelToken::run`] in
/// flight resolves to [`PlStatsError::Cancelled`] and its result is dropped.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // the sender lives in `self`, so wait_for cannot fail
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Drive `fut` unless the token fires first.
    pub async fn run<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(PlStatsError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(PlStatsError::Cancelled),
            out = fut => out,
        }
    }
}
