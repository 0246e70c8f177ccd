//! Serial polling of live fixtures.
//!
//! The next cycle is scheduled only after the current request settles, so a
//! slow upstream stretches the cadence instead of piling up requests.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cancel::CancelToken;
use crate::error::{PlStatsError, Result};
use crate::model::{ApiFixture, LiveLine};

/// State of the live ticker after the latest cycle.
#[derive(Debug, Clone, Serialize)]
pub struct LiveSnapshot {
    pub fixtures: Vec<LiveLine>,
    /// Message of the latest failure; cleared by the next success.
    pub error: Option<String>,
    /// True until the first cycle settles.
    pub loading: bool,
    /// Number of settled cycles.
    pub cycles: u64,
}

impl Default for LiveSnapshot {
    fn default() -> Self {
        Self {
            fixtures: Vec::new(),
            error: None,
            loading: true,
            cycles: 0,
        }
    }
}

/// Polls a fetch function forever, publishing each result as a [`LiveSnapshot`].
#[derive(Debug, Clone, Copy)]
pub struct LivePoller {
    interval: Duration,
}

impl LivePoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Run until `cancel` fires. A failed cycle keeps the previous fixtures
    /// and records the error; polling carries on either way.
    pub async fn run<F, Fut>(self, mut fetch: F, tx: watch::Sender<LiveSnapshot>, cancel: CancelToken)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Vec<ApiFixture>>>,
    {
        loop {
            match cancel.run(fetch()).await {
                Err(PlStatsError::Cancelled) => break,
                Ok(fixtures) => {
                    debug!(count = fixtures.len(), "live cycle");
                    tx.send_modify(|snap| {
                        snap.fixtures = fixtures.iter().map(LiveLine::from).collect();
                        snap.error = None;
                        snap.loading = false;
                        snap.cycles += 1;
                    });
                }
                Err(e) => {
                    warn!(error = %e, "live cycle failed");
                    tx.send_modify(|snap| {
                        snap.error = Some(e.to_string());
                        snap.loading = false;
                        snap.cycles += 1;
                    });
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
        debug!("live poller stopped");
    }

    /// Start polling on the runtime; the returned handle stops it.
    pub fn spawn<F, Fut>(self, fetch: F) -> LiveHandle
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<Vec<ApiFixture>>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(LiveSnapshot::default());
        let cancel = CancelToken::new();
        let task = tokio::spawn(self.run(fetch, tx, cancel.clone()));
        LiveHandle { rx, cancel, task }
    }
}

/// Running live ticker.
#[derive(Debug)]
pub struct LiveHandle {
    rx: watch::Receiver<LiveSnapshot>,
    cancel: CancelToken,
    task: JoinHandle<()>,
}

impl LiveHandle {
    pub fn snapshot(&self) -> LiveSnapshot {
        self.rx.borrow().clone()
    }

    /// Receiver that wakes after every cycle.
    pub fn subscribe(&self) -> watch::Receiver<LiveSnapshot> {
        self.rx.clone()
    }

    /// Cancel the poller and wait for it to wind down. An in-flight request is dropped.
    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.task.await {
            warn!(error = %e, "live poller task failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::json;
    use tokio::time::Instant;

    use super::*;

    fn live_fixture(id: u64) -> ApiFixture {
        serde_json::from_value(json!({
            "fixture": { "id": id, "status": { "short": "1H", "elapsed": 12 } },
            "teams": { "home": { "name": "Spurs" }, "away": { "name": "Chelsea" } },
            "goals": { "home": 1, "away": 0 }
        }))
        .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_cadence_is_serial() {
        let starts = Arc::new(Mutex::new(Vec::new()));
        let recorded = starts.clone();
        let handle = LivePoller::new(Duration::from_secs(10)).spawn(move || {
            let recorded = recorded.clone();
            async move {
                recorded.lock().unwrap().push(Instant::now());
                tokio::time::sleep(Duration::from_secs(2)).await;
                Ok(vec![live_fixture(1)])
            }
        });

        let mut rx = handle.subscribe();
        while rx.borrow_and_update().cycles < 3 {
            rx.changed().await.unwrap();
        }
        let snapshot = handle.snapshot();
        handle.stop().await;

        assert!(!snapshot.loading);
        assert_eq!(snapshot.fixtures.len(), 1);
        let starts = starts.lock().unwrap();
        assert!(starts.len() >= 3);
        for pair in starts.windows(2) {
            // request time plus the full interval
            assert!(pair[1] - pair[0] >= Duration::from_secs(12));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_recorded_and_polling_continues() {
        let calls = Arc::new(Mutex::new(0u32));
        let counter = calls.clone();
        let handle = LivePoller::new(Duration::from_secs(10)).spawn(move || {
            let counter = counter.clone();
            async move {
                let n = {
                    let mut calls = counter.lock().unwrap();
                    *calls += 1;
                    *calls
                };
                if n == 2 {
                    Err(PlStatsError::InvalidArgument("upstream down".into()))
                } else {
                    Ok(vec![live_fixture(u64::from(n))])
                }
            }
        });

        let mut rx = handle.subscribe();
        let mut saw_error = false;
        loop {
            rx.changed().await.unwrap();
            let snap = rx.borrow_and_update().clone();
            if snap.cycles == 2 {
                assert!(snap.error.as_deref().unwrap().contains("upstream down"));
                // previous fixtures survive a failed cycle
                assert_eq!(snap.fixtures[0].fixture_id, 1);
                saw_error = true;
            }
            if snap.cycles == 3 {
                assert!(snap.error.is_none());
                assert_eq!(snap.fixtures[0].fixture_id, 3);
                break;
            }
        }
        handle.stop().await;
        assert!(saw_error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_drops_in_flight_request() {
        let handle = LivePoller::new(Duration::from_secs(10)).spawn(|| async {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(vec![])
        });
        tokio::task::yield_now().await;
        let snapshot = handle.snapshot();
        handle.stop().await;
        assert!(snapshot.loading);
        assert_eq!(snapshot.cycles, 0);
    }
}
