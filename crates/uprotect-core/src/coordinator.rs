// ── Refresh coordinator ──
//
// Single writer for the camera store. Polls the configured source on a
// fixed cadence, folds the result into the store, and publishes one
// RefreshCycle per attempt so entities and watchers can react.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, Notify, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::{CameraId, CameraState};
use crate::source::CameraSource;
use crate::store::CameraStore;
use crate::stream::UpdateStream;

/// Outcome of one refresh attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshCycle {
    /// Monotonic attempt counter; 0 until the first poll completes.
    pub seq: u64,
    pub success: bool,
    pub completed_at: DateTime<Utc>,
}

/// The polling coordinator.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Owns the camera store
/// and is its sole writer: a failed poll keeps the previous camera data
/// and only flips [`last_update_success`](Self::last_update_success).
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    source: Arc<dyn CameraSource>,
    store: CameraStore,
    scan_interval: Duration,
    cycle: watch::Sender<RefreshCycle>,
    refresh_requested: Notify,
    cancel: CancellationToken,
    /// Child token for the current run -- cancelled on shutdown, replaced
    /// on restart (avoids permanent cancellation).
    cancel_child: Mutex<CancellationToken>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Coordinator {
    /// Create a coordinator over a source. Does NOT poll -- call
    /// [`refresh_now()`](Self::refresh_now) for the initial load and
    /// [`start()`](Self::start) for the background loop.
    #[must_use]
    pub fn new(source: Arc<dyn CameraSource>, scan_interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(CoordinatorInner {
                source,
                store: CameraStore::new(),
                scan_interval,
                // Starts successful: consumers that look before the first
                // poll see "no failure yet", not an outage.
                cycle: watch::Sender::new(RefreshCycle {
                    seq: 0,
                    success: true,
                    completed_at: Utc::now(),
                }),
                refresh_requested: Notify::new(),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the underlying camera store.
    pub fn store(&self) -> &CameraStore {
        &self.inner.store
    }

    /// Current snapshot of all cameras, sorted by name.
    #[must_use]
    pub fn data(&self) -> Arc<Vec<Arc<CameraState>>> {
        self.inner.store.snapshot()
    }

    #[must_use]
    pub fn camera(&self, id: &CameraId) -> Option<Arc<CameraState>> {
        self.inner.store.get(id)
    }

    /// Whether the most recent refresh attempt succeeded.
    #[must_use]
    pub fn last_update_success(&self) -> bool {
        self.inner.cycle.borrow().success
    }

    /// The most recent refresh cycle.
    #[must_use]
    pub fn last_cycle(&self) -> RefreshCycle {
        self.inner.cycle.borrow().clone()
    }

    /// Subscribe to refresh cycles. Every attempt is published, failed
    /// ones included.
    #[must_use]
    pub fn subscribe(&self) -> UpdateStream {
        UpdateStream::new(self.inner.cycle.subscribe())
    }

    /// Ask the background loop for an early poll.
    ///
    /// Coalesced: several requests before the loop wakes produce a single
    /// refresh. Returns immediately; observe the result through
    /// [`subscribe()`](Self::subscribe).
    pub fn request_refresh(&self) {
        self.inner.refresh_requested.notify_one();
    }

    /// Run one refresh to completion, bypassing the background loop.
    ///
    /// On failure the store is left untouched and the error is returned;
    /// the failed cycle is still published.
    pub async fn refresh_now(&self) -> Result<(), CoreError> {
        let result = self.inner.source.poll_cameras().await;
        let success = result.is_ok();

        let outcome = match result {
            Ok(cameras) => {
                self.inner.store.apply_refresh(cameras);
                Ok(())
            }
            Err(e) => Err(e),
        };

        self.inner.cycle.send_modify(|cycle| {
            cycle.seq += 1;
            cycle.success = success;
            cycle.completed_at = Utc::now();
        });

        outcome
    }

    /// Spawn the background refresh loop.
    ///
    /// With a zero scan interval nothing is spawned -- one-shot consumers
    /// drive refreshes through [`refresh_now()`](Self::refresh_now).
    pub async fn start(&self) {
        if self.inner.scan_interval.is_zero() {
            debug!("scan interval is zero, background refresh disabled");
            return;
        }

        // Fresh child token for this run (supports restart after shutdown).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let mut handles = self.inner.task_handles.lock().await;
        handles.push(tokio::spawn(refresh_task(self.clone(), child)));
        debug!(interval = ?self.inner.scan_interval, "refresh loop started");
    }

    /// Stop the background loop and wait for it to exit.
    pub async fn shutdown(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }
        debug!("refresh loop stopped");
    }
}

// ── Background tasks ─────────────────────────────────────────────

async fn refresh_task(coordinator: Coordinator, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(coordinator.inner.scan_interval);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = coordinator.inner.refresh_requested.notified() => {
                if let Err(e) = coordinator.refresh_now().await {
                    warn!(error = %e, "requested refresh failed");
                }
            }
            _ = interval.tick() => {
                if let Err(e) = coordinator.refresh_now().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}
