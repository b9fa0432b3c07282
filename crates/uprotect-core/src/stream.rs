// ── Refresh cycle streams ──
//
// Subscription types for observing coordinator refreshes.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::coordinator::RefreshCycle;

/// A subscription to the coordinator's refresh cycles.
///
/// Provides both point-in-time access and reactive change notification
/// via the `changed()` method or by converting to a `Stream`. Every
/// refresh attempt produces a cycle, failed ones included.
pub struct UpdateStream {
    current: RefreshCycle,
    receiver: watch::Receiver<RefreshCycle>,
}

impl UpdateStream {
    pub(crate) fn new(receiver: watch::Receiver<RefreshCycle>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// Get the cycle captured at subscription time.
    pub fn current(&self) -> &RefreshCycle {
        &self.current
    }

    /// Get the latest cycle (may have advanced since subscription).
    pub fn latest(&self) -> RefreshCycle {
        self.receiver.borrow().clone()
    }

    /// Wait for the next refresh, returning its cycle.
    /// Returns `None` if the coordinator has been dropped.
    pub async fn changed(&mut self) -> Option<RefreshCycle> {
        self.receiver.changed().await.ok()?;
        let cycle = self.receiver.borrow_and_update().clone();
        self.current = cycle.clone();
        Some(cycle)
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> UpdateWatchStream {
        UpdateWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields a new [`RefreshCycle`] each time the coordinator completes a
/// refresh attempt.
pub struct UpdateWatchStream {
    inner: WatchStream<RefreshCycle>,
}

impl Stream for UpdateWatchStream {
    type Item = RefreshCycle;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        // WatchStream<RefreshCycle> is Unpin.
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
