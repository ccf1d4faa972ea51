// ── Reactive log subscription ──
//
// Snapshot-plus-change-notification view over the ingestor's output.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use crate::telemetry::{BackfillStatus, TelemetrySnapshot};

/// A subscription to the telemetry buffer.
///
/// Provides point-in-time snapshot access and reactive change
/// notification via [`changed()`](Self::changed) or by converting to a
/// `Stream`.
pub struct LogStream {
    current: TelemetrySnapshot,
    receiver: watch::Receiver<TelemetrySnapshot>,
}

impl LogStream {
    pub(crate) fn new(receiver: watch::Receiver<TelemetrySnapshot>) -> Self {
        let current = receiver.borrow().clone();
        Self { current, receiver }
    }

    /// The snapshot captured at creation or at the last `changed()`.
    pub fn current(&self) -> &TelemetrySnapshot {
        &self.current
    }

    /// The latest snapshot (may have changed since creation).
    pub fn latest(&self) -> TelemetrySnapshot {
        self.receiver.borrow().clone()
    }

    /// Wait for the next change, returning the new snapshot.
    /// Returns `None` if the ingestor has been dropped.
    pub async fn changed(&mut self) -> Option<TelemetrySnapshot> {
        self.receiver.changed().await.ok()?;
        let snap = self.receiver.borrow_and_update().clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Wait until the backfill has either loaded or failed.
    pub async fn backfill_settled(&mut self) -> Option<TelemetrySnapshot> {
        let snap = self
            .receiver
            .wait_for(|s| s.backfill != BackfillStatus::Pending)
            .await
            .ok()?
            .clone();
        self.current = snap.clone();
        Some(snap)
    }

    /// Convert into a `Stream` of snapshots.
    pub fn into_stream(self) -> LogWatchStream {
        LogWatchStream {
            inner: WatchStream::new(self.receiver),
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`.
///
/// Yields the current snapshot first, then one per published change.
pub struct LogWatchStream {
    inner: WatchStream<TelemetrySnapshot>,
}

impl Stream for LogWatchStream {
    type Item = TelemetrySnapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
