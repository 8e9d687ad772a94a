// ── Live telemetry view ──
//
// A mount guard over `TelemetryStream`: the connection opens on `mount`
// and is closed exactly once, by `close` or on drop, whatever state it is
// in at that point. Frame callbacks run on spawned tasks that stop with it.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use teledash_api::{ReconnectPolicy, StreamState, TelemetrySnapshot, TelemetryStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::CoreError;

/// One mounted live view.
pub struct LiveTelemetry {
    url: Url,
    stream: TelemetryStream,
    cancel: CancellationToken,
    mounted_at: DateTime<Utc>,
    last_frame_at: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl LiveTelemetry {
    /// Open the stream at `url`. Must be called from within a Tokio runtime.
    pub fn mount(url: Url, policy: ReconnectPolicy) -> Self {
        let cancel = CancellationToken::new();
        let stream = TelemetryStream::open_with_cancel(url.clone(), policy, cancel.clone());
        let live = Self {
            url,
            stream,
            cancel,
            mounted_at: Utc::now(),
            last_frame_at: Arc::new(Mutex::new(None)),
        };

        let stamp = Arc::clone(&live.last_frame_at);
        live.on_frame(move |_| {
            *stamp.lock().unwrap_or_else(PoisonError::into_inner) = Some(Utc::now());
        });

        live
    }

    /// Latest snapshot, if any frame has arrived.
    pub fn snapshot(&self) -> Option<Arc<TelemetrySnapshot>> {
        self.stream.latest()
    }

    pub fn state(&self) -> StreamState {
        self.stream.state()
    }

    /// Run `callback` for every new snapshot until the view is closed.
    ///
    /// Snapshots that arrive faster than `callback` runs are skipped; only
    /// the latest is delivered.
    pub fn on_frame<F>(&self, mut callback: F)
    where
        F: FnMut(Arc<TelemetrySnapshot>) + Send + 'static,
    {
        let mut rx = self.stream.subscribe();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    changed = rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let latest = rx.borrow_and_update().clone();
                        if let Some(snapshot) = latest {
                            callback(snapshot);
                        }
                    }
                }
            }
        });
    }

    /// Wait for the next snapshot. `None` once the stream has closed.
    pub async fn next_snapshot(&mut self) -> Option<Arc<TelemetrySnapshot>> {
        self.stream.changed().await
    }

    /// Wait for the first snapshot, failing if the stream closes first.
    pub async fn first_snapshot(&mut self) -> Result<Arc<TelemetrySnapshot>, CoreError> {
        if let Some(snapshot) = self.snapshot() {
            return Ok(snapshot);
        }
        self.stream.changed().await.ok_or_else(|| match self.stream.close_reason() {
            Some(reason) => CoreError::ConnectionFailed {
                url: self.url.to_string(),
                reason,
            },
            None => CoreError::NotLoaded {
                what: "telemetry".into(),
            },
        })
    }

    pub fn mounted_at(&self) -> DateTime<Utc> {
        self.mounted_at
    }

    /// Arrival time of the latest snapshot.
    pub fn last_frame_at(&self) -> Option<DateTime<Utc>> {
        *self
            .last_frame_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn dropped_frames(&self) -> u64 {
        self.stream.dropped_frames()
    }

    /// Close the view. Idempotent.
    pub fn close(&self) {
        self.stream.close();
    }
}

impl Drop for LiveTelemetry {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for LiveTelemetry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveTelemetry")
            .field("url", &self.url.as_str())
            .field("state", &self.state())
            .field("mounted_at", &self.mounted_at)
            .finish_non_exhaustive()
    }
}
