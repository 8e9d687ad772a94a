//! Live telemetry stream over WebSocket.
//!
//! Connects to the bridge's `/ws` endpoint and keeps only the most recent
//! [`TelemetrySnapshot`] in a [`tokio::sync::watch`] channel. The bridge
//! pushes frames fire-and-forget, with no handshake or acknowledgment, and
//! this side never applies backpressure: each decoded frame replaces the
//! previous one.
//!
//! Frames that do not decode into a snapshot (the bridge also broadcasts
//! plain-text summaries and other packet types on the same socket) are
//! logged and dropped without touching the last good snapshot.
//!
//! By default a lost connection is terminal. [`ReconnectPolicy::Backoff`]
//! opts in to reconnection with exponential backoff + jitter.
//!
//! # Example
//!
//! ```rust,ignore
//! use teledash_api::websocket::{ReconnectPolicy, TelemetryStream};
//! use url::Url;
//!
//! let url = Url::parse("ws://localhost:1337/ws")?;
//! let stream = TelemetryStream::open(url, ReconnectPolicy::Never);
//! let mut rx = stream.subscribe();
//!
//! while rx.changed().await.is_ok() {
//!     if let Some(snap) = rx.borrow_and_update().clone() {
//!         println!("{} km/h in gear {}", snap.speed, snap.gear);
//!     }
//! }
//!
//! stream.close();
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::watch;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::error::Error;
use crate::models::TelemetrySnapshot;

// ── StreamState ──────────────────────────────────────────────────────

/// Lifecycle of one stream. `Closed` is terminal: once entered, nothing
/// moves the stream out of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Connecting,
    Open,
    /// Waiting to reconnect after a drop (only with [`ReconnectPolicy::Backoff`]).
    Reconnecting { attempt: u32 },
    Closed,
}

impl StreamState {
    pub fn is_closed(self) -> bool {
        self == Self::Closed
    }
}

// ── ReconnectPolicy ──────────────────────────────────────────────────

/// What to do when the connection drops or cannot be established.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Give up: the stream moves to `Closed`.
    #[default]
    Never,
    /// Retry with exponential backoff.
    Backoff(BackoffConfig),
}

/// Exponential backoff configuration for reconnection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackoffConfig {
    /// Delay before the first reconnection attempt. Default: 1s.
    pub initial_delay: Duration,

    /// Upper bound on backoff delay. Default: 30s.
    pub max_delay: Duration,

    /// Maximum reconnection attempts before giving up.
    /// `None` means retry forever.
    pub max_retries: Option<u32>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_retries: None,
        }
    }
}

// ── TelemetryStream ──────────────────────────────────────────────────

/// State shared between the handle and the background task.
struct Shared {
    state: watch::Sender<StreamState>,
    latest: watch::Sender<Option<Arc<TelemetrySnapshot>>>,
    dropped_frames: AtomicU64,
    close_reason: Mutex<Option<String>>,
}

impl Shared {
    /// Move to `next` unless the stream is already closed.
    fn advance(&self, next: StreamState) -> bool {
        self.state.send_if_modified(|current| {
            if current.is_closed() || *current == next {
                false
            } else {
                *current = next;
                true
            }
        })
    }

    fn set_close_reason(&self, reason: String) {
        let mut slot = self
            .close_reason
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(reason);
        }
    }
}

/// Handle to a running telemetry stream.
///
/// The connection is opened by [`open`](Self::open) and released by
/// [`close`](Self::close) or by dropping the handle, whichever comes first.
/// Closing is idempotent.
pub struct TelemetryStream {
    shared: Arc<Shared>,
    frames: watch::Receiver<Option<Arc<TelemetrySnapshot>>>,
    cancel: CancellationToken,
}

impl TelemetryStream {
    /// Open the stream and spawn its background task.
    ///
    /// Returns immediately in the `Connecting` state. Must be called from
    /// within a Tokio runtime.
    pub fn open(url: Url, policy: ReconnectPolicy) -> Self {
        Self::open_with_cancel(url, policy, CancellationToken::new())
    }

    /// Like [`open`](Self::open), tied to an external cancellation token.
    pub fn open_with_cancel(url: Url, policy: ReconnectPolicy, cancel: CancellationToken) -> Self {
        let (state, _) = watch::channel(StreamState::Idle);
        let (latest, frames) = watch::channel(None);
        let shared = Arc::new(Shared {
            state,
            latest,
            dropped_frames: AtomicU64::new(0),
            close_reason: Mutex::new(None),
        });

        shared.advance(StreamState::Connecting);

        let task_shared = Arc::clone(&shared);
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            stream_loop(url, policy, &task_shared, &task_cancel).await;
            task_shared.advance(StreamState::Closed);
        });

        Self {
            shared,
            frames,
            cancel,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> StreamState {
        *self.shared.state.borrow()
    }

    /// The most recent decoded snapshot, if any frame has arrived yet.
    pub fn latest(&self) -> Option<Arc<TelemetrySnapshot>> {
        self.shared.latest.borrow().clone()
    }

    /// Receiver that observes every snapshot replacement.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<TelemetrySnapshot>>> {
        self.shared.latest.subscribe()
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the stream is closed and every snapshot that
    /// arrived before the close has been observed.
    pub async fn changed(&mut self) -> Option<Arc<TelemetrySnapshot>> {
        let mut state = self.shared.state.subscribe();
        let frame = tokio::select! {
            biased;
            res = self.frames.changed() => res.is_ok(),
            _ = state.wait_for(|s| s.is_closed()) => false,
        };
        if frame {
            self.frames.borrow_and_update().clone()
        } else {
            None
        }
    }

    /// Number of frames dropped because they did not decode.
    pub fn dropped_frames(&self) -> u64 {
        self.shared.dropped_frames.load(Ordering::Relaxed)
    }

    /// Why the stream closed, when it closed for a reason other than
    /// [`close`](Self::close).
    pub fn close_reason(&self) -> Option<String> {
        self.shared
            .close_reason
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Close the connection. Safe to call any number of times, in any state.
    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            tracing::debug!("closing telemetry stream");
            self.cancel.cancel();
        }
        self.shared.advance(StreamState::Closed);
    }

    /// Wait until the stream reaches `Closed`.
    pub async fn closed(&self) {
        let mut rx = self.shared.state.subscribe();
        // The sender lives in `self.shared`, so `wait_for` only errors if
        // the handle itself is gone.
        let _ = rx.wait_for(|s| s.is_closed()).await;
    }
}

impl Drop for TelemetryStream {
    fn drop(&mut self) {
        self.close();
    }
}

// ── Background loop ──────────────────────────────────────────────────

/// Main loop: connect → read → on drop, either stop or back off and retry.
async fn stream_loop(
    url: Url,
    policy: ReconnectPolicy,
    shared: &Shared,
    cancel: &CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = connect_and_read(&url, shared, cancel) => result,
        };

        let reason = match result {
            Ok(()) if cancel.is_cancelled() => break,
            Ok(()) => {
                tracing::info!("telemetry stream disconnected");
                attempt = 0;
                "connection closed by bridge".to_owned()
            }
            Err(e) => {
                tracing::warn!(error = %e, attempt, "telemetry stream error");
                e.to_string()
            }
        };

        let ReconnectPolicy::Backoff(ref backoff) = policy else {
            shared.set_close_reason(reason);
            break;
        };

        if let Some(max) = backoff.max_retries {
            if attempt >= max {
                tracing::error!(max_retries = max, "reconnection limit reached, giving up");
                shared.set_close_reason(reason);
                break;
            }
        }

        attempt += 1;
        shared.advance(StreamState::Reconnecting { attempt });

        let delay = calculate_backoff(attempt - 1, backoff);
        tracing::info!(
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            attempt,
            "waiting before reconnect"
        );

        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(delay) => {}
        }

        shared.advance(StreamState::Connecting);
    }

    tracing::debug!("telemetry stream loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one connection and read frames until it drops or is cancelled.
///
/// On cancellation a close frame is sent before returning.
async fn connect_and_read(
    url: &Url,
    shared: &Shared,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to telemetry stream");

    let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

    if !shared.advance(StreamState::Open) && shared.state.borrow().is_closed() {
        return Ok(());
    }
    tracing::info!("telemetry stream open");

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                if let Err(e) = write.send(tungstenite::Message::Close(None)).await {
                    tracing::debug!(error = %e, "close frame not delivered");
                }
                return Ok(());
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        apply_frame(text.as_str(), shared);
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(cf) = frame {
                            tracing::info!(code = %cf.code, reason = %cf.reason, "close frame received");
                            return Err(Error::WebSocketClosed {
                                code: cf.code.into(),
                                reason: cf.reason.to_string(),
                            });
                        }
                        tracing::info!("close frame received (no payload)");
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(Error::WebSocketConnect(e.to_string()));
                    }
                    None => {
                        tracing::info!("telemetry stream ended");
                        return Ok(());
                    }
                    Some(Ok(_)) => {
                        // Binary, Ping, Pong, Frame -- tungstenite answers pings itself
                        tracing::trace!("ignoring non-text frame");
                    }
                }
            }
        }
    }
}

// ── Frame decoding ───────────────────────────────────────────────────

/// Decode one text frame into a snapshot.
pub fn decode_frame(text: &str) -> Result<TelemetrySnapshot, Error> {
    serde_json::from_str(text).map_err(|e| Error::Deserialization {
        message: e.to_string(),
        body: text.to_owned(),
    })
}

/// Replace the latest snapshot with `text`, or drop it if it does not decode.
fn apply_frame(text: &str, shared: &Shared) {
    match decode_frame(text) {
        Ok(snapshot) => {
            shared.latest.send_replace(Some(Arc::new(snapshot)));
        }
        Err(e) => {
            shared.dropped_frames.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(error = %e, "dropping undecodable telemetry frame");
        }
    }
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(initial * 2^attempt, max) + jitter`
///
/// Jitter is +-25%, derived deterministically from the attempt number.
fn calculate_backoff(attempt: u32, config: &BackoffConfig) -> Duration {
    let exponent = i32::try_from(attempt.min(30)).unwrap_or(30);
    let base = config.initial_delay.as_secs_f64() * 2.0_f64.powi(exponent);
    let capped = base.min(config.max_delay.as_secs_f64());

    let jitter_factor = 1.0 + 0.25 * (f64::from(attempt) * 7.3).sin();
    let with_jitter = (capped * jitter_factor).max(0.0);

    Duration::from_secs_f64(with_jitter)
}

// ── Tests ────────────────────────────────────────────────────────────
