// ── Ephemeral status with timed auto-reset ──
//
// A `StatusCell` holds one status value (save badge, restart button) and
// can schedule a one-shot reset back to idle. Every assignment bumps a
// generation counter and aborts the pending reset, so a reset scheduled for
// an older value can never clobber a newer one.

use std::fmt::Debug;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::Serialize;
use strum::Display;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

const TRANSITION_CHANNEL_SIZE: usize = 32;

// ── Status enums ─────────────────────────────────────────────────────

/// Save indicator for an editable document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Failed,
}

impl SaveStatus {
    /// How long `Saved` stays up before reverting to `Idle`.
    pub const SAVED_DWELL: Duration = Duration::from_millis(1500);
    /// How long `Failed` stays up before reverting to `Idle`.
    pub const FAILED_DWELL: Duration = Duration::from_millis(2000);
}

/// Status of a one-shot remote command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TriggerStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl TriggerStatus {
    pub const SUCCESS_DWELL: Duration = Duration::from_millis(1200);
    pub const ERROR_DWELL: Duration = Duration::from_millis(2000);
}

// ── StatusCell ───────────────────────────────────────────────────────

struct Pending {
    generation: u64,
    reset: Option<JoinHandle<()>>,
}

struct Inner<S> {
    idle: S,
    current: watch::Sender<S>,
    transitions: broadcast::Sender<S>,
    pending: Mutex<Pending>,
}

impl<S: Copy> Inner<S> {
    /// Publish `value`. Caller holds the `pending` lock.
    fn publish(&self, value: S) {
        self.current.send_replace(value);
        // No subscribers is fine.
        let _ = self.transitions.send(value);
    }
}

/// A status value with change notification and scheduled reset.
///
/// Cloning yields another handle to the same cell.
pub struct StatusCell<S> {
    inner: Arc<Inner<S>>,
}

impl<S> Clone for StatusCell<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S> Default for StatusCell<S>
where
    S: Copy + Default + PartialEq + Debug + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: Copy + PartialEq + Debug + Send + Sync + 'static> StatusCell<S> {
    /// Create a cell resting at `idle`.
    pub fn new(idle: S) -> Self {
        let (current, _) = watch::channel(idle);
        let (transitions, _) = broadcast::channel(TRANSITION_CHANNEL_SIZE);
        Self {
            inner: Arc::new(Inner {
                idle,
                current,
                transitions,
                pending: Mutex::new(Pending {
                    generation: 0,
                    reset: None,
                }),
            }),
        }
    }

    pub fn get(&self) -> S {
        *self.inner.current.borrow()
    }

    /// Assign `value`, cancelling any pending reset.
    pub fn set(&self, value: S) {
        let mut pending = self.lock();
        Self::supersede(&mut pending);
        self.inner.publish(value);
    }

    /// Assign `value` only if `allow(current)` holds. Returns whether the
    /// assignment happened.
    pub fn set_if(&self, allow: impl FnOnce(S) -> bool, value: S) -> bool {
        let mut pending = self.lock();
        if !allow(self.get()) {
            return false;
        }
        Self::supersede(&mut pending);
        self.inner.publish(value);
        true
    }

    /// Assign `value` and schedule a reset to idle after `dwell`.
    ///
    /// The reset is bound to this assignment: any later `set` cancels it.
    /// Must be called from within a Tokio runtime.
    pub fn set_with_reset(&self, value: S, dwell: Duration) {
        let mut pending = self.lock();
        Self::supersede(&mut pending);
        self.inner.publish(value);

        let generation = pending.generation;
        let inner = Arc::clone(&self.inner);
        pending.reset = Some(tokio::spawn(async move {
            tokio::time::sleep(dwell).await;
            let mut pending = inner.pending.lock().unwrap_or_else(PoisonError::into_inner);
            if pending.generation == generation {
                pending.reset = None;
                inner.publish(inner.idle);
            } else {
                tracing::trace!(?value, "stale status reset skipped");
            }
        }));
    }

    /// Receiver for the current value.
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.inner.current.subscribe()
    }

    /// Receiver that sees every assignment in order, including repeats and
    /// resets.
    pub fn transitions(&self) -> broadcast::Receiver<S> {
        self.inner.transitions.subscribe()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Pending> {
        self.inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn supersede(pending: &mut Pending) {
        pending.generation = pending.generation.wrapping_add(1);
        if let Some(handle) = pending.reset.take() {
            handle.abort();
        }
    }
}

impl<S: Debug> Debug for StatusCell<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusCell")
            .field("current", &*self.inner.current.borrow())
            .finish_non_exhaustive()
    }
}
