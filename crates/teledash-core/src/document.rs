// ── Config Store Client ──
//
// `ConfigDocument<T>` is the local authoritative copy of one remote
// configuration document. Edits land locally first and bump a revision;
// `save` sends the whole document and only a successful response marks
// that revision as persisted. A failed save never rolls the local copy
// back: the edit stays, the document stays dirty, the badge shows `Failed`.
//
// Overlapping saves are neither queued nor coalesced. Whichever response
// arrives last decides the status badge.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use serde::de::DeserializeOwned;
use teledash_api::documents::resource;
use teledash_api::{
    AppConfig, BridgeClient, OscAddressTable, PacketForwardingTable, TelemetryFields,
};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::status::{SaveStatus, StatusCell};

// ── Document trait ───────────────────────────────────────────────────

/// A configuration document with a fixed resource name on the bridge.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Resource path under `/api/`.
    const RESOURCE: &'static str;
}

impl Document for AppConfig {
    const RESOURCE: &'static str = resource::APP_CONFIG;
}

impl Document for OscAddressTable {
    const RESOURCE: &'static str = resource::OSC_ADDRESSES;
}

impl Document for PacketForwardingTable {
    const RESOURCE: &'static str = resource::PACKET_FORWARDING;
}

impl Document for TelemetryFields {
    const RESOURCE: &'static str = resource::TELEMETRY_FIELDS;
}

// ── ConfigDocument ───────────────────────────────────────────────────

struct Local<T> {
    value: T,
    /// Bumped on every edit.
    revision: u64,
    /// Highest revision the bridge has acknowledged.
    saved_revision: u64,
}

struct DocInner<T> {
    client: BridgeClient,
    name: String,
    local: Mutex<Local<T>>,
    outstanding: AtomicUsize,
    status: StatusCell<SaveStatus>,
}

/// Local editable copy of a named remote document.
///
/// Cheap to clone; clones share the same copy and status.
pub struct ConfigDocument<T> {
    inner: Arc<DocInner<T>>,
}

impl<T> Clone for ConfigDocument<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Document> ConfigDocument<T> {
    /// Fetch `T` from its well-known resource.
    pub async fn load(client: &BridgeClient) -> Result<Self, CoreError> {
        Self::load_named(client, T::RESOURCE).await
    }

    /// Wrap an already-held value for `T`'s resource without fetching.
    pub fn from_value(client: &BridgeClient, value: T) -> Self {
        Self::from_named_value(client, T::RESOURCE, value)
    }
}

impl<T> ConfigDocument<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Fetch an arbitrary named document.
    ///
    /// No retry: a failure comes straight back to the caller.
    pub async fn load_named(client: &BridgeClient, name: &str) -> Result<Self, CoreError> {
        let value: T = client.load_document(name).await.map_err(|e| {
            warn!(resource = name, error = %e, "document load failed");
            CoreError::from(e)
        })?;
        debug!(resource = name, "document loaded");
        Ok(Self::from_named_value(client, name, value))
    }

    pub fn from_named_value(client: &BridgeClient, name: &str, value: T) -> Self {
        Self {
            inner: Arc::new(DocInner {
                client: client.clone(),
                name: name.to_owned(),
                local: Mutex::new(Local {
                    value,
                    revision: 0,
                    saved_revision: 0,
                }),
                outstanding: AtomicUsize::new(0),
                status: StatusCell::default(),
            }),
        }
    }

    /// Resource name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Clone of the current local copy.
    pub fn get(&self) -> T {
        self.lock().value.clone()
    }

    /// Read the local copy without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.lock().value)
    }

    /// Mutate the local copy. Marks the document dirty.
    pub fn edit<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut local = self.lock();
        local.revision += 1;
        f(&mut local.value)
    }

    /// Like [`edit`](Self::edit), but the document only counts as dirty
    /// when `f` succeeds. `f` must not mutate before failing.
    pub fn try_edit<R, E>(&self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let mut local = self.lock();
        let out = f(&mut local.value)?;
        local.revision += 1;
        Ok(out)
    }

    /// `true` while the local copy holds edits the bridge has not acknowledged.
    pub fn is_dirty(&self) -> bool {
        let local = self.lock();
        local.revision > local.saved_revision
    }

    /// Number of saves currently in flight.
    pub fn outstanding_writes(&self) -> usize {
        self.inner.outstanding.load(Ordering::SeqCst)
    }

    /// Send the full local copy to the bridge.
    ///
    /// Status goes `Saving`, then `Saved` or `Failed`, then back to `Idle`
    /// after the dwell. On failure the local copy is kept as is. The write
    /// runs on its own task, so dropping the returned future neither
    /// cancels it nor leaves it counted as outstanding.
    pub async fn save(&self) -> Result<(), CoreError> {
        let (snapshot, revision) = {
            let local = self.inner.lock();
            (local.value.clone(), local.revision)
        };

        self.inner.status.set(SaveStatus::Saving);
        let in_flight = InFlight::enter(Arc::clone(&self.inner));

        let request = tokio::spawn(async move {
            let inner = Arc::clone(&in_flight.inner);
            let result = inner.client.save_document(&inner.name, &snapshot).await;
            drop(in_flight);
            inner.settle(result, revision)
        });

        request.await.unwrap_or_else(|e| {
            self.inner
                .status
                .set_with_reset(SaveStatus::Failed, SaveStatus::FAILED_DWELL);
            Err(CoreError::Fetch {
                message: format!("save task failed: {e}"),
            })
        })
    }

    /// Current save badge.
    pub fn status(&self) -> SaveStatus {
        self.inner.status.get()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<SaveStatus> {
        self.inner.status.subscribe()
    }

    /// Every save-status assignment in order.
    pub fn status_transitions(&self) -> broadcast::Receiver<SaveStatus> {
        self.inner.status.transitions()
    }

    fn lock(&self) -> MutexGuard<'_, Local<T>> {
        self.inner.lock()
    }
}

impl<T> DocInner<T> {
    fn lock(&self) -> MutexGuard<'_, Local<T>> {
        self.local.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settle(
        &self,
        result: Result<(), teledash_api::Error>,
        revision: u64,
    ) -> Result<(), CoreError> {
        match result {
            Ok(()) => {
                {
                    let mut local = self.lock();
                    local.saved_revision = local.saved_revision.max(revision);
                }
                debug!(resource = %self.name, revision, "document saved");
                self.status
                    .set_with_reset(SaveStatus::Saved, SaveStatus::SAVED_DWELL);
                Ok(())
            }
            Err(e) => {
                warn!(resource = %self.name, error = %e, "document save failed");
                self.status
                    .set_with_reset(SaveStatus::Failed, SaveStatus::FAILED_DWELL);
                Err(e.into())
            }
        }
    }
}

/// Counts one save as outstanding until dropped.
struct InFlight<T> {
    inner: Arc<DocInner<T>>,
}

impl<T> InFlight<T> {
    fn enter(inner: Arc<DocInner<T>>) -> Self {
        inner.outstanding.fetch_add(1, Ordering::SeqCst);
        Self { inner }
    }
}

impl<T> Drop for InFlight<T> {
    fn drop(&mut self) {
        self.inner.outstanding.fetch_sub(1, Ordering::SeqCst);
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ConfigDocument<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigDocument")
            .field("name", &self.inner.name)
            .field("status", &self.inner.status)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client() -> BridgeClient {
        BridgeClient::from_reqwest("http://127.0.0.1:9", reqwest::Client::new()).unwrap()
    }

    fn table() -> PacketForwardingTable {
        [("0".to_owned(), true), ("6".to_owned(), false)]
            .into_iter()
            .collect()
    }

    #[test]
    fn fresh_document_is_clean() {
        let doc = ConfigDocument::from_value(&client(), table());
        assert!(!doc.is_dirty());
        assert_eq!(doc.outstanding_writes(), 0);
        assert_eq!(doc.status(), SaveStatus::Idle);
        assert_eq!(doc.name(), "packet-forwarding");
    }

    #[test]
    fn edit_marks_dirty_and_is_visible() {
        let doc = ConfigDocument::from_value(&client(), table());
        let previous = doc.edit(|t| t.insert("6".into(), true));
        assert_eq!(previous, Some(false));
        assert!(doc.is_dirty());
        assert!(doc.with(|t| t.is_enabled("6")));
    }

    #[test]
    fn failed_try_edit_stays_clean() {
        let doc = ConfigDocument::from_value(&client(), table());
        let res: Result<(), &str> = doc.try_edit(|_| Err("nope"));
        assert!(res.is_err());
        assert!(!doc.is_dirty());
    }

    #[test]
    fn clones_share_the_local_copy() {
        let doc = ConfigDocument::from_value(&client(), table());
        let other = doc.clone();
        other.edit(|t| *t = PacketForwardingTable::default());
        assert!(doc.get().is_empty());
    }
}
