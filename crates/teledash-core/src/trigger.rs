// ── Action trigger ──
//
// One restart control per service. Status runs idle → loading → success or
// error → idle; a trigger while loading is refused. Network failures and
// non-2xx answers both end in `Error`.

use teledash_api::{BridgeClient, ServiceId};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::error::CoreError;
use crate::status::{StatusCell, TriggerStatus};

/// Restart control for one bridge service.
///
/// Clones share the same status, so a clone cannot start a second restart
/// while the first is in flight.
#[derive(Debug, Clone)]
pub struct RestartTrigger {
    client: BridgeClient,
    service: ServiceId,
    status: StatusCell<TriggerStatus>,
}

impl RestartTrigger {
    pub fn new(client: &BridgeClient, service: ServiceId) -> Self {
        Self {
            client: client.clone(),
            service,
            status: StatusCell::default(),
        }
    }

    pub fn service(&self) -> ServiceId {
        self.service
    }

    /// Fire the restart.
    ///
    /// Returns [`CoreError::TriggerBusy`] without sending anything when a
    /// restart from this control is still loading. Dropping the returned
    /// future does not cancel the request; the status still settles.
    pub async fn trigger(&self) -> Result<(), CoreError> {
        if !self
            .status
            .set_if(|s| s != TriggerStatus::Loading, TriggerStatus::Loading)
        {
            return Err(CoreError::TriggerBusy {
                service: self.service.to_string(),
            });
        }

        // The POST runs on its own task so a dropped caller cannot leave
        // the control stuck in `Loading`.
        let client = self.client.clone();
        let service = self.service;
        let status = self.status.clone();
        let request = tokio::spawn(async move {
            let result = client.restart(service).await;
            match &result {
                Ok(()) => {
                    info!(service = %service, "service restarted");
                    status.set_with_reset(TriggerStatus::Success, TriggerStatus::SUCCESS_DWELL);
                }
                Err(e) => {
                    warn!(service = %service, error = %e, "service restart failed");
                    status.set_with_reset(TriggerStatus::Error, TriggerStatus::ERROR_DWELL);
                }
            }
            result
        });

        match request.await {
            Ok(result) => result.map_err(CoreError::from),
            Err(e) => {
                self.status
                    .set_with_reset(TriggerStatus::Error, TriggerStatus::ERROR_DWELL);
                Err(CoreError::Fetch {
                    message: format!("restart task failed: {e}"),
                })
            }
        }
    }

    pub fn status(&self) -> TriggerStatus {
        self.status.get()
    }

    /// `false` while a restart is in flight.
    pub fn is_enabled(&self) -> bool {
        self.status() != TriggerStatus::Loading
    }

    pub fn subscribe(&self) -> watch::Receiver<TriggerStatus> {
        self.status.subscribe()
    }

    /// Every status assignment in order.
    pub fn transitions(&self) -> broadcast::Receiver<TriggerStatus> {
        self.status.transitions()
    }
}
