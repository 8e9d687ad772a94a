// Service control and metadata endpoints
//
// Restarts of the bridge's UDP listener / OSC sender, and the version probe.

use tracing::debug;

use crate::client::BridgeClient;
use crate::error::Error;
use crate::models::{ServiceId, VersionInfo};

impl BridgeClient {
    /// Restart a bridge service.
    ///
    /// `POST /api/restart/{service}`
    ///
    /// Any 2xx is success. Non-2xx comes back as [`Error::Http`], network
    /// failure as [`Error::Transport`].
    pub async fn restart(&self, service: ServiceId) -> Result<(), Error> {
        debug!(%service, "restarting bridge service");
        self.post_empty(&format!("restart/{}", service.as_path()))
            .await
    }

    /// Bridge build version.
    ///
    /// `GET /api/version`
    pub async fn version(&self) -> Result<VersionInfo, Error> {
        self.get("version").await
    }
}
