// Configuration document endpoints
//
// Each document is a whole-JSON resource under /api/. GET returns the
// document, POST replaces it. There is no partial patch.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::BridgeClient;
use crate::error::Error;
use crate::models::{AppConfig, OscAddressTable, PacketForwardingTable, TelemetryFields};

/// Resource names of the documents the bridge serves.
pub mod resource {
    pub const APP_CONFIG: &str = "config";
    pub const OSC_ADDRESSES: &str = "osc-addresses";
    pub const PACKET_FORWARDING: &str = "packet-forwarding";
    pub const TELEMETRY_FIELDS: &str = "fields";
}

impl BridgeClient {
    // ── Generic document access ──────────────────────────────────────

    /// Fetch a named document.
    ///
    /// `GET /api/{name}`
    pub async fn load_document<T: DeserializeOwned>(&self, name: &str) -> Result<T, Error> {
        debug!(resource = name, "loading document");
        self.get(name).await
    }

    /// Replace a named document with `document`.
    ///
    /// `POST /api/{name}` with the full document as body. The response body
    /// is ignored; any 2xx counts as saved.
    pub async fn save_document<T: Serialize + Sync>(
        &self,
        name: &str,
        document: &T,
    ) -> Result<(), Error> {
        debug!(resource = name, "saving document");
        self.post_no_response(name, document).await
    }

    // ── Typed helpers ────────────────────────────────────────────────

    /// `GET /api/config`
    pub async fn app_config(&self) -> Result<AppConfig, Error> {
        self.load_document(resource::APP_CONFIG).await
    }

    /// `POST /api/config`
    ///
    /// The bridge restarts its UDP listener (and the OSC sender when the
    /// target changed) after accepting a new config.
    pub async fn save_app_config(&self, config: &AppConfig) -> Result<(), Error> {
        self.save_document(resource::APP_CONFIG, config).await
    }

    /// `GET /api/osc-addresses`
    pub async fn osc_addresses(&self) -> Result<OscAddressTable, Error> {
        self.load_document(resource::OSC_ADDRESSES).await
    }

    /// `POST /api/osc-addresses`
    pub async fn save_osc_addresses(&self, table: &OscAddressTable) -> Result<(), Error> {
        self.save_document(resource::OSC_ADDRESSES, table).await
    }

    /// `GET /api/packet-forwarding`
    pub async fn packet_forwarding(&self) -> Result<PacketForwardingTable, Error> {
        self.load_document(resource::PACKET_FORWARDING).await
    }

    /// `POST /api/packet-forwarding`
    pub async fn save_packet_forwarding(&self, table: &PacketForwardingTable) -> Result<(), Error> {
        self.save_document(resource::PACKET_FORWARDING, table).await
    }

    /// `GET /api/fields`
    pub async fn telemetry_fields(&self) -> Result<TelemetryFields, Error> {
        self.load_document(resource::TELEMETRY_FIELDS).await
    }

    /// `POST /api/fields`
    pub async fn save_telemetry_fields(&self, fields: &TelemetryFields) -> Result<(), Error> {
        self.save_document(resource::TELEMETRY_FIELDS, fields).await
    }
}
