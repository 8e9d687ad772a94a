// ── Dashboard facade ──
//
// Entry point for consumers. Each settings accessor loads a fresh document:
// nothing is cached across views.

use teledash_api::{BridgeClient, ReconnectPolicy, ServiceId, TransportConfig, VersionInfo};

use crate::app_settings::AppSettings;
use crate::error::CoreError;
use crate::fields::FieldSettings;
use crate::live::LiveTelemetry;
use crate::osc::OscSettings;
use crate::packets::PacketSettings;
use crate::trigger::RestartTrigger;

/// Where the bridge lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Bridge base URL, e.g. `http://localhost:1337`.
    pub bridge_url: String,
    /// Path of the live telemetry WebSocket.
    pub ws_path: String,
    pub transport: TransportConfig,
    pub reconnect: ReconnectPolicy,
}

impl DashboardConfig {
    pub const DEFAULT_BRIDGE_URL: &'static str = "http://localhost:1337";
    pub const DEFAULT_WS_PATH: &'static str = "/ws";
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bridge_url: Self::DEFAULT_BRIDGE_URL.into(),
            ws_path: Self::DEFAULT_WS_PATH.into(),
            transport: TransportConfig::default(),
            reconnect: ReconnectPolicy::default(),
        }
    }
}

/// Access to every view of the bridge.
#[derive(Debug, Clone)]
pub struct Dashboard {
    config: DashboardConfig,
    client: BridgeClient,
}

impl Dashboard {
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        let client = BridgeClient::new(&config.bridge_url, &config.transport)?;
        Ok(Self { config, client })
    }

    /// Build around an existing client (tests, custom transports).
    pub fn with_client(config: DashboardConfig, client: BridgeClient) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn client(&self) -> &BridgeClient {
        &self.client
    }

    pub async fn app_settings(&self) -> Result<AppSettings, CoreError> {
        AppSettings::load(&self.client).await
    }

    pub async fn osc_settings(&self) -> Result<OscSettings, CoreError> {
        OscSettings::load(&self.client).await
    }

    pub async fn packet_settings(&self) -> Result<PacketSettings, CoreError> {
        PacketSettings::load(&self.client).await
    }

    pub async fn field_settings(&self) -> Result<FieldSettings, CoreError> {
        FieldSettings::load(&self.client).await
    }

    pub fn restart_trigger(&self, service: ServiceId) -> RestartTrigger {
        RestartTrigger::new(&self.client, service)
    }

    /// Mount a live telemetry view.
    pub fn live(&self) -> Result<LiveTelemetry, CoreError> {
        let url = self.client.ws_url(&self.config.ws_path)?;
        Ok(LiveTelemetry::mount(url, self.config.reconnect.clone()))
    }

    pub async fn version(&self) -> Result<VersionInfo, CoreError> {
        Ok(self.client.version().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_bridge() {
        let config = DashboardConfig::default();
        assert_eq!(config.bridge_url, "http://localhost:1337");
        assert_eq!(config.ws_path, "/ws");
        assert_eq!(config.reconnect, ReconnectPolicy::Never);
    }

    #[test]
    fn bad_bridge_url_is_a_config_error() {
        let err = Dashboard::new(DashboardConfig {
            bridge_url: "localhost without scheme".into(),
            ..DashboardConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, CoreError::Config { .. }));
    }
}
