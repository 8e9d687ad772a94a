// ── Bridge service settings ──
//
// Field edits are validated and applied locally; `save` sends the whole
// AppConfig. The bridge restarts its listeners after accepting it.

use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};
use teledash_api::{AppConfig, BridgeClient};

use crate::document::ConfigDocument;
use crate::error::CoreError;

/// Confirmation shown after a successful save.
pub const SAVED_MESSAGE: &str = "Saved! Services will reconnect.";

/// Lowest accepted broadcast rate, in Hz.
pub const MIN_BROADCAST_RATE_HZ: u32 = 1;
/// Highest accepted broadcast rate, in Hz.
pub const MAX_BROADCAST_RATE_HZ: u32 = 60;

/// Editable AppConfig fields, named as on the wire.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AppField {
    UdpAddr,
    UdpPort,
    OscAddr,
    OscPort,
    EnableOsc,
    BroadcastRateHz,
    DebugOutput,
}

impl AppField {
    /// Current value of this field, rendered as text.
    pub fn read(self, config: &AppConfig) -> String {
        match self {
            Self::UdpAddr => config.udp_addr.clone(),
            Self::UdpPort => config.udp_port.to_string(),
            Self::OscAddr => config.osc_addr.clone(),
            Self::OscPort => config.osc_port.to_string(),
            Self::EnableOsc => config.enable_osc.to_string(),
            Self::BroadcastRateHz => config.effective_broadcast_rate().to_string(),
            Self::DebugOutput => config.debug_output.unwrap_or(false).to_string(),
        }
    }

    /// Parse `raw` and write it into `config`.
    pub fn apply(self, config: &mut AppConfig, raw: &str) -> Result<(), CoreError> {
        let raw = raw.trim();
        match self {
            Self::UdpAddr => config.udp_addr = parse_addr(self, raw)?,
            Self::UdpPort => config.udp_port = parse_port(self, raw)?,
            Self::OscAddr => config.osc_addr = parse_addr(self, raw)?,
            Self::OscPort => config.osc_port = parse_port(self, raw)?,
            Self::EnableOsc => config.enable_osc = parse_bool(self, raw)?,
            Self::BroadcastRateHz => config.broadcast_rate_hz = Some(parse_rate(self, raw)?),
            Self::DebugOutput => config.debug_output = Some(parse_bool(self, raw)?),
        }
        Ok(())
    }
}

/// Every field name with its current value, in display order.
pub fn field_values(config: &AppConfig) -> Vec<(AppField, String)> {
    AppField::iter().map(|f| (f, f.read(config))).collect()
}

// ── Coercion ─────────────────────────────────────────────────────────

fn invalid(field: AppField, message: impl Into<String>) -> CoreError {
    CoreError::Validation {
        field: field.to_string(),
        message: message.into(),
    }
}

fn parse_addr(field: AppField, raw: &str) -> Result<String, CoreError> {
    if raw.is_empty() {
        return Err(invalid(field, "address must not be empty"));
    }
    Ok(raw.to_owned())
}

fn parse_port(field: AppField, raw: &str) -> Result<u16, CoreError> {
    match raw.parse::<u16>() {
        Ok(0) | Err(_) => Err(invalid(field, format!("expected a port 1-65535, got {raw:?}"))),
        Ok(port) => Ok(port),
    }
}

fn parse_bool(field: AppField, raw: &str) -> Result<bool, CoreError> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(invalid(field, format!("expected true or false, got {raw:?}"))),
    }
}

fn parse_rate(field: AppField, raw: &str) -> Result<u32, CoreError> {
    let rate: u32 = raw
        .parse()
        .map_err(|_| invalid(field, format!("expected a whole number, got {raw:?}")))?;
    if (MIN_BROADCAST_RATE_HZ..=MAX_BROADCAST_RATE_HZ).contains(&rate) {
        Ok(rate)
    } else {
        Err(invalid(
            field,
            format!("must be between {MIN_BROADCAST_RATE_HZ} and {MAX_BROADCAST_RATE_HZ} Hz"),
        ))
    }
}

// ── AppSettings ──────────────────────────────────────────────────────

/// The bridge's AppConfig with explicit save.
#[derive(Debug, Clone)]
pub struct AppSettings {
    doc: ConfigDocument<AppConfig>,
}

impl AppSettings {
    pub async fn load(client: &BridgeClient) -> Result<Self, CoreError> {
        Ok(Self::from_document(ConfigDocument::load(client).await?))
    }

    pub fn from_document(doc: ConfigDocument<AppConfig>) -> Self {
        Self { doc }
    }

    pub fn document(&self) -> &ConfigDocument<AppConfig> {
        &self.doc
    }

    pub fn config(&self) -> AppConfig {
        self.doc.get()
    }

    /// Set a field by wire name (`udp_port`, `enable_osc`, ...) from text.
    pub fn set_field(&self, name: &str, raw: &str) -> Result<AppField, CoreError> {
        let field: AppField = name.parse().map_err(|_| CoreError::UnknownKey {
            key: name.to_owned(),
        })?;
        self.doc.try_edit(|config| field.apply(config, raw))?;
        Ok(field)
    }

    /// Send the full config to the bridge.
    pub async fn save(&self) -> Result<(), CoreError> {
        self.doc.save().await
    }
}
