// Wire types for the bridge REST API and WebSocket stream.
//
// Every document type carries a `#[serde(flatten)] extra` map (or is a
// transparent map itself) so fields this client does not model survive a
// load → save round trip untouched.

use std::cmp::Ordering;
use std::ops::{Deref, DerefMut};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

// ── AppConfig ────────────────────────────────────────────────────────

/// Service parameters of the bridge (`/api/config`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Interface the UDP listener binds to.
    pub udp_addr: String,
    pub udp_port: u16,
    /// OSC destination host.
    pub osc_addr: String,
    pub osc_port: u16,
    /// Master switch for OSC forwarding.
    pub enable_osc: bool,
    /// WebSocket/OSC send rate. Absent on older bridges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast_rate_hz: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_output: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppConfig {
    pub const DEFAULT_BROADCAST_RATE_HZ: u32 = 2;

    /// Broadcast rate with the bridge's default applied.
    pub fn effective_broadcast_rate(&self) -> u32 {
        self.broadcast_rate_hz
            .unwrap_or(Self::DEFAULT_BROADCAST_RATE_HZ)
    }
}

// ── OSC address table ────────────────────────────────────────────────

/// One forwarded telemetry value and the OSC path it is sent to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscAddressEntry {
    /// OSC path, e.g. `/car/speed`.
    pub address: String,
    /// Value kind tag (`"float"`, `"int"`, ...).
    #[serde(rename = "type")]
    pub value_type: String,
    pub enabled: bool,
    /// Whether zero values are forwarded. Kept as an `Option` so a document
    /// that omits the field round-trips without gaining it.
    #[serde(rename = "allowZero", default, skip_serializing_if = "Option::is_none")]
    pub allow_zero: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl OscAddressEntry {
    pub fn new(address: impl Into<String>, value_type: impl Into<String>, enabled: bool) -> Self {
        Self {
            address: address.into(),
            value_type: value_type.into(),
            enabled,
            allow_zero: None,
            extra: Map::new(),
        }
    }

    pub fn allows_zero(&self) -> bool {
        self.allow_zero.unwrap_or(false)
    }
}

/// The full OSC address mapping (`/api/osc-addresses`), keyed by a stable
/// identifier that is distinct from the OSC path. Insertion order follows
/// the order the bridge sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OscAddressTable(pub IndexMap<String, OscAddressEntry>);

impl Deref for OscAddressTable {
    type Target = IndexMap<String, OscAddressEntry>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for OscAddressTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<(String, OscAddressEntry)> for OscAddressTable {
    fn from_iter<I: IntoIterator<Item = (String, OscAddressEntry)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ── Packet forwarding ────────────────────────────────────────────────

/// Per-packet-type forwarding switches (`/api/packet-forwarding`).
///
/// Keys are string-encoded packet ids. Ids outside the known range are
/// carried like any other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PacketForwardingTable(pub IndexMap<String, bool>);

impl PacketForwardingTable {
    /// Packet ids in numeric order. Non-numeric keys sort after all
    /// numeric ones, lexicographically.
    pub fn sorted_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.0.keys().map(String::as_str).collect();
        ids.sort_by(|a, b| compare_packet_ids(a, b));
        ids
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.0.get(id).copied().unwrap_or(false)
    }
}

fn compare_packet_ids(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

impl Deref for PacketForwardingTable {
    type Target = IndexMap<String, bool>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for PacketForwardingTable {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl FromIterator<(String, bool)> for PacketForwardingTable {
    fn from_iter<I: IntoIterator<Item = (String, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ── Telemetry fields ─────────────────────────────────────────────────

/// Which decoded telemetry fields the bridge forwards (`/api/fields`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFields {
    #[serde(default)]
    pub enabled: IndexMap<String, bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Live telemetry ───────────────────────────────────────────────────

/// One point-in-time reading pushed over the WebSocket.
///
/// Field names match the bridge's JSON exactly (`{"Speed":120,...}`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TelemetrySnapshot {
    /// km/h
    pub speed: u16,
    /// 0.0 – 1.0
    pub throttle: f32,
    /// -1.0 (full left) – 1.0 (full right)
    pub steer: f32,
    pub brake: f32,
    /// 0 – 100
    pub clutch: u8,
    /// -1 reverse, 0 neutral
    pub gear: i8,
    #[serde(rename = "RPM")]
    pub rpm: u16,
}

// ── Services ─────────────────────────────────────────────────────────

/// Bridge services that can be restarted through `/api/restart/{service}`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ServiceId {
    /// The UDP telemetry listener.
    Udp,
    /// The OSC sender.
    Osc,
    /// Both services.
    All,
}

impl ServiceId {
    /// Path segment used in the restart endpoint.
    pub fn as_path(self) -> &'static str {
        self.into()
    }
}

/// `/api/version` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn app_config_preserves_unknown_fields() {
        let raw = json!({
            "udp_addr": "127.0.0.1",
            "udp_port": 20777,
            "osc_addr": "127.0.0.1",
            "osc_port": 9000,
            "enable_osc": false,
            "broadcast_rate_hz": 2,
            "debug_output": false,
            "theme_hint": "night"
        });
        let cfg: AppConfig = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(cfg.extra["theme_hint"], "night");
        assert_eq!(serde_json::to_value(&cfg).unwrap(), raw);
    }

    #[test]
    fn app_config_without_optional_fields() {
        let raw = json!({
            "udp_addr": "0.0.0.0",
            "udp_port": 20777,
            "osc_addr": "10.0.0.2",
            "osc_port": 8000,
            "enable_osc": true
        });
        let cfg: AppConfig = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(cfg.effective_broadcast_rate(), 2);
        assert_eq!(cfg.debug_output, None);
        assert_eq!(serde_json::to_value(&cfg).unwrap(), raw);
    }

    #[test]
    fn osc_entry_allow_zero_is_optional() {
        let without: OscAddressEntry = serde_json::from_value(json!({
            "address": "/car/speed", "type": "float", "enabled": true
        }))
        .unwrap();
        assert!(!without.allows_zero());
        assert!(
            serde_json::to_value(&without)
                .unwrap()
                .get("allowZero")
                .is_none()
        );

        let with: OscAddressEntry = serde_json::from_value(json!({
            "address": "/car/gear", "type": "int", "enabled": false, "allowZero": true
        }))
        .unwrap();
        assert!(with.allows_zero());
    }

    #[test]
    fn osc_table_keeps_document_order() {
        let table: OscAddressTable = serde_json::from_str(
            r#"{
                "Throttle": {"address": "/car/throttle", "type": "float", "enabled": true},
                "Speed": {"address": "/car/speed", "type": "float", "enabled": true},
                "WorldX": {"address": "/motion/world_x", "type": "float", "enabled": false}
            }"#,
        )
        .unwrap();
        let keys: Vec<_> = table.keys().cloned().collect();
        assert_eq!(keys, vec!["Throttle", "Speed", "WorldX"]);
    }

    #[test]
    fn packet_ids_sort_numerically() {
        let table: PacketForwardingTable = [
            ("10".to_owned(), true),
            ("2".to_owned(), false),
            ("custom".to_owned(), true),
            ("0".to_owned(), true),
            ("99".to_owned(), false),
        ]
        .into_iter()
        .collect();
        assert_eq!(table.sorted_ids(), vec!["0", "2", "10", "99", "custom"]);
        assert!(table.is_enabled("10"));
        assert!(!table.is_enabled("missing"));
    }

    #[test]
    fn snapshot_uses_bridge_field_names() {
        let snap: TelemetrySnapshot = serde_json::from_str(
            r#"{"Speed":120,"Throttle":0.8,"Steer":0.1,"Brake":0,"Clutch":0,"Gear":3,"RPM":9000}"#,
        )
        .unwrap();
        assert_eq!(snap.speed, 120);
        assert_eq!(snap.gear, 3);
        assert_eq!(snap.rpm, 9000);
        assert!((snap.throttle - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn service_id_parses_case_insensitively() {
        assert_eq!("UDP".parse::<ServiceId>().unwrap(), ServiceId::Udp);
        assert_eq!(ServiceId::All.as_path(), "all");
        assert_eq!(ServiceId::Osc.to_string(), "osc");
    }
}
