// teledash-core: Settings reconciliation and live telemetry between teledash-api and the CLI.

pub mod app_settings;
pub mod dashboard;
pub mod document;
pub mod error;
pub mod fields;
pub mod grouping;
pub mod live;
pub mod osc;
pub mod packets;
pub mod status;
pub mod trigger;

// ── Primary re-exports ──────────────────────────────────────────────
pub use app_settings::{AppField, AppSettings, SAVED_MESSAGE};
pub use dashboard::{Dashboard, DashboardConfig};
pub use document::{ConfigDocument, Document};
pub use error::CoreError;
pub use fields::FieldSettings;
pub use grouping::{
    AddressGroup, GroupMember, GroupState, OTHER_GROUP, TriState, group_by_prefix, group_key,
    group_label, set_group_enabled,
};
pub use live::LiveTelemetry;
pub use osc::OscSettings;
pub use packets::{PacketEntry, PacketSettings, packet_label};
pub use status::{SaveStatus, StatusCell, TriggerStatus};
pub use trigger::RestartTrigger;

// Wire types consumers need alongside the core API.
pub use teledash_api::{
    AppConfig, BackoffConfig, OscAddressEntry, OscAddressTable, PacketForwardingTable,
    ReconnectPolicy, ServiceId, StreamState, TelemetryFields, TelemetrySnapshot, TransportConfig,
    VersionInfo,
};
