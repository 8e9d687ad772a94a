// teledash-api: Async Rust client for the telemetry bridge (REST + WebSocket)

pub mod client;
pub mod documents;
pub mod error;
pub mod models;
pub mod services;
pub mod transport;
pub mod websocket;

pub use client::BridgeClient;
pub use error::Error;
pub use models::{
    AppConfig, OscAddressEntry, OscAddressTable, PacketForwardingTable, ServiceId,
    TelemetryFields, TelemetrySnapshot, VersionInfo,
};
pub use transport::TransportConfig;
pub use websocket::{BackoffConfig, ReconnectPolicy, StreamState, TelemetryStream, decode_frame};
