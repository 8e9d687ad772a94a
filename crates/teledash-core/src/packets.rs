// ── Packet forwarding settings ──
//
// Unlike the OSC table, packet toggles stay local until an explicit save.

use std::borrow::Cow;

use serde::Serialize;
use teledash_api::{BridgeClient, PacketForwardingTable};

use crate::document::ConfigDocument;
use crate::error::CoreError;

/// Names of the known packet types, indexed by packet id.
pub const PACKET_LABELS: [&str; 16] = [
    "Motion",
    "Session",
    "Lap Data",
    "Event",
    "Participants",
    "Car Setups",
    "Car Telemetry",
    "Car Status",
    "Final Classification",
    "Lobby Info",
    "Car Damage",
    "Session History",
    "Tyre Sets",
    "MotionEx",
    "Time Trial",
    "Lap Positions",
];

/// Display label for a packet id, `Packet {id}` when unknown.
///
/// Only the canonical decimal spelling is known: `"6"` has a label,
/// `"06"` and `"+6"` do not.
pub fn packet_label(id: &str) -> Cow<'static, str> {
    id.parse::<usize>()
        .ok()
        .filter(|n| n.to_string() == id)
        .and_then(|n| PACKET_LABELS.get(n))
        .map_or_else(|| Cow::Owned(format!("Packet {id}")), |label| Cow::Borrowed(*label))
}

/// One row of the packet forwarding list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PacketEntry {
    pub id: String,
    pub label: String,
    pub enabled: bool,
}

/// The packet forwarding table with explicit save.
#[derive(Debug, Clone)]
pub struct PacketSettings {
    doc: ConfigDocument<PacketForwardingTable>,
}

impl PacketSettings {
    pub async fn load(client: &BridgeClient) -> Result<Self, CoreError> {
        Ok(Self::from_document(ConfigDocument::load(client).await?))
    }

    pub fn from_document(doc: ConfigDocument<PacketForwardingTable>) -> Self {
        Self { doc }
    }

    pub fn document(&self) -> &ConfigDocument<PacketForwardingTable> {
        &self.doc
    }

    /// Rows in numeric id order.
    pub fn entries(&self) -> Vec<PacketEntry> {
        self.doc.with(|table| {
            table
                .sorted_ids()
                .into_iter()
                .map(|id| PacketEntry {
                    id: id.to_owned(),
                    label: packet_label(id).into_owned(),
                    enabled: table.is_enabled(id),
                })
                .collect()
        })
    }

    /// Flip one packet type locally. Returns the new value.
    pub fn toggle(&self, id: &str) -> Result<bool, CoreError> {
        self.doc.try_edit(|table| {
            let enabled = table.get_mut(id).ok_or_else(|| unknown(id))?;
            *enabled = !*enabled;
            Ok(*enabled)
        })
    }

    /// Set one packet type locally.
    pub fn set(&self, id: &str, enabled: bool) -> Result<(), CoreError> {
        self.doc.try_edit(|table| {
            let slot = table.get_mut(id).ok_or_else(|| unknown(id))?;
            *slot = enabled;
            Ok(())
        })
    }

    /// `true` when there are local changes not yet saved.
    pub fn has_unsaved_changes(&self) -> bool {
        self.doc.is_dirty()
    }

    /// Send the full table to the bridge.
    pub async fn save(&self) -> Result<(), CoreError> {
        self.doc.save().await
    }
}

fn unknown(id: &str) -> CoreError {
    CoreError::UnknownKey { key: id.to_owned() }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn settings(pairs: &[(&str, bool)]) -> PacketSettings {
        let client =
            BridgeClient::from_reqwest("http://127.0.0.1:9", reqwest::Client::new()).unwrap();
        let table: PacketForwardingTable =
            pairs.iter().map(|&(k, v)| (k.to_owned(), v)).collect();
        PacketSettings::from_document(ConfigDocument::from_value(&client, table))
    }

    #[test]
    fn known_and_fallback_labels() {
        assert_eq!(packet_label("0"), "Motion");
        assert_eq!(packet_label("6"), "Car Telemetry");
        assert_eq!(packet_label("15"), "Lap Positions");
        assert_eq!(packet_label("16"), "Packet 16");
        assert_eq!(packet_label("abc"), "Packet abc");
    }

    #[test]
    fn non_canonical_ids_use_fallback_label() {
        assert_eq!(packet_label("06"), "Packet 06");
        assert_eq!(packet_label("+6"), "Packet +6");
        assert_eq!(packet_label("00"), "Packet 00");
    }

    #[test]
    fn entries_render_labels_and_state() {
        let s = settings(&[("6", false), ("0", true)]);
        assert_eq!(
            s.entries(),
            vec![
                PacketEntry {
                    id: "0".into(),
                    label: "Motion".into(),
                    enabled: true
                },
                PacketEntry {
                    id: "6".into(),
                    label: "Car Telemetry".into(),
                    enabled: false
                },
            ]
        );
    }

    #[test]
    fn unknown_ids_stay_editable() {
        let s = settings(&[("42", false)]);
        assert_eq!(s.entries()[0].label, "Packet 42");
        assert!(s.toggle("42").unwrap());
    }

    #[test]
    fn toggles_are_local_until_saved() {
        let s = settings(&[("0", true)]);
        assert!(!s.has_unsaved_changes());
        assert!(!s.toggle("0").unwrap());
        assert!(s.has_unsaved_changes());
        assert_eq!(s.document().outstanding_writes(), 0);
    }

    #[test]
    fn missing_id_is_an_error() {
        let s = settings(&[("0", true)]);
        assert!(matches!(
            s.set("7", true).unwrap_err(),
            CoreError::UnknownKey { .. }
        ));
        assert!(!s.has_unsaved_changes());
    }
}
