// ── OSC address settings ──
//
// Every user action here is one discrete edit followed by exactly one
// full-table save, including group toggles that touch many entries.

use teledash_api::{BridgeClient, OscAddressTable};

use crate::document::ConfigDocument;
use crate::error::CoreError;
use crate::grouping::{self, AddressGroup};

/// The OSC address table with implicit save.
#[derive(Debug, Clone)]
pub struct OscSettings {
    doc: ConfigDocument<OscAddressTable>,
}

impl OscSettings {
    pub async fn load(client: &BridgeClient) -> Result<Self, CoreError> {
        Ok(Self::from_document(ConfigDocument::load(client).await?))
    }

    pub fn from_document(doc: ConfigDocument<OscAddressTable>) -> Self {
        Self { doc }
    }

    pub fn document(&self) -> &ConfigDocument<OscAddressTable> {
        &self.doc
    }

    /// Current grouping of the local table.
    pub fn groups(&self) -> Vec<AddressGroup> {
        self.doc.with(grouping::group_by_prefix)
    }

    /// Flip `enabled` on one entry and save. Returns the new value.
    pub async fn toggle(&self, key: &str) -> Result<bool, CoreError> {
        let enabled = self.doc.try_edit(|table| {
            let entry = table.get_mut(key).ok_or_else(|| unknown(key))?;
            entry.enabled = !entry.enabled;
            Ok::<_, CoreError>(entry.enabled)
        })?;
        self.doc.save().await?;
        Ok(enabled)
    }

    /// Flip `allowZero` on one entry and save. Returns the new value.
    pub async fn toggle_allow_zero(&self, key: &str) -> Result<bool, CoreError> {
        let allow = self.doc.try_edit(|table| {
            let entry = table.get_mut(key).ok_or_else(|| unknown(key))?;
            let allow = !entry.allows_zero();
            entry.allow_zero = Some(allow);
            Ok::<_, CoreError>(allow)
        })?;
        self.doc.save().await?;
        Ok(allow)
    }

    /// Enable or disable every entry in `group` with a single save.
    /// Returns the number of entries changed.
    pub async fn set_group(&self, group: &str, enabled: bool) -> Result<usize, CoreError> {
        let touched = self
            .doc
            .try_edit(|table| grouping::set_group_enabled(table, group, enabled))?;
        self.doc.save().await?;
        Ok(touched)
    }
}

fn unknown(key: &str) -> CoreError {
    CoreError::UnknownKey {
        key: key.to_owned(),
    }
}
