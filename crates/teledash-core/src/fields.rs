// ── Telemetry field selection ──

use teledash_api::{BridgeClient, TelemetryFields};

use crate::document::ConfigDocument;
use crate::error::CoreError;

/// Which decoded telemetry fields the bridge forwards. Toggles are local
/// until [`save`](Self::save).
#[derive(Debug, Clone)]
pub struct FieldSettings {
    doc: ConfigDocument<TelemetryFields>,
}

impl FieldSettings {
    pub async fn load(client: &BridgeClient) -> Result<Self, CoreError> {
        Ok(Self::from_document(ConfigDocument::load(client).await?))
    }

    pub fn from_document(doc: ConfigDocument<TelemetryFields>) -> Self {
        Self { doc }
    }

    pub fn document(&self) -> &ConfigDocument<TelemetryFields> {
        &self.doc
    }

    /// `(field, enabled)` pairs in document order.
    pub fn entries(&self) -> Vec<(String, bool)> {
        self.doc.with(|fields| {
            fields
                .enabled
                .iter()
                .map(|(name, on)| (name.clone(), *on))
                .collect()
        })
    }

    /// Flip one field locally. Returns the new value.
    pub fn toggle(&self, field: &str) -> Result<bool, CoreError> {
        self.doc.try_edit(|fields| {
            let slot = fields
                .enabled
                .get_mut(field)
                .ok_or_else(|| CoreError::UnknownKey {
                    key: field.to_owned(),
                })?;
            *slot = !*slot;
            Ok(*slot)
        })
    }

    pub async fn save(&self) -> Result<(), CoreError> {
        self.doc.save().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_known_fields_only() {
        let client =
            BridgeClient::from_reqwest("http://127.0.0.1:9", reqwest::Client::new()).unwrap();
        let mut fields = TelemetryFields::default();
        fields.enabled.insert("Speed".into(), true);
        fields.enabled.insert("RPM".into(), false);
        let s = FieldSettings::from_document(ConfigDocument::from_value(&client, fields));

        assert!(s.toggle("RPM").unwrap());
        assert!(s.toggle("Boost").is_err());
        assert_eq!(
            s.entries(),
            vec![("Speed".to_owned(), true), ("RPM".to_owned(), true)]
        );
    }
}
