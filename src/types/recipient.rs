//! Award recipient with lazily fetched profile fields.

use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use crate::client::Client;
use crate::errors::Error;
use crate::types::location::Location;
use crate::types::record::Record;

/// The recipient of an award.
///
/// Rows embed recipients in several shapes; accessors reconcile them.
/// Profile fields (business types, transaction totals) are fetched from the
/// recipient endpoint on first use, at most once per instance.
#[derive(Debug, Clone)]
pub struct Recipient<'a> {
    record: Record,
    client: Option<&'a Client>,
    details_fetched: bool,
}

impl<'a> Recipient<'a> {
    pub(crate) fn new(record: Record, client: Option<&'a Client>) -> Self {
        Self {
            record,
            client,
            details_fetched: false,
        }
    }

    pub(crate) fn from_value(value: Value, client: Option<&'a Client>) -> Result<Self, Error> {
        let record = Record::from_value(value).ok_or_else(|| Error::Api {
            message: "recipient is not an object".to_string(),
        })?;
        Ok(Self::new(record, client))
    }

    pub fn raw(&self) -> &Map<String, Value> {
        self.record.raw()
    }

    /// Recipient hash, cleaned of the level-list suffix some endpoints
    /// attach.
    pub fn recipient_id(&self) -> Option<String> {
        self.record
            .get_string(&["recipient_id", "recipient_hash"])
            .map(|id| clean_recipient_id(&id))
    }

    pub fn name(&self) -> Option<&str> {
        self.record
            .get_str(&["name", "recipient_name", "Recipient Name"])
    }

    pub fn duns(&self) -> Option<String> {
        self.record
            .get_string(&["duns", "recipient_unique_id", "Recipient DUNS Number"])
    }

    pub fn uei(&self) -> Option<String> {
        self.record.get_string(&["uei", "recipient_uei"])
    }

    pub fn location(&self) -> Option<Location> {
        self.record
            .get_object(&["location", "recipient_location"])
            .map(|map| Location::from_map(map.clone()))
    }

    /// Parent recipient assembled from the flat `parent_*` fields, when any
    /// are present.
    pub fn parent(&self) -> Option<Recipient<'a>> {
        let fields = [
            ("parent_id", "recipient_id"),
            ("parent_name", "name"),
            ("parent_duns", "duns"),
            ("parent_uei", "uei"),
        ];
        let mut data = Map::new();
        for (source, target) in fields {
            if let Some(value) = self.record.get(&[source]) {
                data.insert(target.to_string(), value.clone());
            }
        }
        if data.is_empty() {
            return None;
        }
        Some(Recipient::new(Record::new(data), self.client))
    }

    async fn ensure_details(&mut self, keys: &[&str]) -> Result<(), Error> {
        if self.details_fetched || self.record.has_any(keys) {
            return Ok(());
        }
        let Some(client) = self.client else {
            return Ok(());
        };
        let Some(id) = self.recipient_id() else {
            return Ok(());
        };
        let body = client.get(&format!("/recipients/{id}/")).await?;
        if let Value::Object(map) = body {
            self.record.merge_missing(map);
        }
        self.details_fetched = true;
        Ok(())
    }

    /// Business type descriptions from the recipient profile.
    pub async fn business_types(&mut self) -> Result<Vec<String>, Error> {
        self.ensure_details(&["business_types"]).await?;
        let types = self
            .record
            .get_array(&["business_types"])
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(types)
    }

    pub async fn total_transaction_amount(&mut self) -> Result<Option<Decimal>, Error> {
        self.ensure_details(&["total_transaction_amount"]).await?;
        Ok(self.record.get_money(&["total_transaction_amount"]))
    }

    pub async fn total_transactions(&mut self) -> Result<Option<i64>, Error> {
        self.ensure_details(&["total_transactions"]).await?;
        Ok(self.record.get_i64(&["total_transactions"]))
    }
}

/// Normalizes a recipient hash for use in endpoint paths.
///
/// Some endpoints report the hash with a stringified level list attached,
/// e.g. `d2...7a-['C', 'R']`, and some add a trailing slash. The profile
/// endpoint wants a single level; `R` wins when offered.
pub(crate) fn clean_recipient_id(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.ends_with(']') {
        if let Some(pos) = trimmed.rfind("-[") {
            let base = &trimmed[..pos];
            let inner = &trimmed[pos + 2..trimmed.len() - 1];
            let levels: Vec<String> = inner
                .split(',')
                .map(|token| {
                    token
                        .trim()
                        .trim_matches(|c| c == '\'' || c == '"')
                        .to_ascii_uppercase()
                })
                .filter(|token| !token.is_empty())
                .collect();
            let level = if levels.iter().any(|level| level == "R") {
                Some("R".to_string())
            } else {
                levels.first().cloned()
            };
            return match level {
                Some(level) => format!("{base}-{level}"),
                None => base.to_string(),
            };
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_lists_collapse_to_one_level() {
        assert_eq!(
            clean_recipient_id("d2894d46-a4c1-0c2c-e9e4-5c4b8d8a2c7a-['C', 'R']"),
            "d2894d46-a4c1-0c2c-e9e4-5c4b8d8a2c7a-R"
        );
        assert_eq!(clean_recipient_id("abc123-['C']"), "abc123-C");
        assert_eq!(clean_recipient_id("abc123-[\"p\"]"), "abc123-P");
        assert_eq!(clean_recipient_id("abc123-[]"), "abc123");
    }

    #[test]
    fn plain_ids_pass_through() {
        assert_eq!(clean_recipient_id("abc123-R"), "abc123-R");
        assert_eq!(clean_recipient_id(" abc123-C/ "), "abc123-C");
    }

    #[test]
    fn accessors_reconcile_row_shapes() {
        let recipient = Recipient::from_value(
            json!({
                "Recipient Name": "CALIFORNIA INSTITUTE OF TECHNOLOGY",
                "recipient_unique_id": "009584210",
                "recipient_id": "jpl-hash-['C', 'R']/"
            }),
            None,
        )
        .unwrap();
        assert_eq!(
            recipient.name(),
            Some("CALIFORNIA INSTITUTE OF TECHNOLOGY")
        );
        assert_eq!(recipient.duns().as_deref(), Some("009584210"));
        assert_eq!(recipient.recipient_id().as_deref(), Some("jpl-hash-R"));
    }

    #[test]
    fn parent_assembles_from_flat_fields() {
        let recipient = Recipient::from_value(
            json!({
                "name": "SUBSIDIARY LLC",
                "parent_name": "PARENT HOLDINGS INC",
                "parent_uei": "PARENTUEI0001"
            }),
            None,
        )
        .unwrap();
        let parent = recipient.parent().unwrap();
        assert_eq!(parent.name(), Some("PARENT HOLDINGS INC"));
        assert_eq!(parent.uei().as_deref(), Some("PARENTUEI0001"));

        let orphan = Recipient::from_value(json!({"name": "NO PARENT"}), None).unwrap();
        assert!(orphan.parent().is_none());
    }

    #[tokio::test]
    async fn missing_profile_without_a_client_stays_absent() {
        let mut recipient = Recipient::from_value(json!({"name": "X"}), None).unwrap();
        assert!(recipient.business_types().await.unwrap().is_empty());
        assert_eq!(recipient.total_transactions().await.unwrap(), None);
    }
}
