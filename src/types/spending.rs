//! Aggregated spending rows from the spending-by-category search.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::errors::Error;
use crate::types::record::Record;

/// One aggregation bucket: a recipient, a congressional district, or a
/// state, depending on the category the search grouped by.
///
/// The builder stamps `category` and `spending_level` into each row so a
/// bucket knows what it aggregates without carrying the query around.
#[derive(Debug, Clone, PartialEq)]
pub struct Spending {
    record: Record,
}

impl Spending {
    pub(crate) fn from_value(value: Value) -> Result<Self, Error> {
        let record = Record::from_value(value).ok_or_else(|| Error::Api {
            message: "spending row is not an object".to_string(),
        })?;
        Ok(Self { record })
    }

    pub fn raw(&self) -> &serde_json::Map<String, Value> {
        self.record.raw()
    }

    pub fn id(&self) -> Option<String> {
        self.record.get_string(&["id"])
    }

    /// Bucket label: recipient name, `TX-12`, or state name.
    pub fn name(&self) -> Option<&str> {
        self.record.get_str(&["name"])
    }

    /// Bucket code: recipient DUNS, district code, or state code.
    pub fn code(&self) -> Option<String> {
        self.record.get_string(&["code"])
    }

    pub fn amount(&self) -> Option<Decimal> {
        self.record.get_money(&["amount"])
    }

    pub fn total_outlays(&self) -> Option<Decimal> {
        self.record.get_money(&["total_outlays"])
    }

    /// Grouping category: `recipient`, `district`, or `state`.
    pub fn category(&self) -> Option<&str> {
        self.record.get_str(&["category"])
    }

    /// Aggregation level the amounts were computed at.
    pub fn spending_level(&self) -> Option<&str> {
        self.record.get_str(&["spending_level"])
    }

    /// Recipient hash; recipient buckets only.
    pub fn recipient_id(&self) -> Option<String> {
        self.record.get_string(&["recipient_id"])
    }

    /// Recipient UEI; recipient buckets only.
    pub fn uei(&self) -> Option<&str> {
        self.record.get_str(&["uei"])
    }

    /// Recipient DUNS; recipient buckets only.
    pub fn duns(&self) -> Option<String> {
        match self.category() {
            Some("recipient") => self.code(),
            _ => None,
        }
    }

    /// District code; district buckets only.
    pub fn district_code(&self) -> Option<String> {
        match self.category() {
            Some("district") => self.code(),
            _ => None,
        }
    }

    /// Two-letter state code, from the code of a state bucket or the name
    /// prefix of a district bucket.
    pub fn state_code(&self) -> Option<String> {
        match self.category() {
            Some("state") => self.code(),
            Some("district") => self
                .name()
                .and_then(|name| name.split_once('-'))
                .map(|(state, _)| state.to_string()),
            _ => None,
        }
    }

    /// District number from a `TX-12` style name; district buckets only.
    pub fn district_number(&self) -> Option<String> {
        match self.category() {
            Some("district") => self
                .name()
                .and_then(|name| name.split_once('-'))
                .map(|(_, district)| district.to_string()),
            _ => None,
        }
    }

    /// Whether a district bucket aggregates multiple districts, which the
    /// API reports for states with low award counts.
    pub fn is_multiple_districts(&self) -> bool {
        self.category() == Some("district")
            && self.name().is_some_and(|name| name.contains("MULTIPLE"))
    }

    /// State name; state buckets only.
    pub fn state_name(&self) -> Option<&str> {
        match self.category() {
            Some("state") => self.name(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn recipient_bucket_helpers() {
        let row = Spending::from_value(json!({
            "id": 1,
            "name": "CALIFORNIA INSTITUTE OF TECHNOLOGY",
            "code": "009584210",
            "recipient_id": "jpl-hash-R",
            "uei": "U2LXJ2PJN644",
            "amount": "2500000.50",
            "category": "recipient",
            "spending_level": "transactions"
        }))
        .unwrap();
        assert_eq!(row.duns().as_deref(), Some("009584210"));
        assert_eq!(row.uei(), Some("U2LXJ2PJN644"));
        assert_eq!(row.amount(), Some(Decimal::new(250_000_050, 2)));
        assert_eq!(row.district_code(), None);
    }

    #[test]
    fn district_bucket_parses_its_name() {
        let row = Spending::from_value(json!({
            "name": "TX-12",
            "code": "4812",
            "amount": 98000.0,
            "category": "district"
        }))
        .unwrap();
        assert_eq!(row.state_code().as_deref(), Some("TX"));
        assert_eq!(row.district_number().as_deref(), Some("12"));
        assert!(!row.is_multiple_districts());

        let merged = Spending::from_value(json!({
            "name": "AK-MULTIPLE DISTRICTS",
            "category": "district"
        }))
        .unwrap();
        assert!(merged.is_multiple_districts());
    }

    #[test]
    fn state_bucket_helpers() {
        let row = Spending::from_value(json!({
            "name": "Texas",
            "code": "TX",
            "amount": "1.00",
            "category": "state"
        }))
        .unwrap();
        assert_eq!(row.state_code().as_deref(), Some("TX"));
        assert_eq!(row.state_name(), Some("Texas"));
        assert_eq!(row.duns(), None);
    }
}
