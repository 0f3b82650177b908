//! Raw payload wrapper shared by all domain models.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{Map, Value};
use std::str::FromStr;

/// A raw API payload with ordered candidate-key lookup.
///
/// The same logical entity arrives in two shapes: a flat search-result row
/// (`"Award ID"`, `"Recipient Name"`) and a nested detail object
/// (`"generated_unique_award_id"`, `"recipient"`). Accessors therefore look
/// up an ordered list of candidate keys; the first key that is present with
/// a non-null value wins. Presence is explicit: `""`, `0` and `[]` all
/// count as present, only a missing key or a JSON `null` does not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    data: Map<String, Value>,
}

impl Record {
    /// Wraps an existing payload map.
    pub fn new(data: Map<String, Value>) -> Self {
        Self { data }
    }

    /// Builds a single-field payload from a bare identifier.
    pub fn from_id(id_field: &str, id: &str) -> Self {
        let mut data = Map::new();
        data.insert(id_field.to_string(), Value::String(id.to_string()));
        Self { data }
    }

    /// Wraps a JSON value if it is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(data) => Some(Self { data }),
            _ => None,
        }
    }

    /// Borrows the backing payload.
    ///
    /// The library never mutates it except through [`Record::merge_missing`].
    pub fn raw(&self) -> &Map<String, Value> {
        &self.data
    }

    /// Consumes the record, returning the backing payload.
    pub fn into_inner(self) -> Map<String, Value> {
        self.data
    }

    /// Returns the first candidate key's value that is present and non-null.
    pub fn get(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|key| self.data.get(*key))
            .find(|value| !value.is_null())
    }

    /// Whether any candidate key holds a non-null value. This is the lazy
    /// fetch trigger: a fetch happens exactly when this returns false.
    pub fn has_any(&self, keys: &[&str]) -> bool {
        self.get(keys).is_some()
    }

    /// String value for the first matching candidate key.
    pub fn get_str(&self, keys: &[&str]) -> Option<&str> {
        self.get(keys).and_then(Value::as_str)
    }

    /// Owned string, coercing bare numbers to their digit form (some
    /// endpoints return zip codes and ids as numbers).
    pub fn get_string(&self, keys: &[&str]) -> Option<String> {
        match self.get(keys)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Integer value, accepting numbers and numeric strings.
    pub fn get_i64(&self, keys: &[&str]) -> Option<i64> {
        match self.get(keys)? {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean value for the first matching candidate key.
    pub fn get_bool(&self, keys: &[&str]) -> Option<bool> {
        self.get(keys).and_then(Value::as_bool)
    }

    /// Nested object for the first matching candidate key.
    pub fn get_object(&self, keys: &[&str]) -> Option<&Map<String, Value>> {
        self.get(keys).and_then(Value::as_object)
    }

    /// Array for the first matching candidate key.
    pub fn get_array(&self, keys: &[&str]) -> Option<&Vec<Value>> {
        self.get(keys).and_then(Value::as_array)
    }

    /// Monetary value quantized to 2 fractional digits, half-up.
    pub fn get_money(&self, keys: &[&str]) -> Option<Decimal> {
        self.get(keys).and_then(money)
    }

    /// Monetary value for always-present aggregates; missing means zero.
    pub fn get_money_or_zero(&self, keys: &[&str]) -> Decimal {
        self.get_money(keys).unwrap_or(Decimal::ZERO)
    }

    /// Date value, accepting `YYYY-MM-DD` and RFC 3339 timestamps.
    pub fn get_date(&self, keys: &[&str]) -> Option<NaiveDate> {
        parse_date(self.get_str(keys)?)
    }

    /// Merges a fetched detail payload into the backing store. Only keys not
    /// already present are added, so search-result data a caller has already
    /// observed is never rewritten underneath it.
    pub fn merge_missing(&mut self, fetched: Map<String, Value>) {
        for (key, value) in fetched {
            self.data.entry(key).or_insert(value);
        }
    }
}

/// Parses a JSON value into an exact decimal, if it is numeric.
pub(crate) fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
        _ => None,
    }
}

/// Decimal money: exact parse, then quantize to 2 places, half-up.
pub(crate) fn money(value: &Value) -> Option<Decimal> {
    decimal_from_value(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Parses `YYYY-MM-DD`, falling back to a full RFC 3339 timestamp.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| chrono::DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}
