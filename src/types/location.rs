//! Location and period-of-performance models.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::record::Record;

/// A place of performance or recipient location.
///
/// Detail payloads use snake_case keys; search rows use the
/// `"Place of Performance ..."` column names. Accessors accept both.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    record: Record,
}

impl Location {
    pub fn new(record: Record) -> Self {
        Self { record }
    }

    pub fn from_map(data: Map<String, Value>) -> Self {
        Self::new(Record::new(data))
    }

    /// Borrows the raw payload.
    pub fn raw(&self) -> &Map<String, Value> {
        self.record.raw()
    }

    pub fn address_line1(&self) -> Option<&str> {
        self.record.get_str(&["address_line1"])
    }

    pub fn address_line2(&self) -> Option<&str> {
        self.record.get_str(&["address_line2"])
    }

    pub fn address_line3(&self) -> Option<&str> {
        self.record.get_str(&["address_line3"])
    }

    pub fn city_name(&self) -> Option<&str> {
        self.record.get_str(&["city_name"])
    }

    pub fn state_name(&self) -> Option<&str> {
        self.record.get_str(&["state_name"])
    }

    pub fn state_code(&self) -> Option<&str> {
        self.record
            .get_str(&["state_code", "Place of Performance State Code"])
    }

    pub fn country_name(&self) -> Option<&str> {
        self.record.get_str(&["country_name"])
    }

    pub fn country_code(&self) -> Option<&str> {
        self.record
            .get_str(&["location_country_code", "Place of Performance Country Code"])
    }

    /// Five-digit zip, tolerating numeric payload values.
    pub fn zip5(&self) -> Option<String> {
        self.record.get_string(&["zip5", "Place of Performance Zip5"])
    }

    pub fn zip4(&self) -> Option<String> {
        self.record.get_string(&["zip4"])
    }

    pub fn county_name(&self) -> Option<&str> {
        self.record.get_str(&["county_name"])
    }

    pub fn county_code(&self) -> Option<String> {
        self.record.get_string(&["county_code"])
    }

    pub fn congressional_code(&self) -> Option<String> {
        self.record.get_string(&["congressional_code"])
    }

    pub fn foreign_province(&self) -> Option<&str> {
        self.record.get_str(&["foreign_province"])
    }

    pub fn foreign_postal_code(&self) -> Option<String> {
        self.record.get_string(&["foreign_postal_code"])
    }

    /// Congressional district label, e.g. `"TX-12"`.
    pub fn district(&self) -> Option<String> {
        let pieces: Vec<String> = [
            self.state_code().map(str::to_string),
            self.congressional_code(),
        ]
        .into_iter()
        .flatten()
        .collect();
        if pieces.is_empty() {
            None
        } else {
            Some(pieces.join("-"))
        }
    }

    /// Multi-line mailing-style address from whatever fields are present.
    pub fn formatted_address(&self) -> Option<String> {
        let mut lines: Vec<String> = [
            self.address_line1(),
            self.address_line2(),
            self.address_line3(),
        ]
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();

        let trailing: Vec<String> = [
            self.city_name().map(str::to_string),
            self.state_code().map(str::to_string),
            self.zip5(),
        ]
        .into_iter()
        .flatten()
        .collect();
        if !trailing.is_empty() {
            lines.push(trailing.join(", "));
        }
        if let Some(country) = self.country_name() {
            lines.push(country.to_string());
        }
        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }
}

/// Start and end dates of an award's period of performance.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodOfPerformance {
    record: Record,
}

impl PeriodOfPerformance {
    pub fn new(record: Record) -> Self {
        Self { record }
    }

    pub fn from_map(data: Map<String, Value>) -> Self {
        Self::new(Record::new(data))
    }

    pub fn raw(&self) -> &Map<String, Value> {
        self.record.raw()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.record
            .get_date(&["start_date", "Start Date", "Period of Performance Start Date"])
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.record.get_date(&[
            "end_date",
            "End Date",
            "Period of Performance Current End Date",
        ])
    }

    pub fn last_modified_date(&self) -> Option<NaiveDate> {
        self.record
            .get_date(&["last_modified_date", "Last Modified Date"])
    }

    /// Flat search-row columns that can stand in for the nested object.
    pub(crate) const FLAT_KEYS: &'static [&'static str] = &[
        "Start Date",
        "End Date",
        "Period of Performance Start Date",
        "Period of Performance Current End Date",
        "Last Modified Date",
    ];
}
