//! Spending-by-category search: totals grouped by recipient, congressional
//! district, or state.

use std::fmt;

use serde_json::{json, Map, Value};

use crate::client::Client;
use crate::errors::Error;
use crate::query::common::{FilteredSearch, PagedSearch, SearchCommon};
use crate::query::filters::Filter;
use crate::types::Spending;

const CATEGORY_REQUIRED: &str =
    "Category must be set. Use .by_recipient(), .by_district(), or .by_state() method.";

/// Grouping category for a spending search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendingCategory {
    Recipient,
    District,
    State,
}

impl SpendingCategory {
    pub fn name(&self) -> &'static str {
        match self {
            SpendingCategory::Recipient => "recipient",
            SpendingCategory::District => "district",
            SpendingCategory::State => "state",
        }
    }

    /// Path segment of the category endpoint; states use a longer name on
    /// the wire than in payloads.
    fn endpoint_segment(&self) -> &'static str {
        match self {
            SpendingCategory::Recipient => "recipient",
            SpendingCategory::District => "district",
            SpendingCategory::State => "state_territory",
        }
    }
}

impl fmt::Display for SpendingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Aggregation level the totals are computed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpendingLevel {
    #[default]
    Transactions,
    Awards,
    Subawards,
}

impl SpendingLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpendingLevel::Transactions => "transactions",
            SpendingLevel::Awards => "awards",
            SpendingLevel::Subawards => "subawards",
        }
    }
}

impl fmt::Display for SpendingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Search over aggregated spending buckets.
///
/// A grouping category is required before anything can be fetched.
#[derive(Debug, Clone)]
pub struct SpendingSearch<'a> {
    client: &'a Client,
    common: SearchCommon,
    category: Option<SpendingCategory>,
    spending_level: SpendingLevel,
    subawards_only: bool,
}

impl<'a> SpendingSearch<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            common: SearchCommon::default(),
            category: None,
            spending_level: SpendingLevel::default(),
            subawards_only: false,
        }
    }

    /// Groups totals by recipient.
    pub fn by_recipient(mut self) -> Self {
        self.category = Some(SpendingCategory::Recipient);
        self
    }

    /// Groups totals by congressional district.
    pub fn by_district(mut self) -> Self {
        self.category = Some(SpendingCategory::District);
        self
    }

    /// Groups totals by state or territory.
    pub fn by_state(mut self) -> Self {
        self.category = Some(SpendingCategory::State);
        self
    }

    pub fn with_spending_level(mut self, level: SpendingLevel) -> Self {
        self.spending_level = level;
        self
    }

    /// Restricts totals to subaward dollars.
    pub fn with_subawards(mut self, subawards: bool) -> Self {
        self.subawards_only = subawards;
        self
    }

    /// Filters to awards received by one recipient, by recipient hash.
    pub fn with_recipient_id(self, recipient_id: &str) -> Self {
        self.push_filter(Filter::SimpleList {
            key: "recipient_id",
            values: vec![recipient_id.to_string()],
        })
    }

    /// Award type codes, passed through without the family rule; category
    /// buckets may span families.
    pub fn with_award_types(self, codes: Vec<String>) -> Self {
        self.push_filter(Filter::SimpleList {
            key: "award_type_codes",
            values: codes,
        })
    }

    fn require_category(&self) -> Result<SpendingCategory, Error> {
        self.category
            .ok_or_else(|| Error::Validation(CATEGORY_REQUIRED.to_string()))
    }
}

impl<'a> PagedSearch for SpendingSearch<'a> {
    type Item = Spending;

    fn client(&self) -> &Client {
        self.client
    }

    fn common(&self) -> &SearchCommon {
        &self.common
    }

    fn common_mut(&mut self) -> &mut SearchCommon {
        &mut self.common
    }

    fn endpoint(&self) -> Result<String, Error> {
        let category = self.require_category()?;
        Ok(format!(
            "/search/spending_by_category/{}/",
            category.endpoint_segment()
        ))
    }

    fn build_payload(&self, page: usize) -> Result<Value, Error> {
        let category = self.require_category()?;
        let mut payload = Map::new();
        payload.insert(
            "filters".to_string(),
            Value::Object(self.common.aggregated_filters()),
        );
        payload.insert("category".to_string(), json!(category.name()));
        payload.insert("limit".to_string(), json!(self.common.effective_page_size()));
        payload.insert("page".to_string(), json!(page));
        payload.insert(
            "spending_level".to_string(),
            json!(self.spending_level.as_str()),
        );
        if self.subawards_only {
            payload.insert("subawards".to_string(), json!(true));
        }
        Ok(Value::Object(payload))
    }

    /// Stamps the grouping context into each row so buckets know what they
    /// aggregate.
    fn transform(&self, mut row: Value) -> Result<Self::Item, Error> {
        let category = self.require_category()?;
        if let Some(map) = row.as_object_mut() {
            map.insert("category".to_string(), json!(category.name()));
            map.insert(
                "spending_level".to_string(),
                json!(self.spending_level.as_str()),
            );
        }
        Spending::from_value(row)
    }
}

impl FilteredSearch for SpendingSearch<'_> {}
