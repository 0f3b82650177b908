//! Subaward search.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::client::Client;
use crate::errors::Error;
use crate::query::awards::{
    award_family, award_type_codes, validate_award_type_codes, AWARD_TYPES_REQUIRED,
};
use crate::query::common::{
    cap_count, walk_count, FilteredSearch, PagedSearch, SearchCommon, SortOrder,
};
use crate::query::filters::Filter;
use crate::types::{AwardTypeGroup, SubAward};

/// Columns requested when searching contract subawards.
pub(crate) const CONTRACT_SUBAWARD_FIELDS: &[&str] = &[
    "Awarding Agency",
    "Awarding Sub Agency",
    "NAICS",
    "Prime Award ID",
    "prime_award_recipient_id",
    "Prime Award Recipient UEI",
    "Prime Recipient Name",
    "PSC",
    "Sub-Award Amount",
    "Sub-Award Date",
    "Sub-Award Description",
    "Sub-Award ID",
    "Sub-Award Primary Place of Performance",
    "sub_award_recipient_id",
    "Sub-Award Type",
    "Sub-Awardee Name",
    "Sub-Recipient Location",
    "Sub-Recipient UEI",
    "prime_award_generated_internal_id",
    "prime_award_internal_id",
    "internal_id",
    "subaward_description_sorted",
];

/// Columns requested when searching grant subawards.
pub(crate) const GRANT_SUBAWARD_FIELDS: &[&str] = &[
    "Assistance Listing",
    "Awarding Agency",
    "Awarding Sub Agency",
    "Prime Award ID",
    "prime_award_recipient_id",
    "Prime Award Recipient UEI",
    "Prime Recipient Name",
    "Sub-Award Amount",
    "Sub-Award Date",
    "Sub-Award Description",
    "Sub-Award ID",
    "Sub-Award Primary Place of Performance",
    "sub_award_recipient_id",
    "Sub-Award Type",
    "Sub-Awardee Name",
    "Sub-Recipient Location",
    "Sub-Recipient UEI",
    "prime_award_generated_internal_id",
    "prime_award_internal_id",
    "internal_id",
    "subaward_description_sorted",
];

/// Search over subawards, optionally scoped to one prime award.
///
/// Uses the award search endpoint with the subaward flags set, so it takes
/// the same filters and the same award type requirement.
#[derive(Debug, Clone)]
pub struct SubAwardsSearch<'a> {
    client: &'a Client,
    common: SearchCommon,
    award_id: Option<String>,
}

impl<'a> SubAwardsSearch<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            common: SearchCommon::default(),
            award_id: None,
        }
    }

    /// Scopes the search to subawards of one prime award, by generated
    /// award id.
    pub fn for_award(mut self, award_id: &str) -> Result<Self, Error> {
        let trimmed = award_id.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("award_id cannot be empty".to_string()));
        }
        self.award_id = Some(trimmed.to_string());
        Ok(self)
    }

    /// Adds award type codes; same rules as the award search.
    pub fn with_award_types(self, codes: Vec<String>) -> Result<Self, Error> {
        validate_award_type_codes(&self.common, &codes)?;
        Ok(self.push_filter(Filter::SimpleList {
            key: "award_type_codes",
            values: codes,
        }))
    }

    /// Columns the search will request, determined by the award family.
    pub fn fields(&self) -> Vec<&'static str> {
        match award_family(&self.common) {
            Some(AwardTypeGroup::Contracts) => CONTRACT_SUBAWARD_FIELDS.to_vec(),
            Some(
                AwardTypeGroup::Grants
                | AwardTypeGroup::DirectPayments
                | AwardTypeGroup::OtherAssistance,
            ) => GRANT_SUBAWARD_FIELDS.to_vec(),
            _ => {
                let mut fields = CONTRACT_SUBAWARD_FIELDS.to_vec();
                for field in GRANT_SUBAWARD_FIELDS {
                    if !fields.contains(field) {
                        fields.push(field);
                    }
                }
                fields
            }
        }
    }

    /// Subaward counts per award category.
    pub async fn count_by_type(&self) -> Result<HashMap<String, i64>, Error> {
        let mut filters = self.common.aggregated_filters();
        if let Some(award_id) = &self.award_id {
            filters.insert("award_unique_id".to_string(), json!(award_id));
        }
        let payload = json!({
            "filters": filters,
            "subawards": true,
            "spending_level": "subawards",
        });
        let body = self
            .client
            .post("/search/spending_by_award_count/", &payload)
            .await?;
        let mut counts = HashMap::new();
        if let Some(results) = body.get("aggregations").and_then(Value::as_object) {
            for (category, count) in results {
                counts.insert(category.clone(), count.as_i64().unwrap_or(0));
            }
        }
        Ok(counts)
    }
}

impl<'a> PagedSearch for SubAwardsSearch<'a> {
    type Item = SubAward;

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
        Ok("/search/spending_by_award/".to_string())
    }

    fn build_payload(&self, page: usize) -> Result<Value, Error> {
        if award_type_codes(&self.common).is_empty() {
            return Err(Error::Validation(AWARD_TYPES_REQUIRED.to_string()));
        }
        let mut filters = self.common.aggregated_filters();
        if let Some(award_id) = &self.award_id {
            filters.insert("award_unique_id".to_string(), json!(award_id));
        }
        let mut payload = Map::new();
        payload.insert("filters".to_string(), Value::Object(filters));
        payload.insert("fields".to_string(), json!(self.fields()));
        payload.insert("limit".to_string(), json!(self.common.effective_page_size()));
        payload.insert("page".to_string(), json!(page));
        payload.insert("subawards".to_string(), json!(true));
        payload.insert("spending_level".to_string(), json!("subawards"));
        if let Some(order_by) = &self.common.order_by {
            payload.insert("sort".to_string(), json!(order_by));
            payload.insert(
                "order".to_string(),
                json!(self.common.order_direction.as_str()),
            );
        }
        Ok(Value::Object(payload))
    }

    fn order_by(mut self, field: &str, direction: SortOrder) -> Result<Self, Error> {
        if !self.fields().iter().any(|f| *f == field) {
            let mut valid = self.fields();
            valid.sort_unstable();
            return Err(Error::Validation(format!(
                "Invalid sort field '{field}' for subawards. Valid fields are: {}",
                valid.join(", ")
            )));
        }
        self.common.order_by = Some(field.to_string());
        self.common.order_direction = direction;
        Ok(self)
    }

    fn transform(&self, row: Value) -> Result<Self::Item, Error> {
        SubAward::from_value(row)
    }

    /// Scoped searches count through the dedicated per-award endpoint;
    /// unscoped searches walk result pages.
    async fn count(&self) -> Result<i64, Error> {
        let Some(award_id) = &self.award_id else {
            return walk_count(self).await;
        };
        let body = self
            .client
            .get(&format!("/awards/count/subaward/{award_id}/"))
            .await?;
        let raw = body
            .get("subawards")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok(cap_count(&self.common, raw))
    }
}

impl FilteredSearch for SubAwardsSearch<'_> {}
