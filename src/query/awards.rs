//! Prime award search.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::client::Client;
use crate::errors::Error;
use crate::query::common::{cap_count, FilteredSearch, PagedSearch, SearchCommon, SortOrder};
use crate::query::filters::Filter;
use crate::types::{category_for_code, is_valid_award_type, Award, AwardTypeGroup};

pub(crate) const AWARD_TYPES_REQUIRED: &str =
    "A filter for 'award_type_codes' is required. Use the .with_award_types() method.";

/// All award type codes accumulated in a filter set.
pub(crate) fn award_type_codes(common: &SearchCommon) -> Vec<&str> {
    common
        .filters
        .iter()
        .filter_map(|filter| match filter {
            Filter::SimpleList {
                key: "award_type_codes",
                values,
            } => Some(values.iter().map(String::as_str)),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Award family implied by the accumulated type codes.
pub(crate) fn award_family(common: &SearchCommon) -> Option<AwardTypeGroup> {
    award_type_codes(common)
        .first()
        .and_then(|code| category_for_code(code))
}

/// Rejects unknown codes and any mix of award families, counting codes
/// already accumulated in `common`.
pub(crate) fn validate_award_type_codes(common: &SearchCommon, codes: &[String]) -> Result<(), Error> {
    let mut invalid: Vec<&str> = codes
        .iter()
        .map(String::as_str)
        .filter(|code| !is_valid_award_type(code))
        .collect();
    if !invalid.is_empty() {
        invalid.sort_unstable();
        invalid.dedup();
        return Err(Error::Validation(format!(
            "Invalid award type codes: {}",
            invalid.join(", ")
        )));
    }
    let mut categories: Vec<&str> = award_type_codes(common)
        .into_iter()
        .chain(codes.iter().map(String::as_str))
        .filter_map(category_for_code)
        .map(AwardTypeGroup::name)
        .collect();
    categories.sort_unstable();
    categories.dedup();
    if categories.len() > 1 {
        return Err(Error::Validation(format!(
            "Cannot mix different award type categories: {}. \
             Use separate queries for each award type category.",
            categories.join(", ")
        )));
    }
    Ok(())
}

/// Columns requested for every award search.
pub(crate) const BASE_SEARCH_FIELDS: &[&str] = &[
    "Award ID",
    "Recipient Name",
    "Description",
    "Awarding Agency",
    "Awarding Sub Agency",
    "Last Modified Date",
    "recipient_id",
    "generated_internal_id",
];

const CONTRACT_EXTRA_FIELDS: &[&str] = &[
    "Start Date",
    "End Date",
    "Award Amount",
    "Total Outlays",
    "Contract Award Type",
    "NAICS",
    "PSC",
];

const IDV_EXTRA_FIELDS: &[&str] = &[
    "Start Date",
    "End Date",
    "Award Amount",
    "Total Outlays",
    "Contract Award Type",
    "Last Date to Order",
];

const GRANT_EXTRA_FIELDS: &[&str] = &[
    "Start Date",
    "End Date",
    "Award Amount",
    "Total Outlays",
    "Award Type",
    "SAI Number",
    "CFDA Number",
    "Assistance Listings",
    "primary_assistance_listing",
];

const LOAN_EXTRA_FIELDS: &[&str] = &[
    "Issued Date",
    "Loan Value",
    "Subsidy Cost",
    "SAI Number",
    "CFDA Number",
    "Assistance Listings",
    "primary_assistance_listing",
];

/// Search over prime awards.
///
/// The API requires an award type filter and serves one award family per
/// query; [`with_award_types`](Self::with_award_types) enforces both. Chain
/// methods consume the builder, so branch with `clone()`.
#[derive(Debug, Clone)]
pub struct AwardsSearch<'a> {
    client: &'a Client,
    common: SearchCommon,
}

impl<'a> AwardsSearch<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            common: SearchCommon::default(),
        }
    }

    fn group(&self) -> Option<AwardTypeGroup> {
        award_family(&self.common)
    }

    /// Adds award type codes. Codes must be known and belong to the same
    /// family as any codes already present.
    pub fn with_award_types(self, codes: Vec<String>) -> Result<Self, Error> {
        validate_award_type_codes(&self.common, &codes)?;
        Ok(self.push_filter(Filter::SimpleList {
            key: "award_type_codes",
            values: codes,
        }))
    }

    fn with_family(self, group: AwardTypeGroup) -> Result<Self, Error> {
        self.with_award_types(group.codes().map(str::to_string).collect())
    }

    /// All contract type codes.
    pub fn contracts(self) -> Result<Self, Error> {
        self.with_family(AwardTypeGroup::Contracts)
    }

    /// All indefinite delivery vehicle type codes.
    pub fn idvs(self) -> Result<Self, Error> {
        self.with_family(AwardTypeGroup::Idvs)
    }

    /// All grant type codes.
    pub fn grants(self) -> Result<Self, Error> {
        self.with_family(AwardTypeGroup::Grants)
    }

    /// All loan type codes.
    pub fn loans(self) -> Result<Self, Error> {
        self.with_family(AwardTypeGroup::Loans)
    }

    /// All direct payment type codes.
    pub fn direct_payments(self) -> Result<Self, Error> {
        self.with_family(AwardTypeGroup::DirectPayments)
    }

    /// All other assistance type codes.
    pub fn other_assistance(self) -> Result<Self, Error> {
        self.with_family(AwardTypeGroup::OtherAssistance)
    }

    /// Columns the search will request, determined by the award family.
    pub fn fields(&self) -> Vec<&'static str> {
        let extras: &[&str] = match self.group() {
            Some(AwardTypeGroup::Contracts) => CONTRACT_EXTRA_FIELDS,
            Some(AwardTypeGroup::Idvs) => IDV_EXTRA_FIELDS,
            Some(AwardTypeGroup::Loans) => LOAN_EXTRA_FIELDS,
            Some(
                AwardTypeGroup::Grants
                | AwardTypeGroup::DirectPayments
                | AwardTypeGroup::OtherAssistance,
            ) => GRANT_EXTRA_FIELDS,
            None => &[],
        };
        let mut fields: Vec<&'static str> = BASE_SEARCH_FIELDS.to_vec();
        for field in extras {
            if !fields.contains(field) {
                fields.push(field);
            }
        }
        fields
    }

    /// Counts per award category, from the dedicated count endpoint.
    pub async fn count_by_type(&self) -> Result<HashMap<String, i64>, Error> {
        let payload = json!({"filters": self.common.aggregated_filters()});
        let body = self
            .client
            .post("/search/spending_by_award_count/", &payload)
            .await?;
        let mut counts = HashMap::new();
        if let Some(results) = body.get("results").and_then(Value::as_object) {
            for (category, count) in results {
                counts.insert(category.clone(), count.as_i64().unwrap_or(0));
            }
        }
        Ok(counts)
    }
}

impl<'a> PagedSearch for AwardsSearch<'a> {
    type Item = Award<'a>;

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
        let mut payload = Map::new();
        payload.insert(
            "filters".to_string(),
            Value::Object(self.common.aggregated_filters()),
        );
        payload.insert("fields".to_string(), json!(self.fields()));
        payload.insert("limit".to_string(), json!(self.common.effective_page_size()));
        payload.insert("page".to_string(), json!(page));
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
            let category = self.group().map(AwardTypeGroup::name).unwrap_or("awards");
            let mut valid = self.fields();
            valid.sort_unstable();
            return Err(Error::Validation(format!(
                "Invalid sort field '{field}' for {category}. Valid fields are: {}",
                valid.join(", ")
            )));
        }
        self.common.order_by = Some(field.to_string());
        self.common.order_direction = direction;
        Ok(self)
    }

    fn transform(&self, mut row: Value) -> Result<Self::Item, Error> {
        if let (Some(group), Some(map)) = (self.group(), row.as_object_mut()) {
            let category = match group {
                AwardTypeGroup::Contracts => "contract",
                AwardTypeGroup::Idvs => "idv",
                AwardTypeGroup::Grants
                | AwardTypeGroup::DirectPayments
                | AwardTypeGroup::OtherAssistance => "grant",
                AwardTypeGroup::Loans => "loan",
            };
            map.entry("category").or_insert_with(|| json!(category));
        }
        Award::from_value(row, Some(self.client))
    }

    /// Count from the dedicated count endpoint, capped by the configured
    /// limits.
    async fn count(&self) -> Result<i64, Error> {
        let group = self
            .group()
            .ok_or_else(|| Error::Validation(AWARD_TYPES_REQUIRED.to_string()))?;
        let payload = json!({"filters": self.common.aggregated_filters()});
        let body = self
            .client
            .post("/search/spending_by_award_count/", &payload)
            .await?;
        let raw = body
            .get("results")
            .and_then(|results| results.get(group.count_key()))
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok(cap_count(&self.common, raw))
    }
}

impl FilteredSearch for AwardsSearch<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AwardKind;

    fn client() -> Client {
        Client::new()
    }

    #[test]
    fn award_types_are_required() {
        let client = client();
        let err = AwardsSearch::new(&client).build_payload(1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "A filter for 'award_type_codes' is required. Use the .with_award_types() method."
        );
    }

    #[test]
    fn families_cannot_be_mixed() {
        let client = client();
        let err = AwardsSearch::new(&client)
            .with_award_types(vec!["A".to_string(), "07".to_string()])
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot mix different award type categories: contracts, loans. \
             Use separate queries for each award type category."
        );

        let err = AwardsSearch::new(&client)
            .contracts()
            .unwrap()
            .with_award_types(vec!["02".to_string()])
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn unknown_codes_are_rejected() {
        let client = client();
        let err = AwardsSearch::new(&client)
            .with_award_types(vec!["A".to_string(), "ZZ".to_string()])
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid award type codes: ZZ");
    }

    #[test]
    fn contract_payload_carries_contract_fields() {
        let client = client();
        let search = AwardsSearch::new(&client).contracts().unwrap();
        let payload = search.build_payload(1).unwrap();
        assert_eq!(
            payload["filters"]["award_type_codes"],
            json!(["A", "B", "C", "D"])
        );
        assert_eq!(payload["limit"], json!(100));
        assert_eq!(payload["page"], json!(1));
        let fields = payload["fields"].as_array().unwrap();
        assert!(fields.contains(&json!("NAICS")));
        assert!(!fields.contains(&json!("CFDA Number")));
        assert!(payload.get("sort").is_none());
    }

    #[test]
    fn sort_fields_are_validated_per_family() {
        let client = client();
        let search = AwardsSearch::new(&client).loans().unwrap();
        let sorted = search
            .clone()
            .order_by("Loan Value", SortOrder::Desc)
            .unwrap();
        let payload = sorted.build_payload(2).unwrap();
        assert_eq!(payload["sort"], json!("Loan Value"));
        assert_eq!(payload["order"], json!("desc"));

        let err = search.order_by("NAICS", SortOrder::Asc).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Invalid sort field 'NAICS' for loans."));
        assert!(message.contains("Valid fields are:"));
    }

    #[test]
    fn branching_leaves_the_original_untouched() {
        let client = client();
        let base = AwardsSearch::new(&client).grants().unwrap();
        let branched = base
            .clone()
            .with_keywords(vec!["telescope".to_string()])
            .with_limit(5);
        let base_payload = base.build_payload(1).unwrap();
        let branched_payload = branched.build_payload(1).unwrap();
        assert!(base_payload["filters"].get("keywords").is_none());
        assert_eq!(branched_payload["filters"]["keywords"], json!(["telescope"]));
        assert_eq!(base_payload["limit"], json!(100));
        assert_eq!(branched_payload["limit"], json!(5));
    }

    #[test]
    fn rows_classify_by_the_searched_family() {
        let client = client();
        let search = AwardsSearch::new(&client).direct_payments().unwrap();
        let award = search
            .transform(json!({"Award ID": "X", "type": "10"}))
            .unwrap();
        assert_eq!(award.kind(), AwardKind::Grant);
    }
}
