//! Federal account funding listing for one award.

use serde_json::{json, Value};

use crate::client::Client;
use crate::errors::Error;
use crate::query::common::{PagedSearch, SearchCommon, SortOrder};
use crate::types::Funding;

const AWARD_ID_REQUIRED: &str = "An award_id is required. Use the .for_award() method.";

/// Sort fields the endpoint accepts.
const VALID_SORT_FIELDS: &[&str] = &[
    "account_title",
    "awarding_agency_name",
    "disaster_emergency_fund_code",
    "federal_account",
    "funding_agency_name",
    "gross_outlay_amount",
    "object_class",
    "program_activity",
    "reporting_fiscal_date",
    "transaction_obligated_amount",
];

/// Maps a sort field to the name the endpoint wants, accepting both the
/// endpoint names and the shorter names people reach for.
fn resolve_sort_field(field: &str) -> Option<&'static str> {
    let resolved = match field.to_ascii_lowercase().as_str() {
        "account_title" => "account_title",
        "awarding_agency" | "awarding_agency_name" => "awarding_agency_name",
        "disaster_code" | "disaster_emergency_fund_code" => "disaster_emergency_fund_code",
        "federal_account" => "federal_account",
        "funding_agency" | "funding_agency_name" => "funding_agency_name",
        "gross_outlay" | "gross_outlay_amount" => "gross_outlay_amount",
        "object_class" => "object_class",
        "program_activity" => "program_activity",
        "reporting_date" | "fiscal_date" | "reporting_fiscal_date" => "reporting_fiscal_date",
        "obligated_amount" | "obligation" | "transaction_obligated_amount" => {
            "transaction_obligated_amount"
        }
        _ => return None,
    };
    Some(resolved)
}

/// Search over the federal account funding of one award.
///
/// The endpoint always sorts; without an explicit choice it sorts by
/// reporting fiscal date, newest first.
#[derive(Debug, Clone)]
pub struct FundingSearch<'a> {
    client: &'a Client,
    common: SearchCommon,
    award_id: Option<String>,
}

impl<'a> FundingSearch<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            common: SearchCommon::default(),
            award_id: None,
        }
    }

    /// Selects the award whose funding to list, by generated award id.
    pub fn for_award(mut self, award_id: &str) -> Result<Self, Error> {
        let trimmed = award_id.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("award_id cannot be empty".to_string()));
        }
        self.award_id = Some(trimmed.to_string());
        Ok(self)
    }
}

impl<'a> PagedSearch for FundingSearch<'a> {
    type Item = Funding;

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
        Ok("/awards/funding/".to_string())
    }

    fn build_payload(&self, page: usize) -> Result<Value, Error> {
        let award_id = self
            .award_id
            .as_deref()
            .ok_or_else(|| Error::Validation(AWARD_ID_REQUIRED.to_string()))?;
        let sort = self
            .common
            .order_by
            .as_deref()
            .unwrap_or("reporting_fiscal_date");
        Ok(json!({
            "award_id": award_id,
            "limit": self.common.effective_page_size(),
            "page": page,
            "sort": sort,
            "order": self.common.order_direction.as_str(),
        }))
    }

    fn order_by(mut self, field: &str, direction: SortOrder) -> Result<Self, Error> {
        let resolved = resolve_sort_field(field).ok_or_else(|| {
            Error::Validation(format!(
                "Invalid sort field: {field}. Valid fields are: {}",
                VALID_SORT_FIELDS.join(", ")
            ))
        })?;
        self.common.order_by = Some(resolved.to_string());
        self.common.order_direction = direction;
        Ok(self)
    }

    fn transform(&self, row: Value) -> Result<Self::Item, Error> {
        Funding::from_value(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn an_award_id_is_required() {
        let client = Client::new();
        let err = FundingSearch::new(&client).build_payload(1).unwrap_err();
        assert_eq!(
            err.to_string(),
            "An award_id is required. Use the .for_award() method."
        );
    }

    #[test]
    fn the_default_sort_is_reporting_fiscal_date_descending() {
        let client = Client::new();
        let payload = FundingSearch::new(&client)
            .for_award("CONT_AWD_123")
            .unwrap()
            .build_payload(1)
            .unwrap();
        assert_eq!(payload["sort"], json!("reporting_fiscal_date"));
        assert_eq!(payload["order"], json!("desc"));
    }

    #[test]
    fn friendly_sort_names_resolve_to_endpoint_names() {
        let client = Client::new();
        let payload = FundingSearch::new(&client)
            .for_award("CONT_AWD_123")
            .unwrap()
            .order_by("gross_outlay", SortOrder::Asc)
            .unwrap()
            .build_payload(2)
            .unwrap();
        assert_eq!(payload["sort"], json!("gross_outlay_amount"));
        assert_eq!(payload["order"], json!("asc"));
    }

    #[test]
    fn unknown_sort_fields_are_rejected() {
        let client = Client::new();
        let err = FundingSearch::new(&client)
            .for_award("CONT_AWD_123")
            .unwrap()
            .order_by("color", SortOrder::Asc)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Invalid sort field: color."));
        assert!(message.contains("reporting_fiscal_date"));
    }
}
