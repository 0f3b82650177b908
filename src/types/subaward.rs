//! A subaward reported under a prime contract or grant.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::errors::Error;
use crate::types::location::Location;
use crate::types::record::Record;

/// One row from a subaward search.
///
/// The API reports subaward rows under display-name keys such as
/// `Sub-Awardee Name`; accessors hide that.
#[derive(Debug, Clone, PartialEq)]
pub struct SubAward {
    record: Record,
}

impl SubAward {
    pub(crate) fn from_value(value: Value) -> Result<Self, Error> {
        let record = Record::from_value(value).ok_or_else(|| Error::Api {
            message: "subaward row is not an object".to_string(),
        })?;
        Ok(Self { record })
    }

    pub fn raw(&self) -> &serde_json::Map<String, Value> {
        self.record.raw()
    }

    /// Internal row identifier.
    pub fn id(&self) -> Option<String> {
        self.record.get_string(&["internal_id"])
    }

    /// Subaward number assigned by the prime awardee, e.g. `SUB-2024-001`.
    pub fn sub_award_id(&self) -> Option<String> {
        self.record.get_string(&["Sub-Award ID"])
    }

    /// `sub-contract` or `sub-grant`.
    pub fn sub_award_type(&self) -> Option<&str> {
        self.record.get_str(&["Sub-Award Type"])
    }

    /// Subawardee name exactly as reported.
    pub fn sub_awardee_name(&self) -> Option<&str> {
        self.record.get_str(&["Sub-Awardee Name"])
    }

    pub fn sub_award_date(&self) -> Option<NaiveDate> {
        self.record.get_date(&["Sub-Award Date"])
    }

    pub fn sub_award_amount(&self) -> Option<Decimal> {
        self.record.get_money(&["Sub-Award Amount"])
    }

    pub fn description(&self) -> Option<&str> {
        self.record.get_str(&["Sub-Award Description"])
    }

    pub fn awarding_agency(&self) -> Option<&str> {
        self.record.get_str(&["Awarding Agency"])
    }

    pub fn awarding_sub_agency(&self) -> Option<&str> {
        self.record.get_str(&["Awarding Sub Agency"])
    }

    pub fn prime_award_id(&self) -> Option<String> {
        self.record.get_string(&["Prime Award ID"])
    }

    pub fn prime_recipient_name(&self) -> Option<&str> {
        self.record.get_str(&["Prime Recipient Name"])
    }

    pub fn prime_award_recipient_id(&self) -> Option<String> {
        self.record.get_string(&["prime_award_recipient_id"])
    }

    pub fn sub_recipient_uei(&self) -> Option<&str> {
        self.record.get_str(&["Sub-Recipient UEI"])
    }

    pub fn prime_award_recipient_uei(&self) -> Option<&str> {
        self.record.get_str(&["Prime Award Recipient UEI"])
    }

    /// Generated identifier of the prime award, usable with the award
    /// detail endpoint.
    pub fn prime_award_generated_internal_id(&self) -> Option<String> {
        self.record.get_string(&["prime_award_generated_internal_id"])
    }

    pub fn prime_award_internal_id(&self) -> Option<i64> {
        self.record.get_i64(&["prime_award_internal_id"])
    }

    /// NAICS code; contract subawards only.
    pub fn naics(&self) -> Option<String> {
        self.record.get_string(&["NAICS"])
    }

    /// PSC code; contract subawards only.
    pub fn psc(&self) -> Option<String> {
        self.record.get_string(&["PSC"])
    }

    /// Assistance listing; grant subawards only.
    pub fn assistance_listing(&self) -> Option<String> {
        self.record.get_string(&["Assistance Listing"])
    }

    pub fn sub_recipient_location(&self) -> Option<Location> {
        self.record
            .get_object(&["Sub-Recipient Location"])
            .map(|map| Location::from_map(map.clone()))
    }

    pub fn place_of_performance(&self) -> Option<Location> {
        self.record
            .get_object(&["Sub-Award Primary Place of Performance"])
            .map(|map| Location::from_map(map.clone()))
    }

    /// Alias for [`sub_awardee_name`](Self::sub_awardee_name).
    pub fn name(&self) -> Option<&str> {
        self.sub_awardee_name()
    }

    /// Alias for [`sub_award_amount`](Self::sub_award_amount).
    pub fn amount(&self) -> Option<Decimal> {
        self.sub_award_amount()
    }
}
