//! Federal account funding rows for an award.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::errors::Error;
use crate::types::record::Record;

/// One row from the award funding listing: an obligation or outlay reported
/// by a federal account against the award in one submission period.
#[derive(Debug, Clone, PartialEq)]
pub struct Funding {
    record: Record,
}

impl Funding {
    pub(crate) fn from_value(value: Value) -> Result<Self, Error> {
        let record = Record::from_value(value).ok_or_else(|| Error::Api {
            message: "funding row is not an object".to_string(),
        })?;
        Ok(Self { record })
    }

    pub fn raw(&self) -> &serde_json::Map<String, Value> {
        self.record.raw()
    }

    pub fn reporting_fiscal_year(&self) -> Option<i64> {
        self.record.get_i64(&["reporting_fiscal_year"])
    }

    pub fn reporting_fiscal_quarter(&self) -> Option<i64> {
        self.record.get_i64(&["reporting_fiscal_quarter"])
    }

    pub fn reporting_fiscal_month(&self) -> Option<i64> {
        self.record.get_i64(&["reporting_fiscal_month"])
    }

    pub fn is_quarterly_submission(&self) -> Option<bool> {
        self.record.get_bool(&["is_quarterly_submission"])
    }

    pub fn disaster_emergency_fund_code(&self) -> Option<String> {
        self.record.get_string(&["disaster_emergency_fund_code"])
    }

    /// Federal account number, e.g. `080-0122`.
    pub fn federal_account(&self) -> Option<String> {
        self.record.get_string(&["federal_account"])
    }

    pub fn account_title(&self) -> Option<&str> {
        self.record.get_str(&["account_title"])
    }

    pub fn funding_agency_name(&self) -> Option<&str> {
        self.record.get_str(&["funding_agency_name"])
    }

    pub fn funding_agency_id(&self) -> Option<i64> {
        self.record.get_i64(&["funding_agency_id"])
    }

    pub fn awarding_agency_name(&self) -> Option<&str> {
        self.record.get_str(&["awarding_agency_name"])
    }

    pub fn awarding_agency_id(&self) -> Option<i64> {
        self.record.get_i64(&["awarding_agency_id"])
    }

    pub fn object_class(&self) -> Option<String> {
        self.record.get_string(&["object_class"])
    }

    pub fn object_class_name(&self) -> Option<&str> {
        self.record.get_str(&["object_class_name"])
    }

    pub fn program_activity_code(&self) -> Option<String> {
        self.record.get_string(&["program_activity_code"])
    }

    pub fn program_activity_name(&self) -> Option<&str> {
        self.record.get_str(&["program_activity_name"])
    }

    pub fn transaction_obligated_amount(&self) -> Option<Decimal> {
        self.record.get_money(&["transaction_obligated_amount"])
    }

    pub fn gross_outlay_amount(&self) -> Option<Decimal> {
        self.record.get_money(&["gross_outlay_amount"])
    }

    /// Alias for
    /// [`transaction_obligated_amount`](Self::transaction_obligated_amount).
    pub fn amount(&self) -> Option<Decimal> {
        self.transaction_obligated_amount()
    }
}
