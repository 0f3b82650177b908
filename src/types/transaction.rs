//! A single transaction (modification) recorded against an award.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::errors::Error;
use crate::types::record::Record;

/// One row from the transactions listing for an award.
///
/// All fields arrive with the listing; nothing is fetched lazily.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    record: Record,
}

impl Transaction {
    pub(crate) fn from_value(value: Value) -> Result<Self, Error> {
        let record = Record::from_value(value).ok_or_else(|| Error::Api {
            message: "transaction row is not an object".to_string(),
        })?;
        Ok(Self { record })
    }

    pub fn raw(&self) -> &serde_json::Map<String, Value> {
        self.record.raw()
    }

    pub fn id(&self) -> Option<String> {
        self.record.get_string(&["id", "internal_id"])
    }

    /// Transaction type code, e.g. `A` for a BPA call.
    pub fn transaction_type(&self) -> Option<&str> {
        self.record.get_str(&["type"])
    }

    pub fn type_description(&self) -> Option<&str> {
        self.record.get_str(&["type_description"])
    }

    pub fn action_date(&self) -> Option<NaiveDate> {
        self.record.get_date(&["action_date"])
    }

    pub fn action_type(&self) -> Option<&str> {
        self.record.get_str(&["action_type"])
    }

    pub fn action_type_description(&self) -> Option<&str> {
        self.record.get_str(&["action_type_description"])
    }

    pub fn modification_number(&self) -> Option<String> {
        self.record.get_string(&["modification_number"])
    }

    pub fn description(&self) -> Option<&str> {
        self.record.get_str(&["description"])
    }

    pub fn cfda_number(&self) -> Option<String> {
        self.record.get_string(&["cfda_number"])
    }

    pub fn federal_action_obligation(&self) -> Option<Decimal> {
        self.record.get_money(&["federal_action_obligation"])
    }

    pub fn face_value_loan_guarantee(&self) -> Option<Decimal> {
        self.record.get_money(&["face_value_loan_guarantee"])
    }

    pub fn original_loan_subsidy_cost(&self) -> Option<Decimal> {
        self.record.get_money(&["original_loan_subsidy_cost"])
    }

    /// Dollar value of the transaction, whichever measure applies: the
    /// obligation for contracts and grants, the face value or subsidy cost
    /// for loans.
    pub fn amount(&self) -> Option<Decimal> {
        self.federal_action_obligation()
            .or_else(|| self.face_value_loan_guarantee())
            .or_else(|| self.original_loan_subsidy_cost())
    }
}
