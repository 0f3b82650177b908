//! The award entity: classification, identity, and lazily fetched detail
//! fields.

use std::fmt;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::client::Client;
use crate::errors::Error;
use crate::query::{FundingSearch, SubAwardsSearch, TransactionsSearch};
use crate::types::award_types::{category_for_code, AwardTypeGroup};
use crate::types::location::{Location, PeriodOfPerformance};
use crate::types::record::Record;
use crate::types::recipient::Recipient;

/// Family an award belongs to, driving which related records it supports
/// and which detail fields make sense.
///
/// Direct payments and other assistance behave as grants everywhere this
/// crate distinguishes families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AwardKind {
    /// Family could not be determined from the available fields.
    #[default]
    Award,
    Contract,
    Grant,
    Idv,
    Loan,
}

impl AwardKind {
    pub fn supports_subawards(&self) -> bool {
        matches!(self, AwardKind::Contract | AwardKind::Grant)
    }

    fn from_category(category: &str) -> Option<Self> {
        match category.to_ascii_lowercase().as_str() {
            "contract" => Some(AwardKind::Contract),
            "idv" => Some(AwardKind::Idv),
            "grant" | "direct payment" | "other" => Some(AwardKind::Grant),
            "loan" => Some(AwardKind::Loan),
            _ => None,
        }
    }

    fn from_group(group: AwardTypeGroup) -> Self {
        match group {
            AwardTypeGroup::Contracts => AwardKind::Contract,
            AwardTypeGroup::Idvs => AwardKind::Idv,
            AwardTypeGroup::Grants
            | AwardTypeGroup::DirectPayments
            | AwardTypeGroup::OtherAssistance => AwardKind::Grant,
            AwardTypeGroup::Loans => AwardKind::Loan,
        }
    }

    /// Award type group whose subawards this family reports.
    pub(crate) fn subaward_group(&self) -> Option<AwardTypeGroup> {
        match self {
            AwardKind::Contract => Some(AwardTypeGroup::Contracts),
            AwardKind::Grant => Some(AwardTypeGroup::Grants),
            _ => None,
        }
    }
}

impl fmt::Display for AwardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AwardKind::Award => "award",
            AwardKind::Contract => "contract",
            AwardKind::Grant => "grant",
            AwardKind::Idv => "idv",
            AwardKind::Loan => "loan",
        })
    }
}

/// A code paired with its description, as several award fields report them.
/// Some endpoints send a bare code string; both shapes land here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CodedField {
    pub code: Option<String>,
    pub description: Option<String>,
}

impl CodedField {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(code) => Some(Self {
                code: Some(code.clone()),
                description: None,
            }),
            Value::Object(map) => {
                let field = |key: &str| match map.get(key) {
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    _ => None,
                };
                Some(Self {
                    code: field("code"),
                    description: field("description"),
                })
            }
            _ => None,
        }
    }
}

/// A prime award: contract, IDV, grant, loan, or other assistance.
///
/// Constructed from a search row, a detail body, or a bare generated award
/// id. Accessors for fields the source row did not carry fetch the award
/// detail record on first use, at most once per instance; an award without
/// a client never fetches and reports absent fields as `None` or zero.
#[derive(Debug, Clone)]
pub struct Award<'a> {
    record: Record,
    kind: AwardKind,
    client: Option<&'a Client>,
    details_fetched: bool,
}

impl<'a> Award<'a> {
    /// Builds an award from whatever identifies one: a row object or a
    /// generated award id string.
    pub fn from_value(value: Value, client: Option<&'a Client>) -> Result<Self, Error> {
        let record = match value {
            Value::String(id) => Record::from_id("generated_unique_award_id", &id),
            Value::Object(map) => Record::new(map),
            _ => {
                return Err(Error::Validation(
                    "Award factory expects an object or an award id string".to_string(),
                ))
            }
        };
        let kind = record
            .get_str(&["category"])
            .and_then(AwardKind::from_category)
            .or_else(|| {
                record
                    .get_str(&["type"])
                    .and_then(category_for_code)
                    .map(AwardKind::from_group)
            })
            .unwrap_or_default();
        Ok(Self {
            record,
            kind,
            client,
            details_fetched: false,
        })
    }

    /// Builds an award holding only its generated id.
    pub fn from_id(id: &str, client: Option<&'a Client>) -> Self {
        Self {
            record: Record::from_id("generated_unique_award_id", id),
            kind: AwardKind::default(),
            client,
            details_fetched: false,
        }
    }

    pub fn raw(&self) -> &Map<String, Value> {
        self.record.raw()
    }

    pub fn kind(&self) -> AwardKind {
        self.kind
    }

    /// Generated award id, e.g. `CONT_AWD_80NSSC24C0001_8000_-NONE-_-NONE-`.
    pub fn id(&self) -> Option<String> {
        self.record
            .get_string(&["generated_unique_award_id", "generated_internal_id"])
    }

    /// Category string as the row reported it.
    pub fn category(&self) -> Option<&str> {
        self.record.get_str(&["category"])
    }

    pub fn usa_spending_url(&self) -> Option<String> {
        self.id()
            .map(|id| format!("https://www.usaspending.gov/award/{id}/"))
    }

    pub fn supports_subawards(&self) -> bool {
        self.kind.supports_subawards()
    }

    fn attached_client(&self) -> Result<&'a Client, Error> {
        self.client.ok_or_else(|| {
            Error::Validation(
                "Award is not attached to a client; construct it through one to follow related records"
                    .to_string(),
            )
        })
    }

    fn require_id(&self) -> Result<String, Error> {
        self.id()
            .ok_or_else(|| Error::Validation("Award has no generated award id".to_string()))
    }

    /// Search scoped to this award's subawards. Only contracts and grants
    /// report subawards.
    pub fn subawards(&self) -> Result<SubAwardsSearch<'a>, Error> {
        let Some(group) = self.kind.subaward_group() else {
            return Err(Error::Unsupported(format!(
                "Subawards are not available for {} awards",
                self.kind
            )));
        };
        let client = self.attached_client()?;
        let id = self.require_id()?;
        client
            .subawards()
            .for_award(&id)?
            .with_award_types(group.codes().map(str::to_string).collect())
    }

    /// Search over this award's transactions.
    pub fn transactions(&self) -> Result<TransactionsSearch<'a>, Error> {
        let client = self.attached_client()?;
        let id = self.require_id()?;
        client.transactions().for_award(&id)
    }

    /// Search over this award's federal account funding.
    pub fn funding(&self) -> Result<FundingSearch<'a>, Error> {
        let client = self.attached_client()?;
        let id = self.require_id()?;
        client.funding().for_award(&id)
    }

    async fn ensure_details(&mut self, keys: &[&str]) -> Result<(), Error> {
        if self.details_fetched || self.record.has_any(keys) {
            return Ok(());
        }
        let Some(client) = self.client else {
            return Ok(());
        };
        let Some(id) = self.id() else {
            return Ok(());
        };
        let body = client.get(&format!("/awards/{id}/")).await?;
        if let Value::Object(map) = body {
            self.record.merge_missing(map);
        }
        self.details_fetched = true;
        Ok(())
    }

    /// Award number as humans cite it: PIID, FAIN, or URI.
    pub async fn prime_award_id(&mut self) -> Result<String, Error> {
        const KEYS: &[&str] = &["Award ID", "piid", "fain", "uri"];
        self.ensure_details(KEYS).await?;
        Ok(self.record.get_string(KEYS).unwrap_or_default())
    }

    pub async fn description(&mut self) -> Result<Option<String>, Error> {
        const KEYS: &[&str] = &["description", "Description"];
        self.ensure_details(KEYS).await?;
        Ok(self.record.get_string(KEYS))
    }

    pub async fn total_obligations(&mut self) -> Result<Decimal, Error> {
        const KEYS: &[&str] = &["total_obligation", "Award Amount"];
        self.ensure_details(KEYS).await?;
        Ok(self.record.get_money_or_zero(KEYS))
    }

    pub async fn total_outlay(&mut self) -> Result<Decimal, Error> {
        const KEYS: &[&str] = &["total_account_outlay", "Total Outlays"];
        self.ensure_details(KEYS).await?;
        Ok(self.record.get_money_or_zero(KEYS))
    }

    pub async fn award_amount(&mut self) -> Result<Decimal, Error> {
        const KEYS: &[&str] = &["Award Amount", "Loan Amount"];
        self.ensure_details(KEYS).await?;
        Ok(self.record.get_money_or_zero(KEYS))
    }

    pub async fn period_of_performance(&mut self) -> Result<PeriodOfPerformance, Error> {
        let mut trigger = vec!["period_of_performance"];
        trigger.extend_from_slice(PeriodOfPerformance::FLAT_KEYS);
        self.ensure_details(&trigger).await?;
        if let Some(nested) = self.record.get_object(&["period_of_performance"]) {
            return Ok(PeriodOfPerformance::from_map(nested.clone()));
        }
        let mut flat = Map::new();
        for key in PeriodOfPerformance::FLAT_KEYS {
            if let Some(value) = self.record.get(&[key]) {
                flat.insert((*key).to_string(), value.clone());
            }
        }
        Ok(PeriodOfPerformance::from_map(flat))
    }

    pub async fn recipient(&mut self) -> Result<Option<Recipient<'a>>, Error> {
        const KEYS: &[&str] = &[
            "recipient",
            "Recipient Name",
            "Recipient DUNS Number",
            "recipient_id",
        ];
        self.ensure_details(KEYS).await?;
        if let Some(nested) = self.record.get_object(&["recipient"]) {
            return Ok(Some(Recipient::new(
                Record::new(nested.clone()),
                self.client,
            )));
        }
        let fields = [
            ("Recipient Name", "recipient_name"),
            ("Recipient DUNS Number", "recipient_unique_id"),
            ("recipient_id", "recipient_id"),
            ("Recipient Location", "location"),
        ];
        let mut flat = Map::new();
        for (source, target) in fields {
            if let Some(value) = self.record.get(&[source]) {
                flat.insert(target.to_string(), value.clone());
            }
        }
        if flat.is_empty() {
            return Ok(None);
        }
        Ok(Some(Recipient::new(Record::new(flat), self.client)))
    }

    pub async fn place_of_performance(&mut self) -> Result<Option<Location>, Error> {
        self.ensure_details(&["place_of_performance"]).await?;
        Ok(self
            .record
            .get_object(&["place_of_performance"])
            .map(|map| Location::from_map(map.clone())))
    }

    /// Contract award number; contracts and IDVs.
    pub async fn piid(&mut self) -> Result<Option<String>, Error> {
        self.ensure_details(&["piid"]).await?;
        Ok(self.record.get_string(&["piid"]))
    }

    /// Assistance award number; grants, loans, and direct payments.
    pub async fn fain(&mut self) -> Result<Option<String>, Error> {
        self.ensure_details(&["fain"]).await?;
        Ok(self.record.get_string(&["fain"]))
    }

    pub async fn uri(&mut self) -> Result<Option<String>, Error> {
        self.ensure_details(&["uri"]).await?;
        Ok(self.record.get_string(&["uri"]))
    }

    pub async fn contract_award_type(&mut self) -> Result<Option<String>, Error> {
        const KEYS: &[&str] = &["contract_award_type", "Contract Award Type"];
        self.ensure_details(KEYS).await?;
        Ok(self.record.get_string(KEYS))
    }

    pub async fn naics(&mut self) -> Result<Option<CodedField>, Error> {
        const KEYS: &[&str] = &["naics", "NAICS"];
        self.ensure_details(KEYS).await?;
        Ok(self.record.get(KEYS).and_then(CodedField::from_value))
    }

    pub async fn psc(&mut self) -> Result<Option<CodedField>, Error> {
        const KEYS: &[&str] = &["psc", "PSC"];
        self.ensure_details(KEYS).await?;
        Ok(self.record.get(KEYS).and_then(CodedField::from_value))
    }

    pub async fn cfda_number(&mut self) -> Result<Option<String>, Error> {
        const KEYS: &[&str] = &["cfda_number", "CFDA Number"];
        self.ensure_details(KEYS).await?;
        Ok(self.record.get_string(KEYS))
    }

    pub async fn sai_number(&mut self) -> Result<Option<String>, Error> {
        const KEYS: &[&str] = &["sai_number", "SAI Number"];
        self.ensure_details(KEYS).await?;
        Ok(self.record.get_string(KEYS))
    }

    /// Loan subsidy cost; loans only.
    pub async fn total_subsidy_cost(&mut self) -> Result<Option<Decimal>, Error> {
        const KEYS: &[&str] = &["Subsidy Cost", "total_subsidy_cost"];
        self.ensure_details(KEYS).await?;
        Ok(self.record.get_money(KEYS))
    }

    /// Loan face value; loans only.
    pub async fn total_loan_value(&mut self) -> Result<Option<Decimal>, Error> {
        const KEYS: &[&str] = &["Loan Value", "total_loan_value"];
        self.ensure_details(KEYS).await?;
        Ok(self.record.get_money(KEYS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn explicit_category_beats_the_type_code() {
        let award = Award::from_value(
            json!({"category": "grant", "type": "D", "generated_unique_award_id": "ASST_X"}),
            None,
        )
        .unwrap();
        assert_eq!(award.kind(), AwardKind::Grant);
    }

    #[test]
    fn type_codes_classify_when_category_is_absent() {
        let contract = Award::from_value(json!({"type": "B"}), None).unwrap();
        assert_eq!(contract.kind(), AwardKind::Contract);
        let idv = Award::from_value(json!({"type": "IDV_A"}), None).unwrap();
        assert_eq!(idv.kind(), AwardKind::Idv);
        let direct_payment = Award::from_value(json!({"type": "10"}), None).unwrap();
        assert_eq!(direct_payment.kind(), AwardKind::Grant);
        let loan = Award::from_value(json!({"type": "07"}), None).unwrap();
        assert_eq!(loan.kind(), AwardKind::Loan);
        let mystery = Award::from_value(json!({"type": "ZZ"}), None).unwrap();
        assert_eq!(mystery.kind(), AwardKind::Award);
    }

    #[test]
    fn a_bare_id_string_builds_an_unclassified_award() {
        let award = Award::from_value(json!("CONT_AWD_123"), None).unwrap();
        assert_eq!(award.id().as_deref(), Some("CONT_AWD_123"));
        assert_eq!(award.kind(), AwardKind::Award);
        assert_eq!(
            award.usa_spending_url().as_deref(),
            Some("https://www.usaspending.gov/award/CONT_AWD_123/")
        );
    }

    #[test]
    fn the_factory_rejects_other_shapes() {
        assert!(matches!(
            Award::from_value(json!(42), None),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn subawards_are_refused_outside_contracts_and_grants() {
        let idv = Award::from_value(
            json!({"category": "idv", "generated_unique_award_id": "IDV_X"}),
            None,
        )
        .unwrap();
        let err = idv.subawards().unwrap_err();
        assert!(matches!(err, Error::Unsupported(_)));
        assert_eq!(
            err.to_string(),
            "Subawards are not available for idv awards"
        );
    }

    #[tokio::test]
    async fn present_fields_are_served_without_a_fetch() {
        let mut award = Award::from_value(
            json!({
                "category": "contract",
                "Award ID": "80NSSC24C0001",
                "Award Amount": "172213419.67",
                "Recipient Name": "CALIFORNIA INSTITUTE OF TECHNOLOGY"
            }),
            None,
        )
        .unwrap();
        assert_eq!(award.prime_award_id().await.unwrap(), "80NSSC24C0001");
        assert_eq!(
            award.award_amount().await.unwrap(),
            Decimal::new(17_221_341_967, 2)
        );
        let recipient = award.recipient().await.unwrap().unwrap();
        assert_eq!(
            recipient.name(),
            Some("CALIFORNIA INSTITUTE OF TECHNOLOGY")
        );
    }

    #[tokio::test]
    async fn absent_fields_without_a_client_default_quietly() {
        let mut award = Award::from_value(json!({"category": "grant"}), None).unwrap();
        assert_eq!(award.prime_award_id().await.unwrap(), "");
        assert_eq!(award.total_obligations().await.unwrap(), Decimal::ZERO);
        assert!(award.recipient().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn nested_period_of_performance_wins_over_flat_keys() {
        let mut award = Award::from_value(
            json!({
                "period_of_performance": {
                    "start_date": "2024-01-01",
                    "end_date": "2026-12-31"
                },
                "Start Date": "1999-01-01"
            }),
            None,
        )
        .unwrap();
        let period = award.period_of_performance().await.unwrap();
        assert_eq!(
            period.start_date(),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
        );
    }

    #[test]
    fn coded_fields_accept_both_shapes() {
        let nested = CodedField::from_value(&json!({"code": "336414", "description": "GUIDED MISSILE"}));
        assert_eq!(nested.unwrap().code.as_deref(), Some("336414"));
        let bare = CodedField::from_value(&json!("R425")).unwrap();
        assert_eq!(bare.code.as_deref(), Some("R425"));
        assert_eq!(bare.description, None);
    }
}
