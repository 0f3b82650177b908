//! Entry points from [`Client`] into searches and single-record lookups.

use crate::client::Client;
use crate::errors::Error;
use crate::query::{
    AgenciesAutocomplete, AwardsSearch, FundingSearch, SpendingSearch, SubAwardsSearch,
    TransactionsSearch,
};
use crate::types::{Agency, Award, Recipient, Record};

impl Client {
    /// Starts a prime award search against `spending_by_award`.
    pub fn awards(&self) -> AwardsSearch<'_> {
        AwardsSearch::new(self)
    }

    /// Starts a subaward search against `spending_by_award`.
    pub fn subawards(&self) -> SubAwardsSearch<'_> {
        SubAwardsSearch::new(self)
    }

    /// Starts a transaction listing for a single award.
    pub fn transactions(&self) -> TransactionsSearch<'_> {
        TransactionsSearch::new(self)
    }

    /// Starts a spending-by-category aggregation.
    pub fn spending(&self) -> SpendingSearch<'_> {
        SpendingSearch::new(self)
    }

    /// Starts an agency and office name autocomplete.
    pub fn agencies(&self) -> AgenciesAutocomplete<'_> {
        AgenciesAutocomplete::new(self)
    }

    /// Starts a federal account funding listing for a single award.
    pub fn funding(&self) -> FundingSearch<'_> {
        FundingSearch::new(self)
    }

    /// Fetches a single award by its generated award id.
    ///
    /// The award is returned with its detail record already loaded, so the
    /// category is known up front and accessors resolve without further
    /// requests.
    pub async fn award(&self, award_id: &str) -> Result<Award<'_>, Error> {
        let id = award_id.trim();
        if id.is_empty() {
            return Err(Error::Validation("award_id cannot be empty".to_string()));
        }
        let body = self.get(&format!("/awards/{id}/")).await?;
        Award::from_value(body, Some(self))
    }

    /// Returns a lazy profile for the agency with the given toptier code.
    /// No request is made until a detail field is read.
    pub fn agency(&self, toptier_code: &str) -> Agency<'_> {
        Agency::from_code(toptier_code, Some(self))
    }

    /// Returns a lazy profile for a recipient id or hash.
    /// No request is made until a detail field is read.
    pub fn recipient(&self, recipient_id: &str) -> Recipient<'_> {
        Recipient::new(Record::from_id("recipient_id", recipient_id), Some(self))
    }
}
