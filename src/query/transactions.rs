//! Transaction listing for one award.

use serde_json::{json, Map, Value};

use crate::client::Client;
use crate::errors::Error;
use crate::query::common::{cap_count, FilteredSearch, PagedSearch, SearchCommon};
use crate::types::Transaction;

const AWARD_ID_REQUIRED: &str = "An award_id is required. Use the .for_award() method.";

/// Search over the transactions of one award.
#[derive(Debug, Clone)]
pub struct TransactionsSearch<'a> {
    client: &'a Client,
    common: SearchCommon,
    award_id: Option<String>,
}

impl<'a> TransactionsSearch<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            common: SearchCommon::default(),
            award_id: None,
        }
    }

    /// Selects the award whose transactions to list, by generated award id.
    pub fn for_award(mut self, award_id: &str) -> Result<Self, Error> {
        let trimmed = award_id.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation("award_id cannot be empty".to_string()));
        }
        self.award_id = Some(trimmed.to_string());
        Ok(self)
    }

    fn require_award_id(&self) -> Result<&str, Error> {
        self.award_id
            .as_deref()
            .ok_or_else(|| Error::Validation(AWARD_ID_REQUIRED.to_string()))
    }
}

impl<'a> PagedSearch for TransactionsSearch<'a> {
    type Item = Transaction;

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
        Ok("/transactions/".to_string())
    }

    /// This endpoint takes filter fragments at the top level of the body,
    /// not under a `filters` key.
    fn build_payload(&self, page: usize) -> Result<Value, Error> {
        let award_id = self.require_award_id()?;
        let mut payload = Map::new();
        payload.insert("award_id".to_string(), json!(award_id));
        payload.insert("limit".to_string(), json!(self.common.effective_page_size()));
        payload.insert("page".to_string(), json!(page));
        if let Some(order_by) = &self.common.order_by {
            payload.insert("sort".to_string(), json!(order_by));
            payload.insert(
                "order".to_string(),
                json!(self.common.order_direction.as_str()),
            );
        }
        for (key, value) in self.common.aggregated_filters() {
            payload.insert(key, value);
        }
        Ok(Value::Object(payload))
    }

    fn transform(&self, row: Value) -> Result<Self::Item, Error> {
        Transaction::from_value(row)
    }

    /// Count from the dedicated per-award endpoint, capped by the
    /// configured limits.
    async fn count(&self) -> Result<i64, Error> {
        let award_id = self.require_award_id()?;
        let body = self
            .client
            .get(&format!("/awards/count/transaction/{award_id}/"))
            .await?;
        let raw = body
            .get("transactions")
            .and_then(Value::as_i64)
            .unwrap_or(0);
        Ok(cap_count(&self.common, raw))
    }
}

impl FilteredSearch for TransactionsSearch<'_> {}
