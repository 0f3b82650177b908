//! Agency and office autocomplete.

use serde_json::{json, Value};

use crate::client::Client;
use crate::errors::Error;
use crate::query::common::{PagedSearch, SearchCommon};
use crate::types::{Agency, Page, PageMetadata, SubTierAgency};

const SEARCH_TEXT_REQUIRED: &str = "search_text is required. Use with_search_text() method.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Toptier,
    Subtier,
    Office,
}

/// One autocomplete match, at whichever tier the search text matched.
#[derive(Debug, Clone)]
pub enum AgencyMatch<'a> {
    /// A toptier agency, ready for lazy profile access.
    Toptier(Agency<'a>),
    Subtier(SubTierAgency),
    Office(SubTierAgency),
}

impl AgencyMatch<'_> {
    /// Tier label as the API reports it.
    pub fn tier(&self) -> &'static str {
        match self {
            AgencyMatch::Toptier(_) => "toptier_agency",
            AgencyMatch::Subtier(_) => "subtier_agency",
            AgencyMatch::Office(_) => "office",
        }
    }
}

/// Autocomplete over agencies, subtier agencies, and offices.
///
/// The endpoint returns one tiered response rather than pages; results
/// arrive flattened in tier order, and a tier method narrows them.
#[derive(Debug, Clone)]
pub struct AgenciesAutocomplete<'a> {
    client: &'a Client,
    common: SearchCommon,
    search_text: Option<String>,
    tier: Option<Tier>,
}

impl<'a> AgenciesAutocomplete<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self {
            client,
            common: SearchCommon::default(),
            search_text: None,
            tier: None,
        }
    }

    /// Text to match against agency and office names.
    pub fn with_search_text(mut self, search_text: &str) -> Self {
        self.search_text = Some(search_text.to_string());
        self
    }

    /// Only toptier agency matches.
    pub fn toptier(mut self) -> Self {
        self.tier = Some(Tier::Toptier);
        self
    }

    /// Only subtier agency matches.
    pub fn subtier(mut self) -> Self {
        self.tier = Some(Tier::Subtier);
        self
    }

    /// Only office matches.
    pub fn office(mut self) -> Self {
        self.tier = Some(Tier::Office);
        self
    }
}

impl<'a> PagedSearch for AgenciesAutocomplete<'a> {
    type Item = AgencyMatch<'a>;

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
        Ok("/autocomplete/funding_agency_office/".to_string())
    }

    fn build_payload(&self, _page: usize) -> Result<Value, Error> {
        let search_text = self
            .search_text
            .as_deref()
            .ok_or_else(|| Error::Validation(SEARCH_TEXT_REQUIRED.to_string()))?;
        Ok(json!({
            "search_text": search_text,
            "limit": self.common.effective_page_size(),
        }))
    }

    /// Flattens the tiered response into rows tagged with their tier. The
    /// endpoint has no pages, so everything after page one is empty.
    async fn fetch_page(&self, page: usize) -> Result<Page, Error> {
        if page > 1 {
            return Ok(Page::empty());
        }
        let endpoint = self.endpoint()?;
        let payload = self.build_payload(page)?;
        let body = self.client.post(&endpoint, &payload).await?;
        let sections = [
            ("toptier_agency", Tier::Toptier),
            ("subtier_agency", Tier::Subtier),
            ("office", Tier::Office),
        ];
        let mut rows = Vec::new();
        if let Some(results) = body.get("results").and_then(Value::as_object) {
            for (section, tier) in sections {
                if self.tier.is_some_and(|wanted| wanted != tier) {
                    continue;
                }
                if let Some(entries) = results.get(section).and_then(Value::as_array) {
                    for entry in entries {
                        rows.push(json!({"type": section, "data": entry}));
                    }
                }
            }
        }
        Ok(Page {
            results: rows,
            page_metadata: PageMetadata {
                page: 1,
                has_next: false,
            },
        })
    }

    fn transform(&self, row: Value) -> Result<Self::Item, Error> {
        let tier = row
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let data = row.get("data").cloned().unwrap_or(Value::Null);
        match tier.as_str() {
            "toptier_agency" => Ok(AgencyMatch::Toptier(Agency::from_value(
                data,
                Some(self.client),
            )?)),
            "subtier_agency" => Ok(AgencyMatch::Subtier(SubTierAgency::from_value(data)?)),
            "office" => Ok(AgencyMatch::Office(SubTierAgency::from_value(data)?)),
            other => Err(Error::Api {
                message: format!("unknown autocomplete tier: {other}"),
            }),
        }
    }
}
