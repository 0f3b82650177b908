//! Agency profile with lazily fetched detail fields.

use serde_json::Value;

use crate::client::Client;
use crate::errors::Error;
use crate::types::record::Record;

/// A toptier agency.
///
/// Search and autocomplete rows carry only a few fields; the remaining
/// profile fields are fetched from the agency detail endpoint the first time
/// an accessor needs one of them, at most once per instance. An agency
/// without a client or a toptier code never fetches and reports absent
/// fields as `None`.
#[derive(Debug, Clone)]
pub struct Agency<'a> {
    record: Record,
    client: Option<&'a Client>,
    fiscal_year: Option<i32>,
    details_fetched: bool,
}

impl<'a> Agency<'a> {
    pub(crate) fn from_value(value: Value, client: Option<&'a Client>) -> Result<Self, Error> {
        let record = Record::from_value(value).ok_or_else(|| Error::Api {
            message: "agency row is not an object".to_string(),
        })?;
        Ok(Self {
            record,
            client,
            fiscal_year: None,
            details_fetched: false,
        })
    }

    pub(crate) fn from_code(toptier_code: &str, client: Option<&'a Client>) -> Self {
        Self {
            record: Record::from_id("toptier_code", toptier_code),
            client,
            fiscal_year: None,
            details_fetched: false,
        }
    }

    /// Pins the fiscal year the detail endpoint reports on.
    pub fn for_fiscal_year(mut self, fiscal_year: i32) -> Self {
        self.fiscal_year = Some(fiscal_year);
        self
    }

    pub fn raw(&self) -> &serde_json::Map<String, Value> {
        self.record.raw()
    }

    pub fn toptier_code(&self) -> Option<String> {
        self.record.get_string(&["toptier_code", "code"])
    }

    pub fn code(&self) -> Option<String> {
        self.record.get_string(&["code", "toptier_code"])
    }

    pub fn fiscal_year(&self) -> Option<i32> {
        self.fiscal_year
    }

    async fn ensure_details(&mut self, keys: &[&str]) -> Result<(), Error> {
        if self.details_fetched || self.record.has_any(keys) {
            return Ok(());
        }
        let Some(client) = self.client else {
            return Ok(());
        };
        let Some(code) = self.toptier_code() else {
            return Ok(());
        };
        let endpoint = match self.fiscal_year {
            Some(year) => format!("/agency/{code}/?fiscal_year={year}"),
            None => format!("/agency/{code}/"),
        };
        let body = client.get(&endpoint).await?;
        if let Value::Object(map) = body {
            self.record.merge_missing(map);
        }
        self.details_fetched = true;
        Ok(())
    }

    pub async fn name(&mut self) -> Result<Option<String>, Error> {
        self.ensure_details(&["name"]).await?;
        Ok(self.record.get_string(&["name"]))
    }

    pub async fn abbreviation(&mut self) -> Result<Option<String>, Error> {
        self.ensure_details(&["abbreviation"]).await?;
        Ok(self.record.get_string(&["abbreviation"]))
    }

    pub async fn agency_id(&mut self) -> Result<Option<i64>, Error> {
        self.ensure_details(&["agency_id", "id"]).await?;
        Ok(self.record.get_i64(&["agency_id", "id"]))
    }

    pub async fn mission(&mut self) -> Result<Option<String>, Error> {
        self.ensure_details(&["mission"]).await?;
        Ok(self.record.get_string(&["mission"]))
    }

    pub async fn website(&mut self) -> Result<Option<String>, Error> {
        self.ensure_details(&["website"]).await?;
        Ok(self.record.get_string(&["website"]))
    }

    pub async fn icon_filename(&mut self) -> Result<Option<String>, Error> {
        self.ensure_details(&["icon_filename"]).await?;
        Ok(self.record.get_string(&["icon_filename"]))
    }

    pub async fn congressional_justification_url(&mut self) -> Result<Option<String>, Error> {
        self.ensure_details(&["congressional_justification_url"]).await?;
        Ok(self.record.get_string(&["congressional_justification_url"]))
    }

    pub async fn about_agency_data(&mut self) -> Result<Option<Value>, Error> {
        self.ensure_details(&["about_agency_data"]).await?;
        Ok(self.record.get(&["about_agency_data"]).cloned())
    }

    pub async fn subtier_agency_count(&mut self) -> Result<Option<i64>, Error> {
        self.ensure_details(&["subtier_agency_count"]).await?;
        Ok(self.record.get_i64(&["subtier_agency_count"]))
    }

    /// Informational messages the detail endpoint attaches to the profile.
    pub async fn messages(&mut self) -> Result<Vec<String>, Error> {
        self.ensure_details(&["messages"]).await?;
        let messages = self
            .record
            .get_array(&["messages"])
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(messages)
    }

    /// Disaster Emergency Fund codes the agency has reported against.
    pub async fn def_codes(&mut self) -> Result<Vec<DefCode>, Error> {
        self.ensure_details(&["def_codes"]).await?;
        let codes = self
            .record
            .get_array(&["def_codes"])
            .map(|values| values.iter().filter_map(DefCode::from_value).collect())
            .unwrap_or_default();
        Ok(codes)
    }
}

/// One Disaster Emergency Fund code from an agency profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefCode {
    pub code: String,
    pub public_law: Option<String>,
    pub title: Option<String>,
    pub urls: Option<Vec<String>>,
    pub disaster: Option<String>,
}

impl DefCode {
    fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let code = map.get("code")?.as_str()?.to_string();
        // The API reports `urls` as either one string or a list.
        let urls = map.get("urls").and_then(|urls| match urls {
            Value::String(url) => Some(vec![url.clone()]),
            Value::Array(urls) => Some(
                urls.iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect(),
            ),
            _ => None,
        });
        let field = |key: &str| map.get(key).and_then(Value::as_str).map(str::to_string);
        Some(Self {
            code,
            public_law: field("public_law"),
            title: field("title"),
            urls,
            disaster: field("disaster"),
        })
    }
}

/// A subtier agency or office; all fields arrive with the row.
#[derive(Debug, Clone, PartialEq)]
pub struct SubTierAgency {
    record: Record,
}

impl SubTierAgency {
    pub(crate) fn from_value(value: Value) -> Result<Self, Error> {
        let record = Record::from_value(value).ok_or_else(|| Error::Api {
            message: "subtier agency row is not an object".to_string(),
        })?;
        Ok(Self { record })
    }

    pub fn raw(&self) -> &serde_json::Map<String, Value> {
        self.record.raw()
    }

    pub fn name(&self) -> Option<&str> {
        self.record.get_str(&["name"])
    }

    pub fn code(&self) -> Option<String> {
        self.record.get_string(&["code"])
    }

    pub fn abbreviation(&self) -> Option<&str> {
        self.record.get_str(&["abbreviation"])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn present_fields_never_trigger_a_fetch() {
        let mut agency = Agency::from_value(
            json!({"toptier_code": "080", "name": "NASA", "abbreviation": "NASA"}),
            None,
        )
        .unwrap();
        assert_eq!(agency.name().await.unwrap().as_deref(), Some("NASA"));
        assert_eq!(agency.toptier_code().as_deref(), Some("080"));
    }

    #[tokio::test]
    async fn missing_fields_without_a_client_stay_absent() {
        let mut agency = Agency::from_code("080", None);
        assert_eq!(agency.mission().await.unwrap(), None);
        assert!(agency.def_codes().await.unwrap().is_empty());
    }

    #[test]
    fn def_code_urls_accept_both_shapes() {
        let single = DefCode::from_value(&json!({
            "code": "L",
            "public_law": "Emergency P.L. 116-123",
            "urls": "https://www.congress.gov/116/plaws/publ123/PLAW-116publ123.pdf"
        }))
        .unwrap();
        assert_eq!(single.urls.as_ref().map(Vec::len), Some(1));

        let listed = DefCode::from_value(&json!({
            "code": "M",
            "urls": ["https://example.gov/a", "https://example.gov/b"]
        }))
        .unwrap();
        assert_eq!(listed.urls.as_ref().map(Vec::len), Some(2));
    }

    #[test]
    fn subtier_rows_are_plain_records() {
        let subtier = SubTierAgency::from_value(json!({
            "name": "Kennedy Space Center",
            "code": "80KSC0",
            "abbreviation": "KSC"
        }))
        .unwrap();
        assert_eq!(subtier.name(), Some("Kennedy Space Center"));
        assert_eq!(subtier.code().as_deref(), Some("80KSC0"));
    }
}
