use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Pagination metadata attached to every search response.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PageMetadata {
    #[serde(default)]
    pub page: i64,
    #[serde(rename = "hasNext", default)]
    pub has_next: bool,
}

/// One page of search results.
///
/// The API reports no absolute total; the only continuation signal is
/// `page_metadata.hasNext`.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Page {
    #[serde(default)]
    pub results: Vec<Value>,
    #[serde(default)]
    pub page_metadata: PageMetadata,
}

impl Page {
    /// An empty page with no continuation, used by single-page endpoints.
    pub fn empty() -> Self {
        Self::default()
    }
}
