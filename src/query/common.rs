//! Shared search plumbing: paging state, the paged-search contract, and the
//! pull-based iterator over result rows.

use std::fmt;

use serde_json::{Map, Value};

use crate::client::Client;
use crate::errors::Error;
use crate::query::filters::{
    self, AgencyTier, AgencyType, AwardAmount, AwardDateType, Filter, LocationScope, LocationSpec,
    TreasuryAccountComponent,
};
use crate::types::Page;

/// Hard per-page ceiling imposed by the API.
pub(crate) const MAX_PAGE_SIZE: usize = 100;

/// Sort direction for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paging, ordering, and filter state shared by every search builder.
#[derive(Debug, Clone)]
pub struct SearchCommon {
    pub(crate) filters: Vec<Filter>,
    pub(crate) page_size: usize,
    pub(crate) total_limit: Option<usize>,
    pub(crate) max_pages: Option<usize>,
    pub(crate) order_by: Option<String>,
    pub(crate) order_direction: SortOrder,
}

impl Default for SearchCommon {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            page_size: MAX_PAGE_SIZE,
            total_limit: None,
            max_pages: None,
            order_by: None,
            order_direction: SortOrder::default(),
        }
    }
}

impl SearchCommon {
    /// Page size actually sent to the server. Held constant for the whole
    /// run; a per-page value would shift the server's offset arithmetic.
    pub(crate) fn effective_page_size(&self) -> usize {
        match self.total_limit {
            Some(limit) => self.page_size.min(limit),
            None => self.page_size,
        }
    }

    pub(crate) fn aggregated_filters(&self) -> Map<String, Value> {
        filters::aggregate(&self.filters)
    }
}

/// Applies the configured item and page caps to a server-reported total.
pub(crate) fn cap_count(common: &SearchCommon, raw: i64) -> i64 {
    let mut capped = raw.max(0);
    if let Some(limit) = common.total_limit {
        capped = capped.min(limit as i64);
    }
    if let Some(max_pages) = common.max_pages {
        capped = capped.min((max_pages * common.effective_page_size()) as i64);
    }
    capped
}

/// Resolves slice bounds against a known total: negative bounds count from
/// the end, missing bounds open to the full range, and everything clamps to
/// `0..=total`.
pub(crate) fn normalize_slice_bounds(
    start: Option<i64>,
    stop: Option<i64>,
    total: i64,
) -> (i64, i64) {
    let resolve = |bound: Option<i64>, default: i64| match bound {
        None => default,
        Some(b) if b < 0 => (total + b).max(0),
        Some(b) => b.min(total),
    };
    (resolve(start, 0), resolve(stop, total))
}

/// Contract implemented by every search builder.
///
/// Implementations supply the endpoint, the page payload, and the row
/// transformation; the provided methods give every builder the same paging
/// controls and retrieval terminals. Builders are cheap to clone, and every
/// chain method consumes and returns the builder, so branching a query is
/// `query.clone()` followed by further chaining.
#[allow(async_fn_in_trait)]
pub trait PagedSearch: Clone {
    /// Materialized row type.
    type Item;

    fn client(&self) -> &Client;
    fn common(&self) -> &SearchCommon;
    fn common_mut(&mut self) -> &mut SearchCommon;

    /// Path of the search endpoint, relative to the API root.
    fn endpoint(&self) -> Result<String, Error>;

    /// Request body for one page.
    fn build_payload(&self, page: usize) -> Result<Value, Error>;

    /// Materializes one result row.
    fn transform(&self, row: Value) -> Result<Self::Item, Error>;

    /// Fetches one page of results.
    async fn fetch_page(&self, page: usize) -> Result<Page, Error> {
        let endpoint = self.endpoint()?;
        let payload = self.build_payload(page)?;
        let body = self.client().post(&endpoint, &payload).await?;
        serde_json::from_value(body).map_err(|e| Error::Api {
            message: format!("unexpected search response shape: {e}"),
        })
    }

    /// Caps the total number of items the retrieval terminals will return.
    fn with_limit(mut self, limit: usize) -> Self {
        self.common_mut().total_limit = Some(limit);
        self
    }

    /// Rows requested per page, clamped to `1..=100`.
    fn with_page_size(mut self, page_size: usize) -> Self {
        self.common_mut().page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Caps the number of pages fetched.
    fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.common_mut().max_pages = Some(max_pages);
        self
    }

    /// Sort field and direction. Builders with a fixed sort-field list
    /// shadow this with a validating version.
    fn order_by(mut self, field: &str, direction: SortOrder) -> Result<Self, Error> {
        self.common_mut().order_by = Some(field.to_string());
        self.common_mut().order_direction = direction;
        Ok(self)
    }

    /// Lazy iterator over matching rows.
    fn iter(&self) -> PageIter<Self> {
        PageIter::new(self.clone())
    }

    /// Materializes every matching row, honoring the configured caps.
    async fn all(&self) -> Result<Vec<Self::Item>, Error> {
        let mut iter = self.iter();
        let mut items = Vec::new();
        while let Some(item) = iter.try_next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// First matching row, if any. Fetches a single-row page.
    async fn first(&self) -> Result<Option<Self::Item>, Error> {
        let mut iter = PageIter::new(self.clone().with_limit(1));
        iter.try_next().await
    }

    /// Number of matching rows, honoring the configured caps. Walks result
    /// pages; builders with a dedicated count endpoint override this.
    async fn count(&self) -> Result<i64, Error> {
        walk_count(self).await
    }

    /// Random access by index. Negative indexes count from the end. Costs a
    /// count plus one page fetch.
    async fn item(&self, index: i64) -> Result<Self::Item, Error> {
        let total = self.count().await?;
        let resolved = if index < 0 { total + index } else { index };
        if resolved < 0 || resolved >= total {
            return Err(Error::IndexOutOfRange {
                index,
                len: total as usize,
            });
        }
        let page_size = self.common().effective_page_size() as i64;
        let fetched = self.fetch_page((resolved / page_size + 1) as usize).await?;
        let row = fetched
            .results
            .into_iter()
            .nth((resolved % page_size) as usize)
            .ok_or(Error::IndexOutOfRange {
                index,
                len: total as usize,
            })?;
        self.transform(row)
    }

    /// Items from `start` (inclusive) to `stop` (exclusive). Negative bounds
    /// count from the end; `None` leaves the bound open.
    async fn slice(&self, start: Option<i64>, stop: Option<i64>) -> Result<Vec<Self::Item>, Error> {
        self.slice_step(start, stop, 1).await
    }

    /// [`slice`](Self::slice) with a step. Fetches only the pages that hold
    /// selected indexes.
    async fn slice_step(
        &self,
        start: Option<i64>,
        stop: Option<i64>,
        step: i64,
    ) -> Result<Vec<Self::Item>, Error> {
        if step <= 0 {
            return Err(Error::Validation(
                "slice step must be a positive integer".to_string(),
            ));
        }
        // Same-sign bounds that are already inverted cannot select anything,
        // whatever the total turns out to be.
        if let (Some(a), Some(b)) = (start, stop) {
            if (a >= 0) == (b >= 0) && a >= b {
                return Ok(Vec::new());
            }
        }
        let total = self.count().await?;
        let (start, stop) = normalize_slice_bounds(start, stop, total);
        if start >= stop {
            return Ok(Vec::new());
        }
        let page_size = self.common().effective_page_size() as i64;
        let selected = (stop - start + step - 1) / step;
        let last = start + (selected - 1) * step;
        let first_page = start / page_size + 1;
        let last_page = last / page_size + 1;

        let mut items = Vec::with_capacity(selected as usize);
        let mut index = start;
        'pages: for page in first_page..=last_page {
            let page_start = (page - 1) * page_size;
            if index >= page_start + page_size {
                continue;
            }
            let fetched = self.fetch_page(page as usize).await?;
            let mut rows = fetched.results;
            let page_len = rows.len() as i64;
            while index < stop {
                if index < page_start {
                    // A short page ended the data before this index.
                    break 'pages;
                }
                let offset = index - page_start;
                if offset >= page_len {
                    break;
                }
                let row = std::mem::replace(&mut rows[offset as usize], Value::Null);
                items.push(self.transform(row)?);
                index += step;
            }
            if index >= stop {
                break;
            }
        }
        Ok(items)
    }
}

/// Filter chain methods shared by the builders that accept the standard
/// award filter set.
pub trait FilteredSearch: PagedSearch {
    /// Appends a filter to the accumulated set.
    fn push_filter(mut self, filter: Filter) -> Self {
        self.common_mut().filters.push(filter);
        self
    }

    /// Free-text keyword match.
    fn with_keywords(self, keywords: Vec<String>) -> Self {
        self.push_filter(Filter::Keywords { values: keywords })
    }

    /// Restricts results to a date range, both dates `YYYY-MM-DD`.
    fn in_time_period(
        self,
        start_date: &str,
        end_date: &str,
        date_type: Option<AwardDateType>,
    ) -> Result<Self, Error> {
        let start = filters::parse_wire_date(start_date, "start_date")?;
        let end = filters::parse_wire_date(end_date, "end_date")?;
        Ok(self.push_filter(Filter::time_period(start, end, date_type)?))
    }

    /// Restricts results to one US federal fiscal year.
    fn for_fiscal_year(self, year: i32) -> Result<Self, Error> {
        let (start, end) = filters::fiscal_year_bounds(year)?;
        Ok(self.push_filter(Filter::time_period(start, end, None)?))
    }

    fn with_place_of_performance_scope(self, scope: LocationScope) -> Self {
        self.push_filter(Filter::PlaceOfPerformanceScope { scope })
    }

    fn with_recipient_scope(self, scope: LocationScope) -> Self {
        self.push_filter(Filter::RecipientScope { scope })
    }

    fn with_place_of_performance_locations(self, locations: Vec<LocationSpec>) -> Self {
        self.push_filter(Filter::PlaceOfPerformanceLocations { locations })
    }

    fn with_recipient_locations(self, locations: Vec<LocationSpec>) -> Self {
        self.push_filter(Filter::RecipientLocations { locations })
    }

    /// Filters to the named awarding toptier agency.
    fn for_agency(self, name: &str) -> Self {
        self.for_agency_tiered(AgencyType::Awarding, AgencyTier::Toptier, name, None)
    }

    /// Agency filter with explicit type and tier. `toptier_name`
    /// disambiguates subtier names shared across departments.
    fn for_agency_tiered(
        self,
        agency_type: AgencyType,
        tier: AgencyTier,
        name: &str,
        toptier_name: Option<&str>,
    ) -> Self {
        self.push_filter(Filter::Agency {
            agency_type,
            tier,
            name: name.to_string(),
            toptier_name: toptier_name.map(str::to_string),
        })
    }

    /// Recipient name or UEI/DUNS search terms.
    fn with_recipient_search_text(self, terms: Vec<String>) -> Self {
        self.push_filter(Filter::SimpleList {
            key: "recipient_search_text",
            values: terms,
        })
    }

    fn with_recipient_types(self, type_names: Vec<String>) -> Self {
        self.push_filter(Filter::SimpleList {
            key: "recipient_type_names",
            values: type_names,
        })
    }

    fn with_award_ids(self, award_ids: Vec<String>) -> Self {
        self.push_filter(Filter::SimpleList {
            key: "award_ids",
            values: award_ids,
        })
    }

    fn with_award_amounts(self, amounts: Vec<AwardAmount>) -> Self {
        self.push_filter(Filter::AwardAmounts { amounts })
    }

    /// Assistance listing (CFDA) numbers, e.g. `43.008`.
    fn with_cfda_numbers(self, numbers: Vec<String>) -> Self {
        self.push_filter(Filter::SimpleList {
            key: "program_numbers",
            values: numbers,
        })
    }

    /// NAICS codes to require and exclude.
    fn with_naics_codes(self, require: Vec<String>, exclude: Vec<String>) -> Self {
        self.push_filter(Filter::TieredCodes {
            key: "naics_codes",
            require: require.into_iter().map(|code| vec![code]).collect(),
            exclude: exclude.into_iter().map(|code| vec![code]).collect(),
        })
    }

    /// PSC code paths to require and exclude, each a path from the root of
    /// the PSC tree, e.g. `["Service", "B", "B5"]`.
    fn with_psc_codes(self, require: Vec<Vec<String>>, exclude: Vec<Vec<String>>) -> Self {
        self.push_filter(Filter::TieredCodes {
            key: "psc_codes",
            require,
            exclude,
        })
    }

    /// TAS code paths to require and exclude.
    fn with_tas_codes(self, require: Vec<Vec<String>>, exclude: Vec<Vec<String>>) -> Self {
        self.push_filter(Filter::TieredCodes {
            key: "tas_codes",
            require,
            exclude,
        })
    }

    fn with_treasury_account_components(self, components: Vec<TreasuryAccountComponent>) -> Self {
        self.push_filter(Filter::TreasuryAccountComponents { components })
    }

    fn with_contract_pricing_types(self, codes: Vec<String>) -> Self {
        self.push_filter(Filter::SimpleList {
            key: "contract_pricing_type_codes",
            values: codes,
        })
    }

    fn with_set_aside_types(self, codes: Vec<String>) -> Self {
        self.push_filter(Filter::SimpleList {
            key: "set_aside_type_codes",
            values: codes,
        })
    }

    fn with_extent_competed_types(self, codes: Vec<String>) -> Self {
        self.push_filter(Filter::SimpleList {
            key: "extent_competed_type_codes",
            values: codes,
        })
    }

    /// Disaster Emergency Fund codes, e.g. `L` through `P` for COVID-19.
    fn with_def_codes(self, codes: Vec<String>) -> Self {
        self.push_filter(Filter::SimpleList {
            key: "def_codes",
            values: codes,
        })
    }
}

/// Counts rows by walking result pages, honoring the item and page caps.
/// Fallback for searches without a dedicated count endpoint.
pub(crate) async fn walk_count<S: PagedSearch>(search: &S) -> Result<i64, Error> {
    let limit = search.common().total_limit;
    let mut total = 0usize;
    let mut pages_fetched = 0usize;
    let mut page = 1usize;
    loop {
        if let Some(limit) = limit {
            if total >= limit {
                total = limit;
                break;
            }
        }
        if let Some(max_pages) = search.common().max_pages {
            if pages_fetched >= max_pages {
                break;
            }
        }
        let fetched = search.fetch_page(page).await?;
        pages_fetched += 1;
        if fetched.results.is_empty() {
            break;
        }
        total += match limit {
            Some(limit) => fetched.results.len().min(limit - total),
            None => fetched.results.len(),
        };
        if !fetched.page_metadata.has_next {
            break;
        }
        page += 1;
    }
    Ok(total as i64)
}

/// Pull-based iterator over result rows.
///
/// Fetches one page at a time, on demand, and stops at the configured item
/// and page caps or at the server's end of results.
#[derive(Debug)]
pub struct PageIter<S: PagedSearch> {
    search: S,
    next_page: usize,
    pages_fetched: usize,
    items_yielded: usize,
    buffer: Vec<Value>,
    cursor: usize,
    has_next: bool,
    started: bool,
    finished: bool,
}

impl<S: PagedSearch> PageIter<S> {
    pub(crate) fn new(search: S) -> Self {
        Self {
            search,
            next_page: 1,
            pages_fetched: 0,
            items_yielded: 0,
            buffer: Vec::new(),
            cursor: 0,
            has_next: false,
            started: false,
            finished: false,
        }
    }

    /// Next row, or `None` once the query is exhausted.
    pub async fn try_next(&mut self) -> Result<Option<S::Item>, Error> {
        loop {
            if self.finished {
                return Ok(None);
            }
            if let Some(limit) = self.search.common().total_limit {
                if self.items_yielded >= limit {
                    self.finished = true;
                    return Ok(None);
                }
            }
            if self.cursor < self.buffer.len() {
                let row = std::mem::replace(&mut self.buffer[self.cursor], Value::Null);
                self.cursor += 1;
                self.items_yielded += 1;
                return self.search.transform(row).map(Some);
            }
            if self.started && !self.has_next {
                self.finished = true;
                return Ok(None);
            }
            if let Some(max_pages) = self.search.common().max_pages {
                if self.pages_fetched >= max_pages {
                    self.finished = true;
                    return Ok(None);
                }
            }
            let page = self.search.fetch_page(self.next_page).await?;
            self.started = true;
            self.pages_fetched += 1;
            self.next_page += 1;
            self.has_next = page.page_metadata.has_next;
            if page.results.is_empty() {
                self.finished = true;
                return Ok(None);
            }
            self.buffer = page.results;
            self.cursor = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_the_maximum_page_size() {
        let common = SearchCommon::default();
        assert_eq!(common.page_size, 100);
        assert_eq!(common.total_limit, None);
        assert_eq!(common.order_direction, SortOrder::Desc);
    }

    #[test]
    fn effective_page_size_respects_the_limit() {
        let mut common = SearchCommon::default();
        assert_eq!(common.effective_page_size(), 100);
        common.total_limit = Some(10);
        assert_eq!(common.effective_page_size(), 10);
        common.page_size = 5;
        assert_eq!(common.effective_page_size(), 5);
    }

    #[test]
    fn cap_count_applies_both_caps() {
        let mut common = SearchCommon::default();
        assert_eq!(cap_count(&common, 12345), 12345);
        common.total_limit = Some(500);
        assert_eq!(cap_count(&common, 12345), 500);
        common.total_limit = None;
        common.max_pages = Some(2);
        assert_eq!(cap_count(&common, 12345), 200);
        assert_eq!(cap_count(&common, -3), 0);
    }

    #[test]
    fn slice_bounds_clamp_and_count_from_the_end() {
        assert_eq!(normalize_slice_bounds(None, None, 250), (0, 250));
        assert_eq!(normalize_slice_bounds(Some(95), Some(105), 250), (95, 105));
        assert_eq!(normalize_slice_bounds(Some(-10), None, 250), (240, 250));
        assert_eq!(normalize_slice_bounds(Some(-500), Some(500), 250), (0, 250));
        assert_eq!(normalize_slice_bounds(Some(200), Some(100), 250), (200, 100));
    }
}
