//! Filter value objects serialized into search payloads.
//!
//! Each filter owns validation of its inputs and a pure mapping to its wire
//! fragment. Filters never touch the network; builders accumulate them and
//! merge the fragments into one `filters` object at payload time.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::errors::Error;

/// Whether an agency filter targets the awarding or the funding agency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgencyType {
    Awarding,
    Funding,
}

impl fmt::Display for AgencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AgencyType::Awarding => "awarding",
            AgencyType::Funding => "funding",
        })
    }
}

impl FromStr for AgencyType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "awarding" => Ok(AgencyType::Awarding),
            "funding" => Ok(AgencyType::Funding),
            _ => Err(Error::Validation(format!(
                "Invalid agency type: '{s}'. Must be 'awarding' or 'funding'."
            ))),
        }
    }
}

/// Agency hierarchy level an agency filter addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgencyTier {
    Toptier,
    Subtier,
}

impl fmt::Display for AgencyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AgencyTier::Toptier => "toptier",
            AgencyTier::Subtier => "subtier",
        })
    }
}

impl FromStr for AgencyTier {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "toptier" => Ok(AgencyTier::Toptier),
            "subtier" => Ok(AgencyTier::Subtier),
            _ => Err(Error::Validation(format!(
                "Invalid agency tier: '{s}'. Must be 'toptier' or 'subtier'."
            ))),
        }
    }
}

/// Domestic/foreign scope for location filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationScope {
    Domestic,
    Foreign,
}

impl fmt::Display for LocationScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LocationScope::Domestic => "domestic",
            LocationScope::Foreign => "foreign",
        })
    }
}

impl FromStr for LocationScope {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "domestic" => Ok(LocationScope::Domestic),
            "foreign" => Ok(LocationScope::Foreign),
            _ => Err(Error::Validation(format!(
                "Invalid location scope: '{s}'. Must be 'domestic' or 'foreign'."
            ))),
        }
    }
}

/// Which award date a time-period filter constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwardDateType {
    ActionDate,
    DateSigned,
    LastModified,
    NewAwardsOnly,
}

impl fmt::Display for AwardDateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AwardDateType::ActionDate => "action_date",
            AwardDateType::DateSigned => "date_signed",
            AwardDateType::LastModified => "last_modified_date",
            AwardDateType::NewAwardsOnly => "new_awards_only",
        })
    }
}

impl FromStr for AwardDateType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "action_date" => Ok(AwardDateType::ActionDate),
            "date_signed" => Ok(AwardDateType::DateSigned),
            "last_modified" | "last_modified_date" => Ok(AwardDateType::LastModified),
            "new_awards_only" => Ok(AwardDateType::NewAwardsOnly),
            _ => Err(Error::Validation(format!(
                "Invalid award date type: '{s}'. Must be one of 'action_date', \
                 'date_signed', 'last_modified_date', 'new_awards_only'."
            ))),
        }
    }
}

/// A location constraint for place-of-performance or recipient filters.
///
/// Only `country_code` is required; everything else narrows the match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocationSpec {
    pub country_code: String,
    pub state_code: Option<String>,
    pub county_code: Option<String>,
    pub city_name: Option<String>,
    pub district_original: Option<String>,
    pub district_current: Option<String>,
    pub zip_code: Option<String>,
}

impl LocationSpec {
    pub fn new(country_code: &str) -> Self {
        Self {
            country_code: country_code.to_string(),
            ..Self::default()
        }
    }

    pub fn with_state(mut self, state_code: &str) -> Self {
        self.state_code = Some(state_code.to_string());
        self
    }

    pub fn with_county(mut self, county_code: &str) -> Self {
        self.county_code = Some(county_code.to_string());
        self
    }

    pub fn with_city(mut self, city_name: &str) -> Self {
        self.city_name = Some(city_name.to_string());
        self
    }

    pub fn with_district_original(mut self, district: &str) -> Self {
        self.district_original = Some(district.to_string());
        self
    }

    pub fn with_district_current(mut self, district: &str) -> Self {
        self.district_current = Some(district.to_string());
        self
    }

    pub fn with_zip(mut self, zip_code: &str) -> Self {
        self.zip_code = Some(zip_code.to_string());
        self
    }

    /// Wire object with only the populated fields.
    pub(crate) fn to_value(&self) -> Value {
        let mut map = Map::new();
        let fields = [
            ("country", Some(&self.country_code)),
            ("state", self.state_code.as_ref()),
            ("county", self.county_code.as_ref()),
            ("city", self.city_name.as_ref()),
            ("district_original", self.district_original.as_ref()),
            ("district_current", self.district_current.as_ref()),
            ("zip", self.zip_code.as_ref()),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                if !value.is_empty() {
                    map.insert(key.to_string(), json!(value));
                }
            }
        }
        Value::Object(map)
    }
}

/// An award amount range; either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AwardAmount {
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

impl AwardAmount {
    pub fn at_least(lower_bound: f64) -> Self {
        Self {
            lower_bound: Some(lower_bound),
            upper_bound: None,
        }
    }

    pub fn at_most(upper_bound: f64) -> Self {
        Self {
            lower_bound: None,
            upper_bound: Some(upper_bound),
        }
    }

    pub fn between(lower_bound: f64, upper_bound: f64) -> Self {
        Self {
            lower_bound: Some(lower_bound),
            upper_bound: Some(upper_bound),
        }
    }

    fn to_value(&self) -> Option<Value> {
        if self.lower_bound.is_none() && self.upper_bound.is_none() {
            return None;
        }
        let mut map = Map::new();
        if let Some(lower) = self.lower_bound {
            map.insert("lower_bound".to_string(), json!(lower));
        }
        if let Some(upper) = self.upper_bound {
            map.insert("upper_bound".to_string(), json!(upper));
        }
        Some(Value::Object(map))
    }
}

/// Treasury Account Symbol components. `aid` and `main` are required by the
/// API; the rest narrow the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreasuryAccountComponent {
    pub aid: String,
    pub main: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ata: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bpoa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epoa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub a: Option<String>,
}

impl TreasuryAccountComponent {
    pub fn new(aid: &str, main: &str) -> Self {
        Self {
            aid: aid.to_string(),
            main: main.to_string(),
            ata: None,
            sub: None,
            bpoa: None,
            epoa: None,
            a: None,
        }
    }

    pub fn with_ata(mut self, ata: &str) -> Self {
        self.ata = Some(ata.to_string());
        self
    }

    pub fn with_sub(mut self, sub: &str) -> Self {
        self.sub = Some(sub.to_string());
        self
    }

    pub fn with_bpoa(mut self, bpoa: &str) -> Self {
        self.bpoa = Some(bpoa.to_string());
        self
    }

    pub fn with_epoa(mut self, epoa: &str) -> Self {
        self.epoa = Some(epoa.to_string());
        self
    }

    pub fn with_availability(mut self, availability: &str) -> Self {
        self.a = Some(availability.to_string());
        self
    }
}

/// One accumulated query constraint.
///
/// Same-kind list fragments are unioned at aggregation time; scalar and
/// object fragments are last-wins. A filter whose fragment would be empty
/// is omitted from the payload entirely.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Keywords {
        values: Vec<String>,
    },
    TimePeriod {
        start_date: NaiveDate,
        end_date: NaiveDate,
        date_type: Option<AwardDateType>,
    },
    PlaceOfPerformanceScope {
        scope: LocationScope,
    },
    RecipientScope {
        scope: LocationScope,
    },
    PlaceOfPerformanceLocations {
        locations: Vec<LocationSpec>,
    },
    RecipientLocations {
        locations: Vec<LocationSpec>,
    },
    Agency {
        agency_type: AgencyType,
        tier: AgencyTier,
        name: String,
        toptier_name: Option<String>,
    },
    SimpleList {
        key: &'static str,
        values: Vec<String>,
    },
    AwardAmounts {
        amounts: Vec<AwardAmount>,
    },
    TieredCodes {
        key: &'static str,
        require: Vec<Vec<String>>,
        exclude: Vec<Vec<String>>,
    },
    TreasuryAccountComponents {
        components: Vec<TreasuryAccountComponent>,
    },
}

impl Filter {
    /// A date-range filter. Rejects an end date before the start date.
    pub fn time_period(
        start_date: NaiveDate,
        end_date: NaiveDate,
        date_type: Option<AwardDateType>,
    ) -> Result<Self, Error> {
        if end_date < start_date {
            return Err(Error::Validation(format!(
                "end_date {end_date} is before start_date {start_date}"
            )));
        }
        Ok(Filter::TimePeriod {
            start_date,
            end_date,
            date_type,
        })
    }

    /// The `filters`-object key and value this filter contributes, or `None`
    /// when nothing remains after dropping empty entries.
    pub(crate) fn fragment(&self) -> Option<(String, Value)> {
        match self {
            Filter::Keywords { values } => {
                let cleaned = non_empty(values);
                if cleaned.is_empty() {
                    return None;
                }
                Some(("keywords".to_string(), json!(cleaned)))
            }
            Filter::TimePeriod {
                start_date,
                end_date,
                date_type,
            } => {
                let mut period = Map::new();
                period.insert("start_date".to_string(), json!(format_date(start_date)));
                period.insert("end_date".to_string(), json!(format_date(end_date)));
                if let Some(date_type) = date_type {
                    period.insert("date_type".to_string(), json!(date_type.to_string()));
                }
                Some(("time_period".to_string(), json!([period])))
            }
            Filter::PlaceOfPerformanceScope { scope } => Some((
                "place_of_performance_scope".to_string(),
                json!(scope.to_string()),
            )),
            Filter::RecipientScope { scope } => {
                Some(("recipient_scope".to_string(), json!(scope.to_string())))
            }
            Filter::PlaceOfPerformanceLocations { locations } => {
                locations_fragment("place_of_performance_locations", locations)
            }
            Filter::RecipientLocations { locations } => {
                locations_fragment("recipient_locations", locations)
            }
            Filter::Agency {
                agency_type,
                tier,
                name,
                toptier_name,
            } => {
                if name.is_empty() {
                    return None;
                }
                let mut agency = Map::new();
                agency.insert("type".to_string(), json!(agency_type.to_string()));
                agency.insert("tier".to_string(), json!(tier.to_string()));
                agency.insert("name".to_string(), json!(name));
                if let Some(toptier_name) = toptier_name {
                    agency.insert("toptier_name".to_string(), json!(toptier_name));
                }
                Some(("agencies".to_string(), json!([agency])))
            }
            Filter::SimpleList { key, values } => {
                let cleaned = non_empty(values);
                if cleaned.is_empty() {
                    return None;
                }
                Some(((*key).to_string(), json!(cleaned)))
            }
            Filter::AwardAmounts { amounts } => {
                let entries: Vec<Value> =
                    amounts.iter().filter_map(AwardAmount::to_value).collect();
                if entries.is_empty() {
                    return None;
                }
                Some(("award_amounts".to_string(), json!(entries)))
            }
            Filter::TieredCodes {
                key,
                require,
                exclude,
            } => {
                let mut tiers = Map::new();
                if !require.is_empty() {
                    tiers.insert("require".to_string(), json!(require));
                }
                if !exclude.is_empty() {
                    tiers.insert("exclude".to_string(), json!(exclude));
                }
                if tiers.is_empty() {
                    return None;
                }
                Some(((*key).to_string(), Value::Object(tiers)))
            }
            Filter::TreasuryAccountComponents { components } => {
                if components.is_empty() {
                    return None;
                }
                Some((
                    "treasury_account_components".to_string(),
                    serde_json::to_value(components).ok()?,
                ))
            }
        }
    }
}

fn non_empty(values: &[String]) -> Vec<&str> {
    values
        .iter()
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .collect()
}

fn locations_fragment(key: &str, locations: &[LocationSpec]) -> Option<(String, Value)> {
    let entries: Vec<Value> = locations
        .iter()
        .map(LocationSpec::to_value)
        .filter(|v| v.as_object().is_some_and(|m| !m.is_empty()))
        .collect();
    if entries.is_empty() {
        return None;
    }
    Some((key.to_string(), json!(entries)))
}

fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Merges filter fragments, in insertion order, into one `filters` object.
/// Same-key list fragments extend the existing list; anything else replaces.
pub(crate) fn aggregate(filters: &[Filter]) -> Map<String, Value> {
    let mut merged = Map::new();
    for filter in filters {
        let Some((key, value)) = filter.fragment() else {
            continue;
        };
        match (merged.get_mut(&key), value) {
            (Some(Value::Array(existing)), Value::Array(new_items)) => {
                existing.extend(new_items);
            }
            (_, value) => {
                merged.insert(key, value);
            }
        }
    }
    merged
}

/// Parses a `YYYY-MM-DD` wire date, naming the offending field on failure.
pub(crate) fn parse_wire_date(value: &str, field: &str) -> Result<NaiveDate, Error> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        Error::Validation(format!(
            "Invalid {field} format: '{value}'. Expected 'YYYY-MM-DD'."
        ))
    })
}

/// Start and end dates of a US federal fiscal year: October 1 of the prior
/// calendar year through September 30.
pub fn fiscal_year_bounds(year: i32) -> Result<(NaiveDate, NaiveDate), Error> {
    if !(1000..=9999).contains(&year) {
        return Err(Error::Validation(format!(
            "Fiscal year must be provided as a 4-digit integer: {year}"
        )));
    }
    let start = NaiveDate::from_ymd_opt(year - 1, 10, 1)
        .ok_or_else(|| Error::Validation(format!("Invalid fiscal year: {year}")))?;
    let end = NaiveDate::from_ymd_opt(year, 9, 30)
        .ok_or_else(|| Error::Validation(format!("Invalid fiscal year: {year}")))?;
    Ok((start, end))
}
