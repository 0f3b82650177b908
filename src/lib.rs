mod cache;
mod client;
mod config;
mod errors;
mod query;
mod resources;
pub mod types;

pub use self::client::Client;
pub use self::config::{Config, DEFAULT_BASE_URL};
pub use self::errors::Error;
pub use self::query::{
    fiscal_year_bounds, AgenciesAutocomplete, AgencyMatch, AgencyTier, AgencyType, AwardAmount,
    AwardDateType, AwardsSearch, Filter, FilteredSearch, FundingSearch, LocationScope,
    LocationSpec, PageIter, PagedSearch, SortOrder, SpendingCategory, SpendingLevel,
    SpendingSearch, SubAwardsSearch, TransactionsSearch, TreasuryAccountComponent,
};
