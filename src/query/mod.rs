mod common;
pub use self::common::{FilteredSearch, PageIter, PagedSearch, SortOrder};

mod filters;
pub use self::filters::{
    fiscal_year_bounds, AgencyTier, AgencyType, AwardAmount, AwardDateType, Filter, LocationScope,
    LocationSpec, TreasuryAccountComponent,
};

mod awards;
pub use self::awards::AwardsSearch;

mod subawards;
pub use self::subawards::SubAwardsSearch;

mod transactions;
pub use self::transactions::TransactionsSearch;

mod spending;
pub use self::spending::{SpendingCategory, SpendingLevel, SpendingSearch};

mod agencies;
pub use self::agencies::{AgenciesAutocomplete, AgencyMatch};

mod funding;
pub use self::funding::FundingSearch;
