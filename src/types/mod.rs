mod record;
pub use self::record::Record;

mod page;
pub use self::page::{Page, PageMetadata};

mod award_types;
pub use self::award_types::{
    all_award_codes, category_for_code, description_for_code, is_valid_award_type, AwardTypeGroup,
    CONTRACT_CODES, DIRECT_PAYMENT_CODES, GRANT_CODES, IDV_CODES, LOAN_CODES, OTHER_CODES,
};

mod location;
pub use self::location::{Location, PeriodOfPerformance};

mod award;
pub use self::award::{Award, AwardKind, CodedField};

mod recipient;
pub use self::recipient::Recipient;

mod subaward;
pub use self::subaward::SubAward;

mod transaction;
pub use self::transaction::Transaction;

mod spending;
pub use self::spending::Spending;

mod agency;
pub use self::agency::{Agency, DefCode, SubTierAgency};

mod funding;
pub use self::funding::Funding;
