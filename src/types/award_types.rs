//! Award type code tables.
//!
//! USAspending classifies awards by short type codes grouped into six
//! categories. The tables here drive factory dispatch, filter validation,
//! and the per-category field sets requested by award searches.

use std::fmt;

/// Contract type codes and descriptions.
pub const CONTRACT_CODES: &[(&str, &str)] = &[
    ("A", "BPA Call"),
    ("B", "Purchase Order"),
    ("C", "Delivery Order"),
    ("D", "Definitive Contract"),
];

/// Indefinite delivery vehicle type codes and descriptions.
pub const IDV_CODES: &[(&str, &str)] = &[
    ("IDV_A", "GWAC Government Wide Acquisition Contract"),
    ("IDV_B", "IDC Multi-Agency Contract, Other Indefinite Delivery Contract"),
    ("IDV_B_A", "IDC Indefinite Delivery Contract / Requirements"),
    ("IDV_B_B", "IDC Indefinite Delivery Contract / Indefinite Quantity"),
    ("IDV_B_C", "IDC Indefinite Delivery Contract / Definite Quantity"),
    ("IDV_C", "FSS Federal Supply Schedule"),
    ("IDV_D", "BOA Basic Ordering Agreement"),
    ("IDV_E", "BPA Blanket Purchase Agreement"),
];

/// Grant type codes and descriptions.
pub const GRANT_CODES: &[(&str, &str)] = &[
    ("02", "Block Grant"),
    ("03", "Formula Grant"),
    ("04", "Project Grant"),
    ("05", "Cooperative Agreement"),
];

/// Loan type codes and descriptions.
pub const LOAN_CODES: &[(&str, &str)] = &[
    ("07", "Direct Loan"),
    ("08", "Guaranteed/Insured Loan"),
];

/// Direct payment type codes and descriptions.
pub const DIRECT_PAYMENT_CODES: &[(&str, &str)] = &[
    ("06", "Direct Payment for Specified Use"),
    ("10", "Direct Payment with Unrestricted Use"),
];

/// Other assistance type codes and descriptions.
pub const OTHER_CODES: &[(&str, &str)] = &[
    ("09", "Insurance"),
    ("11", "Other Financial Assistance"),
    ("-1", "Not Specified"),
];

/// The six award type categories recognized by the search API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AwardTypeGroup {
    Contracts,
    Idvs,
    Grants,
    Loans,
    DirectPayments,
    OtherAssistance,
}

impl AwardTypeGroup {
    /// All categories, in the order the API documents them.
    pub const ALL: [AwardTypeGroup; 6] = [
        AwardTypeGroup::Contracts,
        AwardTypeGroup::Idvs,
        AwardTypeGroup::Grants,
        AwardTypeGroup::Loans,
        AwardTypeGroup::DirectPayments,
        AwardTypeGroup::OtherAssistance,
    ];

    /// The code/description table for this category.
    pub fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            AwardTypeGroup::Contracts => CONTRACT_CODES,
            AwardTypeGroup::Idvs => IDV_CODES,
            AwardTypeGroup::Grants => GRANT_CODES,
            AwardTypeGroup::Loans => LOAN_CODES,
            AwardTypeGroup::DirectPayments => DIRECT_PAYMENT_CODES,
            AwardTypeGroup::OtherAssistance => OTHER_CODES,
        }
    }

    /// The type codes belonging to this category.
    pub fn codes(self) -> impl Iterator<Item = &'static str> {
        self.table().iter().map(|(code, _)| *code)
    }

    /// The key under which the count endpoint reports this category.
    /// `other_assistance` is reported as `other`.
    pub fn count_key(self) -> &'static str {
        match self {
            AwardTypeGroup::OtherAssistance => "other",
            other => other.name(),
        }
    }

    /// Canonical category name.
    pub fn name(self) -> &'static str {
        match self {
            AwardTypeGroup::Contracts => "contracts",
            AwardTypeGroup::Idvs => "idvs",
            AwardTypeGroup::Grants => "grants",
            AwardTypeGroup::Loans => "loans",
            AwardTypeGroup::DirectPayments => "direct_payments",
            AwardTypeGroup::OtherAssistance => "other_assistance",
        }
    }
}

impl fmt::Display for AwardTypeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Looks up the category a type code belongs to.
pub fn category_for_code(code: &str) -> Option<AwardTypeGroup> {
    AwardTypeGroup::ALL
        .into_iter()
        .find(|group| group.codes().any(|c| c == code))
}

/// Whether `code` is a known award type code.
pub fn is_valid_award_type(code: &str) -> bool {
    category_for_code(code).is_some()
}

/// Human description for a type code, if known.
pub fn description_for_code(code: &str) -> Option<&'static str> {
    AwardTypeGroup::ALL.into_iter().find_map(|group| {
        group
            .table()
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, description)| *description)
    })
}

/// Every known award type code across all six categories.
pub fn all_award_codes() -> impl Iterator<Item = &'static str> {
    AwardTypeGroup::ALL.into_iter().flat_map(AwardTypeGroup::codes)
}
