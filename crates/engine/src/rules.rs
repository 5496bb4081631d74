//! Per-category validation rules, carried as data on [`InfoType`].
//!
//! Adding a category means extending the table in [`InfoType::rules`], not
//! adding branching logic to the validator.

use crate::model::InfoType;

/// Identifier-prefix convention for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefixRule {
    /// Ids must start with this prefix.
    Prefix(&'static str),
    /// Ids must not start with any prefix another category owns.
    NoPrefix,
    /// Category is absent from the prefix table; ids are not checked.
    Unchecked,
}

/// Field requirements and prefix rule for one category.
#[derive(Debug, Clone, Copy)]
pub struct TypeRules {
    pub needs_source: bool,
    pub needs_jump_url: bool,
    pub id_prefix: IdPrefixRule,
}

/// Every prefix owned by some category. The no-prefix category (`CFH`) is
/// flagged when its ids start with any of these (cross-category id leakage).
pub const OWNED_PREFIXES: [&str; 6] = ["NW", "AP", "AN", "LA", "BOND", "PS"];

impl InfoType {
    pub fn rules(self) -> TypeRules {
        use IdPrefixRule::{NoPrefix, Prefix, Unchecked};
        match self {
            Self::News => TypeRules { needs_source: true, needs_jump_url: false, id_prefix: Prefix("NW") },
            Self::Report => TypeRules { needs_source: false, needs_jump_url: false, id_prefix: Prefix("AP") },
            Self::Notice => TypeRules { needs_source: false, needs_jump_url: false, id_prefix: Prefix("AN") },
            Self::Cfh => TypeRules { needs_source: true, needs_jump_url: false, id_prefix: NoPrefix },
            Self::Law => TypeRules { needs_source: true, needs_jump_url: false, id_prefix: Prefix("LA") },
            Self::Bond => TypeRules { needs_source: true, needs_jump_url: false, id_prefix: Prefix("BOND") },
            Self::Wechat => TypeRules { needs_source: true, needs_jump_url: true, id_prefix: Unchecked },
            Self::Interaction => TypeRules { needs_source: true, needs_jump_url: false, id_prefix: Prefix("PS") },
            Self::InvNews => TypeRules { needs_source: false, needs_jump_url: true, id_prefix: Unchecked },
            Self::HotNews => TypeRules { needs_source: true, needs_jump_url: true, id_prefix: Unchecked },
        }
    }
}
