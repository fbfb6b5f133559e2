//! Ledger key layout
//!
//! Every entity lives under its own key so that unrelated operations touch
//! disjoint keys. Each record family owns a half-open range
//! `[prefix, prefix_end)` where `prefix_end` replaces the trailing `/` with
//! the next byte (`0`), which is what range scans use for listing.

use crate::identifiers::{ContractId, MemberId};

/// Prefix of member records
pub const MEMBER_PREFIX: &str = "member/";

/// Prefix of contract records
pub const CONTRACT_PREFIX: &str = "contract/";

/// Half-open key range `[start, end)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    /// Inclusive lower bound
    pub start: String,
    /// Exclusive upper bound
    pub end: String,
}

impl KeyRange {
    /// Range covering every key that starts with `prefix`.
    ///
    /// `prefix` must end in `/`.
    pub fn for_prefix(prefix: &str) -> Self {
        let stem = prefix.strip_suffix('/').unwrap_or(prefix);
        Self {
            start: prefix.to_string(),
            end: format!("{stem}0"),
        }
    }

    /// Whether `key` falls inside the range
    pub fn contains(&self, key: &str) -> bool {
        key >= self.start.as_str() && key < self.end.as_str()
    }
}

/// Key of a member record
pub fn member_key(id: &MemberId) -> String {
    format!("{MEMBER_PREFIX}{id}")
}

/// Key of a contract record
pub fn contract_key(id: &ContractId) -> String {
    format!("{CONTRACT_PREFIX}{id}")
}

/// Range holding every member record
pub fn member_range() -> KeyRange {
    KeyRange::for_prefix(MEMBER_PREFIX)
}

/// Range holding every contract record
pub fn contract_range() -> KeyRange {
    KeyRange::for_prefix(CONTRACT_PREFIX)
}
