//! Ledger accessor effect interface
//!
//! # Effect Classification
//!
//! - **Category**: Infrastructure Effect
//! - **Implementation**: `fitcoin-effects`
//! - **Usage**: every economy operation, through [`crate::Invocation`]
//!
//! The substrate offers single-key reads, ordered range scans and one
//! atomic commit per invocation. A commit carries the versions the
//! invocation observed; the handler rejects the whole unit with
//! [`LedgerError::Conflict`] if any of them moved, which is what lets
//! multi-key operations behave as if single-threaded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Commit sequence number stamped on every written key
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(pub u64);

impl Version {
    /// Version before the first commit
    pub const GENESIS: Version = Version(0);

    /// The version that follows this one
    pub fn next(self) -> Version {
        Version(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Stored bytes together with the commit that wrote them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedValue {
    /// Commit that last wrote the key
    pub version: Version,
    /// Raw record bytes
    pub value: Vec<u8>,
}

/// Error type for ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum LedgerError {
    /// Substrate cannot serve requests
    #[error("Ledger unavailable: {reason}")]
    Unavailable { reason: String },
    /// A read recorded in the commit unit is stale
    #[error("Conflicting write on key {key}")]
    Conflict { key: String },
    /// `start` sorts after `end`
    #[error("Invalid key range [{start}, {end})")]
    InvalidRange { start: String, end: String },
    /// Persisting or loading the store failed
    #[error("Ledger I/O failed: {reason}")]
    Io { reason: String },
    /// Persisted store could not be decoded
    #[error("Ledger snapshot corrupted: {reason}")]
    Corrupted { reason: String },
}

/// Key/version pairs observed by one range scan
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RangeRead {
    /// Inclusive lower bound
    pub start: String,
    /// Exclusive upper bound
    pub end: String,
    /// Keys present at scan time, ascending, with their versions
    pub observed: Vec<(String, Version)>,
}

/// Everything one invocation read and wants to write.
///
/// `reads` maps each key read to the version seen, or `None` if the key was
/// absent. `writes` is applied as a unit or not at all.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitUnit {
    /// Point reads
    pub reads: BTreeMap<String, Option<Version>>,
    /// Range scans
    pub ranges: Vec<RangeRead>,
    /// Buffered puts
    pub writes: BTreeMap<String, Vec<u8>>,
}

impl CommitUnit {
    /// True when nothing would be written
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }

    /// First stale read, given the store's current view.
    ///
    /// `current` returns the version currently stored under a key, `scan`
    /// the current key/version listing of a range.
    pub fn first_conflict<C, S>(&self, current: C, scan: S) -> Option<String>
    where
        C: Fn(&str) -> Option<Version>,
        S: Fn(&str, &str) -> Vec<(String, Version)>,
    {
        for (key, seen) in &self.reads {
            if current(key) != *seen {
                return Some(key.clone());
            }
        }
        for range in &self.ranges {
            let now = scan(&range.start, &range.end);
            if now != range.observed {
                let stale = now
                    .iter()
                    .zip(range.observed.iter())
                    .find(|(a, b)| a != b)
                    .map(|(a, _)| a.0.clone())
                    .or_else(|| now.get(range.observed.len()).map(|(k, _)| k.clone()))
                    .or_else(|| range.observed.get(now.len()).map(|(k, _)| k.clone()))
                    .unwrap_or_else(|| range.start.clone());
                return Some(stale);
            }
        }
        None
    }
}

/// Ledger accessor: the only suspension points of the core.
#[async_trait]
pub trait LedgerEffects: Send + Sync {
    /// Read one key
    async fn get_state(&self, key: &str) -> Result<Option<VersionedValue>, LedgerError>;

    /// Ordered scan of the half-open range `[start, end)`
    async fn scan_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, VersionedValue)>, LedgerError>;

    /// Validate `unit.reads`/`unit.ranges` and apply `unit.writes` atomically.
    ///
    /// Returns the version stamped on the written keys.
    async fn commit(&self, unit: CommitUnit) -> Result<Version, LedgerError>;
}

/// Blanket implementation for Arc<T> where T: LedgerEffects
#[async_trait]
impl<T: LedgerEffects + ?Sized> LedgerEffects for std::sync::Arc<T> {
    async fn get_state(&self, key: &str) -> Result<Option<VersionedValue>, LedgerError> {
        (**self).get_state(key).await
    }

    async fn scan_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, VersionedValue)>, LedgerError> {
        (**self).scan_range(start, end).await
    }

    async fn commit(&self, unit: CommitUnit) -> Result<Version, LedgerError> {
        (**self).commit(unit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_with_read(key: &str, seen: Option<Version>) -> CommitUnit {
        let mut unit = CommitUnit::default();
        unit.reads.insert(key.to_string(), seen);
        unit
    }

    #[test]
    fn default_version_is_genesis() {
        assert_eq!(Version::default(), Version::GENESIS);
        assert_eq!(Version::default().next(), Version(1));
    }

    #[test]
    fn stale_point_read_is_reported() {
        let unit = unit_with_read("member/u1", Some(Version(3)));
        assert_eq!(unit.first_conflict(|_| Some(Version(3)), |_, _| vec![]), None);
        assert_eq!(
            unit.first_conflict(|_| Some(Version(4)), |_, _| vec![]),
            Some("member/u1".to_string())
        );
    }

    #[test]
    fn absent_key_that_appeared_is_a_conflict() {
        let unit = unit_with_read("member/u1", None);
        assert_eq!(
            unit.first_conflict(|_| Some(Version(1)), |_, _| vec![]),
            Some("member/u1".to_string())
        );
    }

    #[test]
    fn phantom_in_range_is_a_conflict() {
        let mut unit = CommitUnit::default();
        unit.ranges.push(RangeRead {
            start: "contract/".into(),
            end: "contract0".into(),
            observed: vec![("contract/ca".into(), Version(1))],
        });
        let grown = |_: &str, _: &str| {
            vec![
                ("contract/ca".to_string(), Version(1)),
                ("contract/cb".to_string(), Version(2)),
            ]
        };
        assert_eq!(
            unit.first_conflict(|_| None, grown),
            Some("contract/cb".to_string())
        );
    }
}
