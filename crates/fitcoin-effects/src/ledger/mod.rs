//! Ledger effect handlers
//!
//! Both handlers share [`VersionedStore`], which owns the commit validation
//! rules; they differ only in where the store lives between commits.

pub mod filesystem;
pub mod memory;

pub use filesystem::FilesystemLedgerHandler;
pub use memory::MemoryLedgerHandler;

use fitcoin_core::effects::{CommitUnit, LedgerError, Version, VersionedValue};
use std::collections::BTreeMap;
use std::ops::Bound;

/// Ordered key space where every key remembers the commit that wrote it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionedStore {
    head: Version,
    entries: BTreeMap<String, VersionedValue>,
}

impl VersionedStore {
    /// Empty store at [`Version::GENESIS`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from persisted parts
    pub fn from_parts(head: Version, entries: BTreeMap<String, VersionedValue>) -> Self {
        Self { head, entries }
    }

    /// Version of the latest applied commit
    pub fn head(&self) -> Version {
        self.head
    }

    /// All entries in key order
    pub fn entries(&self) -> &BTreeMap<String, VersionedValue> {
        &self.entries
    }

    /// Read one key
    pub fn get(&self, key: &str) -> Option<&VersionedValue> {
        self.entries.get(key)
    }

    /// Entries in `[start, end)`, ascending
    pub fn scan(&self, start: &str, end: &str) -> Result<Vec<(String, VersionedValue)>, LedgerError> {
        Ok(self
            .range(start, end)?
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn range<'a>(
        &'a self,
        start: &'a str,
        end: &'a str,
    ) -> Result<impl Iterator<Item = (&'a String, &'a VersionedValue)> + 'a, LedgerError> {
        if start > end {
            return Err(LedgerError::InvalidRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(self
            .entries
            .range::<str, _>((Bound::Included(start), Bound::Excluded(end))))
    }

    /// Validate `unit` against the current contents and apply its writes.
    ///
    /// Every write of one unit is stamped with the same new version. A unit
    /// with no writes is validated but does not advance the head.
    pub fn apply(&mut self, unit: CommitUnit) -> Result<Version, LedgerError> {
        for range in &unit.ranges {
            let _ = self.range(&range.start, &range.end)?;
        }

        let conflict = unit.first_conflict(
            |key| self.entries.get(key).map(|v| v.version),
            |start, end| match self.range(start, end) {
                Ok(iter) => iter.map(|(k, v)| (k.clone(), v.version)).collect(),
                Err(_) => Vec::new(),
            },
        );
        if let Some(key) = conflict {
            return Err(LedgerError::Conflict { key });
        }

        if unit.is_read_only() {
            return Ok(self.head);
        }

        let version = self.head.next();
        for (key, value) in unit.writes {
            self.entries.insert(key, VersionedValue { version, value });
        }
        self.head = version;
        Ok(version)
    }

    /// Number of keys and total value bytes
    pub fn size(&self) -> (u64, u64) {
        let bytes = self.entries.values().map(|v| v.value.len() as u64).sum();
        (self.entries.len() as u64, bytes)
    }
}

/// Point-in-time handler statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerStats {
    /// Keys currently stored
    pub key_count: u64,
    /// Sum of value sizes in bytes
    pub total_size: u64,
    /// Version of the latest commit
    pub head: Version,
    /// Commits applied since the handler was created
    pub commits: u64,
    /// Commits rejected with a conflict since the handler was created
    pub conflicts: u64,
    /// Backend name
    pub backend_type: String,
}
