//! Per-operation transaction over the ledger accessor
//!
//! An [`Invocation`] is the unit of execution: every read an operation makes
//! goes through it and is pinned (a key read twice returns the first value),
//! every write is buffered and visible to later reads of the same
//! invocation, and nothing reaches the ledger until [`Invocation::commit`]
//! hands the read/write sets to [`LedgerEffects::commit`]. Dropping an
//! invocation without committing discards its writes.

use crate::effects::ledger::{CommitUnit, LedgerEffects, RangeRead, Version, VersionedValue};
use crate::errors::{FitcoinError, Result};
use crate::keys::KeyRange;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// Transaction context for one economy operation
pub struct Invocation<'a, L: LedgerEffects + ?Sized> {
    ledger: &'a L,
    reads: BTreeMap<String, Option<VersionedValue>>,
    ranges: Vec<RangeRead>,
    writes: BTreeMap<String, Vec<u8>>,
}

impl<'a, L: LedgerEffects + ?Sized> Invocation<'a, L> {
    /// Open an invocation against `ledger`
    pub fn new(ledger: &'a L) -> Self {
        Self {
            ledger,
            reads: BTreeMap::new(),
            ranges: Vec::new(),
            writes: BTreeMap::new(),
        }
    }

    /// Read raw bytes under `key`
    pub async fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>> {
        if let Some(pending) = self.writes.get(key) {
            return Ok(Some(pending.clone()));
        }
        if let Some(pinned) = self.reads.get(key) {
            return Ok(pinned.as_ref().map(|v| v.value.clone()));
        }
        let fetched = self.ledger.get_state(key).await?;
        let value = fetched.as_ref().map(|v| v.value.clone());
        self.reads.insert(key.to_string(), fetched);
        Ok(value)
    }

    /// Buffer a write of `value` under `key`
    pub fn put_state(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.writes.insert(key.into(), value);
    }

    /// Ordered scan of `range`, overlaid with this invocation's own writes
    pub async fn scan_range(&mut self, range: &KeyRange) -> Result<Vec<(String, Vec<u8>)>> {
        let scanned = self.ledger.scan_range(&range.start, &range.end).await?;

        let mut merged: BTreeMap<String, Vec<u8>> = BTreeMap::new();
        let mut observed = Vec::with_capacity(scanned.len());
        for (key, versioned) in scanned {
            observed.push((key.clone(), versioned.version));
            let value = match self.reads.get(&key) {
                Some(Some(pinned)) => pinned.value.clone(),
                _ => versioned.value,
            };
            merged.insert(key, value);
        }
        for (key, value) in &self.writes {
            if range.contains(key) {
                merged.insert(key.clone(), value.clone());
            }
        }

        self.ranges.push(RangeRead {
            start: range.start.clone(),
            end: range.end.clone(),
            observed,
        });
        Ok(merged.into_iter().collect())
    }

    /// Read and decode a JSON record
    pub async fn get_record<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        match self.get_state(key).await? {
            Some(bytes) => decode_record(key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Encode and buffer a JSON record
    pub fn put_record<T: Serialize>(&mut self, key: impl Into<String>, record: &T) -> Result<()> {
        let bytes = serde_json::to_vec(record)?;
        self.put_state(key, bytes);
        Ok(())
    }

    /// True while nothing has been written
    pub fn is_read_only(&self) -> bool {
        self.writes.is_empty()
    }

    /// Read, range and write sets as submitted to the ledger
    pub fn into_commit_unit(self) -> CommitUnit {
        CommitUnit {
            reads: self
                .reads
                .into_iter()
                .map(|(key, value)| (key, value.map(|v| v.version)))
                .collect(),
            ranges: self.ranges,
            writes: self.writes,
        }
    }

    /// Submit the invocation.
    ///
    /// Read-only invocations are not sent to the ledger and return `None`.
    pub async fn commit(self) -> Result<Option<Version>> {
        if self.is_read_only() {
            return Ok(None);
        }
        let ledger = self.ledger;
        let unit = self.into_commit_unit();
        let write_count = unit.writes.len();
        let version = ledger.commit(unit).await?;
        debug!(%version, writes = write_count, "Invocation committed");
        Ok(Some(version))
    }
}

/// Decode a stored JSON record, naming the key on failure
pub fn decode_record<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes)
        .map_err(|e| FitcoinError::serialization(format!("record at {key}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::ledger::LedgerError;
    use crate::keys::KeyRange;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Fixed store that records what gets committed
    #[derive(Default)]
    struct FixedLedger {
        data: BTreeMap<String, VersionedValue>,
        committed: Mutex<Vec<CommitUnit>>,
    }

    impl FixedLedger {
        fn with(entries: &[(&str, &str, u64)]) -> Self {
            let data = entries
                .iter()
                .map(|(k, v, ver)| {
                    (
                        k.to_string(),
                        VersionedValue {
                            version: Version(*ver),
                            value: v.as_bytes().to_vec(),
                        },
                    )
                })
                .collect();
            Self {
                data,
                committed: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LedgerEffects for FixedLedger {
        async fn get_state(&self, key: &str) -> std::result::Result<Option<VersionedValue>, LedgerError> {
            Ok(self.data.get(key).cloned())
        }

        async fn scan_range(
            &self,
            start: &str,
            end: &str,
        ) -> std::result::Result<Vec<(String, VersionedValue)>, LedgerError> {
            Ok(self
                .data
                .range(start.to_string()..end.to_string())
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect())
        }

        async fn commit(&self, unit: CommitUnit) -> std::result::Result<Version, LedgerError> {
            self.committed.lock().unwrap().push(unit);
            Ok(Version(99))
        }
    }

    #[tokio::test]
    async fn reads_see_own_writes() {
        let ledger = FixedLedger::with(&[("a", "old", 1)]);
        let mut tx = Invocation::new(&ledger);
        assert_eq!(tx.get_state("a").await.unwrap(), Some(b"old".to_vec()));
        tx.put_state("a", b"new".to_vec());
        assert_eq!(tx.get_state("a").await.unwrap(), Some(b"new".to_vec()));
    }

    #[tokio::test]
    async fn commit_unit_records_versions_seen() {
        let ledger = FixedLedger::with(&[("a", "1", 4)]);
        let mut tx = Invocation::new(&ledger);
        tx.get_state("a").await.unwrap();
        tx.get_state("missing").await.unwrap();
        tx.put_state("b", b"x".to_vec());

        let unit = tx.into_commit_unit();
        assert_eq!(unit.reads.get("a"), Some(&Some(Version(4))));
        assert_eq!(unit.reads.get("missing"), Some(&None));
        assert_eq!(unit.writes.get("b"), Some(&b"x".to_vec()));
    }

    #[tokio::test]
    async fn scan_overlays_buffered_writes() {
        let ledger = FixedLedger::with(&[("k/1", "one", 1), ("k/3", "three", 1), ("z", "out", 1)]);
        let mut tx = Invocation::new(&ledger);
        tx.put_state("k/2", b"two".to_vec());
        tx.put_state("k/3", b"THREE".to_vec());

        let rows = tx.scan_range(&KeyRange::for_prefix("k/")).await.unwrap();
        let keys: Vec<_> = rows.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["k/1", "k/2", "k/3"]);
        assert_eq!(rows[2].1, b"THREE".to_vec());

        let unit = tx.into_commit_unit();
        assert_eq!(unit.ranges.len(), 1);
        assert_eq!(unit.ranges[0].observed.len(), 2);
    }

    #[tokio::test]
    async fn read_only_invocations_skip_the_ledger() {
        let ledger = FixedLedger::with(&[("a", "1", 1)]);
        let mut tx = Invocation::new(&ledger);
        tx.get_state("a").await.unwrap();
        assert_eq!(tx.commit().await.unwrap(), None);
        assert!(ledger.committed.lock().unwrap().is_empty());

        let mut tx = Invocation::new(&ledger);
        tx.put_state("a", b"2".to_vec());
        assert_eq!(tx.commit().await.unwrap(), Some(Version(99)));
        assert_eq!(ledger.committed.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn undecodable_record_names_its_key() {
        let ledger = FixedLedger::with(&[("member/u1", "not json", 1)]);
        let mut tx = Invocation::new(&ledger);
        let err = tx
            .get_record::<serde_json::Value>("member/u1")
            .await
            .unwrap_err();
        assert!(matches!(err, FitcoinError::Serialization { ref message } if message.contains("member/u1")));
    }
}
