//! In-memory ledger handler
//!
//! Clones share the same store, so several economy instances built over
//! clones of one handler contend on the same keys.

use super::{LedgerStats, VersionedStore};
use async_trait::async_trait;
use fitcoin_core::effects::{CommitUnit, LedgerEffects, LedgerError, Version, VersionedValue};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct MemoryState {
    store: VersionedStore,
    commits: u64,
    conflicts: u64,
}

/// In-memory versioned ledger
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerHandler {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryLedgerHandler {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger pre-loaded with raw entries, all at version 1
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<u8>)>,
        K: Into<String>,
    {
        let version = Version::GENESIS.next();
        let entries = entries
            .into_iter()
            .map(|(k, value)| (k.into(), VersionedValue { version, value }))
            .collect();
        Self {
            state: Arc::new(RwLock::new(MemoryState {
                store: VersionedStore::from_parts(version, entries),
                ..MemoryState::default()
            })),
        }
    }

    /// Current statistics
    pub async fn stats(&self) -> LedgerStats {
        let state = self.state.read().await;
        let (key_count, total_size) = state.store.size();
        LedgerStats {
            key_count,
            total_size,
            head: state.store.head(),
            commits: state.commits,
            conflicts: state.conflicts,
            backend_type: "memory".to_string(),
        }
    }
}

#[async_trait]
impl LedgerEffects for MemoryLedgerHandler {
    async fn get_state(&self, key: &str) -> Result<Option<VersionedValue>, LedgerError> {
        let state = self.state.read().await;
        Ok(state.store.get(key).cloned())
    }

    async fn scan_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, VersionedValue)>, LedgerError> {
        let state = self.state.read().await;
        state.store.scan(start, end)
    }

    async fn commit(&self, unit: CommitUnit) -> Result<Version, LedgerError> {
        let mut state = self.state.write().await;
        let writes = unit.writes.len();
        match state.store.apply(unit) {
            Ok(version) => {
                state.commits += 1;
                debug!(%version, writes, "Memory ledger commit applied");
                Ok(version)
            }
            Err(err) => {
                if matches!(err, LedgerError::Conflict { .. }) {
                    state.conflicts += 1;
                }
                debug!(error = %err, "Memory ledger commit rejected");
                Err(err)
            }
        }
    }
}
