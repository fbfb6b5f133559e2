//! Ledger wrapper that fails on demand

use async_trait::async_trait;
use fitcoin_core::{CommitUnit, LedgerEffects, LedgerError, Version, VersionedValue};
use fitcoin_effects::MemoryLedgerHandler;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// In-memory ledger whose reads or commits can be switched to fail
#[derive(Debug, Clone, Default)]
pub struct FlakyLedgerHandler {
    inner: MemoryLedgerHandler,
    fail_reads: Arc<AtomicBool>,
    fail_commits: Arc<AtomicBool>,
    conflicts: Arc<AtomicU64>,
    rejected: Arc<AtomicU64>,
}

impl FlakyLedgerHandler {
    /// Wrap an existing ledger
    pub fn wrap(inner: MemoryLedgerHandler) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// The wrapped ledger
    pub fn inner(&self) -> &MemoryLedgerHandler {
        &self.inner
    }

    /// Make every read fail with `Unavailable`
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every commit fail with `Io`
    pub fn fail_commits(&self, fail: bool) {
        self.fail_commits.store(fail, Ordering::SeqCst);
    }

    /// Answer the next `count` commits with a conflict on their first write
    pub fn conflict_next_commits(&self, count: u64) {
        self.conflicts.store(count, Ordering::SeqCst);
    }

    /// Commits refused while failing
    pub fn rejected_commits(&self) -> u64 {
        self.rejected.load(Ordering::SeqCst)
    }

    fn check_reads(&self) -> Result<(), LedgerError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable {
                reason: "injected read failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerEffects for FlakyLedgerHandler {
    async fn get_state(&self, key: &str) -> Result<Option<VersionedValue>, LedgerError> {
        self.check_reads()?;
        self.inner.get_state(key).await
    }

    async fn scan_range(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<(String, VersionedValue)>, LedgerError> {
        self.check_reads()?;
        self.inner.scan_range(start, end).await
    }

    async fn commit(&self, unit: CommitUnit) -> Result<Version, LedgerError> {
        if self.fail_commits.load(Ordering::SeqCst) {
            self.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(LedgerError::Io {
                reason: "injected commit failure".to_string(),
            });
        }
        let scripted = self
            .conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if scripted {
            self.rejected.fetch_add(1, Ordering::SeqCst);
            let key = unit
                .writes
                .keys()
                .next()
                .cloned()
                .unwrap_or_default();
            return Err(LedgerError::Conflict { key });
        }
        self.inner.commit(unit).await
    }
}
