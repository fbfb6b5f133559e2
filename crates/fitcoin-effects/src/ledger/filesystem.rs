//! File-backed ledger handler
//!
//! The whole store is kept in memory and rewritten to a single JSON snapshot
//! after every commit that writes. Snapshots are written to a sibling temp
//! file, synced, then renamed over the previous one, so a crash leaves either
//! the old or the new snapshot on disk. Values are hex-encoded.
//!
//! Several handlers, in one process or many, may share a snapshot file.
//! Reads serve the copy loaded at open or at the last commit. A commit takes
//! an exclusive lock on `<file>.lock`, reloads the snapshot and validates the
//! unit against it, so a read made stale by another writer surfaces as
//! [`LedgerError::Conflict`] instead of overwriting that writer's commit.

use super::{LedgerStats, VersionedStore};
use async_trait::async_trait;
use fitcoin_core::effects::{CommitUnit, LedgerEffects, LedgerError, Version, VersionedValue};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info};

const SNAPSHOT_FORMAT: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    format: u32,
    head: Version,
    entries: BTreeMap<String, SnapshotEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotEntry {
    version: Version,
    value: String,
}

impl Snapshot {
    fn from_store(store: &VersionedStore) -> Self {
        Self {
            format: SNAPSHOT_FORMAT,
            head: store.head(),
            entries: store
                .entries()
                .iter()
                .map(|(key, v)| {
                    (
                        key.clone(),
                        SnapshotEntry {
                            version: v.version,
                            value: hex::encode(&v.value),
                        },
                    )
                })
                .collect(),
        }
    }

    fn into_store(self) -> Result<VersionedStore, LedgerError> {
        if self.format != SNAPSHOT_FORMAT {
            return Err(LedgerError::Corrupted {
                reason: format!("unsupported snapshot format {}", self.format),
            });
        }
        let mut entries = BTreeMap::new();
        for (key, entry) in self.entries {
            let value = hex::decode(&entry.value).map_err(|e| LedgerError::Corrupted {
                reason: format!("value of {key}: {e}"),
            })?;
            if entry.version > self.head {
                return Err(LedgerError::Corrupted {
                    reason: format!("{key} written at {} after head {}", entry.version, self.head),
                });
            }
            entries.insert(
                key,
                VersionedValue {
                    version: entry.version,
                    value,
                },
            );
        }
        Ok(VersionedStore::from_parts(self.head, entries))
    }
}

/// Read and decode the snapshot at `path`, `None` if there is none yet
async fn read_store(path: &Path) -> Result<Option<VersionedStore>, LedgerError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(LedgerError::Io {
                reason: format!("failed to read {}: {e}", path.display()),
            })
        }
    };
    let snapshot: Snapshot = serde_json::from_slice(&bytes).map_err(|e| LedgerError::Corrupted {
        reason: format!("{}: {e}", path.display()),
    })?;
    snapshot.into_store().map(Some)
}

/// Held for the duration of one commit; dropping the file releases the lock
struct WriterLock {
    _file: std::fs::File,
}

#[derive(Debug, Default)]
struct FileState {
    store: VersionedStore,
    commits: u64,
    conflicts: u64,
}

/// Versioned ledger persisted to one JSON snapshot file
#[derive(Debug, Clone)]
pub struct FilesystemLedgerHandler {
    path: PathBuf,
    state: Arc<RwLock<FileState>>,
}

impl FilesystemLedgerHandler {
    /// Open the ledger at `path`, starting empty if the file does not exist
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let path = path.into();
        let store = read_store(&path).await?.unwrap_or_default();

        info!(
            path = %path.display(),
            keys = store.entries().len(),
            head = %store.head(),
            "Opened ledger snapshot"
        );

        Ok(Self {
            path,
            state: Arc::new(RwLock::new(FileState {
                store,
                ..FileState::default()
            })),
        })
    }

    /// Snapshot file location
    pub fn path(&self) -> &Path {
        &self.path
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
            backend_type: "filesystem".to_string(),
        }
    }

    async fn create_parent_dir(&self) -> Result<(), LedgerError> {
        match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => fs::create_dir_all(parent).await.map_err(|e| LedgerError::Io {
                reason: format!("failed to create directory for {}: {e}", self.path.display()),
            }),
            None => Ok(()),
        }
    }

    /// Block until this handler is the only writer of the snapshot file
    async fn lock_writer(&self) -> Result<WriterLock, LedgerError> {
        self.create_parent_dir().await?;
        let lock_path = self.path.with_extension("lock");
        let shown = lock_path.display().to_string();
        let locked = tokio::task::spawn_blocking(move || -> std::io::Result<WriterLock> {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&lock_path)?;
            file.lock_exclusive()?;
            Ok(WriterLock { _file: file })
        })
        .await
        .map_err(|e| LedgerError::Io {
            reason: format!("lock task for {shown} failed: {e}"),
        })?;
        locked.map_err(|e| LedgerError::Io {
            reason: format!("failed to lock {shown}: {e}"),
        })
    }

    async fn persist(&self, store: &VersionedStore) -> Result<(), LedgerError> {
        let io_err = |what: &str, e: std::io::Error| LedgerError::Io {
            reason: format!("{what} {}: {e}", self.path.display()),
        };

        let bytes = serde_json::to_vec_pretty(&Snapshot::from_store(store)).map_err(|e| {
            LedgerError::Io {
                reason: format!("failed to encode snapshot: {e}"),
            }
        })?;

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| io_err("failed to create temp file for", e))?;
        file.write_all(&bytes)
            .await
            .map_err(|e| io_err("failed to write", e))?;
        file.sync_all()
            .await
            .map_err(|e| io_err("failed to sync", e))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| io_err("failed to replace", e))?;
        Ok(())
    }
}

#[async_trait]
impl LedgerEffects for FilesystemLedgerHandler {
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
        let _writer = self.lock_writer().await?;

        if let Some(on_disk) = read_store(&self.path).await? {
            if on_disk.head() != state.store.head() {
                debug!(
                    path = %self.path.display(),
                    loaded = %state.store.head(),
                    on_disk = %on_disk.head(),
                    "Snapshot advanced by another writer, reloading"
                );
            }
            state.store = on_disk;
        }

        // Apply to a copy so a failed write leaves memory and disk in agreement.
        let mut next = state.store.clone();
        let read_only = unit.is_read_only();
        let version = match next.apply(unit) {
            Ok(version) => version,
            Err(err) => {
                if matches!(err, LedgerError::Conflict { .. }) {
                    state.conflicts += 1;
                }
                return Err(err);
            }
        };
        if read_only {
            return Ok(version);
        }

        self.persist(&next).await?;
        state.store = next;
        state.commits += 1;
        debug!(%version, path = %self.path.display(), "Ledger snapshot written");
        Ok(version)
    }
}
