//! Fitcoin Effects - production effect handlers
//!
//! Stateless-to-the-caller implementations of the effect traits defined in
//! `fitcoin-core`:
//!
//! - [`MemoryLedgerHandler`]: versioned ledger held in memory
//! - [`FilesystemLedgerHandler`]: the same ledger persisted to a JSON snapshot
//! - [`RealRandomHandler`]: OS-backed randomness for contract ids
//!
//! Mock and deterministic handlers belong in `fitcoin-testkit`.

#![forbid(unsafe_code)]

pub mod ledger;
pub mod random;

pub use ledger::{FilesystemLedgerHandler, LedgerStats, MemoryLedgerHandler, VersionedStore};
pub use random::RealRandomHandler;
