//! Core effect trait definitions
//!
//! This module defines **what** side effects the economy may perform;
//! handlers in `fitcoin-effects` (production) and `fitcoin-testkit`
//! (deterministic) define **how**.
//!
//! - **Ledger**: keyed reads, range scans, atomic commit
//! - **Random**: entropy for contract ids

pub mod ledger;
pub mod random;

pub use ledger::{CommitUnit, LedgerEffects, LedgerError, RangeRead, Version, VersionedValue};
pub use random::RandomEffects;
