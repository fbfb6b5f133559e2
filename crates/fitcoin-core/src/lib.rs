//! Fitcoin Core - records, effect interfaces and invocation semantics
//!
//! This crate holds everything the economy needs that is not business logic:
//! the persisted record types, the key layout, the unified error type, the
//! effect traits the economy is written against, and the [`Invocation`]
//! transaction that gives each operation a consistent view of the ledger.
//!
//! # Layers
//!
//! ## Records
//! - [`Member`]: either a [`User`] earning and spending fitcoin, or a
//!   [`Seller`] owning a product catalog
//! - [`Contract`]: one purchase, `pending` until settled as `complete` or
//!   `declined`
//!
//! ## Effect Interfaces
//! - [`LedgerEffects`]: `get_state`, `scan_range`, `commit`
//! - [`RandomEffects`]: entropy for contract ids
//!
//! ## Invocation
//! Each economy operation runs inside one [`Invocation`]; its writes land
//! atomically or not at all, and a concurrent writer on any key it read
//! surfaces as [`FitcoinError::Conflict`].

#![forbid(unsafe_code)]

/// Policy configuration and loading
pub mod config;

/// Pure effect interfaces (no implementations)
pub mod effects;

/// Unified error handling
pub mod errors;

/// Member, product and contract identifiers
pub mod identifiers;

/// Per-operation transaction
pub mod invocation;

/// Ledger key layout
pub mod keys;

/// Persisted record types
pub mod types;

pub use config::{AccrualConfig, AccrualPolicy, EconomyConfig, FitcoinConfig};
pub use effects::{
    CommitUnit, LedgerEffects, LedgerError, RandomEffects, RangeRead, Version, VersionedValue,
};
pub use errors::{ErrorClass, ErrorKind, FitcoinError, Result};
pub use identifiers::{ContractId, MemberId, ProductId};
pub use invocation::Invocation;
pub use keys::KeyRange;
pub use types::{Contract, ContractState, Member, MemberKind, Product, Seller, User};
