//! Fitcoin Economy - business rules over the ledger
//!
//! Users convert activity into fitcoin, sellers list products, and purchase
//! contracts move fitcoin and inventory between them.
//!
//! - [`registry`]: member creation and lookup
//! - [`catalog`]: products and the for-sale listing
//! - [`accrual`]: activity-to-fitcoin conversion
//! - [`contract`]: the purchase contract state machine
//! - [`Economy`]: one committed invocation per operation
//! - [`dispatch`]: the positional string-argument surface
//!
//! Component functions take an open [`fitcoin_core::Invocation`] so several
//! of them can share one atomic write set; [`Economy`] is the usual entry
//! point.

#![forbid(unsafe_code)]

pub mod accrual;
pub mod catalog;
pub mod contract;
pub mod dispatch;
pub mod economy;
pub mod listing;
pub mod registry;

pub use accrual::AccrualOutcome;
pub use catalog::{ForSaleItem, ForSaleListing};
pub use contract::PurchaseRequest;
pub use dispatch::{Operation, OPERATION_NAMES};
pub use economy::Economy;
pub use listing::RecordListing;
