//! Purchase contract engine
//!
//! Contracts are stored under `contract/<id>`; each user record also lists
//! the ids of its contracts, updated in the same commit that creates them.

pub mod engine;
pub mod query;

pub use engine::{create_contract, get_contract, settle_contract, PurchaseRequest};
pub use query::{list_all_contracts, list_contracts_for_user};
