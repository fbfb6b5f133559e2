//! Ledger record types

pub mod contract;
pub mod member;
pub mod product;

pub use contract::{Contract, ContractState};
pub use member::{Member, MemberKind, Seller, User};
pub use product::Product;
