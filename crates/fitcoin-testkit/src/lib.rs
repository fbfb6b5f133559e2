//! Fitcoin Testing Infrastructure
//!
//! Deterministic handlers, fixtures and property strategies shared by the
//! workspace's tests.
//!
//! # Usage
//!
//! ```rust,no_run
//! use fitcoin_testkit::EconomyFixture;
//!
//! # async fn example() {
//! let fixture = EconomyFixture::builder()
//!     .seller("s1")
//!     .product("s1", "p1", 5, 10)
//!     .user("u1", 100)
//!     .build()
//!     .await;
//! fixture.buy("s1", "u1", "p1", 3).await;
//! # }
//! ```

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

pub mod assertions;
pub mod faults;
pub mod fixtures;
pub mod random;
pub mod scenario;
pub mod strategies;

pub use assertions::{assert_conserved, assert_watermarks};
pub use faults::FlakyLedgerHandler;
pub use fixtures::{EconomyFixture, EconomyFixtureBuilder, TestEconomy};
pub use random::{DeterministicRandomHandler, ScriptedRandomHandler};
pub use scenario::{ScenarioReport, ScenarioRunner};
