//! Property test strategies for fitcoin types
//!
//! Ids are drawn from small pools so generated operation sequences keep
//! hitting the same members and products.

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use fitcoin_core::{AccrualConfig, AccrualPolicy, ContractState, Product};

/// Users present in generated scenarios
pub const USERS: &[&str] = &["u1", "u2", "u3"];

/// Sellers present in generated scenarios
pub const SELLERS: &[&str] = &["s1", "s2"];

/// Product ids every seller lists
pub const PRODUCTS: &[&str] = &["p1", "p2"];

/// Strategy for a user id from [`USERS`]
pub fn arb_user_id() -> impl Strategy<Value = &'static str> {
    prop::sample::select(USERS)
}

/// Strategy for a seller id from [`SELLERS`]
pub fn arb_seller_id() -> impl Strategy<Value = &'static str> {
    prop::sample::select(SELLERS)
}

/// Strategy for a product id from [`PRODUCTS`]
pub fn arb_product_id() -> impl Strategy<Value = &'static str> {
    prop::sample::select(PRODUCTS)
}

/// Strategy for a product with modest stock and price
pub fn arb_product() -> impl Strategy<Value = Product> {
    (arb_product_id(), 0u64..20, 0u64..50)
        .prop_map(|(id, count, price)| Product::new(id, format!("item-{id}"), count, price))
}

/// Strategy for an accrual policy
pub fn arb_accrual_policy() -> impl Strategy<Value = AccrualPolicy> {
    prop_oneof![
        Just(AccrualPolicy::BankRemainder),
        Just(AccrualPolicy::ExactMultiple),
    ]
}

/// Strategy for a valid accrual configuration
pub fn arb_accrual_config() -> impl Strategy<Value = AccrualConfig> {
    (1u64..500, arb_accrual_policy()).prop_map(|(threshold, policy)| AccrualConfig { threshold, policy })
}

/// One step of a generated economy run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EconomyAction {
    /// Report `increment` more activity for a user
    Accrue {
        /// User id
        user: &'static str,
        /// Activity added on top of the last report
        increment: u64,
    },
    /// Store a product for a seller
    Restock {
        /// Seller id
        seller: &'static str,
        /// Product to store
        product: Product,
    },
    /// Open a contract
    Purchase {
        /// Seller id
        seller: &'static str,
        /// User id
        user: &'static str,
        /// Product id
        product: &'static str,
        /// Units, possibly zero
        quantity: u64,
    },
    /// Settle the n-th contract opened so far (modulo the count)
    Settle {
        /// Index into opened contracts
        index: usize,
        /// Target state
        target: ContractState,
    },
}

/// Strategy for a single action
pub fn arb_action() -> impl Strategy<Value = EconomyAction> {
    prop_oneof![
        (arb_user_id(), 0u64..400)
            .prop_map(|(user, increment)| EconomyAction::Accrue { user, increment }),
        (arb_seller_id(), arb_product())
            .prop_map(|(seller, product)| EconomyAction::Restock { seller, product }),
        (arb_seller_id(), arb_user_id(), arb_product_id(), 0u64..6).prop_map(
            |(seller, user, product, quantity)| EconomyAction::Purchase {
                seller,
                user,
                product,
                quantity,
            }
        ),
        (
            any::<usize>(),
            prop_oneof![
                Just(ContractState::Complete),
                Just(ContractState::Declined),
                Just(ContractState::Pending),
            ]
        )
            .prop_map(|(index, target)| EconomyAction::Settle { index, target }),
    ]
}

/// Strategy for a sequence of actions
pub fn arb_actions(max_len: usize) -> impl Strategy<Value = Vec<EconomyAction>> {
    prop::collection::vec(arb_action(), 0..max_len)
}
