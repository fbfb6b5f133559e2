//! Assertion helpers for economy tests

use crate::fixtures::EconomyFixture;

/// Assert a user's balance
#[macro_export]
macro_rules! assert_user_balance {
    ($fixture:expr, $user:expr, $expected:expr) => {
        assert_eq!(
            $fixture.user($user).await.fitcoin_balance,
            $expected,
            "unexpected balance for user {}",
            $user
        )
    };
}

/// Assert a seller's balance
#[macro_export]
macro_rules! assert_seller_balance {
    ($fixture:expr, $seller:expr, $expected:expr) => {
        assert_eq!(
            $fixture.seller($seller).await.fitcoin_balance,
            $expected,
            "unexpected balance for seller {}",
            $seller
        )
    };
}

/// Assert a product's stock
#[macro_export]
macro_rules! assert_stock {
    ($fixture:expr, $seller:expr, $product:expr, $expected:expr) => {
        assert_eq!(
            $fixture.product($seller, $product).await.count,
            $expected,
            "unexpected stock for {}/{}",
            $seller,
            $product
        )
    };
}

/// Assert that settlement only moved fitcoin around: the sum of balances
/// equals everything minted through accrual
pub async fn assert_conserved(fixture: &EconomyFixture) {
    let held = fixture.total_fitcoin().await;
    let minted = fixture.total_minted().await;
    assert_eq!(held, minted, "fitcoin held ({held}) != fitcoin minted ({minted})");
}

/// Assert that every user's activity watermarks are consistent
pub async fn assert_watermarks(fixture: &EconomyFixture) {
    let threshold = fixture.economy().config().accrual.threshold;
    for member in fixture.members().await {
        if let Ok(user) = member.into_user() {
            assert!(
                user.activity_units_converted <= user.total_activity_units,
                "user {} converted more than reported",
                user.id
            );
            assert_eq!(
                user.activity_units_converted % threshold,
                0,
                "user {} converted a partial threshold",
                user.id
            );
        }
    }
}
