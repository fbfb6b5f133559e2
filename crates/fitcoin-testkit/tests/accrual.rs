//! Activity accrual scenarios

use assert_matches::assert_matches;
use fitcoin_core::{AccrualConfig, AccrualPolicy, EconomyConfig, FitcoinError};
use fitcoin_testkit::{assert_conserved, assert_user_balance, assert_watermarks, EconomyFixture};

fn with_policy(policy: AccrualPolicy, threshold: u64) -> EconomyConfig {
    EconomyConfig {
        accrual: AccrualConfig { threshold, policy },
        ..EconomyConfig::default()
    }
}

#[tokio::test]
async fn remainder_is_banked_for_the_next_report() {
    let fixture = EconomyFixture::builder().user("u1", 0).build().await;
    let economy = fixture.economy();

    let outcome = economy.accrue(&"u1".into(), 250).await.unwrap();
    assert_eq!(outcome.earned, 2);
    assert_eq!(outcome.user.fitcoin_balance, 2);
    assert_eq!(outcome.user.activity_units_converted, 200);
    assert_eq!(outcome.user.total_activity_units, 250);

    let outcome = economy.accrue(&"u1".into(), 300).await.unwrap();
    assert_eq!(outcome.earned, 1);
    assert_eq!(outcome.user.activity_units_converted, 300);
    assert_user_balance!(fixture, "u1", 3);
    assert_watermarks(&fixture).await;
    assert_conserved(&fixture).await;
}

#[tokio::test]
async fn replayed_report_mints_nothing() {
    let fixture = EconomyFixture::builder().user("u1", 0).build().await;
    let economy = fixture.economy();

    economy.accrue(&"u1".into(), 250).await.unwrap();
    let head = fixture.ledger().stats().await.head;
    for _ in 0..3 {
        let outcome = economy.accrue(&"u1".into(), 250).await.unwrap();
        assert_eq!(outcome.earned, 0);
    }
    assert_user_balance!(fixture, "u1", 2);
    assert_eq!(fixture.ledger().stats().await.head, head);
}

#[tokio::test]
async fn below_threshold_is_a_no_op() {
    let fixture = EconomyFixture::builder().user("u1", 0).build().await;
    let outcome = fixture.economy().accrue(&"u1".into(), 99).await.unwrap();
    assert_eq!(outcome.earned, 0);
    assert_eq!(outcome.user.total_activity_units, 0);
    assert_user_balance!(fixture, "u1", 0);
}

#[tokio::test]
async fn regressed_counter_is_rejected() {
    let fixture = EconomyFixture::builder().user("u1", 0).build().await;
    let economy = fixture.economy();
    economy.accrue(&"u1".into(), 250).await.unwrap();

    assert_matches!(
        economy.accrue(&"u1".into(), 249).await,
        Err(FitcoinError::RegressedCounter {
            reported: 249,
            recorded: 250,
            ..
        })
    );
    assert_user_balance!(fixture, "u1", 2);
}

#[tokio::test]
async fn exact_multiple_policy_skips_uneven_deltas() {
    let fixture = EconomyFixture::builder()
        .config(with_policy(AccrualPolicy::ExactMultiple, 100))
        .user("u1", 0)
        .build()
        .await;
    let economy = fixture.economy();

    assert_eq!(economy.accrue(&"u1".into(), 250).await.unwrap().earned, 0);
    assert_eq!(economy.accrue(&"u1".into(), 300).await.unwrap().earned, 3);
    assert_eq!(economy.accrue(&"u1".into(), 450).await.unwrap().earned, 0);
    assert_eq!(economy.accrue(&"u1".into(), 500).await.unwrap().earned, 2);
    assert_user_balance!(fixture, "u1", 5);
    assert_watermarks(&fixture).await;
}

#[tokio::test]
async fn threshold_comes_from_config() {
    let fixture = EconomyFixture::builder()
        .config(with_policy(AccrualPolicy::BankRemainder, 10))
        .user("u1", 0)
        .build()
        .await;
    let outcome = fixture.economy().accrue(&"u1".into(), 95).await.unwrap();
    assert_eq!(outcome.earned, 9);
    assert_eq!(outcome.user.activity_units_converted, 90);
}

#[tokio::test]
async fn only_users_accrue() {
    let fixture = EconomyFixture::builder().seller("s1").build().await;
    assert_matches!(
        fixture.economy().accrue(&"s1".into(), 500).await,
        Err(FitcoinError::KindMismatch { .. })
    );
    assert_matches!(
        fixture.economy().accrue(&"ghost".into(), 500).await,
        Err(FitcoinError::NotFound { .. })
    );
}
