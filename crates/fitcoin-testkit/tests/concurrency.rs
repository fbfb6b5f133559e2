//! Interleaved and parallel invocations over shared keys

use assert_matches::assert_matches;
use fitcoin_core::{ContractState, EconomyConfig, FitcoinError, Invocation, MemberKind};
use fitcoin_economy::{accrual, contract, registry, Economy};
use fitcoin_testkit::{
    assert_conserved, assert_stock, assert_user_balance, DeterministicRandomHandler,
    EconomyFixture,
};
use futures::future::join_all;

#[tokio::test]
async fn later_commit_on_the_same_user_conflicts() {
    let fixture = EconomyFixture::builder()
        .seller("s1")
        .product("s1", "p1", 10, 10)
        .user("u1", 100)
        .build()
        .await;
    let first = fixture.purchase("s1", "u1", "p1", 5).await;
    let second = fixture.purchase("s1", "u1", "p1", 5).await;
    let ledger = fixture.ledger();

    // Both settlements read u1 with 100 fitcoin before either commits.
    let mut tx_a = Invocation::new(ledger);
    let mut tx_b = Invocation::new(ledger);
    contract::settle_contract(&mut tx_a, &first.id, ContractState::Complete)
        .await
        .unwrap();
    contract::settle_contract(&mut tx_b, &second.id, ContractState::Complete)
        .await
        .unwrap();

    tx_a.commit().await.unwrap();
    assert_matches!(tx_b.commit().await, Err(FitcoinError::Conflict { .. }));

    assert_user_balance!(fixture, "u1", 50);
    assert_stock!(fixture, "s1", "p1", 5);
    let second = fixture.economy().get_contract(&second.id).await.unwrap();
    assert_eq!(second.state, ContractState::Pending);
    assert_conserved(&fixture).await;
}

#[tokio::test]
async fn racing_registrations_of_one_id_admit_one() {
    let fixture = EconomyFixture::new();
    let ledger = fixture.ledger();

    let mut tx_a = Invocation::new(ledger);
    let mut tx_b = Invocation::new(ledger);
    registry::create_member(&mut tx_a, &"m1".into(), MemberKind::User)
        .await
        .unwrap();
    registry::create_member(&mut tx_b, &"m1".into(), MemberKind::Seller)
        .await
        .unwrap();

    tx_a.commit().await.unwrap();
    assert_matches!(tx_b.commit().await, Err(FitcoinError::Conflict { key }) if key == "member/m1");
    fixture.user("m1").await;
}

#[tokio::test]
async fn replayed_accrual_in_parallel_mints_once() {
    let fixture = EconomyFixture::builder().user("u1", 0).build().await;
    let config = fixture.economy().config().accrual.clone();
    let ledger = fixture.ledger();

    let mut tx_a = Invocation::new(ledger);
    let mut tx_b = Invocation::new(ledger);
    accrual::accrue(&mut tx_a, &config, &"u1".into(), 500)
        .await
        .unwrap();
    accrual::accrue(&mut tx_b, &config, &"u1".into(), 500)
        .await
        .unwrap();
    tx_a.commit().await.unwrap();
    assert_matches!(tx_b.commit().await, Err(FitcoinError::Conflict { .. }));

    assert_user_balance!(fixture, "u1", 5);
}

#[tokio::test]
async fn new_contract_invalidates_an_open_listing() {
    let fixture = EconomyFixture::builder()
        .seller("s1")
        .product("s1", "p1", 10, 1)
        .user("u1", 10)
        .user("u2", 10)
        .build()
        .await;
    let ledger = fixture.ledger();

    // A listing that also writes must see a stable contract range.
    let mut tx = Invocation::new(ledger);
    let seen = contract::list_all_contracts(&mut tx).await.unwrap();
    assert!(seen.is_empty());
    let mut user = registry::get_user(&mut tx, &"u2".into()).await.unwrap();
    user.contract_ids.clear();
    registry::put_user(&mut tx, &user).unwrap();

    fixture.purchase("s1", "u1", "p1", 1).await;
    assert_matches!(tx.commit().await, Err(FitcoinError::Conflict { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn parallel_settlements_never_overdraw() {
    let fixture = EconomyFixture::builder()
        .seller("s1")
        .product("s1", "p1", 100, 10)
        .user("u1", 50)
        .build()
        .await;
    let mut ids = Vec::new();
    for _ in 0..8 {
        ids.push(fixture.purchase("s1", "u1", "p1", 1).await.id);
    }

    let tasks = ids.iter().map(|id| {
        let economy = fixture.economy().clone();
        let id = id.clone();
        tokio::spawn(async move {
            // Callers own the retry policy; retry conflicts a bounded number of times.
            for _ in 0..32 {
                match economy.settle_contract(&id, ContractState::Complete).await {
                    Err(FitcoinError::Conflict { .. }) => tokio::task::yield_now().await,
                    other => return other,
                }
            }
            Err(FitcoinError::Conflict { key: id.to_string() })
        })
    });
    let results: Vec<_> = join_all(tasks)
        .await
        .into_iter()
        .map(|joined| joined.unwrap())
        .collect();

    let completed = results.iter().filter(|r| r.is_ok()).count();
    let refused = results
        .iter()
        .filter(|r| matches!(r, Err(FitcoinError::InsufficientFunds { .. })))
        .count();
    assert_eq!(completed, 5);
    assert_eq!(refused, 3);

    assert_user_balance!(fixture, "u1", 0);
    assert_stock!(fixture, "s1", "p1", 95);
    assert_conserved(&fixture).await;
}

#[tokio::test]
async fn economies_over_one_ledger_share_state() {
    let fixture = EconomyFixture::builder().user("u1", 0).build().await;
    let other = Economy::new(
        fixture.ledger().clone(),
        DeterministicRandomHandler::with_seed(1),
        EconomyConfig::default(),
    )
    .unwrap();

    other.accrue(&"u1".into(), 300).await.unwrap();
    assert_user_balance!(fixture, "u1", 3);
}
