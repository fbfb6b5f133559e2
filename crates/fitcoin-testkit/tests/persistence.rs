//! Economy over the file-backed ledger and under injected storage faults

use assert_matches::assert_matches;
use fitcoin_core::{ContractState, EconomyConfig, FitcoinError, MemberKind, Product};
use fitcoin_economy::{Economy, PurchaseRequest};
use fitcoin_effects::{FilesystemLedgerHandler, MemoryLedgerHandler};
use fitcoin_testkit::{DeterministicRandomHandler, FlakyLedgerHandler};
use std::path::Path;

#[tokio::test]
async fn economy_state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");

    let contract_id = {
        let economy = Economy::new(
            FilesystemLedgerHandler::open(&path).await.unwrap(),
            DeterministicRandomHandler::deterministic(),
            EconomyConfig::default(),
        )
        .unwrap();
        economy
            .create_member(&"s1".into(), MemberKind::Seller)
            .await
            .unwrap();
        economy
            .create_member(&"u1".into(), MemberKind::User)
            .await
            .unwrap();
        economy
            .create_or_update_product(&"s1".into(), Product::new("p1", "Shirt", 5, 10))
            .await
            .unwrap();
        economy.accrue(&"u1".into(), 10_000).await.unwrap();
        economy
            .create_contract(PurchaseRequest {
                seller_id: "s1".into(),
                user_id: "u1".into(),
                product_id: "p1".into(),
                quantity: 3,
            })
            .await
            .unwrap()
            .id
    };

    let economy = Economy::new(
        FilesystemLedgerHandler::open(&path).await.unwrap(),
        DeterministicRandomHandler::deterministic(),
        EconomyConfig::default(),
    )
    .unwrap();
    economy
        .settle_contract(&contract_id, ContractState::Complete)
        .await
        .unwrap();

    let user = economy
        .get_member(&"u1".into(), MemberKind::User)
        .await
        .unwrap();
    assert_eq!(user.fitcoin_balance(), 70);
    let product = economy
        .get_product(&"s1".into(), &"p1".into())
        .await
        .unwrap();
    assert_eq!(product.count, 2);
}

async fn file_economy(
    path: &Path,
    seed: u64,
) -> Economy<FilesystemLedgerHandler, DeterministicRandomHandler> {
    Economy::new(
        FilesystemLedgerHandler::open(path).await.unwrap(),
        DeterministicRandomHandler::with_seed(seed),
        EconomyConfig::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn economies_sharing_a_file_keep_every_acknowledged_commit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let first = file_economy(&path, 1).await;
    let second = file_economy(&path, 2).await;

    first
        .create_member(&"u1".into(), MemberKind::User)
        .await
        .unwrap();
    second
        .create_member(&"s1".into(), MemberKind::Seller)
        .await
        .unwrap();

    let reopened = file_economy(&path, 3).await;
    reopened
        .get_member(&"u1".into(), MemberKind::User)
        .await
        .unwrap();
    reopened
        .get_member(&"s1".into(), MemberKind::Seller)
        .await
        .unwrap();
}

#[tokio::test]
async fn settlement_from_a_stale_handler_conflicts_instead_of_repeating() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");
    let setup = file_economy(&path, 1).await;
    setup
        .create_member(&"s1".into(), MemberKind::Seller)
        .await
        .unwrap();
    setup
        .create_member(&"u1".into(), MemberKind::User)
        .await
        .unwrap();
    setup
        .create_or_update_product(&"s1".into(), Product::new("p1", "Shirt", 5, 10))
        .await
        .unwrap();
    setup.accrue(&"u1".into(), 10_000).await.unwrap();
    let contract = setup
        .create_contract(PurchaseRequest {
            seller_id: "s1".into(),
            user_id: "u1".into(),
            product_id: "p1".into(),
            quantity: 3,
        })
        .await
        .unwrap();

    let first = file_economy(&path, 2).await;
    let second = file_economy(&path, 3).await;
    first
        .settle_contract(&contract.id, ContractState::Complete)
        .await
        .unwrap();
    assert_matches!(
        second
            .settle_contract(&contract.id, ContractState::Complete)
            .await,
        Err(FitcoinError::Conflict { .. })
    );
    // once refreshed, the second handler sees the settled contract
    assert_matches!(
        second
            .settle_contract(&contract.id, ContractState::Complete)
            .await,
        Err(FitcoinError::AlreadySettled { .. })
    );

    let reopened = file_economy(&path, 4).await;
    let user = reopened
        .get_member(&"u1".into(), MemberKind::User)
        .await
        .unwrap();
    assert_eq!(user.fitcoin_balance(), 70);
    let product = reopened
        .get_product(&"s1".into(), &"p1".into())
        .await
        .unwrap();
    assert_eq!(product.count, 2);
}

#[tokio::test]
async fn failed_commit_surfaces_as_storage_unavailable() {
    let ledger = FlakyLedgerHandler::wrap(MemoryLedgerHandler::new());
    let economy = Economy::new(
        ledger.clone(),
        DeterministicRandomHandler::deterministic(),
        EconomyConfig::default(),
    )
    .unwrap();
    economy
        .create_member(&"u1".into(), MemberKind::User)
        .await
        .unwrap();

    ledger.fail_commits(true);
    let err = economy.accrue(&"u1".into(), 500).await.unwrap_err();
    assert_matches!(err, FitcoinError::StorageUnavailable { .. });
    assert!(!err.kind().is_retryable());
    assert_eq!(ledger.rejected_commits(), 1);

    ledger.fail_commits(false);
    let user = economy
        .get_member(&"u1".into(), MemberKind::User)
        .await
        .unwrap();
    assert_eq!(user.fitcoin_balance(), 0);
}

#[tokio::test]
async fn failed_reads_abort_before_any_write() {
    let ledger = FlakyLedgerHandler::wrap(MemoryLedgerHandler::new());
    let economy = Economy::new(
        ledger.clone(),
        DeterministicRandomHandler::deterministic(),
        EconomyConfig::default(),
    )
    .unwrap();

    ledger.fail_reads(true);
    assert_matches!(
        economy.create_member(&"u1".into(), MemberKind::User).await,
        Err(FitcoinError::StorageUnavailable { .. })
    );
    assert_matches!(
        economy.list_for_sale().await,
        Err(FitcoinError::StorageUnavailable { .. })
    );
    assert_eq!(ledger.inner().stats().await.key_count, 0);
}
