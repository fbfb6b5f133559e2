//! Economy facade
//!
//! Each public method is one operation: it opens an [`Invocation`], runs the
//! component logic against it and commits. A failing operation never reaches
//! the commit, so its buffered writes are dropped with the invocation.
//! Conflicting commits surface as [`FitcoinError::Conflict`]; retrying is the
//! caller's decision.

use crate::accrual::{self, AccrualOutcome};
use crate::catalog::{self, ForSaleListing};
use crate::contract::{self, PurchaseRequest};
use crate::listing::RecordListing;
use crate::registry;
use fitcoin_core::{
    Contract, ContractId, ContractState, EconomyConfig, FitcoinConfig, FitcoinError, Invocation,
    LedgerEffects, Member, MemberId, MemberKind, Product, ProductId, RandomEffects, Result,
};
use tracing::info;

/// The fitcoin economy over a ledger and a randomness source
#[derive(Debug, Clone)]
pub struct Economy<L, R> {
    ledger: L,
    random: R,
    config: EconomyConfig,
}

impl<L, R> Economy<L, R>
where
    L: LedgerEffects,
    R: RandomEffects,
{
    /// Build an economy, rejecting an invalid configuration
    pub fn new(ledger: L, random: R, config: EconomyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ledger,
            random,
            config,
        })
    }

    /// Active policy configuration
    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Underlying ledger handler
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    fn begin(&self) -> Invocation<'_, L> {
        Invocation::new(&self.ledger)
    }

    /// Register a user or seller
    pub async fn create_member(&self, id: &MemberId, kind: MemberKind) -> Result<Member> {
        let mut tx = self.begin();
        let member = registry::create_member(&mut tx, id, kind).await?;
        tx.commit().await?;
        info!(member_id = %id, %kind, "Member created");
        Ok(member)
    }

    /// Fetch a member of the given kind
    pub async fn get_member(&self, id: &MemberId, kind: MemberKind) -> Result<Member> {
        let mut tx = self.begin();
        registry::get_member(&mut tx, id, kind).await
    }

    /// Report a user's cumulative activity counter
    pub async fn accrue(&self, user_id: &MemberId, reported: u64) -> Result<AccrualOutcome> {
        let mut tx = self.begin();
        let outcome = accrual::accrue(&mut tx, &self.config.accrual, user_id, reported).await?;
        tx.commit().await?;
        if outcome.earned > 0 {
            info!(
                user_id = %user_id,
                earned = outcome.earned,
                balance = outcome.balance(),
                "Fitcoin accrued"
            );
        }
        Ok(outcome)
    }

    /// Add or overwrite a seller's product
    pub async fn create_or_update_product(
        &self,
        seller_id: &MemberId,
        product: Product,
    ) -> Result<Product> {
        let mut tx = self.begin();
        let product = catalog::create_or_update_product(&mut tx, seller_id, product).await?;
        tx.commit().await?;
        info!(seller_id = %seller_id, product_id = %product.id, "Product stored");
        Ok(product)
    }

    /// Fetch one product of a seller
    pub async fn get_product(&self, seller_id: &MemberId, product_id: &ProductId) -> Result<Product> {
        let mut tx = self.begin();
        catalog::get_product(&mut tx, seller_id, product_id).await
    }

    /// Every in-stock product across sellers
    pub async fn list_for_sale(&self) -> Result<ForSaleListing> {
        let mut tx = self.begin();
        catalog::list_for_sale(&mut tx).await
    }

    /// Open a pending purchase contract
    pub async fn create_contract(&self, request: PurchaseRequest) -> Result<Contract> {
        let mut tx = self.begin();
        let contract =
            contract::create_contract(&mut tx, &self.random, &self.config, request).await?;
        tx.commit().await?;
        info!(contract_id = %contract.id, cost = contract.cost, "Contract opened");
        Ok(contract)
    }

    /// Settle a pending contract
    pub async fn settle_contract(&self, id: &ContractId, target: ContractState) -> Result<Contract> {
        let mut tx = self.begin();
        let contract = contract::settle_contract(&mut tx, id, target).await?;
        tx.commit().await?;
        info!(contract_id = %id, state = %contract.state, "Contract settled");
        Ok(contract)
    }

    /// Fetch a contract
    pub async fn get_contract(&self, id: &ContractId) -> Result<Contract> {
        let mut tx = self.begin();
        contract::get_contract(&mut tx, id).await
    }

    /// Contracts opened by a user, in creation order
    pub async fn list_contracts_for_user(&self, user_id: &MemberId) -> Result<RecordListing<Contract>> {
        let mut tx = self.begin();
        contract::list_contracts_for_user(&mut tx, user_id).await
    }

    /// Every contract, ascending by id
    pub async fn list_all_contracts(&self) -> Result<RecordListing<Contract>> {
        let mut tx = self.begin();
        contract::list_all_contracts(&mut tx).await
    }

    /// Raw bytes stored under a ledger key
    pub async fn get_data_by_key(&self, key: &str) -> Result<Vec<u8>> {
        if key.is_empty() {
            return Err(FitcoinError::invalid_argument("key must not be empty"));
        }
        let mut tx = self.begin();
        tx.get_state(key)
            .await?
            .ok_or_else(|| FitcoinError::not_found(format!("key {key}")))
    }
}
