//! Economy fixtures
//!
//! Fixtures only go through public economy operations, so everything they
//! set up is reachable the same way production state is. Balances are
//! funded through accrual; there is no back door that mints fitcoin.

use crate::random::DeterministicRandomHandler;
use fitcoin_core::invocation::decode_record;
use fitcoin_core::keys::member_range;
use fitcoin_core::{
    Contract, ContractState, EconomyConfig, LedgerEffects, Member, MemberId, MemberKind, Product,
    Seller, User,
};
use fitcoin_economy::{Economy, PurchaseRequest};
use fitcoin_effects::MemoryLedgerHandler;

/// Economy over the in-memory ledger and seeded randomness
pub type TestEconomy = Economy<MemoryLedgerHandler, DeterministicRandomHandler>;

/// A ready-to-use economy plus helpers for inspecting it
#[derive(Debug, Clone)]
pub struct EconomyFixture {
    economy: TestEconomy,
}

impl EconomyFixture {
    /// Empty economy with default configuration
    pub fn new() -> Self {
        Self::with_config(EconomyConfig::default())
    }

    /// Empty economy with the given configuration
    pub fn with_config(config: EconomyConfig) -> Self {
        Self::with_parts(config, 42)
    }

    fn with_parts(config: EconomyConfig, seed: u64) -> Self {
        let economy = Economy::new(
            MemoryLedgerHandler::new(),
            DeterministicRandomHandler::with_seed(seed),
            config,
        )
        .expect("fixture config must be valid");
        Self { economy }
    }

    /// Start describing a populated economy
    pub fn builder() -> EconomyFixtureBuilder {
        EconomyFixtureBuilder::default()
    }

    /// The economy under test
    pub fn economy(&self) -> &TestEconomy {
        &self.economy
    }

    /// The backing ledger
    pub fn ledger(&self) -> &MemoryLedgerHandler {
        self.economy.ledger()
    }

    /// Current user record
    pub async fn user(&self, id: &str) -> User {
        self.economy
            .get_member(&id.into(), MemberKind::User)
            .await
            .and_then(Member::into_user)
            .expect("user must exist")
    }

    /// Current seller record
    pub async fn seller(&self, id: &str) -> Seller {
        self.economy
            .get_member(&id.into(), MemberKind::Seller)
            .await
            .and_then(Member::into_seller)
            .expect("seller must exist")
    }

    /// Current product record
    pub async fn product(&self, seller_id: &str, product_id: &str) -> Product {
        self.economy
            .get_product(&seller_id.into(), &product_id.into())
            .await
            .expect("product must exist")
    }

    /// Mint exactly `amount` fitcoin for a user by reporting activity
    pub async fn fund_user(&self, id: &str, amount: u64) -> User {
        let user = self.user(id).await;
        if amount == 0 {
            return user;
        }
        let threshold = self.economy.config().accrual.threshold;
        let reported = user.activity_units_converted + amount * threshold;
        self.economy
            .accrue(&id.into(), reported)
            .await
            .expect("funding accrual must succeed")
            .user
    }

    /// Store a product for a seller
    pub async fn add_product(
        &self,
        seller_id: &str,
        product_id: &str,
        count: u64,
        price: u64,
    ) -> Product {
        self.economy
            .create_or_update_product(
                &seller_id.into(),
                Product::new(product_id, product_id, count, price),
            )
            .await
            .expect("product must be stored")
    }

    /// Open a contract
    pub async fn purchase(
        &self,
        seller_id: &str,
        user_id: &str,
        product_id: &str,
        quantity: u64,
    ) -> Contract {
        self.economy
            .create_contract(PurchaseRequest {
                seller_id: seller_id.into(),
                user_id: user_id.into(),
                product_id: product_id.into(),
                quantity,
            })
            .await
            .expect("contract must be created")
    }

    /// Open and complete a contract
    pub async fn buy(&self, seller_id: &str, user_id: &str, product_id: &str, quantity: u64) -> Contract {
        let contract = self.purchase(seller_id, user_id, product_id, quantity).await;
        self.economy
            .settle_contract(&contract.id, ContractState::Complete)
            .await
            .expect("contract must complete")
    }

    /// Every member record on the ledger
    pub async fn members(&self) -> Vec<Member> {
        let range = member_range();
        self.ledger()
            .scan_range(&range.start, &range.end)
            .await
            .expect("member scan must succeed")
            .into_iter()
            .map(|(key, v)| decode_record::<Member>(&key, &v.value).expect("member must decode"))
            .collect()
    }

    /// Sum of all member balances
    pub async fn total_fitcoin(&self) -> u64 {
        self.members()
            .await
            .iter()
            .map(Member::fitcoin_balance)
            .sum()
    }

    /// Fitcoin ever minted, derived from users' converted activity
    pub async fn total_minted(&self) -> u64 {
        let threshold = self.economy.config().accrual.threshold;
        self.members()
            .await
            .into_iter()
            .filter_map(|m| m.into_user().ok())
            .map(|u| u.activity_units_converted / threshold)
            .sum()
    }
}

impl Default for EconomyFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Declarative setup for [`EconomyFixture`]
#[derive(Debug, Default)]
pub struct EconomyFixtureBuilder {
    config: EconomyConfig,
    seed: Option<u64>,
    users: Vec<(MemberId, u64)>,
    sellers: Vec<MemberId>,
    products: Vec<(MemberId, Product)>,
}

impl EconomyFixtureBuilder {
    /// Use this configuration
    pub fn config(mut self, config: EconomyConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed for contract id generation
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Add a user funded with `balance` fitcoin
    pub fn user(mut self, id: &str, balance: u64) -> Self {
        self.users.push((id.into(), balance));
        self
    }

    /// Add a seller
    pub fn seller(mut self, id: &str) -> Self {
        self.sellers.push(id.into());
        self
    }

    /// Add a product to a seller added earlier
    pub fn product(mut self, seller_id: &str, product_id: &str, count: u64, price: u64) -> Self {
        self.products
            .push((seller_id.into(), Product::new(product_id, product_id, count, price)));
        self
    }

    /// Create everything described so far
    pub async fn build(self) -> EconomyFixture {
        let fixture = EconomyFixture::with_parts(self.config, self.seed.unwrap_or(42));
        let economy = fixture.economy();

        for id in &self.sellers {
            economy
                .create_member(id, MemberKind::Seller)
                .await
                .expect("seller must be created");
        }
        for (id, _) in &self.users {
            economy
                .create_member(id, MemberKind::User)
                .await
                .expect("user must be created");
        }
        for (seller_id, product) in self.products {
            economy
                .create_or_update_product(&seller_id, product)
                .await
                .expect("product must be stored");
        }
        for (id, balance) in &self.users {
            if *balance > 0 {
                fixture.fund_user(id.as_str(), *balance).await;
            }
        }
        fixture
    }
}
