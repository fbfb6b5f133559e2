//! Replays generated action sequences against an economy

use crate::fixtures::EconomyFixture;
use crate::strategies::{EconomyAction, PRODUCTS, SELLERS, USERS};
use fitcoin_core::{ContractId, ErrorClass, FitcoinError, MemberKind, Result};
use fitcoin_economy::PurchaseRequest;
use std::collections::BTreeMap;

/// Outcome counts of a replayed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioReport {
    /// Actions that succeeded
    pub applied: usize,
    /// Actions refused by an economic or structural rule
    pub rejected: usize,
    /// Contracts opened
    pub contracts: Vec<ContractId>,
}

/// Drives [`EconomyAction`]s against a fixture, tracking activity counters
#[derive(Debug)]
pub struct ScenarioRunner<'a> {
    fixture: &'a EconomyFixture,
    activity: BTreeMap<&'static str, u64>,
    report: ScenarioReport,
}

impl<'a> ScenarioRunner<'a> {
    /// Register the standard users and sellers, each seller listing every
    /// product id with no stock
    pub async fn setup(fixture: &'a EconomyFixture) -> ScenarioRunner<'a> {
        let economy = fixture.economy();
        for seller in SELLERS {
            economy
                .create_member(&(*seller).into(), MemberKind::Seller)
                .await
                .expect("seller must be created");
            for product in PRODUCTS {
                fixture.add_product(seller, product, 0, 1).await;
            }
        }
        for user in USERS {
            economy
                .create_member(&(*user).into(), MemberKind::User)
                .await
                .expect("user must be created");
        }
        Self {
            fixture,
            activity: BTreeMap::new(),
            report: ScenarioReport::default(),
        }
    }

    /// Apply one action.
    ///
    /// Business and structural rejections are counted; infrastructure
    /// failures are returned.
    pub async fn apply(&mut self, action: &EconomyAction) -> Result<()> {
        match self.run(action).await {
            Ok(()) => {
                self.report.applied += 1;
                Ok(())
            }
            Err(err) if err.kind().class() != ErrorClass::Infrastructure => {
                self.report.rejected += 1;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn run(&mut self, action: &EconomyAction) -> Result<()> {
        let fixture = self.fixture;
        let economy = fixture.economy();
        match action {
            EconomyAction::Accrue { user, increment } => {
                let total = self.activity.entry(*user).or_insert(0);
                *total += *increment;
                economy.accrue(&(*user).into(), *total).await?;
            }
            EconomyAction::Restock { seller, product } => {
                economy
                    .create_or_update_product(&(*seller).into(), product.clone())
                    .await?;
            }
            EconomyAction::Purchase {
                seller,
                user,
                product,
                quantity,
            } => {
                let contract = economy
                    .create_contract(PurchaseRequest {
                        seller_id: (*seller).into(),
                        user_id: (*user).into(),
                        product_id: (*product).into(),
                        quantity: *quantity,
                    })
                    .await?;
                self.report.contracts.push(contract.id);
            }
            EconomyAction::Settle { index, target } => {
                if self.report.contracts.is_empty() {
                    return Err(FitcoinError::not_found("no contracts yet"));
                }
                let id = self.report.contracts[*index % self.report.contracts.len()].clone();
                economy.settle_contract(&id, *target).await?;
            }
        }
        Ok(())
    }

    /// Counts so far
    pub fn report(&self) -> &ScenarioReport {
        &self.report
    }
}
