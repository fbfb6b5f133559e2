//! Contract creation and settlement
//!
//! Creation prices the purchase and records intent; nothing moves until the
//! contract settles. Settling to `Complete` debits the user, credits the
//! seller and withdraws inventory in one write set, checked in that order.

use crate::registry;
use fitcoin_core::keys::contract_key;
use fitcoin_core::{
    Contract, ContractId, ContractState, EconomyConfig, FitcoinError, Invocation, LedgerEffects,
    MemberId, ProductId, RandomEffects, Result,
};
use tracing::{debug, warn};

const MAX_ID_ATTEMPTS: usize = 4;

/// Parameters of a purchase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRequest {
    /// Seller providing the product
    pub seller_id: MemberId,
    /// User paying
    pub user_id: MemberId,
    /// Product being bought
    pub product_id: ProductId,
    /// Units to buy
    pub quantity: u64,
}

/// Draw a contract id that is not yet on the ledger
async fn allocate_contract_id<L, R>(tx: &mut Invocation<'_, L>, random: &R) -> Result<ContractId>
where
    L: LedgerEffects + ?Sized,
    R: RandomEffects + ?Sized,
{
    for _ in 0..MAX_ID_ATTEMPTS {
        let id = ContractId::from_random_bytes(random.random_bytes_16().await);
        if tx.get_state(&contract_key(&id)).await?.is_none() {
            return Ok(id);
        }
        warn!(contract_id = %id, "Contract id collision, drawing again");
    }
    Err(FitcoinError::storage(
        "could not allocate an unused contract id",
    ))
}

/// Open a pending contract and attach it to the user
pub async fn create_contract<L, R>(
    tx: &mut Invocation<'_, L>,
    random: &R,
    config: &EconomyConfig,
    request: PurchaseRequest,
) -> Result<Contract>
where
    L: LedgerEffects + ?Sized,
    R: RandomEffects + ?Sized,
{
    if request.quantity == 0 {
        return Err(FitcoinError::invalid_argument("quantity must be positive"));
    }

    let seller = registry::get_seller(tx, &request.seller_id).await?;
    let mut user = registry::get_user(tx, &request.user_id).await?;
    let product = seller.product(&request.product_id).ok_or_else(|| {
        FitcoinError::product_not_found(request.seller_id.as_str(), request.product_id.as_str())
    })?;
    let cost = product.cost_of(request.quantity)?;

    if config.funds_precheck && user.fitcoin_balance < cost {
        return Err(FitcoinError::InsufficientFunds {
            member_id: user.id.to_string(),
            balance: user.fitcoin_balance,
            required: cost,
        });
    }

    let id = allocate_contract_id(tx, random).await?;
    let contract = Contract::pending(
        id.clone(),
        request.seller_id,
        request.user_id,
        request.product_id,
        request.quantity,
        cost,
    );

    tx.put_record(contract_key(&id), &contract)?;
    user.contract_ids.push(id);
    registry::put_user(tx, &user)?;

    debug!(
        contract_id = %contract.id,
        seller_id = %contract.seller_id,
        user_id = %contract.user_id,
        cost,
        "Contract created"
    );
    Ok(contract)
}

/// Fetch a contract by id
pub async fn get_contract<L>(tx: &mut Invocation<'_, L>, id: &ContractId) -> Result<Contract>
where
    L: LedgerEffects + ?Sized,
{
    tx.get_record(&contract_key(id))
        .await?
        .ok_or_else(|| FitcoinError::not_found(format!("contract {id}")))
}

/// Move a pending contract to `Complete` or `Declined`
pub async fn settle_contract<L>(
    tx: &mut Invocation<'_, L>,
    id: &ContractId,
    target: ContractState,
) -> Result<Contract>
where
    L: LedgerEffects + ?Sized,
{
    let mut contract = get_contract(tx, id).await?;
    if target == ContractState::Pending {
        return Err(FitcoinError::invalid_argument(format!(
            "contract {id} can only settle to complete or declined"
        )));
    }
    contract.check_transition(target)?;

    if target == ContractState::Complete {
        let mut user = registry::get_user(tx, &contract.user_id).await?;
        user.debit(contract.cost)?;

        let mut seller = registry::get_seller(tx, &contract.seller_id).await?;
        seller.credit(contract.cost)?;
        seller
            .product_mut(&contract.product_id)
            .ok_or_else(|| {
                FitcoinError::product_not_found(
                    contract.seller_id.as_str(),
                    contract.product_id.as_str(),
                )
            })?
            .withdraw(contract.quantity)?;

        registry::put_user(tx, &user)?;
        registry::put_seller(tx, &seller)?;
    }

    contract.transition(target)?;
    tx.put_record(contract_key(id), &contract)?;
    debug!(contract_id = %id, state = %target, "Contract settled");
    Ok(contract)
}
