//! Contract listings

use crate::listing::RecordListing;
use crate::registry;
use fitcoin_core::keys::{contract_key, contract_range};
use fitcoin_core::{Contract, FitcoinError, Invocation, LedgerEffects, MemberId, Result};

/// Every contract on the ledger, ascending by id
pub async fn list_all_contracts<L>(tx: &mut Invocation<'_, L>) -> Result<RecordListing<Contract>>
where
    L: LedgerEffects + ?Sized,
{
    let rows = tx.scan_range(&contract_range()).await?;
    Ok(RecordListing::new(rows))
}

/// Contracts a user opened, in creation order
pub async fn list_contracts_for_user<L>(
    tx: &mut Invocation<'_, L>,
    user_id: &MemberId,
) -> Result<RecordListing<Contract>>
where
    L: LedgerEffects + ?Sized,
{
    let user = registry::get_user(tx, user_id).await?;
    let mut rows = Vec::with_capacity(user.contract_ids.len());
    for id in &user.contract_ids {
        let key = contract_key(id);
        let bytes = tx.get_state(&key).await?.ok_or_else(|| {
            FitcoinError::not_found(format!("contract {id} referenced by user {user_id}"))
        })?;
        rows.push((key, bytes));
    }
    Ok(RecordListing::new(rows))
}
