//! Purchase contracts and their settlement state machine
//!
//! ```text
//!            ┌──────────► Complete
//!   Pending ─┤
//!            └──────────► Declined
//! ```
//!
//! `Pending` is the only initial state. `Complete` and `Declined` are
//! terminal: once a contract leaves `Pending` no further transition is
//! accepted.

use crate::errors::{FitcoinError, Result};
use crate::identifiers::{ContractId, MemberId, ProductId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Settlement state of a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContractState {
    /// Created, awaiting settlement
    Pending,
    /// Currency and inventory moved
    Complete,
    /// Rejected without effects
    Declined,
}

impl ContractState {
    /// Terminal states admit no further transitions
    pub fn is_terminal(self) -> bool {
        !matches!(self, ContractState::Pending)
    }
}

impl fmt::Display for ContractState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractState::Pending => write!(f, "pending"),
            ContractState::Complete => write!(f, "complete"),
            ContractState::Declined => write!(f, "declined"),
        }
    }
}

impl FromStr for ContractState {
    type Err = FitcoinError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(ContractState::Pending),
            "complete" => Ok(ContractState::Complete),
            "declined" => Ok(ContractState::Declined),
            other => Err(FitcoinError::invalid_argument(format!(
                "unknown contract state '{other}'"
            ))),
        }
    }
}

/// Purchase agreement between a user and a seller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    /// Globally unique id
    pub id: ContractId,
    /// Seller providing the product
    pub seller_id: MemberId,
    /// User paying for it
    pub user_id: MemberId,
    /// Product being bought
    pub product_id: ProductId,
    /// Units bought, always positive
    pub quantity: u64,
    /// Price times quantity, fixed at creation
    pub cost: u64,
    /// Settlement state
    pub state: ContractState,
}

impl Contract {
    /// Build a pending contract
    pub fn pending(
        id: ContractId,
        seller_id: MemberId,
        user_id: MemberId,
        product_id: ProductId,
        quantity: u64,
        cost: u64,
    ) -> Self {
        Self {
            id,
            seller_id,
            user_id,
            product_id,
            quantity,
            cost,
            state: ContractState::Pending,
        }
    }

    /// Check that `target` is a legal next state without applying it
    pub fn check_transition(&self, target: ContractState) -> Result<()> {
        if self.state.is_terminal() {
            return Err(FitcoinError::AlreadySettled {
                contract_id: self.id.to_string(),
                state: self.state,
            });
        }
        if target == ContractState::Pending {
            return Err(FitcoinError::invalid_argument(format!(
                "contract {} can only settle to complete or declined",
                self.id
            )));
        }
        Ok(())
    }

    /// Move to `target`, enforcing the at-most-once transition rule
    pub fn transition(&mut self, target: ContractState) -> Result<()> {
        self.check_transition(target)?;
        self.state = target;
        Ok(())
    }
}
