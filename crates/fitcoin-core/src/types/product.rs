//! Product inventory listed by a seller

use crate::errors::{FitcoinError, Result};
use crate::identifiers::ProductId;
use serde::{Deserialize, Serialize};

/// Priced inventory item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Product id, unique within its seller
    pub id: ProductId,
    /// Display name
    pub name: String,
    /// Units available
    pub count: u64,
    /// Fitcoin per unit
    pub price: u64,
}

impl Product {
    /// Build a product listing
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, count: u64, price: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            count,
            price,
        }
    }

    /// Price of `quantity` units, failing on overflow
    pub fn cost_of(&self, quantity: u64) -> Result<u64> {
        self.price.checked_mul(quantity).ok_or_else(|| {
            FitcoinError::invalid_argument(format!(
                "cost of {quantity} x {} overflows",
                self.price
            ))
        })
    }

    /// Take `quantity` units out of inventory, never below zero
    pub fn withdraw(&mut self, quantity: u64) -> Result<()> {
        self.count = self.count.checked_sub(quantity).ok_or_else(|| {
            FitcoinError::InsufficientInventory {
                product_id: self.id.to_string(),
                available: self.count,
                requested: quantity,
            }
        })?;
        Ok(())
    }

    /// Whether at least one unit can be bought
    pub fn in_stock(&self) -> bool {
        self.count > 0
    }
}
