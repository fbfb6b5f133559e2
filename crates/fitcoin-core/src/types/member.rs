//! Member records: users who earn fitcoin and sellers who list products

use super::product::Product;
use crate::errors::{FitcoinError, Result};
use crate::identifiers::{ContractId, MemberId, ProductId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role a member plays in the economy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    /// Earns fitcoin from activity and buys products
    User,
    /// Lists products and receives fitcoin on settlement
    Seller,
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKind::User => write!(f, "user"),
            MemberKind::Seller => write!(f, "seller"),
        }
    }
}

impl FromStr for MemberKind {
    type Err = FitcoinError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "user" => Ok(MemberKind::User),
            "seller" => Ok(MemberKind::Seller),
            other => Err(FitcoinError::invalid_argument(format!(
                "unknown member kind '{other}', expected 'user' or 'seller'"
            ))),
        }
    }
}

/// A member who converts activity into fitcoin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Member id
    pub id: MemberId,
    /// Spendable balance
    pub fitcoin_balance: u64,
    /// Last raw activity counter that was processed
    pub total_activity_units: u64,
    /// Portion of the counter already turned into fitcoin
    pub activity_units_converted: u64,
    /// Contracts this user opened, in creation order
    #[serde(default)]
    pub contract_ids: Vec<ContractId>,
}

impl User {
    /// Fresh user with nothing earned
    pub fn new(id: MemberId) -> Self {
        Self {
            id,
            fitcoin_balance: 0,
            total_activity_units: 0,
            activity_units_converted: 0,
            contract_ids: Vec::new(),
        }
    }

    /// Remove `amount` from the balance, refusing to go below zero
    pub fn debit(&mut self, amount: u64) -> Result<()> {
        self.fitcoin_balance = self.fitcoin_balance.checked_sub(amount).ok_or_else(|| {
            FitcoinError::InsufficientFunds {
                member_id: self.id.to_string(),
                balance: self.fitcoin_balance,
                required: amount,
            }
        })?;
        Ok(())
    }

    /// Add `amount` to the balance
    pub fn credit(&mut self, amount: u64) -> Result<()> {
        self.fitcoin_balance = credit_balance(&self.id, self.fitcoin_balance, amount)?;
        Ok(())
    }
}

/// A member who lists products for sale
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    /// Member id
    pub id: MemberId,
    /// Fitcoin received from completed contracts
    pub fitcoin_balance: u64,
    /// Inventory, unique by product id, in listing order
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Seller {
    /// Fresh seller with an empty catalog
    pub fn new(id: MemberId) -> Self {
        Self {
            id,
            fitcoin_balance: 0,
            products: Vec::new(),
        }
    }

    /// Look up a listed product
    pub fn product(&self, product_id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == product_id)
    }

    /// Mutable lookup of a listed product
    pub fn product_mut(&mut self, product_id: &ProductId) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| &p.id == product_id)
    }

    /// Replace a product with the same id, or append it.
    ///
    /// Returns true when an existing listing was overwritten.
    pub fn upsert_product(&mut self, product: Product) -> bool {
        match self.product_mut(&product.id) {
            Some(existing) => {
                *existing = product;
                true
            }
            None => {
                self.products.push(product);
                false
            }
        }
    }

    /// Add `amount` to the balance
    pub fn credit(&mut self, amount: u64) -> Result<()> {
        self.fitcoin_balance = credit_balance(&self.id, self.fitcoin_balance, amount)?;
        Ok(())
    }
}

fn credit_balance(id: &MemberId, balance: u64, amount: u64) -> Result<u64> {
    balance.checked_add(amount).ok_or_else(|| {
        FitcoinError::invalid_argument(format!("balance overflow crediting {amount} to {id}"))
    })
}

/// Member record as stored under `member/<id>`.
///
/// The `memberType` tag keeps one key space for both roles, so an id can
/// never be registered twice under different kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "memberType", rename_all = "lowercase")]
pub enum Member {
    /// A user record
    User(User),
    /// A seller record
    Seller(Seller),
}

impl Member {
    /// Zero-balance member of the requested kind
    pub fn new(id: MemberId, kind: MemberKind) -> Self {
        match kind {
            MemberKind::User => Member::User(User::new(id)),
            MemberKind::Seller => Member::Seller(Seller::new(id)),
        }
    }

    /// Member id
    pub fn id(&self) -> &MemberId {
        match self {
            Member::User(user) => &user.id,
            Member::Seller(seller) => &seller.id,
        }
    }

    /// Member role
    pub fn kind(&self) -> MemberKind {
        match self {
            Member::User(_) => MemberKind::User,
            Member::Seller(_) => MemberKind::Seller,
        }
    }

    /// Current fitcoin balance
    pub fn fitcoin_balance(&self) -> u64 {
        match self {
            Member::User(user) => user.fitcoin_balance,
            Member::Seller(seller) => seller.fitcoin_balance,
        }
    }

    /// Fail with `KindMismatch` unless the member has the expected role
    pub fn expect_kind(self, expected: MemberKind) -> Result<Self> {
        if self.kind() == expected {
            Ok(self)
        } else {
            Err(self.mismatch(expected))
        }
    }

    /// Unwrap the user record or fail with `KindMismatch`
    pub fn into_user(self) -> Result<User> {
        match self {
            Member::User(user) => Ok(user),
            other => Err(other.mismatch(MemberKind::User)),
        }
    }

    /// Unwrap the seller record or fail with `KindMismatch`
    pub fn into_seller(self) -> Result<Seller> {
        match self {
            Member::Seller(seller) => Ok(seller),
            other => Err(other.mismatch(MemberKind::Seller)),
        }
    }

    fn mismatch(&self, expected: MemberKind) -> FitcoinError {
        FitcoinError::KindMismatch {
            id: self.id().to_string(),
            expected,
            actual: self.kind(),
        }
    }
}

impl From<User> for Member {
    fn from(user: User) -> Self {
        Member::User(user)
    }
}

impl From<Seller> for Member {
    fn from(seller: Seller) -> Self {
        Member::Seller(seller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn member_kind_parses_case_insensitively() {
        assert_eq!("User".parse::<MemberKind>().unwrap(), MemberKind::User);
        assert_eq!("SELLER".parse::<MemberKind>().unwrap(), MemberKind::Seller);
        assert_matches!(
            "admin".parse::<MemberKind>(),
            Err(FitcoinError::InvalidArgument { .. })
        );
    }

    #[test]
    fn debit_refuses_to_overdraw() {
        let mut user = User::new("u1".into());
        user.credit(5).unwrap();
        assert_matches!(
            user.debit(6),
            Err(FitcoinError::InsufficientFunds {
                balance: 5,
                required: 6,
                ..
            })
        );
        assert_eq!(user.fitcoin_balance, 5);
        user.debit(5).unwrap();
        assert_eq!(user.fitcoin_balance, 0);
    }

    #[test]
    fn member_records_carry_type_tag() {
        let member = Member::new("s1".into(), MemberKind::Seller);
        let json = serde_json::to_value(&member).unwrap();
        assert_eq!(json["memberType"], "seller");
        assert_eq!(json["id"], "s1");
        assert_eq!(json["fitcoinBalance"], 0);

        let decoded: Member = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, member);
    }

    #[test]
    fn wrong_role_is_kind_mismatch() {
        let member = Member::new("u1".into(), MemberKind::User);
        assert_matches!(
            member.into_seller(),
            Err(FitcoinError::KindMismatch {
                expected: MemberKind::Seller,
                actual: MemberKind::User,
                ..
            })
        );
    }

    #[test]
    fn upsert_overwrites_by_id() {
        let mut seller = Seller::new("s1".into());
        assert!(!seller.upsert_product(Product::new("p1", "Shirt", 5, 10)));
        assert!(seller.upsert_product(Product::new("p1", "Hat", 1, 3)));
        assert_eq!(seller.products.len(), 1);
        assert_eq!(seller.products[0].name, "Hat");
    }
}
