//! Positional operation surface
//!
//! Callers name an operation and pass its arguments as strings in a fixed
//! order. Arguments are parsed and validated here into typed values before
//! any ledger access; results come back as JSON bytes.

use crate::contract::PurchaseRequest;
use crate::economy::Economy;
use fitcoin_core::{
    ContractId, ContractState, FitcoinError, LedgerEffects, MemberId, MemberKind, Product,
    ProductId, RandomEffects, Result,
};
use serde::Serialize;
use tracing::debug;

/// A parsed operation with typed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `createMember(id, kind)`
    CreateMember {
        /// New member id
        id: MemberId,
        /// Role of the member
        kind: MemberKind,
    },
    /// `getMember(id, kind)`
    GetMember {
        /// Member id
        id: MemberId,
        /// Expected role
        kind: MemberKind,
    },
    /// `accrue(userId, activityTotal)`
    Accrue {
        /// User reporting activity
        user_id: MemberId,
        /// Raw cumulative activity counter
        activity_total: u64,
    },
    /// `createOrUpdateProduct(sellerId, productId, name, count, price)`
    CreateOrUpdateProduct {
        /// Owning seller
        seller_id: MemberId,
        /// Product to store
        product: Product,
    },
    /// `getProduct(sellerId, productId)`
    GetProduct {
        /// Owning seller
        seller_id: MemberId,
        /// Product id
        product_id: ProductId,
    },
    /// `listForSale()`
    ListForSale,
    /// `createContract(sellerId, userId, productId, quantity)`
    CreateContract(PurchaseRequest),
    /// `settleContract(contractId, targetState)`
    SettleContract {
        /// Contract to settle
        contract_id: ContractId,
        /// `complete` or `declined`
        target: ContractState,
    },
    /// `getContract(contractId)`
    GetContract {
        /// Contract id
        contract_id: ContractId,
    },
    /// `listContractsForUser(userId)`
    ListContractsForUser {
        /// User whose contracts to list
        user_id: MemberId,
    },
    /// `listAllContracts()`
    ListAllContracts,
    /// `getDataByKey(key)`
    GetDataByKey {
        /// Raw ledger key
        key: String,
    },
}

/// Canonical operation names, in the order they are documented
pub const OPERATION_NAMES: &[&str] = &[
    "createMember",
    "getMember",
    "accrue",
    "createOrUpdateProduct",
    "getProduct",
    "listForSale",
    "createContract",
    "settleContract",
    "getContract",
    "listContractsForUser",
    "listAllContracts",
    "getDataByKey",
];

fn canonical_name(function: &str) -> Option<&'static str> {
    let name = match function {
        "generateFitcoin" => "accrue",
        "createProduct" | "updateProduct" => "createOrUpdateProduct",
        "getProductByID" => "getProduct",
        "makePurchase" => "createContract",
        "transactPurchase" => "settleContract",
        "getContractByID" => "getContract",
        "getAllContracts" => "listAllContracts",
        other => other,
    };
    OPERATION_NAMES.iter().copied().find(|n| *n == name)
}

fn expect_args<'a, const N: usize>(function: &str, args: &'a [String]) -> Result<&'a [String; N]> {
    args.try_into().map_err(|_| {
        FitcoinError::invalid_argument(format!(
            "{function} takes {N} argument(s), got {}",
            args.len()
        ))
    })
}

fn parse_count(function: &str, position: usize, field: &str, value: &str) -> Result<u64> {
    value.trim().parse::<u64>().map_err(|_| {
        FitcoinError::invalid_argument(format!(
            "{function}: argument {position} ({field}) must be a non-negative integer, got '{value}'"
        ))
    })
}

impl Operation {
    /// Parse `function(args...)`, accepting the legacy operation names
    pub fn parse(function: &str, args: &[String]) -> Result<Self> {
        let name = canonical_name(function)
            .ok_or_else(|| FitcoinError::invalid_argument(format!("unknown function '{function}'")))?;

        let op = match name {
            "createMember" => {
                let [id, kind] = expect_args::<2>(name, args)?;
                Operation::CreateMember {
                    id: id.as_str().into(),
                    kind: kind.parse()?,
                }
            }
            "getMember" => {
                let [id, kind] = expect_args::<2>(name, args)?;
                Operation::GetMember {
                    id: id.as_str().into(),
                    kind: kind.parse()?,
                }
            }
            "accrue" => {
                let [user_id, total] = expect_args::<2>(name, args)?;
                Operation::Accrue {
                    user_id: user_id.as_str().into(),
                    activity_total: parse_count(name, 2, "activityTotal", total)?,
                }
            }
            "createOrUpdateProduct" => {
                let [seller_id, product_id, product_name, count, price] =
                    expect_args::<5>(name, args)?;
                Operation::CreateOrUpdateProduct {
                    seller_id: seller_id.as_str().into(),
                    product: Product::new(
                        product_id.as_str(),
                        product_name.as_str(),
                        parse_count(name, 4, "count", count)?,
                        parse_count(name, 5, "price", price)?,
                    ),
                }
            }
            "getProduct" => {
                let [seller_id, product_id] = expect_args::<2>(name, args)?;
                Operation::GetProduct {
                    seller_id: seller_id.as_str().into(),
                    product_id: product_id.as_str().into(),
                }
            }
            "listForSale" => {
                let [] = expect_args::<0>(name, args)?;
                Operation::ListForSale
            }
            "createContract" => {
                let [seller_id, user_id, product_id, quantity] = expect_args::<4>(name, args)?;
                Operation::CreateContract(PurchaseRequest {
                    seller_id: seller_id.as_str().into(),
                    user_id: user_id.as_str().into(),
                    product_id: product_id.as_str().into(),
                    quantity: parse_count(name, 4, "quantity", quantity)?,
                })
            }
            "settleContract" => {
                let [contract_id, state] = expect_args::<2>(name, args)?;
                let target: ContractState = state.parse()?;
                if !target.is_terminal() {
                    return Err(FitcoinError::invalid_argument(format!(
                        "{name}: target state must be complete or declined, got '{state}'"
                    )));
                }
                Operation::SettleContract {
                    contract_id: contract_id.as_str().into(),
                    target,
                }
            }
            "getContract" => {
                let [contract_id] = expect_args::<1>(name, args)?;
                Operation::GetContract {
                    contract_id: contract_id.as_str().into(),
                }
            }
            "listContractsForUser" => {
                let [user_id] = expect_args::<1>(name, args)?;
                Operation::ListContractsForUser {
                    user_id: user_id.as_str().into(),
                }
            }
            "listAllContracts" => {
                let [] = expect_args::<0>(name, args)?;
                Operation::ListAllContracts
            }
            _ => {
                let [key] = expect_args::<1>(name, args)?;
                Operation::GetDataByKey { key: key.clone() }
            }
        };
        Ok(op)
    }

    /// Canonical name of the operation
    pub fn name(&self) -> &'static str {
        match self {
            Operation::CreateMember { .. } => "createMember",
            Operation::GetMember { .. } => "getMember",
            Operation::Accrue { .. } => "accrue",
            Operation::CreateOrUpdateProduct { .. } => "createOrUpdateProduct",
            Operation::GetProduct { .. } => "getProduct",
            Operation::ListForSale => "listForSale",
            Operation::CreateContract(_) => "createContract",
            Operation::SettleContract { .. } => "settleContract",
            Operation::GetContract { .. } => "getContract",
            Operation::ListContractsForUser { .. } => "listContractsForUser",
            Operation::ListAllContracts => "listAllContracts",
            Operation::GetDataByKey { .. } => "getDataByKey",
        }
    }

    /// Whether the operation can write to the ledger
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Operation::CreateMember { .. }
                | Operation::Accrue { .. }
                | Operation::CreateOrUpdateProduct { .. }
                | Operation::CreateContract(_)
                | Operation::SettleContract { .. }
        )
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

impl<L, R> Economy<L, R>
where
    L: LedgerEffects,
    R: RandomEffects,
{
    /// Run a parsed operation and encode its result
    pub async fn execute(&self, op: Operation) -> Result<Vec<u8>> {
        match op {
            Operation::CreateMember { id, kind } => to_json(&self.create_member(&id, kind).await?),
            Operation::GetMember { id, kind } => to_json(&self.get_member(&id, kind).await?),
            Operation::Accrue {
                user_id,
                activity_total,
            } => {
                let outcome = self.accrue(&user_id, activity_total).await?;
                to_json(&outcome.user)
            }
            Operation::CreateOrUpdateProduct { seller_id, product } => {
                to_json(&self.create_or_update_product(&seller_id, product).await?)
            }
            Operation::GetProduct {
                seller_id,
                product_id,
            } => to_json(&self.get_product(&seller_id, &product_id).await?),
            Operation::ListForSale => to_json(&self.list_for_sale().await?.to_vec()?),
            Operation::CreateContract(request) => to_json(&self.create_contract(request).await?),
            Operation::SettleContract {
                contract_id,
                target,
            } => to_json(&self.settle_contract(&contract_id, target).await?),
            Operation::GetContract { contract_id } => {
                to_json(&self.get_contract(&contract_id).await?)
            }
            Operation::ListContractsForUser { user_id } => {
                to_json(&self.list_contracts_for_user(&user_id).await?.to_vec()?)
            }
            Operation::ListAllContracts => to_json(&self.list_all_contracts().await?.to_vec()?),
            Operation::GetDataByKey { key } => self.get_data_by_key(&key).await,
        }
    }

    /// Parse and run `function(args...)`
    pub async fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>> {
        let op = Operation::parse(function, args)?;
        debug!(function, operation = op.name(), "Dispatching operation");
        self.execute(op).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_legacy_names_map_to_operations() {
        assert_eq!(
            Operation::parse("generateFitcoin", &args(&["u1", "250"])).unwrap(),
            Operation::Accrue {
                user_id: "u1".into(),
                activity_total: 250
            }
        );
        assert_eq!(
            Operation::parse("transactPurchase", &args(&["c1", "complete"]))
                .unwrap()
                .name(),
            "settleContract"
        );
        assert_eq!(
            Operation::parse("getAllContracts", &[]).unwrap(),
            Operation::ListAllContracts
        );
        for alias in ["createProduct", "updateProduct"] {
            assert_matches!(
                Operation::parse(alias, &args(&["s1", "p1", "Shirt", "5", "10"])),
                Ok(Operation::CreateOrUpdateProduct { .. })
            );
        }
    }

    #[test]
    fn test_bad_arguments() {
        assert_matches!(
            Operation::parse("createMember", &args(&["u1"])),
            Err(FitcoinError::InvalidArgument { .. })
        );
        assert_matches!(
            Operation::parse("createMember", &args(&["u1", "admin"])),
            Err(FitcoinError::InvalidArgument { .. })
        );
        assert_matches!(
            Operation::parse("makePurchase", &args(&["s1", "u1", "p1", "-3"])),
            Err(FitcoinError::InvalidArgument { .. })
        );
        assert_matches!(
            Operation::parse("createProduct", &args(&["s1", "p1", "Shirt", "five", "10"])),
            Err(FitcoinError::InvalidArgument { .. })
        );
        assert_matches!(
            Operation::parse("settleContract", &args(&["c1", "archived"])),
            Err(FitcoinError::InvalidArgument { .. })
        );
        assert_matches!(
            Operation::parse("transfer", &[]),
            Err(FitcoinError::InvalidArgument { .. })
        );
        assert_matches!(
            Operation::parse("listForSale", &args(&["extra"])),
            Err(FitcoinError::InvalidArgument { .. })
        );
    }

    #[test]
    fn test_every_name_parses_with_right_arity() {
        let arity = |name: &str| match name {
            "listForSale" | "listAllContracts" => 0,
            "getContract" | "listContractsForUser" | "getDataByKey" => 1,
            "createContract" => 4,
            "createOrUpdateProduct" => 5,
            _ => 2,
        };
        for name in OPERATION_NAMES {
            let mut values = vec!["1".to_string(); arity(name)];
            if matches!(*name, "createMember" | "getMember") {
                values[1] = "user".into();
            }
            if *name == "settleContract" {
                values[1] = "declined".into();
            }
            let op = Operation::parse(name, &values).unwrap();
            assert_eq!(op.name(), *name);
        }
    }

    #[test]
    fn test_only_writers_are_mutating() {
        let writers = [
            "createMember",
            "accrue",
            "createOrUpdateProduct",
            "createContract",
            "settleContract",
        ];
        let arity = |name: &str| match name {
            "listForSale" | "listAllContracts" => 0,
            "getContract" | "listContractsForUser" | "getDataByKey" => 1,
            "createContract" => 4,
            "createOrUpdateProduct" => 5,
            _ => 2,
        };
        for name in OPERATION_NAMES {
            let mut values = vec!["1".to_string(); arity(name)];
            if matches!(*name, "createMember" | "getMember") {
                values[1] = "user".into();
            }
            if *name == "settleContract" {
                values[1] = "complete".into();
            }
            let op = Operation::parse(name, &values).unwrap();
            assert_eq!(op.is_mutating(), writers.contains(name), "{name}");
        }
    }
}
