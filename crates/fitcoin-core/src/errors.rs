//! Unified error system for the fitcoin economy
//!
//! Every operation reports failure through one [`FitcoinError`]. Callers that
//! need to branch on the failure use [`FitcoinError::kind`] and
//! [`ErrorKind::class`] to tell business-rule rejections from structural
//! errors from infrastructure faults.

use crate::effects::ledger::LedgerError;
use crate::types::{ContractState, MemberKind};
use serde::{Deserialize, Serialize};

/// Unified error type for all economy operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum FitcoinError {
    /// Malformed or out-of-range input
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message describing the invalid input
        message: String,
    },

    /// Referenced member, contract or key is absent
    #[error("Not found: {message}")]
    NotFound {
        /// Error message describing what was not found
        message: String,
    },

    /// Member exists but plays a different role
    #[error("Member {id} is a {actual}, expected a {expected}")]
    KindMismatch {
        /// Member id that was looked up
        id: String,
        /// Role the caller asked for
        expected: MemberKind,
        /// Role stored on the ledger
        actual: MemberKind,
    },

    /// Member id is already taken
    #[error("Member id already in use: {id}")]
    DuplicateId {
        /// Conflicting member id
        id: String,
    },

    /// Product is not listed by the seller
    #[error("Product {product_id} not found for seller {seller_id}")]
    ProductNotFound {
        /// Seller that was searched
        seller_id: String,
        /// Missing product id
        product_id: String,
    },

    /// Contract already left the pending state
    #[error("Contract {contract_id} already settled as {state}")]
    AlreadySettled {
        /// Contract id
        contract_id: String,
        /// Terminal state the contract is in
        state: ContractState,
    },

    /// Balance does not cover the cost
    #[error("Insufficient fitcoins for {member_id}: balance {balance}, required {required}")]
    InsufficientFunds {
        /// Member being debited
        member_id: String,
        /// Balance at the time of the check
        balance: u64,
        /// Amount that had to be covered
        required: u64,
    },

    /// Product inventory does not cover the quantity
    #[error("Insufficient inventory for {product_id}: available {available}, requested {requested}")]
    InsufficientInventory {
        /// Product being decremented
        product_id: String,
        /// Units on hand
        available: u64,
        /// Units the contract needs
        requested: u64,
    },

    /// Reported activity counter went backwards
    #[error("Activity counter regressed for {user_id}: reported {reported}, recorded {recorded}")]
    RegressedCounter {
        /// User whose counter regressed
        user_id: String,
        /// Value the client reported
        reported: u64,
        /// Last processed value on the ledger
        recorded: u64,
    },

    /// Ledger collaborator failed
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        /// Error message from the storage layer
        message: String,
    },

    /// Commit rejected because a key read by the invocation changed underneath it
    #[error("Commit conflict on key {key}")]
    Conflict {
        /// First key found to be stale
        key: String,
    },

    /// A stored record could not be encoded or decoded
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },
}

/// Discriminant of [`FitcoinError`] without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`FitcoinError::InvalidArgument`]
    InvalidArgument,
    /// See [`FitcoinError::NotFound`]
    NotFound,
    /// See [`FitcoinError::KindMismatch`]
    KindMismatch,
    /// See [`FitcoinError::DuplicateId`]
    DuplicateId,
    /// See [`FitcoinError::ProductNotFound`]
    ProductNotFound,
    /// See [`FitcoinError::AlreadySettled`]
    AlreadySettled,
    /// See [`FitcoinError::InsufficientFunds`]
    InsufficientFunds,
    /// See [`FitcoinError::InsufficientInventory`]
    InsufficientInventory,
    /// See [`FitcoinError::RegressedCounter`]
    RegressedCounter,
    /// See [`FitcoinError::StorageUnavailable`]
    StorageUnavailable,
    /// See [`FitcoinError::Conflict`]
    Conflict,
    /// See [`FitcoinError::Serialization`]
    Serialization,
}

/// Coarse classification of failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
    /// The request was well-formed but violates an economic rule
    Business,
    /// The request references something that does not exist or is malformed
    Structural,
    /// The ledger substrate failed or rejected the commit
    Infrastructure,
}

impl ErrorKind {
    /// Classify the failure
    pub fn class(self) -> ErrorClass {
        match self {
            ErrorKind::AlreadySettled
            | ErrorKind::InsufficientFunds
            | ErrorKind::InsufficientInventory
            | ErrorKind::RegressedCounter
            | ErrorKind::DuplicateId => ErrorClass::Business,
            ErrorKind::InvalidArgument
            | ErrorKind::NotFound
            | ErrorKind::KindMismatch
            | ErrorKind::ProductNotFound => ErrorClass::Structural,
            ErrorKind::StorageUnavailable | ErrorKind::Conflict | ErrorKind::Serialization => {
                ErrorClass::Infrastructure
            }
        }
    }

    /// Whether a caller may reasonably re-run the whole operation
    pub fn is_retryable(self) -> bool {
        matches!(self, ErrorKind::Conflict)
    }
}

impl FitcoinError {
    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Create a storage unavailable error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageUnavailable {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a product not found error
    pub fn product_not_found(seller_id: impl Into<String>, product_id: impl Into<String>) -> Self {
        Self::ProductNotFound {
            seller_id: seller_id.into(),
            product_id: product_id.into(),
        }
    }

    /// Payload-free discriminant
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::KindMismatch { .. } => ErrorKind::KindMismatch,
            Self::DuplicateId { .. } => ErrorKind::DuplicateId,
            Self::ProductNotFound { .. } => ErrorKind::ProductNotFound,
            Self::AlreadySettled { .. } => ErrorKind::AlreadySettled,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::InsufficientInventory { .. } => ErrorKind::InsufficientInventory,
            Self::RegressedCounter { .. } => ErrorKind::RegressedCounter,
            Self::StorageUnavailable { .. } => ErrorKind::StorageUnavailable,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Serialization { .. } => ErrorKind::Serialization,
        }
    }
}

/// Standard Result type for economy operations
pub type Result<T> = std::result::Result<T, FitcoinError>;

impl From<LedgerError> for FitcoinError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Conflict { key } => Self::Conflict { key },
            LedgerError::InvalidRange { start, end } => {
                Self::invalid_argument(format!("invalid key range [{start}, {end})"))
            }
            other => Self::storage(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for FitcoinError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}
