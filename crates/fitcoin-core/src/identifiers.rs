//! Member, product and contract identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix carried by every generated contract id
pub const CONTRACT_ID_PREFIX: char = 'c';

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier text
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// True for the empty identifier, which is never valid on the ledger
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Unique, immutable member identifier shared by users and sellers
    MemberId
);

string_id!(
    /// Product identifier, unique within one seller
    ProductId
);

string_id!(
    /// Globally unique purchase contract identifier
    ContractId
);

impl ContractId {
    /// Build a contract id from 128 random bits.
    ///
    /// The bytes are stamped as a v4 UUID and rendered as `c` followed by 32
    /// lowercase hex digits, so generated ids always sort inside the contract
    /// key range.
    pub fn from_random_bytes(bytes: [u8; 16]) -> Self {
        let uuid = uuid::Builder::from_random_bytes(bytes).into_uuid();
        Self(format!("{CONTRACT_ID_PREFIX}{}", uuid.simple()))
    }
}
