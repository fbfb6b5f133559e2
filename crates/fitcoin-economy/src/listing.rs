//! Lazily decoded record sequences
//!
//! Listing operations read their keys inside the invocation, so the read set
//! is complete before commit, but decode records only as the caller walks
//! the sequence. A listing can be iterated any number of times.

use fitcoin_core::invocation::decode_record;
use fitcoin_core::Result;
use serde::de::DeserializeOwned;
use std::fmt;
use std::marker::PhantomData;

/// Raw rows read from the ledger, decoded to `T` on iteration
pub struct RecordListing<T> {
    rows: Vec<(String, Vec<u8>)>,
    _record: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> RecordListing<T> {
    /// Wrap rows already read from the ledger
    pub fn new(rows: Vec<(String, Vec<u8>)>) -> Self {
        Self {
            rows,
            _record: PhantomData,
        }
    }

    /// Decode rows in order; a row that fails to decode yields an error item
    pub fn iter(&self) -> impl Iterator<Item = Result<T>> + '_ {
        self.rows
            .iter()
            .map(|(key, bytes)| decode_record::<T>(key, bytes))
    }

    /// True when there are no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Decode every row, stopping at the first failure
    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.iter().collect()
    }
}

impl<T> fmt::Debug for RecordListing<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordListing")
            .field("keys", &self.rows.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .finish()
    }
}
