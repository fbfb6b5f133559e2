//! Randomness effect interface
//!
//! Contract ids are derived from these bytes, so production handlers must be
//! backed by a cryptographically secure generator. Deterministic handlers
//! live in `fitcoin-testkit`.

use async_trait::async_trait;

/// Source of random bytes
#[async_trait]
pub trait RandomEffects: Send + Sync {
    /// `len` random bytes
    async fn random_bytes(&self, len: usize) -> Vec<u8>;

    /// 128 random bits, the width of a contract id
    async fn random_bytes_16(&self) -> [u8; 16] {
        let mut out = [0u8; 16];
        let bytes = self.random_bytes(16).await;
        let n = bytes.len().min(16);
        out[..n].copy_from_slice(&bytes[..n]);
        out
    }
}

/// Blanket implementation for Arc<T> where T: RandomEffects
#[async_trait]
impl<T: RandomEffects + ?Sized> RandomEffects for std::sync::Arc<T> {
    async fn random_bytes(&self, len: usize) -> Vec<u8> {
        (**self).random_bytes(len).await
    }

    async fn random_bytes_16(&self) -> [u8; 16] {
        (**self).random_bytes_16().await
    }
}
