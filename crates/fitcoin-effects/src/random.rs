//! OS-backed randomness
//!
//! Production source for contract ids. Draws straight from the operating
//! system generator; seeded and scripted handlers for tests are in
//! `fitcoin-testkit`.

use async_trait::async_trait;
use fitcoin_core::effects::RandomEffects;
use rand::rngs::OsRng;
use rand::RngCore;

/// Randomness from the operating system's CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct RealRandomHandler;

impl RealRandomHandler {
    /// Handler over `OsRng`
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RandomEffects for RealRandomHandler {
    async fn random_bytes(&self, len: usize) -> Vec<u8> {
        let mut buf = vec![0u8; len];
        OsRng.fill_bytes(&mut buf);
        buf
    }

    async fn random_bytes_16(&self) -> [u8; 16] {
        let mut id = [0u8; 16];
        OsRng.fill_bytes(&mut id);
        id
    }
}
