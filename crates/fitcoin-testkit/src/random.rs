//! Deterministic randomness for reproducible tests
//!
//! Uses `std::sync::Mutex`: calls never hold the lock across an await.

use async_trait::async_trait;
use fitcoin_core::RandomEffects;
use rand::RngCore;
use rand_chacha::{rand_core::SeedableRng, ChaCha20Rng};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Seeded ChaCha20 generator; the same seed yields the same contract ids
#[derive(Debug, Clone)]
pub struct DeterministicRandomHandler {
    rng: Arc<Mutex<ChaCha20Rng>>,
}

impl DeterministicRandomHandler {
    /// Handler with the default seed
    pub fn deterministic() -> Self {
        Self::with_seed(42)
    }

    /// Handler with a specific seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Arc::new(Mutex::new(ChaCha20Rng::seed_from_u64(seed))),
        }
    }
}

impl Default for DeterministicRandomHandler {
    fn default() -> Self {
        Self::deterministic()
    }
}

#[async_trait]
impl RandomEffects for DeterministicRandomHandler {
    async fn random_bytes(&self, len: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; len];
        self.rng.lock().unwrap().fill_bytes(&mut bytes);
        bytes
    }
}

/// Replays scripted 16-byte draws, then falls back to a seeded generator.
///
/// Used to force contract id collisions.
#[derive(Debug, Clone)]
pub struct ScriptedRandomHandler {
    script: Arc<Mutex<VecDeque<[u8; 16]>>>,
    fallback: DeterministicRandomHandler,
}

impl ScriptedRandomHandler {
    /// Handler that returns `draws` in order before going random
    pub fn new(draws: impl IntoIterator<Item = [u8; 16]>) -> Self {
        Self {
            script: Arc::new(Mutex::new(draws.into_iter().collect())),
            fallback: DeterministicRandomHandler::deterministic(),
        }
    }

    /// Scripted draws not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl RandomEffects for ScriptedRandomHandler {
    async fn random_bytes(&self, len: usize) -> Vec<u8> {
        self.fallback.random_bytes(len).await
    }

    async fn random_bytes_16(&self) -> [u8; 16] {
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(bytes) => bytes,
            None => self.fallback.random_bytes_16().await,
        }
    }
}
