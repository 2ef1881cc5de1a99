//! # Token Module
//!
//! Group access tokens: 9 characters drawn uniformly from `[A-Z0-9]`
//! (about 46.5 bits of entropy). The randomness source is injected so tests
//! can run with a seeded or scripted provider.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::validator::Validator;

/// Token alphabet
pub const TOKEN_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Token length in characters
pub const TOKEN_LENGTH: usize = 9;

/// Provider of uniformly distributed indexes.
pub trait RandomSource: Send + Sync {
    /// Uniform value in `0..upper`
    fn next_index(&self, upper: usize) -> usize;
}

/// Process thread-local RNG, the production default
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_index(&self, upper: usize) -> usize {
        rand::thread_rng().gen_range(0..upper)
    }
}

/// Deterministic RNG for tests and reproducible runs
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_index(&self, upper: usize) -> usize {
        // A poisoned lock still holds a usable RNG state
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        rng.gen_range(0..upper)
    }
}

/// Generates group access tokens from an injected [`RandomSource`].
#[derive(Clone)]
pub struct TokenGenerator {
    source: Arc<dyn RandomSource>,
}

impl TokenGenerator {
    pub fn new(source: Arc<dyn RandomSource>) -> Self {
        Self { source }
    }

    /// Generator seeded for deterministic output
    pub fn seeded(seed: u64) -> Self {
        Self::new(Arc::new(SeededRandom::new(seed)))
    }

    pub fn generate(&self) -> String {
        (0..TOKEN_LENGTH)
            .map(|_| TOKEN_CHARSET[self.source.next_index(TOKEN_CHARSET.len())] as char)
            .collect()
    }
}

impl Default for TokenGenerator {
    fn default() -> Self {
        Self::new(Arc::new(ThreadRandom))
    }
}

impl fmt::Debug for TokenGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGenerator").finish_non_exhaustive()
    }
}

/// True iff `token` has the fixed length and alphabet
pub fn is_valid_token(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.bytes().all(|b| TOKEN_CHARSET.contains(&b))
}

pub fn validate_token(v: &mut Validator, token: &str) {
    v.check(
        is_valid_token(token),
        "token",
        "must be 9 characters long and contain only uppercase letters and numbers",
    );
}
