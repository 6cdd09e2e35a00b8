//! Wall-clock implementation of RunContext.

use crate::RunContext;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Context backed by the system clock.
///
/// The seed is either supplied (reproducible runs) or drawn once from
/// `OsRng` at construction.
pub struct SystemContext {
    /// Start time for monotonic duration calculations
    start: Instant,
    
    /// Master seed
    seed: u64,
}

impl SystemContext {
    /// Creates a context seeded from OS entropy.
    pub fn new() -> Self {
        Self::seeded(rand::rngs::OsRng.next_u64())
    }
    
    /// Creates a context with a fixed seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            start: Instant::now(),
            seed,
        }
    }
    
    /// Creates an Arc-wrapped context for sharing across tasks.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::seeded(seed))
    }
}

impl Default for SystemContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext for SystemContext {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
    
    fn seed(&self) -> u64 {
        self.seed
    }
    
    fn derive_rng(&self, stream: u64) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(stream);
        rng
    }
}
