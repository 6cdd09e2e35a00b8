//! Run context trait for Tidepool ranks.

use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// The clock and entropy a run draws on.
///
/// # Implementations
///
/// - **Production**: `SystemContext::new()` - wall clock, seed from `OsRng`
/// - **Reproducible**: `SystemContext::seeded(seed)` - wall clock, fixed seed
///
/// # Determinism
///
/// Every random decision in a run (seeding the ocean, predator mortality)
/// is derived from `seed()` through `derive_rng`, so replaying a seed replays
/// the run bit for bit.
pub trait RunContext: Send + Sync + 'static {
    /// Returns the monotonic time since context creation.
    ///
    /// Used for the processing-time measurement of a run.
    fn now(&self) -> Duration;
    
    /// Returns the master seed of the run.
    fn seed(&self) -> u64;
    
    /// Derives an independent random stream from the master seed.
    ///
    /// # Arguments
    /// * `stream` - Purpose selector; different values never share output
    fn derive_rng(&self, stream: u64) -> ChaCha8Rng;
}
