//! Error types for the stencil engine.

use thiserror::Error;
use tidepool_env::{EnvError, Rank, Tag};

/// Failures a rank can hit while advancing the grid.
///
/// None of these are retried: a generation cannot be computed from partial
/// halos, so every variant aborts the run.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Send or receive failed during exchange, reduction or distribution
    #[error("Transport failure: {0}")]
    Transport(#[from] EnvError),
    
    /// Rank/size/width combination cannot be partitioned
    #[error("Invalid partition: rank {rank} of {size} over width {width}")]
    InvalidPartition {
        rank: usize,
        size: usize,
        width: usize,
    },
    
    /// Payload length does not match the protocol
    #[error("Malformed message from {peer} on tag {tag}: expected {expected} cells, got {actual}")]
    MalformedMessage {
        peer: Rank,
        tag: Tag,
        expected: usize,
        actual: usize,
    },
    
    /// A population count arrived negative
    #[error("Invalid count {value} from {peer}")]
    InvalidCount {
        peer: Rank,
        value: i32,
    },
    
    /// A population count does not fit one transport cell
    #[error("Count {0} does not fit a transport cell")]
    CountOverflow(u64),
    
    /// The coordinator must hold the seeded grid before scattering
    #[error("Coordinator started without an initial grid")]
    MissingInitialGrid,
    
    /// The worker pool could not be built
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

impl CoreError {
    /// Checks a received payload against the expected length.
    pub(crate) fn expect_len(peer: Rank, tag: Tag, expected: usize, payload: &[i32]) -> Result<(), Self> {
        if payload.len() != expected {
            return Err(Self::MalformedMessage {
                peer,
                tag,
                expected,
                actual: payload.len(),
            });
        }
        Ok(())
    }
}
