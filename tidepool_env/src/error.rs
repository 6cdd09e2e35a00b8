//! Error types for the Tidepool environment abstraction.

use crate::types::{Rank, Tag};
use thiserror::Error;

/// Errors that can occur in the environment abstraction layer.
#[derive(Debug, Error)]
pub enum EnvError {
    /// Target node is unreachable (severed link)
    #[error("Node unreachable: {0}")]
    NodeUnreachable(String),
    
    /// The peer's end of the link is gone (task exited or aborted)
    #[error("Link to {peer} closed while waiting on tag {tag}")]
    Disconnected {
        peer: Rank,
        tag: Tag,
    },
    
    /// Rank outside the communicator
    #[error("Rank {rank} is outside a communicator of size {size}")]
    InvalidRank {
        rank: Rank,
        size: usize,
    },
}

impl EnvError {
    /// Creates an unreachable error.
    pub fn unreachable(node: impl std::fmt::Display) -> Self {
        Self::NodeUnreachable(node.to_string())
    }
}
