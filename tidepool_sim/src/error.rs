//! Error types for the simulation driver.

use crate::config::ConfigError;
use thiserror::Error;
use tidepool_core::CoreError;
use tidepool_env::EnvError;

/// Errors that end a run.
#[derive(Debug, Error)]
pub enum SimError {
    /// Configuration rejected before any rank started
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// A rank failed; every other rank is torn down with it
    #[error("Rank failed: {0}")]
    Core(#[from] CoreError),

    /// A rank task panicked
    #[error("Run aborted: {0}")]
    Aborted(String),

    /// Report export failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// A rank that only saw a peer's link close; the peer holds the cause.
    pub fn is_knock_on(&self) -> bool {
        matches!(self, SimError::Core(CoreError::Transport(EnvError::Disconnected { .. })))
    }
}
