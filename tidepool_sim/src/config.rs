//! Run configuration and reporting presets.

use crate::seeding::CellMix;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tidepool_core::Dimensions;

/// Reporting cadence presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speed {
    /// Report every 100th generation
    Fast,

    /// Report every 10th generation
    Medium,

    /// Report every generation
    Slow,
}

impl Speed {
    /// Returns a list of all presets.
    pub fn all() -> Vec<Speed> {
        vec![Speed::Fast, Speed::Medium, Speed::Slow]
    }

    /// Returns the preset name.
    pub fn name(&self) -> &'static str {
        match self {
            Speed::Fast => "fast",
            Speed::Medium => "medium",
            Speed::Slow => "slow",
        }
    }

    /// Generations between two reports.
    pub fn interval(&self) -> u64 {
        match self {
            Speed::Fast => 100,
            Speed::Medium => 10,
            Speed::Slow => 1,
        }
    }
}

impl std::fmt::Display for Speed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Speed {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" | "100" => Ok(Speed::Fast),
            "medium" | "10" => Ok(Speed::Medium),
            "slow" | "1" => Ok(Speed::Slow),
            _ => Err(format!("Unknown speed: {} (expected fast, medium or slow)", s)),
        }
    }
}

/// Configuration errors, reported before any rank starts.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid must have at least one row and one column (got {height}x{width})")]
    EmptyGrid {
        height: usize,
        width: usize,
    },

    #[error("at least one process is required")]
    ZeroProcesses,

    #[error("at least one thread per process is required")]
    ZeroThreads,

    #[error("reporting interval must be at least 1")]
    ZeroInterval,

    #[error("link capacity must be at least 1")]
    ZeroCapacity,

    #[error("width {width} is narrower than {procs} processes; every process needs a column")]
    NarrowGrid {
        width: usize,
        procs: usize,
    },

    #[error("invalid cell mix: {0}")]
    InvalidMix(String),

    #[error("initial ocean is {actual:?}, configured for {expected:?}")]
    OceanMismatch {
        expected: Dimensions,
        actual: Dimensions,
    },
}

/// Configuration for a simulation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// Logical columns (W)
    pub width: usize,

    /// Logical rows (H)
    pub height: usize,

    /// Generations to run
    pub generations: u64,

    /// Number of cooperating processes (ranks)
    pub procs: usize,

    /// Worker threads per process
    pub threads: usize,

    /// Report every Nth generation
    pub report_interval: u64,

    /// Include an ASCII frame with each report
    pub display: bool,

    /// Envelopes buffered per link before `send` blocks
    pub channel_capacity: usize,

    /// Initial distribution of cell states
    pub mix: CellMix,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            width: 2048,
            height: 1024,
            generations: 500,
            procs: 4,
            threads: 4,
            report_interval: Speed::Fast.interval(),
            display: false,
            channel_capacity: 4,
            mix: CellMix::default(),
        }
    }
}

impl SimConfig {
    /// Logical size of the ocean.
    pub fn dims(&self) -> Dimensions {
        Dimensions::new(self.height, self.width)
    }

    /// Sets the reporting interval from a preset.
    pub fn with_speed(mut self, speed: Speed) -> Self {
        self.report_interval = speed.interval();
        self
    }

    /// Checks every field before a run starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.height == 0 || self.width == 0 {
            return Err(ConfigError::EmptyGrid {
                height: self.height,
                width: self.width,
            });
        }
        if self.procs == 0 {
            return Err(ConfigError::ZeroProcesses);
        }
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        if self.report_interval == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.channel_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.width < self.procs {
            return Err(ConfigError::NarrowGrid {
                width: self.width,
                procs: self.procs,
            });
        }
        self.mix.validate()
    }
}
