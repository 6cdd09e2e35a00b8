//! Initializer - random seeding of the whole ocean.

use crate::config::ConfigError;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tidepool_core::{Dimensions, Grid};

/// Relative weights of the three starting states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellMix {
    pub empty: f64,
    pub predator: f64,
    pub prey: f64,
}

impl Default for CellMix {
    fn default() -> Self {
        Self {
            empty: 0.25,
            predator: 0.25,
            prey: 0.50,
        }
    }
}

impl CellMix {
    fn weights(&self) -> [f64; 3] {
        [self.empty, self.predator, self.prey]
    }

    /// Weights must be finite, non-negative and not all zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        WeightedIndex::new(self.weights())
            .map(|_| ())
            .map_err(|e| ConfigError::InvalidMix(e.to_string()))
    }
}

/// Fills every logical cell with empty (`0`), a newborn predator (`-1`) or a
/// newborn prey (`1`); the halo stays empty.
pub fn seed_ocean<R: Rng + ?Sized>(
    dims: Dimensions,
    mix: CellMix,
    rng: &mut R,
) -> Result<Grid, ConfigError> {
    const STATES: [i32; 3] = [0, -1, 1];
    let dist = WeightedIndex::new(mix.weights()).map_err(|e| ConfigError::InvalidMix(e.to_string()))?;

    let mut grid = Grid::new(dims.height, dims.width);
    for i in 1..=dims.height {
        for j in 1..=dims.width {
            grid.set(i, j, STATES[dist.sample(rng)]);
        }
    }
    Ok(grid)
}
