//! Tidepool Core - Partitioned Predator/Prey Stencil Engine
//!
//! Advances a toroidal grid of empty / prey / predator cells through discrete
//! generations, split across cooperating ranks:
//! 1. **Partition Map**: contiguous column ranges, one per rank
//! 2. **Halo Exchange**: parity-ordered ghost-column swap plus row wraparound
//! 3. **Transition Engine**: 8-neighbor census and rule, fanned out over a worker pool
//! 4. **Global Reduction**: star-shaped prey/predator totals on the coordinator
//!
//! Per generation: exchange → update into the scratch buffer → commit →
//! (periodically) reduce.

pub mod grid;
pub mod partition;
pub mod transition;
pub mod mortality;
pub mod engine;
pub mod halo;
pub mod reduction;
pub mod distribution;
pub mod reference;
pub mod process;
mod error;

// Re-export key types for convenience
pub use error::CoreError;
pub use grid::{Dimensions, Grid, GridPair};
pub use partition::{partition, Partition};
pub use transition::{Census, CellState};
pub use mortality::{FixedDraw, KeyedDraw, MortalityDraw};
pub use engine::TransitionEngine;
pub use halo::{exchange_halo, role, Role};
pub use reduction::{reduce_population, Population};
pub use distribution::{gather_grid, scatter_initial};
pub use process::RankProcess;
