//! Rank Process - one partition's engines wired to its transport.
//!
//! This module is the integration layer between the pure pieces (grid,
//! partition, transition engine) and the environment (`Communicator`).
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       RankProcess                           │
//! │  ┌──────────────────────────────────────────────────────┐   │
//! │  │              Transport: Communicator                 │   │
//! │  │  • halo columns to/from ring neighbors               │   │
//! │  │  • counts / blocks to/from the coordinator           │   │
//! │  └──────────────────────────────────────────────────────┘   │
//! │                              │                              │
//! │  ┌───────────┐ ┌────────────┐ ┌────────────────────────┐    │
//! │  │ PARTITION │ │  GRID PAIR │ │   TRANSITION ENGINE    │    │
//! │  │  [lo, hi) │ │ cur / next │ │  worker pool + draw    │    │
//! │  └───────────┘ └────────────┘ └────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use tidepool_core::{Dimensions, KeyedDraw, RankProcess};
//!
//! let mut rank = RankProcess::bootstrap(comm, dims, 4, KeyedDraw::new(seed), seeded.as_ref()).await?;
//! for _ in 0..generations {
//!     rank.advance().await?;
//! }
//! let totals = rank.population().await?;
//! ```

use crate::distribution::{gather_grid, scatter_initial};
use crate::engine::TransitionEngine;
use crate::error::CoreError;
use crate::grid::{Dimensions, Grid, GridPair};
use crate::halo::exchange_halo;
use crate::mortality::MortalityDraw;
use crate::partition::Partition;
use crate::reduction::{reduce_population, Population};

use std::sync::Arc;
use tidepool_env::{Communicator, Rank};
use tracing::{debug, trace};

/// One cooperating process of a run.
///
/// Generic over the transport so the same code runs on the in-process mesh
/// or behind a fault-injecting wrapper.
pub struct RankProcess<C, D>
where
    C: Communicator,
    D: MortalityDraw + 'static,
{
    /// Transport endpoint
    comm: C,

    /// Owned columns
    partition: Partition,

    /// Size of the whole ocean
    dims: Dimensions,

    /// Live and scratch buffers for the owned columns plus ghosts
    grids: GridPair,

    /// Worker pool and mortality source, shared with the blocking step
    engine: Arc<TransitionEngine<D>>,

    /// Generations completed so far
    generation: u64,
}

impl<C, D> RankProcess<C, D>
where
    C: Communicator,
    D: MortalityDraw + 'static,
{
    /// Partitions the ocean, builds the worker pool and receives this
    /// rank's block from the coordinator.
    ///
    /// `initial` is the seeded full ocean; only the coordinator reads it.
    pub async fn bootstrap(
        comm: C,
        dims: Dimensions,
        threads: usize,
        draw: D,
        initial: Option<&Grid>,
    ) -> Result<Self, CoreError> {
        let partition = Partition::for_rank(comm.rank(), comm.size(), dims.width)?;
        let engine = TransitionEngine::new(threads, draw)?;

        debug!(
            rank = %partition.rank,
            of = partition.size,
            threads = engine.threads(),
            columns = ?partition.columns,
            "rank online"
        );

        let local = scatter_initial(&comm, &partition, dims, initial).await?;

        Ok(Self {
            comm,
            partition,
            dims,
            grids: GridPair::from_current(local),
            engine: Arc::new(engine),
            generation: 0,
        })
    }

    /// Returns this process's rank.
    pub fn rank(&self) -> Rank {
        self.partition.rank
    }

    /// Returns the owned partition.
    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    /// Returns the number of completed generations.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Runs one generation: exchange, update, commit.
    ///
    /// Blocks at the exchange until both neighbors have reached the same
    /// generation, which keeps the whole run in lockstep. The update runs on
    /// the blocking pool so other ranks keep the executor while it computes.
    pub async fn advance(&mut self) -> Result<(), CoreError> {
        exchange_halo(&self.comm, &mut self.grids.current).await?;

        let engine = Arc::clone(&self.engine);
        let rank = self.partition.rank;
        let column_offset = self.partition.lo();
        let generation = self.generation;
        let mut grids = std::mem::replace(&mut self.grids, GridPair::new(0, 0));

        self.grids = tokio::task::spawn_blocking(move || {
            if generation == 0 {
                engine.greet_workers(rank);
            }
            engine.step(&mut grids, column_offset, generation);
            grids.commit();
            grids
        })
        .await
        .map_err(|e| CoreError::WorkerPool(e.to_string()))?;
        self.generation += 1;

        trace!(rank = %self.partition.rank, generation = self.generation, "generation committed");
        Ok(())
    }

    /// Counts of the owned cells only.
    pub fn local_population(&self) -> Population {
        Population::of_grid(&self.grids.current)
    }

    /// Global totals; `Some` on the coordinator, `None` elsewhere.
    pub async fn population(&self) -> Result<Option<Population>, CoreError> {
        reduce_population(&self.comm, self.local_population()).await
    }

    /// Full ocean on the coordinator, for display.
    pub async fn snapshot(&self) -> Result<Option<Grid>, CoreError> {
        gather_grid(&self.comm, &self.partition, self.dims, &self.grids.current).await
    }
}
