//! Transition Engine - parallel application of the rule over owned cells.
//!
//! Rows of the scratch buffer are handed to the worker pool as disjoint
//! mutable slices while the live buffer is shared read-only, so no locking
//! is needed. `step` returns only after every row is written.

use crate::error::CoreError;
use crate::grid::GridPair;
use crate::mortality::MortalityDraw;
use crate::transition::evolve_cell;
use rayon::prelude::*;
use tidepool_env::Rank;
use tracing::trace;

/// Per-rank worker pool plus the mortality source it draws from.
pub struct TransitionEngine<D: MortalityDraw> {
    pool: rayon::ThreadPool,
    draw: D,
}

impl<D: MortalityDraw> TransitionEngine<D> {
    /// Creates an engine with `threads` workers (at least one).
    pub fn new(threads: usize, draw: D) -> Result<Self, CoreError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|idx| format!("tidepool-worker-{idx}"))
            .build()
            .map_err(|e| CoreError::WorkerPool(e.to_string()))?;

        Ok(Self { pool, draw })
    }

    /// Number of workers in the pool.
    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Has every worker announce itself once; returns the worker indices
    /// that answered, in order.
    pub fn greet_workers(&self, rank: Rank) -> Vec<usize> {
        self.pool.broadcast(|ctx| {
            trace!(%rank, worker = ctx.index(), of = ctx.num_threads(), "worker online");
            ctx.index()
        })
    }

    /// Computes generation `generation` of every logical cell into `next`.
    ///
    /// `current` must have fresh halos. `column_offset` maps local stored
    /// columns to global ones for the mortality key (`Partition::lo`).
    pub fn step(&self, grids: &mut GridPair, column_offset: usize, generation: u64) {
        let GridPair { current, next } = grids;
        let current = &*current;
        let stride = current.stride();
        let width = current.width();
        let draw = &self.draw;

        self.pool.install(|| {
            next.interior_rows_mut()
                .par_chunks_mut(stride)
                .enumerate()
                .for_each_init(
                    || vec![0.0; width],
                    |draws, (offset, row)| {
                        let i = offset + 1;
                        draw.fill_row(generation, i, column_offset + 1, draws);
                        for j in 1..=width {
                            row[j] = evolve_cell(current, i, j, || draws[j - 1]);
                        }
                    },
                );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::mortality::{FixedDraw, KeyedDraw};
    use crate::reference;

    fn seeded_grid(height: usize, width: usize, seed: u64) -> Grid {
        use rand::{Rng, SeedableRng};
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        let mut grid = Grid::new(height, width);
        for i in 1..=height {
            for j in 1..=width {
                let v = match rng.gen_range(0..4) {
                    0 => 0,
                    1 => -rng.gen_range(1..20),
                    _ => rng.gen_range(1..10),
                };
                grid.set(i, j, v);
            }
        }
        grid
    }

    #[test]
    fn test_engine_thread_count() {
        let engine = TransitionEngine::new(3, FixedDraw(0.5)).unwrap();
        assert_eq!(engine.threads(), 3);
        let engine = TransitionEngine::new(0, FixedDraw(0.5)).unwrap();
        assert_eq!(engine.threads(), 1);
    }

    #[test]
    fn test_every_worker_greets_once() {
        let engine = TransitionEngine::new(3, FixedDraw(0.5)).unwrap();
        assert_eq!(engine.greet_workers(Rank(2)), vec![0, 1, 2]);
    }

    #[test]
    fn test_engine_leaves_halo_untouched() {
        let mut pair = GridPair::from_current(seeded_grid(6, 6, 1));
        reference::refresh_boundaries(&mut pair.current);
        pair.next.set(0, 0, 99);

        let engine = TransitionEngine::new(2, FixedDraw(0.5)).unwrap();
        engine.step(&mut pair, 0, 0);
        assert_eq!(pair.next.get(0, 0), 99);
    }

    #[test]
    fn test_engine_matches_reference_for_any_thread_count() {
        let seed_grid = seeded_grid(24, 17, 9);
        let draw = KeyedDraw::new(5);

        let mut expected = GridPair::from_current(seed_grid.clone());
        reference::step(&mut expected, &draw, 0);

        for threads in [1, 2, 4, 7] {
            let mut pair = GridPair::from_current(seed_grid.clone());
            reference::refresh_boundaries(&mut pair.current);
            let engine = TransitionEngine::new(threads, draw.clone()).unwrap();
            engine.step(&mut pair, 0, 0);
            pair.commit();

            assert_eq!(pair.current.block(1..18), expected.current.block(1..18), "threads = {threads}");
        }
    }
}
