//! Partition Map - column decomposition of the ocean across ranks.
//!
//! Rank `id` of `nprocs` owns global columns `[id*W/nprocs, (id+1)*W/nprocs)`
//! (0-based, half-open) over the full height. Integer division keeps the
//! ranges contiguous and gap-free even when `W` is not a multiple of `nprocs`.

use crate::error::CoreError;
use std::ops::Range;
use tidepool_env::Rank;

/// Half-open column range `[lo, hi)` owned by rank `id`.
///
/// # Panics
/// If `nprocs == 0` or `id >= nprocs`.
pub fn partition(id: usize, nprocs: usize, width: usize) -> Range<usize> {
    assert!(nprocs >= 1, "partition requested for zero processes");
    assert!(id < nprocs, "rank {id} outside {nprocs} processes");
    (id * width / nprocs)..((id + 1) * width / nprocs)
}

/// One rank's slice of the ocean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Owning rank
    pub rank: Rank,

    /// Number of ranks in the run
    pub size: usize,

    /// Owned global columns, 0-based half-open
    pub columns: Range<usize>,
}

impl Partition {
    /// Validated partition for `rank` of `size` over `width` columns.
    ///
    /// Every rank must own at least one column, otherwise it would have no
    /// boundary column to hand its neighbors.
    pub fn for_rank(rank: Rank, size: usize, width: usize) -> Result<Self, CoreError> {
        if size == 0 || rank.0 >= size || width < size {
            return Err(CoreError::InvalidPartition {
                rank: rank.0,
                size,
                width,
            });
        }

        Ok(Self {
            rank,
            size,
            columns: partition(rank.0, size, width),
        })
    }

    /// First owned global column (0-based).
    pub fn lo(&self) -> usize {
        self.columns.start
    }

    /// One past the last owned global column (0-based).
    pub fn hi(&self) -> usize {
        self.columns.end
    }

    /// Number of owned columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Stored column of a full-width grid that holds local column `j`.
    ///
    /// Local and full-width grids both reserve column 0 for the left ghost,
    /// so this is a plain offset.
    pub fn global_column(&self, local: usize) -> usize {
        self.lo() + local
    }

    /// Owned columns in the stored coordinates of a full-width grid.
    pub fn stored_columns(&self) -> Range<usize> {
        (self.lo() + 1)..(self.hi() + 1)
    }
}
