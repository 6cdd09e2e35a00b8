//! Moving whole partitions between the coordinator and its peers.
//!
//! `scatter_initial` hands every rank its owned block of the seeded ocean
//! before the first generation; `gather_grid` pulls every block back to the
//! coordinator for display. Blocks travel as one row-major message of
//! `H × owned-columns` cells.

use crate::error::CoreError;
use crate::grid::{Dimensions, Grid};
use crate::partition::Partition;
use tidepool_env::{Communicator, Rank, Tag};

/// Tag for the initial block sent from the coordinator.
pub const SCATTER_TAG: Tag = Tag(7000);

/// Tag for a block returned to the coordinator.
pub const GATHER_TAG: Tag = Tag(7001);

/// Builds this rank's local grid from the coordinator's seeded ocean.
///
/// `me` is the caller's own partition. `initial` is read only on the
/// coordinator, where it is required.
pub async fn scatter_initial<C>(
    comm: &C,
    me: &Partition,
    dims: Dimensions,
    initial: Option<&Grid>,
) -> Result<Grid, CoreError>
where
    C: Communicator + ?Sized,
{
    let size = me.size;
    let mut local = Grid::new(dims.height, me.width());

    if me.rank.is_coordinator() {
        let full = initial.ok_or(CoreError::MissingInitialGrid)?;
        for peer in (1..size).map(Rank) {
            let part = Partition::for_rank(peer, size, dims.width)?;
            comm.send(peer, SCATTER_TAG, full.block(part.stored_columns())).await?;
        }
        local.set_block(1..me.width() + 1, &full.block(me.stored_columns()));
    } else {
        let block = comm.recv(Rank::COORDINATOR, SCATTER_TAG).await?;
        CoreError::expect_len(Rank::COORDINATOR, SCATTER_TAG, dims.height * me.width(), &block)?;
        local.set_block(1..me.width() + 1, &block);
    }

    Ok(local)
}

/// Reassembles the full ocean on the coordinator.
///
/// Returns `Some(full)` on rank 0 (halo cells left empty) and `None`
/// elsewhere. Every rank must call this in the same generation.
pub async fn gather_grid<C>(
    comm: &C,
    me: &Partition,
    dims: Dimensions,
    local: &Grid,
) -> Result<Option<Grid>, CoreError>
where
    C: Communicator + ?Sized,
{
    let size = me.size;
    let owned = local.block(1..me.width() + 1);

    if !me.rank.is_coordinator() {
        comm.send(Rank::COORDINATOR, GATHER_TAG, owned).await?;
        return Ok(None);
    }

    let mut full = Grid::new(dims.height, dims.width);
    full.set_block(me.stored_columns(), &owned);
    for peer in (1..size).map(Rank) {
        let part = Partition::for_rank(peer, size, dims.width)?;
        let block = comm.recv(peer, GATHER_TAG).await?;
        CoreError::expect_len(peer, GATHER_TAG, dims.height * part.width(), &block)?;
        full.set_block(part.stored_columns(), &block);
    }

    Ok(Some(full))
}
