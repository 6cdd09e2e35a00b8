//! Global Reduction Protocol - prey/predator totals on the coordinator.
//!
//! A star: every non-coordinator sends its prey count then its predator
//! count to rank 0, and rank 0 drains exactly those two messages from each
//! peer in rank order. Flow is strictly leaves → coordinator, so it cannot
//! deadlock. A silent peer stalls the coordinator; there is no timeout.

use crate::error::CoreError;
use crate::grid::Grid;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};
use tidepool_env::{Communicator, Rank, Tag};

/// Tag for a peer's prey count.
pub const PREY_COUNT_TAG: Tag = Tag(32120);

/// Tag for a peer's predator count.
pub const PREDATOR_COUNT_TAG: Tag = Tag(12320);

/// Prey and predator totals over some set of cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Population {
    pub prey: u64,
    pub predators: u64,
}

impl Population {
    /// Creates a population from explicit counts.
    pub fn new(prey: u64, predators: u64) -> Self {
        Self { prey, predators }
    }

    /// Counts the logical cells of a grid; ghosts are never counted.
    pub fn of_grid(grid: &Grid) -> Self {
        grid.interior().fold(Self::default(), |mut acc, (_, _, value)| {
            if value > 0 {
                acc.prey += 1;
            } else if value < 0 {
                acc.predators += 1;
            }
            acc
        })
    }

    /// Number of occupied cells.
    pub fn occupied(&self) -> u64 {
        self.prey + self.predators
    }
}

impl Add for Population {
    type Output = Population;

    fn add(self, rhs: Population) -> Population {
        Population {
            prey: self.prey + rhs.prey,
            predators: self.predators + rhs.predators,
        }
    }
}

impl AddAssign for Population {
    fn add_assign(&mut self, rhs: Population) {
        *self = *self + rhs;
    }
}

fn encode(count: u64) -> Result<Vec<i32>, CoreError> {
    let cell = i32::try_from(count).map_err(|_| CoreError::CountOverflow(count))?;
    Ok(vec![cell])
}

async fn recv_count<C>(comm: &C, peer: Rank, tag: Tag) -> Result<u64, CoreError>
where
    C: Communicator + ?Sized,
{
    let payload = comm.recv(peer, tag).await?;
    CoreError::expect_len(peer, tag, 1, &payload)?;
    u64::try_from(payload[0]).map_err(|_| CoreError::InvalidCount {
        peer,
        value: payload[0],
    })
}

/// Sums every rank's `local` counts onto the coordinator.
///
/// Every rank must call this in the same generation. Returns `Some(total)`
/// on rank 0 and `None` elsewhere.
pub async fn reduce_population<C>(comm: &C, local: Population) -> Result<Option<Population>, CoreError>
where
    C: Communicator + ?Sized,
{
    if comm.rank().is_coordinator() {
        let mut total = local;
        for peer in (1..comm.size()).map(Rank) {
            let prey = recv_count(comm, peer, PREY_COUNT_TAG).await?;
            let predators = recv_count(comm, peer, PREDATOR_COUNT_TAG).await?;
            total += Population::new(prey, predators);
        }
        Ok(Some(total))
    } else {
        comm.send(Rank::COORDINATOR, PREY_COUNT_TAG, encode(local.prey)?).await?;
        comm.send(Rank::COORDINATOR, PREDATOR_COUNT_TAG, encode(local.predators)?).await?;
        Ok(None)
    }
}
