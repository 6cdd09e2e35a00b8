//! Halo Exchange Protocol - ghost columns from the neighbors, ghost rows by wrap.
//!
//! Each rank swaps one boundary column with each ring neighbor per
//! generation. To avoid every rank blocking in `send` at once, ranks take a
//! role by parity and walk the same four steps in complementary order:
//!
//! ```text
//! Initiator (even)          Responder (odd)
//!   send → right              recv ← left
//!   recv ← left               send → right
//!   send → left               recv ← right
//!   recv ← right              send → left
//! ```
//!
//! Every send is posted against a receive its peer is about to issue, so
//! the ring cannot close into a circular wait. Tags encode the sender's
//! role and the direction of travel, keeping the four flows on a boundary
//! apart. With one rank the exchange is a local wrap.

use crate::error::CoreError;
use crate::grid::Grid;
use tidepool_env::{Communicator, Rank, Tag};
use tracing::trace;

/// Position of a rank in the exchange ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Sends before it receives
    Initiator,

    /// Receives before it sends
    Responder,
}

/// Parity role of a rank.
pub fn role(rank: Rank) -> Role {
    if rank.0 % 2 == 0 {
        Role::Initiator
    } else {
        Role::Responder
    }
}

/// Which way a boundary column travels around the ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Toward `rank + 1`; carries the sender's last owned column
    Rightward,

    /// Toward `rank - 1`; carries the sender's first owned column
    Leftward,
}

/// Transport tag for a column sent by a `sender` in `direction`.
pub fn halo_tag(sender: Role, direction: Direction) -> Tag {
    match (sender, direction) {
        (Role::Initiator, Direction::Rightward) => Tag(21),
        (Role::Responder, Direction::Rightward) => Tag(122),
        (Role::Initiator, Direction::Leftward) => Tag(221),
        (Role::Responder, Direction::Leftward) => Tag(120),
    }
}

/// One operation of the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaloStep {
    SendRight,
    RecvLeft,
    SendLeft,
    RecvRight,
}

impl Role {
    /// The order in which this role performs the four operations.
    pub fn schedule(&self) -> [HaloStep; 4] {
        match self {
            Role::Initiator => [
                HaloStep::SendRight,
                HaloStep::RecvLeft,
                HaloStep::SendLeft,
                HaloStep::RecvRight,
            ],
            Role::Responder => [
                HaloStep::RecvLeft,
                HaloStep::SendRight,
                HaloStep::RecvRight,
                HaloStep::SendLeft,
            ],
        }
    }
}

/// Copies the opposite owned columns into the ghost columns.
///
/// This is the whole column exchange when a single rank owns every column.
pub fn wrap_columns(grid: &mut Grid) {
    let width = grid.width();
    for i in 1..=grid.height() {
        grid.set(i, 0, grid.get(i, width));
        grid.set(i, width + 1, grid.get(i, 1));
    }
}

/// Refreshes every halo cell of a rank's live buffer.
///
/// Ghost columns come from the ring neighbors (or a local wrap), then the
/// ghost rows are wrapped across the full local width including the ghost
/// columns, which fills the corners.
pub async fn exchange_halo<C>(comm: &C, grid: &mut Grid) -> Result<(), CoreError>
where
    C: Communicator + ?Sized,
{
    let size = comm.size();

    if size == 1 {
        wrap_columns(grid);
    } else {
        let me = comm.rank();
        let left = me.left(size);
        let right = me.right(size);
        let my_role = role(me);
        let width = grid.width();
        let height = grid.height();

        for step in my_role.schedule() {
            match step {
                HaloStep::SendRight => {
                    let tag = halo_tag(my_role, Direction::Rightward);
                    comm.send(right, tag, grid.column(width)).await?;
                }
                HaloStep::RecvLeft => {
                    let tag = halo_tag(role(left), Direction::Rightward);
                    let column = comm.recv(left, tag).await?;
                    CoreError::expect_len(left, tag, height, &column)?;
                    grid.set_column(0, &column);
                }
                HaloStep::SendLeft => {
                    let tag = halo_tag(my_role, Direction::Leftward);
                    comm.send(left, tag, grid.column(1)).await?;
                }
                HaloStep::RecvRight => {
                    let tag = halo_tag(role(right), Direction::Leftward);
                    let column = comm.recv(right, tag).await?;
                    CoreError::expect_len(right, tag, height, &column)?;
                    grid.set_column(width + 1, &column);
                }
            }
        }
        trace!(rank = %me, %left, %right, "ghost columns exchanged");
    }

    grid.wrap_rows();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::Partition;
    use tidepool_env::LocalFabric;

    /// Full grid where every logical cell holds a unique value.
    fn labelled(height: usize, width: usize) -> Grid {
        let mut grid = Grid::new(height, width);
        for i in 1..=height {
            for j in 1..=width {
                grid.set(i, j, (i * 1000 + j) as i32);
            }
        }
        grid
    }

    /// Runs one exchange on every rank and returns the local grids.
    async fn exchange_all(full: &Grid, nprocs: usize) -> Vec<(Partition, Grid)> {
        let mut handles = Vec::new();
        for comm in LocalFabric::new(nprocs, 1) {
            let part = Partition::for_rank(comm.rank(), nprocs, full.width()).unwrap();
            let mut local = Grid::new(full.height(), part.width());
            local.set_block(1..part.width() + 1, &full.block(part.stored_columns()));
            handles.push(tokio::spawn(async move {
                exchange_halo(&comm, &mut local).await.unwrap();
                (part, local)
            }));
        }

        let mut out = Vec::new();
        for handle in handles {
            out.push(handle.await.unwrap());
        }
        out
    }

    #[test]
    fn test_roles_alternate_by_parity() {
        assert_eq!(role(Rank(0)), Role::Initiator);
        assert_eq!(role(Rank(1)), Role::Responder);
        assert_eq!(role(Rank(6)), Role::Initiator);
    }

    #[test]
    fn test_halo_tags_are_distinct() {
        let tags = [
            halo_tag(Role::Initiator, Direction::Rightward),
            halo_tag(Role::Responder, Direction::Rightward),
            halo_tag(Role::Initiator, Direction::Leftward),
            halo_tag(Role::Responder, Direction::Leftward),
        ];
        for a in 0..tags.len() {
            for b in a + 1..tags.len() {
                assert_ne!(tags[a], tags[b]);
            }
        }
    }

    #[test]
    fn test_schedules_pair_sends_with_receives() {
        let init = Role::Initiator.schedule();
        let resp = Role::Responder.schedule();
        // At each position one side sends while the other receives
        for (a, b) in init.iter().zip(resp.iter()) {
            let a_sends = matches!(a, HaloStep::SendRight | HaloStep::SendLeft);
            let b_sends = matches!(b, HaloStep::SendRight | HaloStep::SendLeft);
            assert_ne!(a_sends, b_sends);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_ghost_columns_match_neighbors() {
        let full = labelled(5, 16);
        let ranks = exchange_all(&full, 4).await;

        for (part, local) in &ranks {
            let left_global = if part.lo() == 0 { full.width() } else { part.lo() };
            let right_global = if part.hi() == full.width() { 1 } else { part.hi() + 1 };
            assert_eq!(local.column(0), full.column(left_global), "left ghost of {}", part.rank);
            assert_eq!(local.column(part.width() + 1), full.column(right_global), "right ghost of {}", part.rank);
        }

        // Rank 1's left ghost is rank 0's last real column
        let (_, rank1) = &ranks[1];
        assert_eq!(rank1.column(0), full.column(4));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 3)]
    async fn test_odd_ring_and_uneven_width() {
        let full = labelled(4, 11);
        for nprocs in [2, 3, 5] {
            let ranks = exchange_all(&full, nprocs).await;
            for (part, local) in &ranks {
                let left_global = if part.lo() == 0 { full.width() } else { part.lo() };
                assert_eq!(local.column(0), full.column(left_global), "nprocs {nprocs}");
            }
        }
    }

    #[tokio::test]
    async fn test_ghost_rows_are_toroidal_after_exchange() {
        let full = labelled(6, 8);
        for (_, local) in exchange_all(&full, 2).await {
            assert_eq!(local.row(0), local.row(6));
            assert_eq!(local.row(7), local.row(1));
        }
    }

    #[tokio::test]
    async fn test_single_rank_wraps_locally() {
        let full = labelled(3, 5);
        let (_, local) = exchange_all(&full, 1).await.remove(0);
        assert_eq!(local.column(0), full.column(5));
        assert_eq!(local.column(6), full.column(1));
        assert_eq!(local.get(0, 0), full.get(3, 5));
    }
}
