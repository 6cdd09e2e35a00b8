//! Common types for the Tidepool environment abstraction.

use serde::{Deserialize, Serialize};

/// Index of a cooperating process in `[0, size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(pub usize);

impl Rank {
    /// The rank that coordinates reductions and owns the seeded grid.
    pub const COORDINATOR: Rank = Rank(0);
    
    /// Returns true for the coordinator rank.
    pub fn is_coordinator(&self) -> bool {
        self.0 == 0
    }
    
    /// Neighbor to the left on a ring of `size` ranks.
    pub fn left(&self, size: usize) -> Rank {
        Rank((self.0 + size - 1) % size)
    }
    
    /// Neighbor to the right on a ring of `size` ranks.
    pub fn right(&self, size: usize) -> Rank {
        Rank((self.0 + 1) % size)
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rank-{}", self.0)
    }
}

/// Transport-level message tag.
///
/// Receives are matched on `(source, tag)`, so two flows between the same
/// pair of ranks never cross as long as their tags differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag(pub u32);

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Envelope for a tagged message travelling between two ranks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Tag the receiver matches on
    pub tag: Tag,
    
    /// Raw cell values or counters
    pub payload: Vec<i32>,
}

impl Envelope {
    /// Creates a new envelope.
    pub fn new(tag: Tag, payload: Vec<i32>) -> Self {
        Self { tag, payload }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    
    #[test]
    fn test_ring_neighbors_wrap() {
        assert_eq!(Rank(0).left(4), Rank(3));
        assert_eq!(Rank(3).right(4), Rank(0));
        assert_eq!(Rank(1).left(4), Rank(0));
        assert_eq!(Rank(1).right(4), Rank(2));
    }
    
    #[test]
    fn test_single_rank_is_its_own_neighbor() {
        assert_eq!(Rank(0).left(1), Rank(0));
        assert_eq!(Rank(0).right(1), Rank(0));
    }
}
