//! Neighbor census and the predator/prey transition rule.
//!
//! Both are pure and allocation-free; the engine calls them once per owned
//! cell per generation.

use crate::grid::Grid;

/// Prey at or above this age count as adults in a census.
pub const PREY_ADULT_AGE: i32 = 2;

/// Predators at or above this age (magnitude) count as adults.
pub const PREDATOR_ADULT_AGE: i32 = 3;

/// Prey die of old age once they reach this age.
pub const PREY_MAX_AGE: i32 = 10;

/// Predators die of old age once they reach this age (magnitude).
pub const PREDATOR_MAX_AGE: i32 = 20;

/// A predator dies when its uniform draw is at or below this value.
pub const PREDATOR_MORTALITY: f64 = 0.031;

/// Decoded value of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Empty,
    Prey(u32),
    Predator(u32),
}

impl From<i32> for CellState {
    fn from(value: i32) -> Self {
        match value {
            0 => CellState::Empty,
            v if v > 0 => CellState::Prey(v.unsigned_abs()),
            v => CellState::Predator(v.unsigned_abs()),
        }
    }
}

/// Tally of the 8 cells surrounding one cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Census {
    /// Neighboring prey of any age
    pub prey: u8,

    /// Neighboring prey aged `PREY_ADULT_AGE` or more
    pub adult_prey: u8,

    /// Neighboring predators of any age
    pub predators: u8,

    /// Neighboring predators aged `PREDATOR_ADULT_AGE` or more
    pub adult_predators: u8,
}

impl Census {
    /// Counts a fixed 8-cell neighborhood.
    #[inline]
    pub fn of(neighbors: &[i32; 8]) -> Self {
        let mut census = Census::default();
        for &value in neighbors {
            if value > 0 {
                census.prey += 1;
                if value >= PREY_ADULT_AGE {
                    census.adult_prey += 1;
                }
            } else if value < 0 {
                census.predators += 1;
                if value <= -PREDATOR_ADULT_AGE {
                    census.adult_predators += 1;
                }
            }
        }
        census
    }
}

/// Next-generation value of a cell from its current value and census.
///
/// `draw` is consulted only for predators that survive the deterministic
/// checks, and must yield a uniform value in `[0, 1)`.
#[inline]
pub fn next_value(value: i32, census: Census, draw: impl FnOnce() -> f64) -> i32 {
    if value > 0 {
        // Eaten, crowded out, or old
        if census.predators >= 5 || census.prey == 8 || value >= PREY_MAX_AGE {
            0
        } else {
            value + 1
        }
    } else if value < 0 {
        // Starved in a crowded pack, sudden death, or old
        let starved = census.predators >= 6 && census.prey == 0;
        if starved || value <= -PREDATOR_MAX_AGE || draw() <= PREDATOR_MORTALITY {
            0
        } else {
            value - 1
        }
    } else if census.prey >= 4 && census.adult_prey >= 3 && census.predators < 4 {
        1
    } else if census.predators >= 4 && census.adult_predators >= 3 && census.prey < 4 {
        -1
    } else {
        0
    }
}

/// Census plus rule for logical cell `(i, j)` of `grid`.
#[inline]
pub fn evolve_cell(grid: &Grid, i: usize, j: usize, draw: impl FnOnce() -> f64) -> i32 {
    next_value(grid.get(i, j), Census::of(&grid.neighborhood(i, j)), draw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn census(prey: u8, adult_prey: u8, predators: u8, adult_predators: u8) -> Census {
        Census {
            prey,
            adult_prey,
            predators,
            adult_predators,
        }
    }

    fn never() -> f64 {
        panic!("draw must not be consulted")
    }

    #[test]
    fn test_census_counts_adults() {
        let c = Census::of(&[1, 2, 5, 0, -1, -2, -3, -7]);
        assert_eq!(c, census(3, 2, 4, 2));
    }

    #[test]
    fn test_cell_state_decoding() {
        assert_eq!(CellState::from(0), CellState::Empty);
        assert_eq!(CellState::from(4), CellState::Prey(4));
        assert_eq!(CellState::from(-6), CellState::Predator(6));
    }

    #[test]
    fn test_prey_crowded_out() {
        assert_eq!(next_value(3, census(8, 8, 0, 0), never), 0);
    }

    #[test]
    fn test_prey_eaten() {
        assert_eq!(next_value(1, census(0, 0, 5, 0), never), 0);
        assert_eq!(next_value(1, census(0, 0, 4, 4), never), 2);
    }

    #[test]
    fn test_prey_ages_then_dies_of_old_age() {
        assert_eq!(next_value(9, Census::default(), never), 10);
        assert_eq!(next_value(10, Census::default(), never), 0);
    }

    #[test]
    fn test_predator_survives_when_draw_misses() {
        assert_eq!(next_value(-1, Census::default(), || 0.5), -2);
        assert_eq!(next_value(-19, census(2, 0, 3, 0), || 0.0311), -20);
    }

    #[test]
    fn test_predator_sudden_death() {
        assert_eq!(next_value(-4, Census::default(), || 0.031), 0);
        assert_eq!(next_value(-4, Census::default(), || 0.0), 0);
    }

    #[test]
    fn test_predator_starvation_and_old_age() {
        assert_eq!(next_value(-2, census(0, 0, 6, 0), never), 0);
        // One prey nearby is enough to avoid starvation
        assert_eq!(next_value(-2, census(1, 0, 6, 0), || 0.9), -3);
        assert_eq!(next_value(-20, Census::default(), never), 0);
    }

    #[test]
    fn test_prey_birth() {
        assert_eq!(next_value(0, census(4, 3, 0, 0), never), 1);
        assert_eq!(next_value(0, census(4, 2, 0, 0), never), 0);
        assert_eq!(next_value(0, census(4, 3, 4, 3), never), 0);
    }

    #[test]
    fn test_predator_birth() {
        assert_eq!(next_value(0, census(3, 3, 4, 3), never), -1);
        assert_eq!(next_value(0, census(0, 0, 4, 2), never), 0);
    }

    #[test]
    fn test_evolve_cell_reads_neighborhood() {
        let mut grid = Grid::new(3, 3);
        for &(i, j) in &[(1, 1), (1, 2), (1, 3), (2, 1)] {
            grid.set(i, j, 2);
        }
        assert_eq!(evolve_cell(&grid, 2, 2, never), 1);
    }
}
