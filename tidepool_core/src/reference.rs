//! Sequential reference stepper.
//!
//! One process, one thread, full-width grid. Used as the oracle the
//! partitioned engine must reproduce bit for bit.

use crate::grid::{Grid, GridPair};
use crate::mortality::MortalityDraw;
use crate::transition::evolve_cell;

/// Full toroidal wrap of a single full-width grid.
///
/// Columns first (`0` ← `W`, `W + 1` ← `1`), then whole rows, which also
/// fills the four corners from their diagonal opposites.
pub fn refresh_boundaries(grid: &mut Grid) {
    let width = grid.width();
    for i in 1..=grid.height() {
        grid.set(i, 0, grid.get(i, width));
        grid.set(i, width + 1, grid.get(i, 1));
    }
    grid.wrap_rows();
}

/// Advances a full-width grid by one generation: wrap, update, commit.
pub fn step<D: MortalityDraw + ?Sized>(grids: &mut GridPair, draw: &D, generation: u64) {
    refresh_boundaries(&mut grids.current);

    let height = grids.current.height();
    let width = grids.current.width();
    let mut draws = vec![0.0; width];
    for i in 1..=height {
        draw.fill_row(generation, i, 1, &mut draws);
        for j in 1..=width {
            let value = evolve_cell(&grids.current, i, j, || draws[j - 1]);
            grids.next.set(i, j, value);
        }
    }

    grids.commit();
}
