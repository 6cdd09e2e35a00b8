//! ASCII frames of the ocean.

use tidepool_core::{CellState, Grid};

/// Glyph for one cell: `f` prey, `s` predator, `-` empty.
pub fn glyph(value: i32) -> char {
    match CellState::from(value) {
        CellState::Prey(_) => 'f',
        CellState::Predator(_) => 's',
        CellState::Empty => '-',
    }
}

/// Renders the logical cells, one line per row; ghosts are skipped.
pub fn render_ascii(grid: &Grid) -> String {
    let mut out = String::with_capacity(grid.height() * (grid.width() + 1));
    for i in 1..=grid.height() {
        out.extend((1..=grid.width()).map(|j| glyph(grid.get(i, j))));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_small_ocean() {
        let mut grid = Grid::new(2, 3);
        grid.set(1, 1, 4);
        grid.set(2, 3, -7);
        grid.set(0, 2, 1); // halo, never drawn

        assert_eq!(render_ascii(&grid), "f--\n--s\n");
    }
}
