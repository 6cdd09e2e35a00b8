//! Grid Store - cell buffers with a one-cell halo border.
//!
//! A `Grid` of logical size `H × W` is stored as `(H + 2) × (W + 2)` signed
//! cells. Rows `0` / `H + 1` and columns `0` / `W + 1` are the halo: they
//! mirror data owned elsewhere and are only ever read by the census.
//!
//! Cell encoding:
//! - `0` → empty
//! - `a > 0` → prey of age `a`
//! - `-a < 0` → predator of age `a`

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Logical size of the whole ocean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Number of logical rows (H)
    pub height: usize,

    /// Number of logical columns (W)
    pub width: usize,
}

impl Dimensions {
    /// Creates a new dimension pair.
    pub fn new(height: usize, width: usize) -> Self {
        Self { height, width }
    }
}

/// A halo-bordered buffer of cell values, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Stored rows, including both halo rows
    rows: usize,

    /// Stored columns, including both ghost columns
    cols: usize,

    cells: Vec<i32>,
}

impl Grid {
    /// Allocates an all-empty grid with `height × width` logical cells.
    pub fn new(height: usize, width: usize) -> Self {
        let rows = height + 2;
        let cols = width + 2;
        Self {
            rows,
            cols,
            cells: vec![0; rows * cols],
        }
    }

    /// Logical rows (H).
    pub fn height(&self) -> usize {
        self.rows - 2
    }

    /// Logical columns (W), excluding ghosts.
    pub fn width(&self) -> usize {
        self.cols - 2
    }

    /// Distance between vertically adjacent cells in the backing store.
    pub fn stride(&self) -> usize {
        self.cols
    }

    #[inline]
    fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.rows && j < self.cols, "cell ({i}, {j}) outside grid");
        i * self.cols + j
    }

    /// Reads cell `(i, j)` in stored coordinates (halo included).
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> i32 {
        self.cells[self.index(i, j)]
    }

    /// Writes cell `(i, j)` in stored coordinates (halo included).
    #[inline]
    pub fn set(&mut self, i: usize, j: usize, value: i32) {
        let idx = self.index(i, j);
        self.cells[idx] = value;
    }

    /// Whole stored row `i`, ghost columns included.
    pub fn row(&self, i: usize) -> &[i32] {
        let start = self.index(i, 0);
        &self.cells[start..start + self.cols]
    }

    /// Logical rows `1..=H` as one mutable slice, `stride()` cells per row.
    pub fn interior_rows_mut(&mut self) -> &mut [i32] {
        let start = self.cols;
        let end = self.cols * (self.rows - 1);
        &mut self.cells[start..end]
    }

    /// Column `j` over the logical rows `1..=H`.
    pub fn column(&self, j: usize) -> Vec<i32> {
        (1..=self.height()).map(|i| self.get(i, j)).collect()
    }

    /// Overwrites column `j` over the logical rows `1..=H`.
    pub fn set_column(&mut self, j: usize, values: &[i32]) {
        assert_eq!(values.len(), self.height(), "column length mismatch");
        for (offset, &value) in values.iter().enumerate() {
            self.set(offset + 1, j, value);
        }
    }

    /// Row-major copy of logical rows `1..=H` restricted to `columns`.
    pub fn block(&self, columns: Range<usize>) -> Vec<i32> {
        let mut out = Vec::with_capacity(self.height() * columns.len());
        for i in 1..=self.height() {
            let start = self.index(i, columns.start);
            out.extend_from_slice(&self.cells[start..start + columns.len()]);
        }
        out
    }

    /// Inverse of `block`: writes a row-major block into `columns`.
    pub fn set_block(&mut self, columns: Range<usize>, values: &[i32]) {
        let span = columns.len();
        assert_eq!(values.len(), self.height() * span, "block length mismatch");
        if span == 0 {
            return;
        }
        for (offset, chunk) in values.chunks(span).enumerate() {
            let start = self.index(offset + 1, columns.start);
            self.cells[start..start + span].copy_from_slice(chunk);
        }
    }

    /// The 8 cells surrounding `(i, j)`, diagonals included.
    ///
    /// ```text
    /// 0  3  5
    /// 1  X  6
    /// 2  4  7
    /// ```
    ///
    /// # Panics
    /// If `(i, j)` is a halo cell; only logical cells have a full neighborhood.
    #[inline]
    pub fn neighborhood(&self, i: usize, j: usize) -> [i32; 8] {
        assert!(
            i >= 1 && j >= 1 && i <= self.height() && j <= self.width(),
            "census requested for boundary cell ({i}, {j})"
        );
        let up = self.index(i - 1, j);
        let here = self.index(i, j);
        let down = self.index(i + 1, j);
        let c = &self.cells;
        [
            c[up - 1], c[here - 1], c[down - 1],
            c[up], c[down],
            c[up + 1], c[here + 1], c[down + 1],
        ]
    }

    /// Toroidal row wrap across every stored column, ghosts included:
    /// row `0` ← row `H`, row `H + 1` ← row `1`.
    ///
    /// Run after the ghost columns are current so the corners are right.
    pub fn wrap_rows(&mut self) {
        let h = self.height();
        let cols = self.cols;
        self.cells.copy_within(h * cols..(h + 1) * cols, 0);
        self.cells.copy_within(cols..2 * cols, (h + 1) * cols);
    }

    /// Iterator over the logical cells `(i, j, value)`.
    pub fn interior(&self) -> impl Iterator<Item = (usize, usize, i32)> + '_ {
        (1..=self.height()).flat_map(move |i| (1..=self.width()).map(move |j| (i, j, self.get(i, j))))
    }
}

/// The current / next generation buffers of one rank.
///
/// During a step `current` is only read and `next` is only written; `commit`
/// swaps them once every worker has finished.
#[derive(Debug, Clone)]
pub struct GridPair {
    /// Live generation (read-only while a step runs)
    pub current: Grid,

    /// Scratch generation (write-only while a step runs)
    pub next: Grid,
}

impl GridPair {
    /// Allocates two empty buffers of the same shape.
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            current: Grid::new(height, width),
            next: Grid::new(height, width),
        }
    }

    /// Wraps a seeded grid as the live generation.
    pub fn from_current(current: Grid) -> Self {
        let next = Grid::new(current.height(), current.width());
        Self { current, next }
    }

    /// Publishes the scratch buffer as the live generation.
    ///
    /// Halo cells of the new `current` are stale until the next exchange.
    pub fn commit(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }
}
