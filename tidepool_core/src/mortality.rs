//! Random source for predator sudden death.
//!
//! Draws are keyed by `(generation, row, col)` in global coordinates rather
//! than pulled from a shared stream, so a cell's fate never depends on how
//! many other cells drew before it. Results are identical for any process
//! count, thread count or scheduling order.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Uniform `[0, 1)` value for one predator in one generation.
pub trait MortalityDraw: Send + Sync {
    /// Draw for the predator at global stored cell `(row, col)`.
    fn draw(&self, generation: u64, row: usize, col: usize) -> f64;

    /// Draws for the run of cells `(row, first_col..first_col + out.len())`.
    ///
    /// Must agree with `draw` cell by cell.
    fn fill_row(&self, generation: u64, row: usize, first_col: usize, out: &mut [f64]) {
        for (offset, slot) in out.iter_mut().enumerate() {
            *slot = self.draw(generation, row, first_col + offset);
        }
    }
}

/// ChaCha8 keystream addressed by cell.
///
/// The generation selects the stream and the cell selects the word
/// position, giving every `(generation, row, col)` its own 64 bits.
#[derive(Debug, Clone)]
pub struct KeyedDraw {
    base: ChaCha8Rng,
}

impl KeyedDraw {
    /// Creates a keyed source from a run seed.
    pub fn new(seed: u64) -> Self {
        Self {
            base: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl KeyedDraw {
    /// Keystream positioned at the draw for `(generation, row, col)`.
    fn seek(&self, generation: u64, row: usize, col: usize) -> ChaCha8Rng {
        // Two 32-bit words per draw; rows and columns stay below 2^32
        let word = (((row as u128) << 32) | col as u128) << 1;
        let mut rng = self.base.clone();
        rng.set_stream(generation);
        rng.set_word_pos(word);
        rng
    }
}

impl MortalityDraw for KeyedDraw {
    fn draw(&self, generation: u64, row: usize, col: usize) -> f64 {
        self.seek(generation, row, col).gen::<f64>()
    }

    fn fill_row(&self, generation: u64, row: usize, first_col: usize, out: &mut [f64]) {
        // Adjacent columns are adjacent words, so one seek serves the whole run
        let mut rng = self.seek(generation, row, first_col);
        for slot in out.iter_mut() {
            *slot = rng.gen::<f64>();
        }
    }
}

/// Constant draw, for pinning predator fate in tests and benchmarks.
#[derive(Debug, Clone, Copy)]
pub struct FixedDraw(pub f64);

impl MortalityDraw for FixedDraw {
    fn draw(&self, _generation: u64, _row: usize, _col: usize) -> f64 {
        self.0
    }
}
