use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Tile values the environment can insert.
pub const TWO: u32 = 2;
pub const FOUR: u32 = 4;

/// Source of simulated tile insertions inside the search.
///
/// This is separate from whatever randomness the game loop uses to place
/// real tiles, so look-ahead is not repeatable across calls unless the
/// generator is seeded.
pub trait TileGenerator {
    /// Return 2 with probability `two_probability`, else 4.
    fn sample(&mut self, two_probability: f64) -> u32;
}

/// `rand`-backed generator.
#[derive(Debug, Clone)]
pub struct RandomTiles<R> {
    rng: R,
}

impl<R: Rng> RandomTiles<R> {
    pub fn new(rng: R) -> Self { Self { rng } }
}

impl RandomTiles<StdRng> {
    /// Reproducible generator.
    pub fn seeded(seed: u64) -> Self { Self::new(StdRng::seed_from_u64(seed)) }

    pub fn from_entropy() -> Self { Self::new(StdRng::from_entropy()) }
}

impl<R: Rng> TileGenerator for RandomTiles<R> {
    #[inline]
    fn sample(&mut self, two_probability: f64) -> u32 {
        if self.rng.gen_bool(two_probability.clamp(0.0, 1.0)) { TWO } else { FOUR }
    }
}

/// Cycles through a fixed sequence, ignoring the probability.
#[derive(Debug, Clone)]
pub struct FixedTiles {
    values: Vec<u32>,
    next: usize,
}

impl FixedTiles {
    /// `values` must be non-empty; an empty sequence behaves like `[2]`.
    pub fn new(values: Vec<u32>) -> Self {
        let values = if values.is_empty() { vec![TWO] } else { values };
        Self { values, next: 0 }
    }

    /// Always yields `value`.
    pub fn constant(value: u32) -> Self { Self::new(vec![value]) }
}

impl TileGenerator for FixedTiles {
    fn sample(&mut self, _two_probability: f64) -> u32 {
        let v = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        v
    }
}
