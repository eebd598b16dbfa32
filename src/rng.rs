//! Seeded random source threaded through question generation.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, RngCore, SeedableRng};

use crate::util::round_to;

/// Deterministic RNG handle used by every generator and formatter.
///
/// A dynamic question persists the `u64` seed it was rendered with, so the
/// same `(generator, params, style, seed)` always renders the same question.
#[derive(Debug, Clone)]
pub struct QuestionRng {
    seed: u64,
    rng: StdRng,
}

impl QuestionRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed drawn from the thread RNG, for fresh question instances
    pub fn fresh_seed() -> u64 {
        rand::thread_rng().next_u64()
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform draw in `[min, max]`, rounded to 3 decimals
    pub fn in_range(&mut self, min: f64, max: f64) -> f64 {
        if min >= max {
            return round_to(min, 3);
        }
        round_to(self.rng.gen_range(min..=max), 3)
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p)
    }

    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}
