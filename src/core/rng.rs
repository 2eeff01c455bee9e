//! Deterministic random number generation for action sampling.
//!
//! The same seed produces the same sequence of sampled actions, which
//! makes self-play runs and tests reproducible.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded RNG used by `explore()` and the random baseline agent.
///
/// ChaCha8 is fast while keeping high-quality randomness.
#[derive(Clone, Debug)]
pub struct SearchRng {
    inner: ChaCha8Rng,
}

impl SearchRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draw from the half-open interval `(0, 1]`.
    ///
    /// Used as the minimum probability mass to accumulate when sampling an
    /// action proportionally to visit counts.
    pub fn gen_unit_open(&mut self) -> f32 {
        1.0 - self.inner.gen::<f32>()
    }

    /// Generate a random usize in the given range.
    pub fn gen_range_usize(&mut self, range: std::ops::Range<usize>) -> usize {
        self.inner.gen_range(range)
    }
}
