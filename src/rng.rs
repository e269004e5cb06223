//! Injectable randomness.
//!
//! Every random draw in the simulation (spawn sampling, wander headings, catch
//! and line-break rolls) goes through [`RandomSource`] so a round can be
//! replayed exactly from a seed.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub trait RandomSource {
    /// Uniform draw in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform draw in `[min, max)`. Empty or inverted ranges yield `min`.
    fn range_f64(&mut self, min: f64, max: f64) -> f64 {
        if max <= min {
            return min;
        }
        min + (max - min) * self.next_f64()
    }

    /// Uniform integer in `[min, max]` (inclusive).
    fn range_usize(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            return min;
        }
        let span = (max - min + 1) as f64;
        min + ((self.next_f64() * span) as usize).min(max - min)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// `-1.0` or `1.0` with equal odds.
    fn sign(&mut self) -> f64 {
        if self.next_f64() < 0.5 { -1.0 } else { 1.0 }
    }

    /// Heading in `[0, 2π)`.
    fn angle(&mut self) -> f64 {
        self.next_f64() * std::f64::consts::TAU
    }
}

#[cfg(feature = "rng")]
const FALLBACK_SEED: u64 = 0x5eed_f00d;

/// Default source backed by ChaCha8, seedable for tests and replays.
#[derive(Clone, Debug)]
pub struct SimRng {
    inner: ChaCha8Rng,
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self { inner: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Seed from the platform entropy source (browser crypto on wasm).
    #[cfg(feature = "rng")]
    pub fn from_entropy() -> Self {
        let mut seed = [0u8; 32];
        if let Err(err) = getrandom::getrandom(&mut seed) {
            log::warn!("entropy unavailable ({err}), falling back to a fixed seed");
            return Self::seeded(FALLBACK_SEED);
        }
        Self { inner: ChaCha8Rng::from_seed(seed) }
    }
}

impl RandomSource for SimRng {
    fn next_f64(&mut self) -> f64 {
        self.inner.gen_range(0.0..1.0)
    }
}

/// Always returns the same draw; pins branch outcomes in unit tests.
#[cfg(test)]
pub(crate) struct FixedRng(pub f64);

#[cfg(test)]
impl RandomSource for FixedRng {
    fn next_f64(&mut self) -> f64 {
        self.0
    }
}

/// Replays a fixed list of draws in order, cycling when exhausted.
#[cfg(test)]
pub(crate) struct SequenceRng {
    draws: Vec<f64>,
    next: usize,
}

#[cfg(test)]
impl SequenceRng {
    pub(crate) fn new(draws: &[f64]) -> Self {
        Self { draws: draws.to_vec(), next: 0 }
    }
}

#[cfg(test)]
impl RandomSource for SequenceRng {
    fn next_f64(&mut self) -> f64 {
        let draw = self.draws[self.next % self.draws.len()];
        self.next += 1;
        draw
    }
}
