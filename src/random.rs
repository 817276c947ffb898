//! Injectable randomness.
//!
//! Palette variants, placeholder seeds, board ids and example prompt
//! shuffling all draw from a [`RandomSource`]. The variety is a presentation
//! feature; tests build the source from a fixed seed to get repeatable output.

use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use std::sync::Mutex;

pub struct RandomSource {
    rng: Mutex<StdRng>,
}

impl RandomSource {
    /// Seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic source, the same seed always yields the same sequence.
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng: Mutex::new(rng),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StdRng> {
        // The generator has no invariants a panic could break.
        self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Picks one element uniformly, `None` for an empty slice.
    pub fn choose<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut *self.lock())
    }

    pub fn range(&self, range: RangeInclusive<u32>) -> u32 {
        self.lock().random_range(range)
    }

    pub fn shuffle<T>(&self, items: &mut [T]) {
        items.shuffle(&mut *self.lock());
    }
}

impl Default for RandomSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}
