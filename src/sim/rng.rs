//! Seeded pseudo-random streams
//!
//! Every procedural decision draws from a `SeededRng`. Instances are never
//! shared between purposes: world generation, procedural level parameters,
//! gameplay jitter and cosmetic effects each own their own stream.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Base of the per-level seed formula
pub const SEED_BASE: u32 = 1337;
/// Stride between consecutive level ids
pub const SEED_STRIDE: u32 = 1009;

/// Seed used for everything generated from level `id`
#[inline]
pub fn level_seed(id: u32) -> u32 {
    SEED_BASE.wrapping_add(id.wrapping_mul(SEED_STRIDE))
}

/// Deterministic float generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeededRng {
    inner: Pcg32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self {
            inner: Pcg32::seed_from_u64(u64::from(seed)),
        }
    }

    /// Stream for level `id` (world layout or procedural parameters)
    pub fn for_level(id: u32) -> Self {
        Self::new(level_seed(id))
    }

    /// Next float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Float in [min, max)
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Symmetric jitter in [-half_width, half_width)
    pub fn jitter(&mut self, half_width: f32) -> f32 {
        (self.next_f32() - 0.5) * 2.0 * half_width
    }

    /// Index in [0, len), drawn as floor(r * len) like every other pick
    pub fn index(&mut self, len: usize) -> usize {
        let i = (self.next_f32() * len as f32) as usize;
        i.min(len.saturating_sub(1))
    }
}

impl Default for SeededRng {
    fn default() -> Self {
        Self::new(SEED_BASE)
    }
}
