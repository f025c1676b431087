//! Deterministic random number generation.
//!
//! RULE: Nothing in the garden core may call any platform RNG.
//! All randomness flows through GardenRng instances derived
//! from a single master seed.
//!
//! Each stream gets its own generator, seeded from
//! (master_seed XOR stream_index × golden ratio). Adding a stream
//! never changes the draws of an existing one.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Lower bound of the growth jitter multiplier.
pub const JITTER_MIN: f64 = 0.9;
/// Upper bound of the growth jitter multiplier.
pub const JITTER_MAX: f64 = 1.1;

/// Anything that can supply the growth jitter multiplier drawn on watering.
pub trait JitterSource {
    /// A multiplier in [JITTER_MIN, JITTER_MAX].
    fn growth_jitter(&mut self) -> f64;
}

/// A named, deterministic RNG for a single stream.
pub struct GardenRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl GardenRng {
    pub fn new(master_seed: u64, stream_index: u64) -> Self {
        let derived_seed = master_seed ^ (stream_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a float in [lo, hi].
    pub fn range_f64(&mut self, lo: f64, hi: f64) -> f64 {
        (lo + (hi - lo) * self.next_f64()).clamp(lo, hi)
    }

    /// Sixteen random bytes, enough for a v4 UUID.
    pub fn next_bytes_16(&mut self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        self.inner.fill_bytes(&mut bytes);
        bytes
    }
}

impl JitterSource for GardenRng {
    fn growth_jitter(&mut self) -> f64 {
        self.range_f64(JITTER_MIN, JITTER_MAX)
    }
}

/// Always returns the same multiplier. For tests and replays.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn growth_jitter(&mut self) -> f64 {
        self.0.clamp(JITTER_MIN, JITTER_MAX)
    }
}

/// All RNG streams for a single game, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_stream(&self, stream: RngStream) -> GardenRng {
        GardenRng::new(self.master_seed, stream as u64).with_name(stream.name())
    }
}

/// Stable stream assignments.
/// NEVER reorder or remove entries, only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngStream {
    Growth = 0,
    Identity = 1,
}

impl RngStream {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Growth => "growth",
            Self::Identity => "identity",
        }
    }
}
