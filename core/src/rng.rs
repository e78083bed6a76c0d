//! Random number generation.
//!
//! RULE: the engine never calls a platform RNG directly.
//! Every draw flows through a `SinkRng` handed in by the host, so tests can
//! pin storms, leaks and patch rolls to known outcomes.
//!
//! Each channel gets its own stream, seeded deterministically from
//! (master_seed XOR hash(channel_id)). This means:
//!   - Opening a new channel never changes another channel's stream.
//!   - Each channel's game is fully reproducible in isolation.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// The random source the engine draws from.
pub trait SinkRng {
    /// Roll a float in [0.0, 1.0).
    fn next_f64(&mut self) -> f64;

    /// Roll an integer uniformly from the inclusive range [min, max].
    fn range_inclusive(&mut self, min: i32, max: i32) -> i32;

    /// Bernoulli trial: returns true with probability p.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Pick an index in [0, len). `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize {
        assert!(len > 0, "len must be > 0");
        self.range_inclusive(0, len as i32 - 1) as usize
    }
}

/// A seedable PCG stream. The default source for hosts and property tests.
#[derive(Debug, Clone)]
pub struct SeededRng {
    inner: Pcg64Mcg,
}

impl SeededRng {
    pub fn new(seed: u64) -> Self {
        Self { inner: Pcg64Mcg::seed_from_u64(seed) }
    }

    /// Seeded from OS entropy. Not reproducible; hosts that need replays
    /// go through `RngBank` instead.
    pub fn from_entropy() -> Self {
        Self { inner: Pcg64Mcg::from_entropy() }
    }

    /// Draw a fresh u64, e.g. a master seed for an `RngBank`.
    pub fn next_seed(&mut self) -> u64 {
        self.inner.gen()
    }
}

impl SinkRng for SeededRng {
    fn next_f64(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }

    fn range_inclusive(&mut self, min: i32, max: i32) -> i32 {
        assert!(min <= max, "empty range [{min}, {max}]");
        self.inner.gen_range(min..=max)
    }
}

/// Derives one independent `SeededRng` per channel from a master seed.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_channel(&self, channel_id: &str) -> SeededRng {
        let derived = self.master_seed ^ fnv1a(channel_id.as_bytes()).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        SeededRng::new(derived)
    }
}

// std's DefaultHasher is not stable across releases; seeds must be.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0100_0000_01b3)
    })
}

/// Where a `FixedRng` lands inside every integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pick {
    Min,
    Mid,
    Max,
}

/// A constant source: every float roll returns `roll`, every range returns
/// its min, midpoint or max. Used to force outcomes in tests.
///
/// With `roll = 0.0` every chance fires; with `roll` close to 1.0 none do.
/// A roll of 0.5 lets patches (>= 0.65) succeed while storms and new
/// leaks (<= 0.30) never happen.
#[derive(Debug, Clone, Copy)]
pub struct FixedRng {
    pub roll: f64,
    pub pick: Pick,
}

impl FixedRng {
    pub fn new(roll: f64, pick: Pick) -> Self {
        Self { roll, pick }
    }

    /// Everything that can go wrong does, as hard as possible.
    pub fn worst_case() -> Self {
        Self::new(0.0, Pick::Max)
    }

    /// No storms, no new leaks, patches hold.
    pub fn calm_seas() -> Self {
        Self::new(0.5, Pick::Mid)
    }
}

impl SinkRng for FixedRng {
    fn next_f64(&mut self) -> f64 {
        self.roll
    }

    fn range_inclusive(&mut self, min: i32, max: i32) -> i32 {
        assert!(min <= max, "empty range [{min}, {max}]");
        match self.pick {
            Pick::Min => min,
            Pick::Mid => min + (max - min) / 2,
            Pick::Max => max,
        }
    }
}
