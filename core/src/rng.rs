//! Deterministic random number generation.
//!
//! RULE: Nothing in the round engine may call any platform RNG.
//! All randomness flows through a RoundRng owned by the caller and
//! handed into each round invocation. One round = one RNG; sharing a
//! generator across concurrent rounds is forbidden.
//!
//! In seeded mode, round `i` of a batch uses seed `base_seed + i`, so
//! any single round of a batch is reproducible in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// The deterministic random source for a single round.
pub struct RoundRng {
    inner: Pcg64Mcg,
}

impl RoundRng {
    /// Create a round RNG from an explicit seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: Pcg64Mcg::seed_from_u64(seed),
        }
    }

    /// The seed for round `index` of a batch started from `base_seed`.
    /// Wrapping add — the mapping only needs to be stable, not ordered.
    pub fn batch_seed(base_seed: u64, index: u64) -> u64 {
        base_seed.wrapping_add(index)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n). Used for uniform symbol selection.
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }
}
