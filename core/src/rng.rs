//! Deterministic random number generation.
//!
//! RULE: Nothing in the simulation may call any platform RNG.
//! All randomness flows through SubsystemRng instances derived
//! from the single master seed of the session.
//!
//! Each (slot, day) pair gets its own RNG stream, seeded
//! deterministically from the master seed. This means:
//!   - Adding a new slot never changes existing slots' streams.
//!   - Each day's stream is reproducible in isolation.

use crate::types::Day;
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single slot.
pub struct SubsystemRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl SubsystemRng {
    /// Create an RNG from the master seed and a stable stream index.
    /// The index must never change once assigned.
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
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Sample from a normal distribution (Box–Muller).
    /// A zero `std_dev` returns `mean` exactly.
    pub fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        // u1 in (0, 1] so ln() stays finite.
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        mean + std_dev * z
    }
}

/// All RNG streams for a single run.
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

    /// The stream for `slot` on `day`. Calling twice with the same
    /// arguments yields identical sequences.
    pub fn for_day(&self, slot: RngSlot, day: Day) -> SubsystemRng {
        let index = (day as u64).wrapping_mul(RngSlot::COUNT) + slot as u64;
        SubsystemRng::new(self.master_seed, index).with_name(slot.name())
    }
}

/// Stable stream slot assignments.
/// NEVER reorder or remove entries; only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum RngSlot {
    WeightSampling = 0,
}

impl RngSlot {
    const COUNT: u64 = 1;

    pub fn name(&self) -> &'static str {
        match self {
            Self::WeightSampling => "weight_sampling",
        }
    }
}
