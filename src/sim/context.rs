//! Per-session clock and RNG
//!
//! Processors never read wall-clock time: timers are measured in simulation
//! milliseconds derived from the tick counter, and all randomness comes from
//! one seeded generator.

use rand::SeedableRng;
use rand_pcg::Pcg32;

#[derive(Debug, Clone)]
pub struct SimContext {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Simulation tick counter
    pub ticks: u64,
    pub ticks_per_second: u32,
}

impl SimContext {
    pub fn new(seed: u64, ticks_per_second: u32) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            ticks: 0,
            ticks_per_second: ticks_per_second.max(1),
        }
    }

    /// Advance the clock by one tick
    pub fn advance(&mut self) {
        self.ticks += 1;
    }

    /// Simulation time in milliseconds
    pub fn now_ms(&self) -> u64 {
        self.ticks * 1000 / self.ticks_per_second as u64
    }

    /// Seconds per tick
    pub fn step(&self) -> f32 {
        1.0 / self.ticks_per_second as f32
    }
}
