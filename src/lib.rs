//! Orbital Smash - a tractor-beam arcade game
//!
//! Core modules:
//! - `math`: 2D vector helpers (polar form, reflection)
//! - `sim`: Entity simulation (entities, physics, AI, input, sessions)
//! - `frames`: Menu/dialog/session frame stack
//! - `renderer`: Rendering collaborator seam
//! - `settings`: Data-driven game balance

pub mod error;
pub mod frames;
pub mod math;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{ConfigError, SimError};
pub use frames::{Frame, FrameStack, Transition};
pub use math::{Polar, VectorExt, distance, reflect};
pub use renderer::{HeadlessRenderer, Renderer};
pub use settings::{OrbitAttraction, SimConfig};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICKS_PER_SECOND: u32 = 50;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / TICKS_PER_SECOND as f32;

    /// Side length of the square arena
    pub const ARENA_SIZE: f32 = 800.0;
    /// Centre of the arena (also the player's start position)
    pub const ARENA_CENTER: f32 = ARENA_SIZE / 2.0;

    /// Random spawn positions fall in [SPAWN_MIN, SPAWN_MAX] on both axes
    pub const SPAWN_MIN: i32 = 50;
    pub const SPAWN_MAX: i32 = 750;
}

/// Crate version, shown in the About dialog
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
