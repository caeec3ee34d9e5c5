//! Game balance and simulation settings
//!
//! Every tuning number lives here instead of being scattered through the
//! processors. Loaded from JSON; any field left out keeps its default.

use std::path::Path;

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;
use crate::sim::Sprite;

/// How a collector pulls captured objects toward itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OrbitAttraction {
    /// Add a unit impulse toward the collector each tick
    #[default]
    UnitDirection,
    /// Add `m_orbiting * m_collector / d²` toward the collector
    InverseSquare,
}

impl OrbitAttraction {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrbitAttraction::UnitDirection => "unit-direction",
            OrbitAttraction::InverseSquare => "inverse-square",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "unit" | "unit-direction" => Some(OrbitAttraction::UnitDirection),
            "inverse-square" | "gravity" => Some(OrbitAttraction::InverseSquare),
            _ => None,
        }
    }
}

/// Pick a random element, or the type's default for an empty table
pub fn pick<T: Copy + Default, R: Rng + ?Sized>(choices: &[T], rng: &mut R) -> T {
    choices.choose(rng).copied().unwrap_or_default()
}

/// Health drawn from `min, min + step, ...` below `max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthRoll {
    pub min: u32,
    pub max: u32,
    pub step: u32,
}

impl HealthRoll {
    pub const fn new(min: u32, max: u32, step: u32) -> Self {
        Self { min, max, step }
    }

    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let step = self.step.max(1);
        let slots = self.max.saturating_sub(self.min).div_ceil(step).max(1);
        (self.min + rng.random_range(0..slots) * step) as f32
    }
}

/// Randomised starting values for a category of entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyProfile {
    /// Inclusive mass range
    pub mass_min: u32,
    pub mass_max: u32,
    pub dampening: Vec<f32>,
    pub health: HealthRoll,
}

impl BodyProfile {
    pub fn roll_mass<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        rng.random_range(self.mass_min..=self.mass_max.max(self.mass_min)) as f32
    }

    pub fn roll_dampening<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        pick(&self.dampening, rng)
    }
}

/// Fixed starting values for the player
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HumanProfile {
    pub position: Vec2,
    pub mass: f32,
    pub dampening: f32,
    pub health: f32,
}

impl Default for HumanProfile {
    fn default() -> Self {
        Self {
            position: Vec2::splat(ARENA_CENTER),
            mass: 20.0,
            dampening: 0.92,
            health: 400.0,
        }
    }
}

/// Per-category body tables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Bodies {
    pub human: HumanProfile,
    pub rock: BodyProfile,
    pub enemy: BodyProfile,
    pub star: BodyProfile,
}

impl Default for Bodies {
    fn default() -> Self {
        let dampening = vec![0.98, 0.99, 0.999];
        Self {
            human: HumanProfile::default(),
            rock: BodyProfile {
                mass_min: 40,
                mass_max: 55,
                dampening: dampening.clone(),
                health: HealthRoll::new(500, 1000, 20),
            },
            enemy: BodyProfile {
                mass_min: 10,
                mass_max: 55,
                dampening: dampening.clone(),
                health: HealthRoll::new(40, 300, 20),
            },
            star: BodyProfile {
                mass_min: 5,
                mass_max: 15,
                dampening,
                health: HealthRoll::new(20, 40, 1),
            },
        }
    }
}

/// Collision radius per sprite
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteRadii {
    pub human: f32,
    pub rock: f32,
    pub steel: f32,
    pub ufo: f32,
    pub shooter: f32,
    pub mine: f32,
    pub bullet: f32,
    pub star: f32,
}

impl Default for SpriteRadii {
    fn default() -> Self {
        Self {
            human: 8.0,
            rock: 21.0,
            steel: 21.0,
            ufo: 22.0,
            shooter: 25.0,
            mine: 12.0,
            bullet: 4.0,
            star: 8.0,
        }
    }
}

impl SpriteRadii {
    pub fn radius(&self, sprite: Sprite) -> f32 {
        match sprite {
            Sprite::Human => self.human,
            Sprite::Rock => self.rock,
            Sprite::Steel => self.steel,
            Sprite::Ufo => self.ufo,
            Sprite::Shooter => self.shooter,
            Sprite::Mine => self.mine,
            Sprite::Bullet => self.bullet,
            Sprite::Star => self.star,
        }
    }
}

/// Tractor beam geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub draw_radius: f32,
    pub push_radius: f32,
    pub max_collectable: usize,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        // More than one captured object at a time gets unstable.
        Self {
            draw_radius: 150.0,
            push_radius: 50.0,
            max_collectable: 1,
        }
    }
}

/// Bullets and stars fired by enemies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    pub speed: f32,
    /// Spawn distance beyond the shooter's radius
    pub muzzle_offset: f32,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            speed: 8.0,
            muzzle_offset: 25.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Speed cap in units per tick
    pub max_speed: f32,
    pub collision_epsilon: f32,
    /// Force the player applies toward the pointer
    pub user_force: f32,
    pub orbit_attraction: OrbitAttraction,
    pub collector: CollectorConfig,
    pub projectile: ProjectileConfig,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_speed: 15.0,
            collision_epsilon: 1.0,
            user_force: 20.0,
            orbit_attraction: OrbitAttraction::default(),
            collector: CollectorConfig::default(),
            projectile: ProjectileConfig::default(),
        }
    }
}

/// Speed and timer choices for a movement pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternConfig {
    pub speeds: Vec<f32>,
    /// Full interval in milliseconds; the pattern moves after half of it
    pub intervals_ms: Vec<u64>,
}

/// Ring an orbiting enemy keeps around its target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CircleConfig {
    /// Ring bounds, measured beyond the target's draw radius
    pub ring_inner: f32,
    pub ring_outer: f32,
    /// Where an enemy is put back when it leaves the ring
    pub snap: f32,
}

impl Default for CircleConfig {
    fn default() -> Self {
        Self {
            ring_inner: 150.0,
            ring_outer: 200.0,
            snap: 175.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    pub jagged: PatternConfig,
    pub tracking: PatternConfig,
    pub bulldoze: PatternConfig,
    pub circle: CircleConfig,
    pub shooting_cooldown_ms: u64,
    pub wide_shooting_cooldown_ms: u64,
    pub swarming_cooldown_ms: u64,
    /// Inclusive range of bonus contact damage
    pub contact_damage_min: u32,
    pub contact_damage_max: u32,
    pub wide_shot_count: u32,
    pub swarm_count: u32,
    /// Distance of the aim point used for radial volleys
    pub volley_aim_distance: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            jagged: PatternConfig {
                speeds: vec![14.0, 15.0, 16.0],
                intervals_ms: vec![10_000],
            },
            tracking: PatternConfig {
                speeds: vec![3.0, 4.0, 5.0],
                intervals_ms: Vec::new(),
            },
            bulldoze: PatternConfig {
                speeds: vec![14.0, 15.0, 16.0],
                intervals_ms: vec![4_500, 5_000, 5_500],
            },
            circle: CircleConfig::default(),
            shooting_cooldown_ms: 1_000,
            wide_shooting_cooldown_ms: 1_000,
            swarming_cooldown_ms: 6_000,
            contact_damage_min: 5,
            contact_damage_max: 14,
            wide_shot_count: 8,
            swarm_count: 2,
            volley_aim_distance: 16.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Reserve entities are admitted while the population is below one of these
    pub population_thresholds: Vec<usize>,
    /// Chance that a queued slot (other than the first) is a rock
    pub rock_chance: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            population_thresholds: vec![5, 6, 7, 9, 10, 11],
            rock_chance: 0.2,
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub ticks_per_second: u32,
    pub arena_size: f32,
    pub spawn_min: i32,
    pub spawn_max: i32,
    /// Sleep until the next tick boundary (off for headless fast runs)
    pub throttle: bool,
    pub physics: PhysicsConfig,
    pub bodies: Bodies,
    pub sprites: SpriteRadii,
    pub ai: AiConfig,
    pub session: SessionConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            ticks_per_second: TICKS_PER_SECOND,
            arena_size: ARENA_SIZE,
            spawn_min: SPAWN_MIN,
            spawn_max: SPAWN_MAX,
            throttle: true,
            physics: PhysicsConfig::default(),
            bodies: Bodies::default(),
            sprites: SpriteRadii::default(),
            ai: AiConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Random spawn position inside the arena
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        let hi = self.spawn_max.max(self.spawn_min);
        Vec2::new(
            rng.random_range(self.spawn_min..=hi) as f32,
            rng.random_range(self.spawn_min..=hi) as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_health_roll_stays_on_grid() {
        let roll = HealthRoll::new(500, 1000, 20);
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..200 {
            let h = roll.roll(&mut rng) as u32;
            assert!((500..1000).contains(&h));
            assert_eq!((h - 500) % 20, 0);
        }
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            SimConfig::from_json(r#"{ "physics": { "orbit_attraction": "InverseSquare" } }"#)
                .unwrap();
        assert_eq!(config.physics.orbit_attraction, OrbitAttraction::InverseSquare);
        assert_eq!(config.physics.max_speed, 15.0);
        assert_eq!(config.ticks_per_second, 50);
        assert_eq!(config.session.population_thresholds, vec![5, 6, 7, 9, 10, 11]);
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            SimConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_random_position_in_spawn_box() {
        let config = SimConfig::default();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            let p = config.random_position(&mut rng);
            assert!((50.0..=750.0).contains(&p.x));
            assert!((50.0..=750.0).contains(&p.y));
        }
    }

    #[test]
    fn test_orbit_attraction_names() {
        assert_eq!(
            OrbitAttraction::from_str("Gravity"),
            Some(OrbitAttraction::InverseSquare)
        );
        assert_eq!(OrbitAttraction::UnitDirection.as_str(), "unit-direction");
        assert_eq!(OrbitAttraction::from_str("nope"), None);
    }
}
