//! Tag-driven entities
//!
//! An entity is a tag set plus optional attribute slots. Factories set the
//! tags (and a few launch values); each processor's `initialize` fills the
//! slots its tags own. Reading an empty slot is an invariant breach and
//! surfaces as `SimError::MissingAttribute`.

use std::fmt;

use glam::Vec2;

use super::tags::Tags;
use crate::error::SimError;

/// Stable entity handle, unique within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Id of an entity that has not been registered with a world yet
    pub const UNASSIGNED: EntityId = EntityId(0);

    pub fn is_assigned(self) -> bool {
        self != Self::UNASSIGNED
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sprite identity, also used to look up the collision radius
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sprite {
    Human,
    Rock,
    Steel,
    Ufo,
    Shooter,
    Mine,
    Bullet,
    Star,
}

/// Why an explosion marker was spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplosionReason {
    /// Two solid bodies hit each other
    Collision,
    /// A bullet was involved
    Bullet,
}

/// Linear motion state (Moveable)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    pub velocity: Vec2,
    pub acceleration: Vec2,
    pub mass: f32,
    /// Velocity multiplier applied every tick
    pub dampening: f32,
}

/// Hit points (Damageable)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn full(max: f32) -> Self {
        Self { current: max, max }
    }

    /// Subtract damage; returns true once health is depleted
    pub fn apply(&mut self, damage: f32) -> bool {
        self.current -= damage;
        self.current <= 0.0
    }
}

/// Tractor beam state (Collector)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CollectorState {
    pub draw_radius: f32,
    pub push_radius: f32,
    pub max_collectable: usize,
    /// Captured entities, in capture order
    pub collected: Vec<EntityId>,
}

/// Precomputed spawn values for projectiles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Launch {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Millisecond timer measured against the session clock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cooldown {
    pub last_ms: u64,
    pub interval_ms: u64,
}

impl Cooldown {
    pub fn new(now_ms: u64, interval_ms: u64) -> Self {
        Self {
            last_ms: now_ms,
            interval_ms,
        }
    }

    pub fn elapsed(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_ms)
    }

    /// At least half the interval has passed
    pub fn half_elapsed(&self, now_ms: u64) -> bool {
        self.elapsed(now_ms) * 2 >= self.interval_ms
    }

    pub fn ready(&self, now_ms: u64) -> bool {
        self.elapsed(now_ms) >= self.interval_ms
    }

    pub fn restart(&mut self, now_ms: u64) {
        self.last_ms = now_ms;
    }
}

/// Movement pattern state (AI)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovementState {
    pub speed: f32,
    /// Only timed patterns (jagged, bulldoze) carry a timer
    pub timer: Option<Cooldown>,
}

/// One cooldown per ranged attack pattern
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AttackTimers {
    pub shooting: Option<Cooldown>,
    pub wide_shooting: Option<Cooldown>,
    pub swarming: Option<Cooldown>,
}

/// A game object
#[derive(Debug, Clone, Default)]
pub struct Entity {
    id: EntityId,
    tags: Tags,
    pub sprite: Option<Sprite>,
    pub position: Option<Vec2>,
    pub radius: Option<f32>,
    /// Facing in radians (Rotates)
    pub angle: Option<f32>,
    pub motion: Option<Motion>,
    pub health: Option<Health>,
    pub collector: Option<CollectorState>,
    pub movement: Option<MovementState>,
    pub attacks: Option<AttackTimers>,
    /// Bonus damage dealt on contact (ContactAttack)
    pub additional_damage: Option<f32>,
    pub launch: Option<Launch>,
    pub reason: Option<ExplosionReason>,
}

macro_rules! copy_attribute {
    ($name:ident, $name_mut:ident, $ty:ty) => {
        pub fn $name(&self) -> Result<$ty, SimError> {
            self.$name.ok_or_else(|| self.missing(stringify!($name)))
        }

        pub fn $name_mut(&mut self) -> Result<&mut $ty, SimError> {
            let err = self.missing(stringify!($name));
            self.$name.as_mut().ok_or(err)
        }
    };
}

macro_rules! ref_attribute {
    ($name:ident, $name_mut:ident, $ty:ty) => {
        pub fn $name(&self) -> Result<&$ty, SimError> {
            self.$name.as_ref().ok_or_else(|| self.missing(stringify!($name)))
        }

        pub fn $name_mut(&mut self) -> Result<&mut $ty, SimError> {
            let err = self.missing(stringify!($name));
            self.$name.as_mut().ok_or(err)
        }
    };
}

impl Entity {
    pub fn new(tags: Tags) -> Self {
        Self {
            tags,
            ..Self::default()
        }
    }

    pub fn with_sprite(mut self, sprite: Sprite) -> Self {
        self.sprite = Some(sprite);
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    pub fn tags(&self) -> Tags {
        self.tags
    }

    /// True if every tag in `tags` is present
    pub fn has(&self, tags: Tags) -> bool {
        self.tags.contains(tags)
    }

    /// Idempotent
    pub fn add(&mut self, tags: Tags) {
        self.tags.insert(tags);
    }

    /// Idempotent; absent tags are ignored
    pub fn remove(&mut self, tags: Tags) {
        self.tags.remove(tags);
    }

    /// Tag as dead; returns true only the first time
    pub fn kill(&mut self) -> bool {
        let first = !self.has(Tags::DEAD);
        self.add(Tags::DEAD);
        first
    }

    fn missing(&self, attribute: &'static str) -> SimError {
        SimError::MissingAttribute {
            entity: self.id,
            attribute,
        }
    }

    copy_attribute!(position, position_mut, Vec2);
    copy_attribute!(radius, radius_mut, f32);
    copy_attribute!(angle, angle_mut, f32);
    copy_attribute!(additional_damage, additional_damage_mut, f32);
    copy_attribute!(launch, launch_mut, Launch);
    copy_attribute!(reason, reason_mut, ExplosionReason);
    ref_attribute!(motion, motion_mut, Motion);
    ref_attribute!(health, health_mut, Health);
    ref_attribute!(collector, collector_mut, CollectorState);
    ref_attribute!(movement, movement_mut, MovementState);
    ref_attribute!(attacks, attacks_mut, AttackTimers);

    /// Bonus damage this entity deals on contact (0 without ContactAttack)
    pub fn contact_bonus(&self) -> Result<f32, SimError> {
        if self.has(Tags::CONTACT_ATTACK) {
            self.additional_damage()
        } else {
            Ok(0.0)
        }
    }

    /// Whether the tractor beam is switched on
    pub fn is_collecting(&self) -> bool {
        self.has(Tags::COLLECTOR | Tags::COLLECTOR_ACTIVE)
    }
}
