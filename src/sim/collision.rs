//! Collision detection and response between circular bodies
//!
//! Pure functions over `CollisionBody` snapshots. The physics processor
//! copies the relevant attributes out of two entities, calls `resolve`, then
//! writes the `Resolution` back.

use glam::Vec2;

use super::entity::Entity;
use crate::error::SimError;
use crate::math::{VectorExt, distance, reflect};

/// What collision response needs to know about one participant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionBody {
    pub position: Vec2,
    pub radius: f32,
    pub velocity: Vec2,
    /// Zero for bodies that are never deflected (bullets)
    pub mass: f32,
    /// Bonus damage dealt on contact
    pub contact_bonus: f32,
}

impl CollisionBody {
    pub fn of(entity: &Entity) -> Result<Self, SimError> {
        let motion = entity.motion()?;
        Ok(Self {
            position: entity.position()?,
            radius: entity.radius()?,
            velocity: motion.velocity,
            mass: motion.mass,
            contact_bonus: entity.contact_bonus()?,
        })
    }
}

/// Outcome of a collision between `a` and `b`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub position_a: Vec2,
    pub position_b: Vec2,
    pub velocity_a: Vec2,
    pub velocity_b: Vec2,
    pub damage_to_a: f32,
    pub damage_to_b: f32,
    /// Where the explosion marker goes
    pub point: Vec2,
}

/// Circles touch, allowing `epsilon` slack
#[inline]
pub fn is_colliding(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32, epsilon: f32) -> bool {
    distance(a, b) <= radius_a + radius_b + epsilon
}

/// Unit vector pointing from `from` toward `to` (`(1, 0)` when they coincide)
#[inline]
pub fn unit_toward(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).unit()
}

/// Point on `b`'s surface facing `a`
#[inline]
pub fn contact_point(a: Vec2, b: Vec2, radius_b: f32) -> Vec2 {
    b + unit_toward(b, a) * radius_b
}

/// Push two circles apart along the line between their centres.
///
/// Both end up one unit clear of the contact point on `b`'s surface, so the
/// distance between them is `radius_a + radius_b + 2` whatever the overlap.
pub fn fix_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> (Vec2, Vec2) {
    let normal = unit_toward(b, a);
    let point = b + normal * radius_b;
    (point + normal * (radius_a + 1.0), point - normal * (radius_b + 1.0))
}

/// Post-collision velocity of `a`.
///
/// `a`'s velocity is reflected about the contact normal and rescaled to the
/// mass-weighted mean speed `(m_a|v_a| + m_b|v_b|) / (m_a + m_b)`. Massless
/// bodies keep their velocity. A body at rest leaves along the normal.
pub fn sphere_collision(a: &CollisionBody, b: &CollisionBody) -> Vec2 {
    if a.mass == 0.0 || b.mass == 0.0 {
        return a.velocity;
    }

    let normal = unit_toward(b.position, a.position);
    let speed = (a.mass * a.velocity.magnitude() + b.mass * b.velocity.magnitude()) / (a.mass + b.mass);
    let reflection = reflect(normal, a.velocity);
    if reflection == Vec2::ZERO {
        normal * speed
    } else {
        reflection.with_magnitude(speed)
    }
}

/// Damage `dealer` inflicts on whatever it hits during one step
#[inline]
pub fn contact_damage(dealer: &CollisionBody, step: f32) -> f32 {
    dealer.mass * dealer.velocity.magnitude() * step + 1.0 + dealer.contact_bonus
}

/// Full response for a colliding pair
pub fn resolve(a: &CollisionBody, b: &CollisionBody, step: f32) -> Resolution {
    let (position_a, position_b) = fix_overlap(a.position, a.radius, b.position, b.radius);
    let a_fixed = CollisionBody {
        position: position_a,
        ..*a
    };
    let b_fixed = CollisionBody {
        position: position_b,
        ..*b
    };

    // Both sides react to the velocities from before the hit
    let velocity_a = sphere_collision(&a_fixed, &b_fixed);
    let velocity_b = sphere_collision(&b_fixed, &a_fixed);

    let a_after = CollisionBody {
        velocity: velocity_a,
        ..a_fixed
    };
    let b_after = CollisionBody {
        velocity: velocity_b,
        ..b_fixed
    };

    Resolution {
        position_a,
        position_b,
        velocity_a,
        velocity_b,
        damage_to_a: contact_damage(&b_after, step),
        damage_to_b: contact_damage(&a_after, step),
        point: contact_point(position_a, position_b, b.radius),
    }
}

/// Reflect off the walls of a square arena and clamp inside it.
///
/// Returns the corrected position and velocity.
pub fn bounce_off_walls(position: Vec2, velocity: Vec2, radius: f32, size: f32) -> (Vec2, Vec2) {
    let mut position = position;
    let mut velocity = velocity;
    if position.x - radius < 0.0 {
        position.x = radius;
        velocity = reflect(Vec2::X, velocity);
    }
    if position.x + radius > size {
        position.x = size - radius;
        velocity = reflect(Vec2::NEG_X, velocity);
    }
    if position.y - radius < 0.0 {
        position.y = radius;
        velocity = reflect(Vec2::Y, velocity);
    }
    if position.y + radius > size {
        position.y = size - radius;
        velocity = reflect(Vec2::NEG_Y, velocity);
    }
    (position, velocity)
}

/// Far enough outside the arena that an unbounded body is gone for good
pub fn is_out_of_bounds(position: Vec2, radius: f32, size: f32) -> bool {
    let margin = radius * 2.0;
    position.x < -margin || position.x > size + margin || position.y < -margin || position.y > size + margin
}
