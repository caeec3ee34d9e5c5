//! Premade entities
//!
//! Factories only decide tags, sprite and launch values. Everything else is
//! filled in when the processors initialise the entity.

use glam::Vec2;
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};

use super::entity::{Entity, ExplosionReason, Launch, Sprite};
use super::tags::Tags;
use crate::math::VectorExt;
use crate::settings::ProjectileConfig;

/// The player
pub fn make_human() -> Entity {
    Entity::new(
        Tags::USER_CONTROLLABLE
            | Tags::HUMAN
            | Tags::DRAWABLE
            | Tags::SOLID
            | Tags::MOVEABLE
            | Tags::BOUNDED
            | Tags::DAMAGEABLE
            | Tags::COLLECTOR,
    )
    .with_sprite(Sprite::Human)
}

/// A breakable rock
pub fn make_rock() -> Entity {
    Entity::new(
        Tags::ROCK
            | Tags::DRAWABLE
            | Tags::ROTATES
            | Tags::MOVEABLE
            | Tags::SOLID
            | Tags::ORBITABLE
            | Tags::DAMAGEABLE
            | Tags::BOUNDED,
    )
    .with_sprite(Sprite::Rock)
}

/// A steel rock: like a rock, but never takes damage
pub fn make_steel() -> Entity {
    Entity::new(
        Tags::ROCK
            | Tags::DRAWABLE
            | Tags::ROTATES
            | Tags::MOVEABLE
            | Tags::SOLID
            | Tags::ORBITABLE
            | Tags::BOUNDED,
    )
    .with_sprite(Sprite::Steel)
}

/// A jagged-path enemy that shoots at the player
pub fn make_shooter() -> Entity {
    Entity::new(
        Tags::AI
            | Tags::ENEMY
            | Tags::ROTATES
            | Tags::FACES_USER
            | Tags::MOVEABLE
            | Tags::SOLID
            | Tags::DRAWABLE
            | Tags::BOUNDED
            | Tags::DAMAGEABLE
            | Tags::JAGGED_PATH
            | Tags::ORBITABLE
            | Tags::SHOOTING_ATTACK,
    )
    .with_sprite(Sprite::Shooter)
}

/// An enemy with a random sprite, one movement pattern and 1-4 attacks
pub fn make_enemy<R: Rng + ?Sized>(rng: &mut R) -> Entity {
    const SPRITES: [Sprite; 4] = [Sprite::Ufo, Sprite::Shooter, Sprite::Mine, Sprite::Star];
    const MOVEMENTS: [Tags; 4] = [
        Tags::JAGGED_PATH,
        Tags::TRACKING_PATH,
        Tags::BULLDOZE_PATH,
        Tags::CIRCLE_PATH,
    ];
    let mut attacks = [
        Tags::SHOOTING_ATTACK,
        Tags::WIDE_SHOOTING_ATTACK,
        Tags::CONTACT_ATTACK,
        Tags::SWARMING_ATTACK,
    ];
    attacks.shuffle(rng);

    // A full set is twice as likely as any smaller one
    let count = rng.random_range(1..=attacks.len() + 1).min(attacks.len());

    let mut tags = Tags::AI
        | Tags::ENEMY
        | Tags::MOVEABLE
        | Tags::SOLID
        | Tags::ORBITABLE
        | Tags::DRAWABLE
        | Tags::DAMAGEABLE
        | Tags::ROTATES
        | Tags::FACES_USER
        | Tags::BOUNDED;
    tags |= *MOVEMENTS.choose(rng).unwrap_or(&Tags::JAGGED_PATH);
    for attack in &attacks[..count] {
        tags |= *attack;
    }

    let sprite = *SPRITES.choose(rng).unwrap_or(&Sprite::Ufo);
    Entity::new(tags).with_sprite(sprite)
}

/// One-shot visual marker, pruned at the end of the tick it appears in
pub fn make_explosion(position: Vec2, reason: ExplosionReason) -> Entity {
    let mut explosion = Entity::new(Tags::EXPLOSION);
    explosion.position = Some(position);
    explosion.reason = Some(reason);
    explosion
}

/// Launch values for a projectile fired from `start` toward `target`.
///
/// The projectile starts just outside the shooter so it cannot hit it.
fn launch_toward(start: Vec2, target: Vec2, radius: f32, projectile: &ProjectileConfig) -> Launch {
    let aim = target - start;
    Launch {
        position: start + aim.with_magnitude(radius + projectile.muzzle_offset),
        velocity: aim.with_magnitude(projectile.speed),
    }
}

/// A bullet flying from `start` toward `target`
pub fn make_bullet(start: Vec2, target: Vec2, radius: f32, projectile: &ProjectileConfig) -> Entity {
    let mut bullet = Entity::new(
        Tags::AI
            | Tags::ENEMY
            | Tags::BULLET
            | Tags::MOVEABLE
            | Tags::SOLID
            | Tags::DRAWABLE
            | Tags::DAMAGEABLE
            | Tags::CONTACT_ATTACK,
    )
    .with_sprite(Sprite::Bullet);
    // Contact bonus is rolled when the AI admits it
    bullet.launch = Some(launch_toward(start, target, radius, projectile));
    bullet
}

/// A homing star released by a swarmer
pub fn make_star<R: Rng + ?Sized>(
    start: Vec2,
    target: Vec2,
    radius: f32,
    projectile: &ProjectileConfig,
    rng: &mut R,
) -> Entity {
    const MOVEMENTS: [Tags; 3] = [Tags::JAGGED_PATH, Tags::TRACKING_PATH, Tags::BULLDOZE_PATH];
    let movement = *MOVEMENTS.choose(rng).unwrap_or(&Tags::TRACKING_PATH);

    let mut star = Entity::new(
        Tags::AI
            | Tags::ENEMY
            | Tags::STAR
            | Tags::MOVEABLE
            | Tags::SOLID
            | Tags::DRAWABLE
            | Tags::DAMAGEABLE
            | Tags::CONTACT_ATTACK
            | Tags::ROTATES
            | Tags::FACES_USER
            | Tags::BOUNDED
            | movement,
    )
    .with_sprite(Sprite::Star);
    star.launch = Some(launch_toward(start, target, radius, projectile));
    star
}
