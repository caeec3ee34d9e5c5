//! Physics processor
//!
//! Per tick, in order: solid-solid collisions, walls, tractor-beam capture,
//! orbit upkeep, movement integration, and facing. Collisions return
//! explosion markers for the session to merge.

use glam::Vec2;
use rand::Rng;

use super::Processor;
use super::collision::{
    CollisionBody, bounce_off_walls, is_colliding, is_out_of_bounds, resolve, unit_toward,
};
use super::context::SimContext;
use super::entity::{CollectorState, Entity, EntityId, ExplosionReason, Health, Motion};
use super::factory::make_explosion;
use super::tags::Tags;
use super::world::World;
use crate::error::SimError;
use crate::math::distance;
use crate::settings::{BodyProfile, OrbitAttraction, SimConfig};

pub struct Physics {
    config: SimConfig,
}

impl Physics {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Random position, mass, dampening, health and facing for a category
    fn roll_body(&self, e: &mut Entity, profile: &BodyProfile, ctx: &mut SimContext) {
        let rng = &mut ctx.rng;
        e.position = Some(self.config.random_position(rng));
        let motion = e.motion.get_or_insert_with(Motion::default);
        motion.mass = profile.roll_mass(rng);
        motion.dampening = profile.roll_dampening(rng);
        if e.has(Tags::DAMAGEABLE) {
            e.health = Some(Health::full(profile.health.roll(rng)));
        }
        if e.has(Tags::ROTATES) {
            e.angle = Some(rng.random::<f32>() * std::f32::consts::TAU);
        }
    }

    /// Advance one tick; returns explosion markers
    pub fn process(&mut self, world: &mut World, ctx: &SimContext) -> Result<Vec<Entity>, SimError> {
        let mut spawned = Vec::new();
        self.collide(world, ctx.step(), &mut spawned)?;
        self.handle_walls(world)?;
        self.capture(world)?;
        self.maintain_orbits(world)?;
        self.integrate(world)?;
        self.face_user(world)?;
        Ok(spawned)
    }

    fn collide(&self, world: &mut World, step: f32, spawned: &mut Vec<Entity>) -> Result<(), SimError> {
        let epsilon = self.config.physics.collision_epsilon;
        let n = world.len();
        for i in 0..n {
            if !world.entities()[i].has(Tags::SOLID) {
                continue;
            }
            for j in 0..n {
                if i == j {
                    continue;
                }
                let (a, b) = (&world.entities()[i], &world.entities()[j]);
                if !b.has(Tags::SOLID) {
                    continue;
                }
                let body_a = CollisionBody::of(a)?;
                let body_b = CollisionBody::of(b)?;
                if !is_colliding(body_a.position, body_a.radius, body_b.position, body_b.radius, epsilon) {
                    continue;
                }

                let reason = if a.has(Tags::BULLET) || b.has(Tags::BULLET) {
                    ExplosionReason::Bullet
                } else {
                    ExplosionReason::Collision
                };
                let hit = resolve(&body_a, &body_b, step);
                log::debug!(
                    "Collision {} <-> {} at ({:.1}, {:.1}): damage {:.1} / {:.1}",
                    a.id(),
                    b.id(),
                    hit.point.x,
                    hit.point.y,
                    hit.damage_to_a,
                    hit.damage_to_b
                );

                let (a, b) = world.pair_mut(i, j);
                apply_hit(a, hit.position_a, hit.velocity_a, hit.damage_to_a)?;
                apply_hit(b, hit.position_b, hit.velocity_b, hit.damage_to_b)?;
                spawned.push(make_explosion(hit.point, reason));
            }
        }
        Ok(())
    }

    fn handle_walls(&self, world: &mut World) -> Result<(), SimError> {
        let size = self.config.arena_size;
        for e in world.entities_mut().iter_mut().filter(|e| e.has(Tags::SOLID)) {
            let position = e.position()?;
            let radius = e.radius()?;
            if e.has(Tags::BOUNDED) {
                let motion = e.motion_mut()?;
                let (position, velocity) = bounce_off_walls(position, motion.velocity, radius, size);
                motion.velocity = velocity;
                *e.position_mut()? = position;
            } else if is_out_of_bounds(position, radius, size) {
                e.kill();
            }
        }
        Ok(())
    }

    /// Active collectors grab orbitables inside their draw radius
    fn capture(&self, world: &mut World) -> Result<(), SimError> {
        let candidates = world
            .entities()
            .iter()
            .filter(|e| e.has(Tags::ORBITABLE) && !e.has(Tags::DEAD))
            .map(|e| Ok((e.id(), e.position()?)))
            .collect::<Result<Vec<(EntityId, Vec2)>, SimError>>()?;

        for collector in world.entities_mut().iter_mut().filter(|e| e.is_collecting()) {
            let id = collector.id();
            let position = collector.position()?;
            let state = collector.collector_mut()?;
            for &(candidate, candidate_position) in &candidates {
                if state.collected.len() >= state.max_collectable {
                    break;
                }
                if candidate == id || state.collected.contains(&candidate) {
                    continue;
                }
                if distance(candidate_position, position) < state.draw_radius {
                    state.collected.push(candidate);
                    log::debug!("Collector {} captured {}", id, candidate);
                }
            }
        }
        Ok(())
    }

    /// Keep captured objects between the push and draw radii and pull them in
    fn maintain_orbits(&self, world: &mut World) -> Result<(), SimError> {
        let collectors: Vec<usize> = (0..world.len())
            .filter(|&i| world.entities()[i].is_collecting())
            .collect();

        for ci in collectors {
            let (center, center_mass, beam) = {
                let c = &world.entities()[ci];
                let mass = match self.config.physics.orbit_attraction {
                    OrbitAttraction::InverseSquare => c.motion()?.mass,
                    OrbitAttraction::UnitDirection => 0.0,
                };
                (c.position()?, mass, c.collector()?.clone())
            };

            let mut kept = Vec::with_capacity(beam.collected.len());
            for &id in &beam.collected {
                let Some(oi) = world.index_of(id) else {
                    continue;
                };
                if oi == ci {
                    continue;
                }
                let orbiting = &mut world.entities_mut()[oi];
                if orbiting.has(Tags::DEAD) {
                    log::debug!("Collector dropped dead {}", id);
                    continue;
                }
                self.hold_in_orbit(orbiting, center, center_mass, &beam)?;
                kept.push(id);
            }
            world.entities_mut()[ci].collector_mut()?.collected = kept;
        }
        Ok(())
    }

    fn hold_in_orbit(
        &self,
        orbiting: &mut Entity,
        center: Vec2,
        center_mass: f32,
        beam: &CollectorState,
    ) -> Result<(), SimError> {
        let position = orbiting.position()?;
        let radius = orbiting.radius()?;
        let d = distance(position, center);
        let inward = unit_toward(position, center);

        if d > beam.draw_radius {
            *orbiting.position_mut()? = center - inward * beam.draw_radius;
        }
        if d < beam.push_radius + radius {
            *orbiting.position_mut()? = center - inward * (beam.push_radius + radius);
        }

        let motion = orbiting.motion_mut()?;
        let pull = match self.config.physics.orbit_attraction {
            OrbitAttraction::UnitDirection => inward,
            OrbitAttraction::InverseSquare => {
                let d = d.max(self.config.physics.collision_epsilon);
                inward * (motion.mass * center_mass / (d * d))
            }
        };
        motion.velocity += pull;
        Ok(())
    }

    fn integrate(&self, world: &mut World) -> Result<(), SimError> {
        let max_speed = self.config.physics.max_speed;
        for e in world.entities_mut().iter_mut().filter(|e| e.has(Tags::MOVEABLE)) {
            let motion = e.motion_mut()?;
            motion.velocity += motion.acceleration;
            motion.velocity *= motion.dampening;
            motion.velocity = motion.velocity.clamp_length_max(max_speed);
            let velocity = motion.velocity;
            *e.position_mut()? += velocity;
        }
        Ok(())
    }

    fn face_user(&self, world: &mut World) -> Result<(), SimError> {
        let Some(user) = world.tagged(Tags::USER_CONTROLLABLE).next() else {
            return Ok(());
        };
        let target = user.position()?;
        for e in world
            .entities_mut()
            .iter_mut()
            .filter(|e| e.has(Tags::ROTATES | Tags::FACES_USER))
        {
            let offset = e.position()? - target;
            *e.angle_mut()? = -offset.y.atan2(offset.x);
        }
        Ok(())
    }
}

impl Processor for Physics {
    fn initialize(&mut self, entities: &mut [Entity], ctx: &mut SimContext) -> Result<(), SimError> {
        for e in entities.iter_mut() {
            if e.has(Tags::USER_CONTROLLABLE) {
                let human = &self.config.bodies.human;
                e.position = Some(human.position);
                let motion = e.motion.get_or_insert_with(Motion::default);
                motion.mass = human.mass;
                motion.dampening = human.dampening;
                if e.has(Tags::DAMAGEABLE) {
                    e.health = Some(Health::full(human.health));
                }
                if e.has(Tags::ROTATES) {
                    e.angle = Some(0.0);
                }
            }
            if e.has(Tags::ROCK) {
                self.roll_body(e, &self.config.bodies.rock, ctx);
            }
            if e.has(Tags::ENEMY) {
                self.roll_body(e, &self.config.bodies.enemy, ctx);
            }
            if e.has(Tags::STAR) {
                self.roll_body(e, &self.config.bodies.star, ctx);
            }
            if e.has(Tags::MOVEABLE) {
                let motion = e.motion.get_or_insert_with(Motion::default);
                motion.velocity = Vec2::ZERO;
                motion.acceleration = Vec2::ZERO;
            }
            if let Some(sprite) = e.sprite {
                e.radius = Some(self.config.sprites.radius(sprite));
            }
            if e.has(Tags::COLLECTOR) {
                let beam = &self.config.physics.collector;
                let state = e.collector.get_or_insert_with(CollectorState::default);
                state.draw_radius = beam.draw_radius;
                state.push_radius = beam.push_radius;
                state.max_collectable = beam.max_collectable;
            }
            if e.has(Tags::BULLET) || e.launch.is_some() {
                let launch = e.launch()?;
                e.position = Some(launch.position);
                let motion = e.motion.get_or_insert_with(Motion::default);
                motion.velocity = launch.velocity;
            }
            if e.has(Tags::BULLET) {
                let motion = e.motion.get_or_insert_with(Motion::default);
                motion.mass = 0.0;
                motion.dampening = 1.0;
                if e.has(Tags::DAMAGEABLE) {
                    e.health = Some(Health::full(1.0));
                }
            }
        }
        Ok(())
    }
}

/// Write one side of a collision back to its entity
fn apply_hit(e: &mut Entity, position: Vec2, velocity: Vec2, damage: f32) -> Result<(), SimError> {
    *e.position_mut()? = position;
    e.motion_mut()?.velocity = velocity;
    if e.has(Tags::DAMAGEABLE) && e.health_mut()?.apply(damage) && e.kill() {
        log::debug!("{} destroyed", e.id());
    }
    Ok(())
}
