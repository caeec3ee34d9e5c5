//! AI processor
//!
//! Drives movement patterns (jagged, tracking, bulldoze, circle) and attack
//! patterns (shooting, wide shooting, swarming, contact) for AI-tagged
//! entities. Timers run on the session clock in milliseconds.
//!
//! Targets come from a pool of Human ids taken when the session's entities
//! are first initialised. Each tick the pool is resolved against the world;
//! ids that no longer resolve are ignored, and a behaviour that needs a
//! target does nothing when none is left.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec2;
use rand::Rng;
use rand::seq::IndexedRandom;

use super::Processor;
use super::collision::unit_toward;
use super::context::SimContext;
use super::entity::{AttackTimers, Cooldown, Entity, EntityId, MovementState};
use super::factory::{make_bullet, make_star};
use super::tags::Tags;
use super::world::World;
use crate::error::SimError;
use crate::math::{Polar, VectorExt, distance};
use crate::settings::{PatternConfig, SimConfig, pick};

pub struct AiProcessor {
    config: SimConfig,
    /// Entities enemies chase and shoot at
    targets: Vec<EntityId>,
}

impl AiProcessor {
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            targets: Vec::new(),
        }
    }

    pub fn targets(&self) -> &[EntityId] {
        &self.targets
    }

    fn roll_movement(pattern: &PatternConfig, timed: bool, now_ms: u64, rng: &mut impl Rng) -> MovementState {
        MovementState {
            speed: pick(&pattern.speeds, rng),
            timer: timed.then(|| Cooldown::new(now_ms, pick(&pattern.intervals_ms, rng))),
        }
    }

    /// Advance one tick; returns spawned bullets and stars
    pub fn process(&mut self, world: &mut World, ctx: &mut SimContext) -> Result<Vec<Entity>, SimError> {
        // Snapshot so enemies can read their targets while being mutated
        let targets: Vec<Entity> = self
            .targets
            .iter()
            .filter_map(|&id| world.get(id))
            .filter(|e| !e.has(Tags::DEAD))
            .cloned()
            .collect();

        let now = ctx.now_ms();
        let mut spawned = Vec::new();
        for e in world
            .entities_mut()
            .iter_mut()
            .filter(|e| e.has(Tags::AI) && !e.has(Tags::DEAD))
        {
            self.move_entity(e, &targets, now, &mut ctx.rng)?;
            self.attack(e, &targets, now, &mut ctx.rng, &mut spawned)?;
        }
        Ok(spawned)
    }

    fn move_entity(&self, e: &mut Entity, targets: &[Entity], now: u64, rng: &mut impl Rng) -> Result<(), SimError> {
        if e.has(Tags::JAGGED_PATH) {
            let movement = *e.movement()?;
            if let Some(timer) = movement.timer {
                let motion = e.motion_mut()?;
                if timer.half_elapsed(now) && motion.velocity == Vec2::ZERO {
                    motion.velocity = Polar::new(movement.speed, rng.random::<f32>() * TAU).to_cartesian();
                }
                if timer.ready(now) {
                    motion.velocity = Vec2::ZERO;
                    restart_movement(e, now)?;
                }
            }
        }

        if e.has(Tags::TRACKING_PATH) {
            if let Some(target) = targets.choose(rng) {
                let aim = target.position()? - e.position()?;
                let speed = e.movement()?.speed;
                e.motion_mut()?.velocity = aim.with_magnitude(speed);
            }
        }

        if e.has(Tags::BULLDOZE_PATH) {
            let movement = *e.movement()?;
            if let Some(timer) = movement.timer {
                let idle = e.motion()?.velocity == Vec2::ZERO;
                if timer.half_elapsed(now) && idle {
                    if let Some(target) = targets.choose(rng) {
                        let aim = target.position()? - e.position()?;
                        e.motion_mut()?.velocity = aim.with_magnitude(movement.speed);
                    }
                }
                if timer.ready(now) {
                    e.motion_mut()?.velocity = Vec2::ZERO;
                    restart_movement(e, now)?;
                }
            }
        }

        if e.has(Tags::CIRCLE_PATH) {
            if let Some(target) = targets.choose(rng) {
                self.circle(e, target, rng)?;
            }
        }
        Ok(())
    }

    /// Keep `e` on a ring around `target` and nudge it sideways
    fn circle(&self, e: &mut Entity, target: &Entity, rng: &mut impl Rng) -> Result<(), SimError> {
        let ring = &self.config.ai.circle;
        let center = target.position()?;
        let collector = target.collector()?;
        let (draw_radius, push_radius) = (collector.draw_radius, collector.push_radius);
        let target_mass = target.motion()?.mass;

        let position = e.position()?;
        let d = distance(position, center).max(self.config.physics.collision_epsilon);
        let inward = unit_toward(position, center);

        // Outer violations snap from the draw radius, inner ones from the push radius
        if d > draw_radius + ring.ring_outer {
            *e.position_mut()? = center - inward * (draw_radius + ring.snap);
        } else if d < draw_radius + ring.ring_inner {
            *e.position_mut()? = center - inward * (push_radius + ring.snap);
        }

        let motion = e.motion_mut()?;
        let strength = motion.mass * target_mass / (d * d);
        let turn = if rng.random::<bool>() { FRAC_PI_2 } else { -FRAC_PI_2 };
        motion.velocity += Polar::new(strength, inward.heading() + turn).to_cartesian();
        Ok(())
    }

    fn attack(
        &self,
        e: &mut Entity,
        targets: &[Entity],
        now: u64,
        rng: &mut impl Rng,
        spawned: &mut Vec<Entity>,
    ) -> Result<(), SimError> {
        let ai = &self.config.ai;
        let projectile = &self.config.physics.projectile;

        if e.has(Tags::SHOOTING_ATTACK) && e.attacks()?.shooting.is_some_and(|c| c.ready(now)) {
            if let Some(target) = targets.choose(rng) {
                let (position, radius) = (e.position()?, e.radius()?);
                spawned.push(make_bullet(position, target.position()?, radius, projectile));
                restart_attack(&mut e.attacks_mut()?.shooting, now);
                log::debug!("{} fired at {}", e.id(), target.id());
            }
        }

        if e.has(Tags::WIDE_SHOOTING_ATTACK) && e.attacks()?.wide_shooting.is_some_and(|c| c.ready(now)) {
            let (position, radius) = (e.position()?, e.radius()?);
            let count = ai.wide_shot_count.max(1);
            for i in 0..count {
                let aim = position + Polar::new(ai.volley_aim_distance, i as f32 * TAU / count as f32).to_cartesian();
                spawned.push(make_bullet(position, aim, radius, projectile));
            }
            restart_attack(&mut e.attacks_mut()?.wide_shooting, now);
            log::debug!("{} fired a {}-way volley", e.id(), count);
        }

        if e.has(Tags::SWARMING_ATTACK) && e.attacks()?.swarming.is_some_and(|c| c.ready(now)) {
            let (position, radius) = (e.position()?, e.radius()?);
            let count = ai.swarm_count.max(1);
            for i in 0..count {
                let aim = position + Polar::new(ai.volley_aim_distance, i as f32 * TAU / count as f32).to_cartesian();
                spawned.push(make_star(position, aim, radius, projectile, rng));
            }
            restart_attack(&mut e.attacks_mut()?.swarming, now);
            log::debug!("{} released {} stars", e.id(), count);
        }
        Ok(())
    }
}

fn restart_movement(e: &mut Entity, now: u64) -> Result<(), SimError> {
    if let Some(timer) = e.movement_mut()?.timer.as_mut() {
        timer.restart(now);
    }
    Ok(())
}

fn restart_attack(timer: &mut Option<Cooldown>, now: u64) {
    if let Some(timer) = timer {
        timer.restart(now);
    }
}

impl Processor for AiProcessor {
    fn initialize(&mut self, entities: &mut [Entity], ctx: &mut SimContext) -> Result<(), SimError> {
        self.targets
            .extend(entities.iter().filter(|e| e.has(Tags::HUMAN)).map(|e| e.id()));

        let ai = &self.config.ai;
        let now = ctx.now_ms();
        let rng = &mut ctx.rng;
        for e in entities.iter_mut() {
            if e.has(Tags::JAGGED_PATH) {
                e.movement = Some(Self::roll_movement(&ai.jagged, true, now, rng));
            }
            if e.has(Tags::TRACKING_PATH) {
                e.movement = Some(Self::roll_movement(&ai.tracking, false, now, rng));
            }
            if e.has(Tags::BULLDOZE_PATH) {
                e.movement = Some(Self::roll_movement(&ai.bulldoze, true, now, rng));
            }

            if e.has(Tags::CONTACT_ATTACK) {
                let hi = ai.contact_damage_max.max(ai.contact_damage_min);
                e.additional_damage = Some(rng.random_range(ai.contact_damage_min..=hi) as f32);
            }

            let timers = AttackTimers {
                shooting: e
                    .has(Tags::SHOOTING_ATTACK)
                    .then(|| Cooldown::new(now, ai.shooting_cooldown_ms)),
                wide_shooting: e
                    .has(Tags::WIDE_SHOOTING_ATTACK)
                    .then(|| Cooldown::new(now, ai.wide_shooting_cooldown_ms)),
                swarming: e
                    .has(Tags::SWARMING_ATTACK)
                    .then(|| Cooldown::new(now, ai.swarming_cooldown_ms)),
            };
            if timers != AttackTimers::default() {
                e.attacks = Some(timers);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::factory::{make_human, make_shooter};
    use crate::sim::physics::Physics;

    struct Rig {
        ai: AiProcessor,
        physics: Physics,
        ctx: SimContext,
        world: World,
    }

    impl Rig {
        fn new() -> Self {
            let config = SimConfig::default();
            Self {
                ai: AiProcessor::new(config.clone()),
                physics: Physics::new(config),
                ctx: SimContext::new(21, 50),
                world: World::new(),
            }
        }

        fn spawn(&mut self, mut e: Entity) -> EntityId {
            self.world.register(&mut e);
            let mut batch = [e];
            self.physics.initialize(&mut batch, &mut self.ctx).unwrap();
            self.ai.initialize(&mut batch, &mut self.ctx).unwrap();
            let [e] = batch;
            self.world.spawn(e)
        }

        fn spawn_at(&mut self, e: Entity, position: Vec2) -> EntityId {
            let id = self.spawn(e);
            self.world.get_mut(id).unwrap().position = Some(position);
            id
        }

        fn run_ms(&mut self, ms: u64) {
            let ticks = (ms * self.ctx.ticks_per_second as u64).div_ceil(1000);
            for _ in 0..ticks {
                self.ctx.advance();
            }
        }

        fn process(&mut self) -> Vec<Entity> {
            self.ai.process(&mut self.world, &mut self.ctx).unwrap()
        }
    }

    fn enemy(tags: Tags) -> Entity {
        Entity::new(
            Tags::AI | Tags::ENEMY | Tags::MOVEABLE | Tags::SOLID | Tags::BOUNDED | Tags::DAMAGEABLE | tags,
        )
        .with_sprite(crate::sim::Sprite::Ufo)
    }

    #[test]
    fn test_humans_become_targets() {
        let mut rig = Rig::new();
        let human = rig.spawn(make_human());
        rig.spawn(make_shooter());
        assert_eq!(rig.ai.targets(), &[human]);
    }

    #[test]
    fn test_bullet_bonus_rolled_like_contact_attackers() {
        let mut rig = Rig::new();
        let projectile = SimConfig::default().physics.projectile;
        for i in 0..20 {
            let shot = make_bullet(Vec2::new(100.0, 100.0), Vec2::new(200.0, 100.0 + i as f32), 4.0, &projectile);
            let bullet = rig.spawn(shot);
            let bonus = rig.world.get(bullet).unwrap().additional_damage().unwrap();
            assert!((5.0..=14.0).contains(&bonus), "bonus {bonus}");
        }
    }

    #[test]
    fn test_initialize_seeds_state() {
        let mut rig = Rig::new();
        let shooter = rig.spawn(make_shooter());
        let contact = rig.spawn(enemy(Tags::CONTACT_ATTACK | Tags::TRACKING_PATH));

        let s = rig.world.get(shooter).unwrap();
        let movement = s.movement().unwrap();
        assert!((14.0..=16.0).contains(&movement.speed));
        assert_eq!(movement.timer.unwrap().interval_ms, 10_000);
        assert_eq!(s.attacks().unwrap().shooting.unwrap().interval_ms, 1_000);
        assert!(s.attacks().unwrap().swarming.is_none());

        let c = rig.world.get(contact).unwrap();
        assert!((3.0..=5.0).contains(&c.movement().unwrap().speed));
        assert!(c.movement().unwrap().timer.is_none());
        let bonus = c.additional_damage().unwrap();
        assert!((5.0..=14.0).contains(&bonus));
        assert!(c.attacks.is_none());
    }

    #[test]
    fn test_wide_shot_volley() {
        let mut rig = Rig::new();
        rig.spawn(make_human());
        let shooter = rig.spawn_at(enemy(Tags::WIDE_SHOOTING_ATTACK), Vec2::new(200.0, 200.0));

        assert!(rig.process().is_empty());
        rig.run_ms(1_000);
        let bullets = rig.process();
        assert_eq!(bullets.len(), 8);
        for (i, bullet) in bullets.iter().enumerate() {
            assert!(bullet.has(Tags::BULLET));
            let launch = bullet.launch().unwrap();
            let expected = Polar::new(8.0, i as f32 * TAU / 8.0).to_cartesian();
            assert!((launch.velocity - expected).length() < 1e-4);
            // 22 ufo radius + 25 muzzle offset
            let offset = launch.position - Vec2::new(200.0, 200.0);
            assert!((offset.length() - 47.0).abs() < 1e-3);
        }

        // Cooldown restarted
        assert!(rig.process().is_empty());
        assert_eq!(
            rig.world.get(shooter).unwrap().attacks().unwrap().wide_shooting.unwrap().last_ms,
            1_000
        );
        rig.run_ms(1_000);
        assert_eq!(rig.process().len(), 8);
    }

    #[test]
    fn test_shooting_aims_at_target() {
        let mut rig = Rig::new();
        rig.spawn(make_human());
        rig.spawn_at(enemy(Tags::SHOOTING_ATTACK), Vec2::new(400.0, 100.0));
        rig.run_ms(1_000);
        let bullets = rig.process();
        assert_eq!(bullets.len(), 1);
        let v = bullets[0].launch().unwrap().velocity;
        assert!((v - Vec2::new(0.0, 8.0)).length() < 1e-4);
    }

    #[test]
    fn test_swarm_releases_opposing_stars() {
        let mut rig = Rig::new();
        rig.spawn(make_human());
        rig.spawn_at(enemy(Tags::SWARMING_ATTACK), Vec2::new(300.0, 300.0));
        rig.run_ms(5_000);
        assert!(rig.process().is_empty());
        rig.run_ms(1_000);
        let stars = rig.process();
        assert_eq!(stars.len(), 2);
        assert!(stars.iter().all(|s| s.has(Tags::STAR)));
        let sum = stars[0].launch().unwrap().velocity + stars[1].launch().unwrap().velocity;
        assert!(sum.length() < 1e-4);
    }

    #[test]
    fn test_no_targets_no_shots() {
        let mut rig = Rig::new();
        rig.spawn_at(enemy(Tags::SHOOTING_ATTACK | Tags::TRACKING_PATH), Vec2::new(300.0, 300.0));
        rig.run_ms(2_000);
        assert!(rig.process().is_empty());
    }

    #[test]
    fn test_jagged_moves_then_stops() {
        let mut rig = Rig::new();
        rig.spawn(make_human());
        let id = rig.spawn(enemy(Tags::JAGGED_PATH));

        rig.run_ms(4_000);
        rig.process();
        assert_eq!(rig.world.get(id).unwrap().motion().unwrap().velocity, Vec2::ZERO);

        rig.run_ms(1_000);
        rig.process();
        let e = rig.world.get(id).unwrap();
        let speed = e.motion().unwrap().velocity.length();
        assert!((speed - e.movement().unwrap().speed).abs() < 1e-3);

        rig.run_ms(5_000);
        rig.process();
        assert_eq!(rig.world.get(id).unwrap().motion().unwrap().velocity, Vec2::ZERO);
    }

    #[test]
    fn test_tracking_heads_for_target() {
        let mut rig = Rig::new();
        rig.spawn(make_human());
        let id = rig.spawn_at(enemy(Tags::TRACKING_PATH), Vec2::new(400.0, 700.0));
        rig.process();
        let e = rig.world.get(id).unwrap();
        let v = e.motion().unwrap().velocity;
        assert!(v.y < 0.0 && v.x.abs() < 1e-3);
        assert!((v.length() - e.movement().unwrap().speed).abs() < 1e-3);
    }

    #[test]
    fn test_bulldoze_charges_target() {
        let mut rig = Rig::new();
        rig.spawn(make_human());
        let id = rig.spawn_at(enemy(Tags::BULLDOZE_PATH), Vec2::new(100.0, 400.0));
        let half = rig.world.get(id).unwrap().movement().unwrap().timer.unwrap().interval_ms / 2;
        rig.run_ms(half);
        rig.process();
        let v = rig.world.get(id).unwrap().motion().unwrap().velocity;
        assert!(v.x > 0.0 && v.y.abs() < 1e-3);
    }

    #[test]
    fn test_circle_snaps_into_ring() {
        let mut rig = Rig::new();
        rig.spawn(make_human());
        let far = rig.spawn_at(enemy(Tags::CIRCLE_PATH), Vec2::new(400.0, 790.0));
        rig.process();
        let e = rig.world.get(far).unwrap();
        // 150 draw radius + 175 snap
        assert!((distance(e.position().unwrap(), Vec2::new(400.0, 400.0)) - 325.0).abs() < 1e-3);
    }

    #[test]
    fn test_circle_too_close_uses_push_radius() {
        let mut rig = Rig::new();
        rig.spawn(make_human());
        let id = rig.spawn_at(enemy(Tags::CIRCLE_PATH), Vec2::new(400.0, 420.0));
        rig.process();
        let e = rig.world.get(id).unwrap();
        let d = distance(e.position().unwrap(), Vec2::new(400.0, 400.0));
        // 50 push radius + 175 snap
        assert!((d - 225.0).abs() < 1e-3);
        // Sideways nudge only
        let v = e.motion().unwrap().velocity;
        assert!(v.y.abs() < 1e-4);
        assert!(v.x.abs() > 0.0);
    }
}
