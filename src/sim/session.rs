//! One wave of play
//!
//! A session owns the live entities, the reserve queue and the three
//! processors. Each tick runs input, AI and physics in that order, admits
//! whatever they spawned, draws, tops the arena up from the queue, prunes,
//! and then checks whether the wave is won or lost.

use std::collections::VecDeque;

use rand::Rng;

use super::Processor;
use super::ai::AiProcessor;
use super::context::SimContext;
use super::entity::Entity;
use super::factory::{make_enemy, make_human, make_rock, make_steel};
use super::input::{InputProcessor, InputRequest, InputSource};
use super::physics::Physics;
use super::tags::Tags;
use super::world::World;
use crate::error::SimError;
use crate::renderer::Renderer;
use crate::settings::{SimConfig, pick};

/// Result of one session tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionOutcome {
    Continue,
    /// Player asked for the pause menu; the tick still ran
    Pause,
    Quit,
    /// Player is gone and the last explosion has faded
    GameOver { score: f32 },
    /// Every enemy destroyed; carry `score` into the next wave
    WaveCleared { score: f32 },
}

pub struct Session {
    config: SimConfig,
    ctx: SimContext,
    world: World,
    /// Reserve entities, already initialised, admitted front first
    queue: VecDeque<Entity>,
    input: InputProcessor,
    ai: AiProcessor,
    physics: Physics,
    prev_score: f32,
    max_score: f32,
}

impl Session {
    /// Start a wave: the player, a steel rock and a queue sized from the
    /// score carried over.
    pub fn new(prev_score: f32, config: SimConfig, seed: u64, renderer: &mut dyn Renderer) -> Result<Self, SimError> {
        let mut session = Self {
            ctx: SimContext::new(seed, config.ticks_per_second),
            world: World::new(),
            queue: VecDeque::new(),
            input: InputProcessor::new(config.physics.user_force),
            ai: AiProcessor::new(config.clone()),
            physics: Physics::new(config.clone()),
            config,
            prev_score,
            max_score: prev_score,
        };

        let mut reserve = Vec::with_capacity(Self::queue_size(prev_score));
        let rock_chance = session.config.session.rock_chance.clamp(0.0, 1.0);
        for i in 0..Self::queue_size(prev_score) {
            let rng = &mut session.ctx.rng;
            if i != 0 && rng.random_bool(rock_chance) {
                reserve.push(make_rock());
            } else {
                reserve.push(make_enemy(rng));
            }
        }

        session.admit(vec![make_human(), make_steel()], renderer)?;
        session.initialize_batch(&mut reserve, renderer)?;
        session.max_score = prev_score
            + reserve
                .iter()
                .filter(|e| e.has(Tags::ENEMY))
                .map(|e| e.health().map(|h| h.max))
                .sum::<Result<f32, SimError>>()?;
        session.queue = reserve.into();

        log::info!(
            "Wave started: {} queued, score {} of {}",
            session.queue.len(),
            prev_score as i64,
            session.max_score as i64
        );
        Ok(session)
    }

    /// `floor(sqrt(prev_score / 100)) + 3`
    pub fn queue_size(prev_score: f32) -> usize {
        (prev_score.max(0.0) / 100.0).sqrt().floor() as usize + 3
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn context(&self) -> &SimContext {
        &self.ctx
    }

    pub fn queue(&self) -> &VecDeque<Entity> {
        &self.queue
    }

    pub fn prev_score(&self) -> f32 {
        self.prev_score
    }

    pub fn max_score(&self) -> f32 {
        self.max_score
    }

    /// Score if the game ended now: everything not yet destroyed is
    /// subtracted from the best possible score.
    pub fn current_score(&self) -> Result<f32, SimError> {
        let is_scored = |e: &&Entity| e.has(Tags::ENEMY) && !e.tags().intersects(Tags::BULLET | Tags::STAR);
        let mut remaining = 0.0;
        for e in self.world.entities().iter().chain(self.queue.iter()).filter(is_scored) {
            remaining += e.health()?.current.max(0.0);
        }
        Ok((self.max_score - remaining).clamp(self.prev_score, self.max_score))
    }

    /// Register and initialise a batch through every processor
    fn initialize_batch(&mut self, batch: &mut [Entity], renderer: &mut dyn Renderer) -> Result<(), SimError> {
        for e in batch.iter_mut() {
            self.world.register(e);
        }
        self.ai.initialize(batch, &mut self.ctx)?;
        self.input.initialize(batch, &mut self.ctx)?;
        self.physics.initialize(batch, &mut self.ctx)?;
        renderer.initialize(batch);
        Ok(())
    }

    /// Initialise spawned entities and add them to the live collection
    fn admit(&mut self, mut batch: Vec<Entity>, renderer: &mut dyn Renderer) -> Result<(), SimError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.initialize_batch(&mut batch, renderer)?;
        for e in batch {
            self.world.spawn(e);
        }
        Ok(())
    }

    /// Top the arena up from the queue while below a random population size
    fn inject_reserves(&mut self) {
        let size = pick(&self.config.session.population_thresholds, &mut self.ctx.rng);
        while self.world.len() < size {
            let Some(e) = self.queue.pop_front() else {
                break;
            };
            log::debug!("Admitted {} from the queue ({} left)", e.id(), self.queue.len());
            self.world.spawn(e);
        }
    }

    /// Advance the wave by one tick
    pub fn tick(&mut self, input: &mut dyn InputSource, renderer: &mut dyn Renderer) -> Result<SessionOutcome, SimError> {
        self.ctx.advance();

        let request = self.input.process(&mut self.world, input)?;
        if request == Some(InputRequest::Quit) {
            log::info!("Quit requested");
            return Ok(SessionOutcome::Quit);
        }

        let spawned = self.ai.process(&mut self.world, &mut self.ctx)?;
        self.admit(spawned, renderer)?;
        let spawned = self.physics.process(&mut self.world, &self.ctx)?;
        self.admit(spawned, renderer)?;

        renderer.process(self.world.entities());
        renderer.display();

        self.inject_reserves();
        let pruned = self.world.prune();
        log::trace!(
            "Tick {}: {} live, {} queued, {} pruned",
            self.ctx.ticks,
            self.world.len(),
            self.queue.len(),
            pruned
        );

        let player_alive = self.world.count_tagged(Tags::USER_CONTROLLABLE) > 0;
        if !player_alive {
            if renderer.animations_pending() {
                return Ok(SessionOutcome::Continue);
            }
            let score = self.current_score()?;
            log::info!("Game over: score {}", score as i64);
            return Ok(SessionOutcome::GameOver { score });
        }

        let enemies_left = self.world.count_tagged(Tags::ENEMY) + self.queue.iter().filter(|e| e.has(Tags::ENEMY)).count();
        if enemies_left == 0 {
            log::info!("Wave cleared: score {}", self.max_score as i64);
            return Ok(SessionOutcome::WaveCleared { score: self.max_score });
        }

        Ok(match request {
            Some(InputRequest::Pause) => SessionOutcome::Pause,
            _ => SessionOutcome::Continue,
        })
    }
}
