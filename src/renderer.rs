//! Rendering collaborator
//!
//! The simulation only needs three things from a renderer: a chance to look
//! at newly admitted entities, a per-tick pass over the live collection, and
//! whether any explosion animation is still playing (game over waits for
//! those). `HeadlessRenderer` keeps that bookkeeping without drawing.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::{Entity, ExplosionReason, Tags};

/// Drawing seam used by sessions, menus and dialogs
pub trait Renderer {
    /// Called once for every entity before it joins a session
    fn initialize(&mut self, _entities: &mut [Entity]) {}

    /// Draw one tick of the live collection
    fn process(&mut self, entities: &[Entity]);

    /// Draw a menu box; `hovered` is the option under the pointer
    fn draw_menu(&mut self, title: &str, options: &[&str], width: f32, hovered: Option<usize>);

    fn draw_dialog(&mut self, title: &str, lines: &[String]);

    /// Present the finished frame
    fn display(&mut self);

    /// Any explosion still animating
    fn animations_pending(&self) -> bool;
}

/// What kind of blast wave an animation shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlastKind {
    PlayerDeath,
    Death,
    Minor,
    Bullet,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Animation {
    pub position: Vec2,
    pub kind: BlastKind,
    /// Frames left to draw
    pub frames_left: u32,
}

/// Renderer that tracks animations and counts frames
#[derive(Debug, Clone)]
pub struct HeadlessRenderer {
    rng: Pcg32,
    animations: Vec<Animation>,
    /// Frames presented so far
    pub frames: u64,
    /// Title of the last menu or dialog drawn
    pub last_overlay: Option<String>,
}

impl Default for HeadlessRenderer {
    fn default() -> Self {
        Self::new(0)
    }
}

impl HeadlessRenderer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            animations: Vec::new(),
            frames: 0,
            last_overlay: None,
        }
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    /// Queue a burst of `min..=max` waves, each lasting `frames` frames
    fn add_explosion(&mut self, position: Vec2, kind: BlastKind, waves: (u32, u32), frames: u32) {
        let count = self.rng.random_range(waves.0..=waves.1);
        self.animations.extend((0..count).map(|_| Animation {
            position,
            kind,
            frames_left: frames,
        }));
    }
}

impl Renderer for HeadlessRenderer {
    fn process(&mut self, entities: &[Entity]) {
        // Age existing animations before adding this tick's
        self.animations.retain_mut(|a| {
            a.frames_left -= 1;
            a.frames_left > 0
        });

        for e in entities {
            let Some(position) = e.position else {
                continue;
            };
            if e.has(Tags::DEAD) {
                if e.has(Tags::USER_CONTROLLABLE) {
                    self.add_explosion(position, BlastKind::PlayerDeath, (4, 6), 20);
                } else if !e.has(Tags::BULLET) {
                    self.add_explosion(position, BlastKind::Death, (4, 6), 20);
                }
            }
            if e.has(Tags::EXPLOSION) {
                let kind = match e.reason {
                    Some(ExplosionReason::Bullet) => BlastKind::Bullet,
                    _ => BlastKind::Minor,
                };
                self.add_explosion(position, kind, (2, 3), 4);
            }
        }
    }

    fn draw_menu(&mut self, title: &str, _options: &[&str], _width: f32, _hovered: Option<usize>) {
        self.last_overlay = Some(title.to_string());
    }

    fn draw_dialog(&mut self, title: &str, _lines: &[String]) {
        self.last_overlay = Some(title.to_string());
    }

    fn display(&mut self) {
        self.frames += 1;
    }

    fn animations_pending(&self) -> bool {
        !self.animations.is_empty()
    }
}
