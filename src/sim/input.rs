//! Input processor
//!
//! Polls one event per tick from an `InputSource`, steers the player toward
//! the pointer and switches the tractor beam on and off.

use std::collections::VecDeque;

use glam::Vec2;

use super::Processor;
use super::context::SimContext;
use super::entity::Entity;
use super::tags::Tags;
use super::world::World;
use crate::error::SimError;
use crate::math::VectorExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    /// The `p` key
    Pause,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputEvent {
    /// Nothing pending this tick
    #[default]
    None,
    /// Window closed or equivalent
    Quit,
    KeyDown(Key),
    PointerDown,
    PointerUp,
}

/// What the input asks the surrounding frame to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRequest {
    Pause,
    Quit,
}

/// Where events and the pointer position come from
pub trait InputSource {
    /// Next pending event, `InputEvent::None` if there is none
    fn poll_event(&mut self) -> InputEvent;
    /// Pointer position in arena coordinates
    fn pointer(&self) -> Vec2;
}

/// Replays a fixed list of events, one per poll
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
    pointer: Vec2,
}

impl ScriptedInput {
    pub fn new(pointer: Vec2) -> Self {
        Self {
            events: VecDeque::new(),
            pointer,
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    pub fn set_pointer(&mut self, pointer: Vec2) {
        self.pointer = pointer;
    }

    pub fn pending(&self) -> usize {
        self.events.len()
    }
}

impl InputSource for ScriptedInput {
    fn poll_event(&mut self) -> InputEvent {
        self.events.pop_front().unwrap_or_default()
    }

    fn pointer(&self) -> Vec2 {
        self.pointer
    }
}

pub struct InputProcessor {
    /// Force the player pushes with
    force: f32,
}

impl InputProcessor {
    pub fn new(force: f32) -> Self {
        Self { force }
    }

    /// Handle one tick of input.
    ///
    /// Quit returns straight away. A pause request is reported after the
    /// player's controls have been applied.
    pub fn process(&mut self, world: &mut World, input: &mut dyn InputSource) -> Result<Option<InputRequest>, SimError> {
        let event = input.poll_event();
        let request = match event {
            InputEvent::Quit => return Ok(Some(InputRequest::Quit)),
            InputEvent::KeyDown(Key::Escape | Key::Pause) => Some(InputRequest::Pause),
            _ => None,
        };

        let pointer = input.pointer();
        for e in world
            .entities_mut()
            .iter_mut()
            .filter(|e| e.has(Tags::USER_CONTROLLABLE))
        {
            let offset = pointer - e.position()?;
            let motion = e.motion_mut()?;
            motion.acceleration = if offset == Vec2::ZERO {
                Vec2::ZERO
            } else {
                offset.with_magnitude(self.force / motion.mass)
            };

            if e.has(Tags::COLLECTOR) {
                match event {
                    InputEvent::PointerDown => {
                        e.add(Tags::COLLECTOR_ACTIVE);
                        log::debug!("{} collector on", e.id());
                    }
                    InputEvent::PointerUp => {
                        e.remove(Tags::COLLECTOR_ACTIVE);
                        e.collector_mut()?.collected.clear();
                        log::debug!("{} collector off", e.id());
                    }
                    _ => {}
                }
            }
        }
        Ok(request)
    }
}

impl Processor for InputProcessor {
    fn initialize(&mut self, entities: &mut [Entity], _ctx: &mut SimContext) -> Result<(), SimError> {
        for e in entities.iter_mut().filter(|e| e.has(Tags::COLLECTOR)) {
            e.remove(Tags::COLLECTOR_ACTIVE);
            e.collector.get_or_insert_with(Default::default).collected.clear();
        }
        Ok(())
    }
}
