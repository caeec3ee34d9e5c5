//! Entity simulation module
//!
//! All gameplay logic lives here:
//! - Fixed timestep only
//! - Seeded RNG only (`SimContext`)
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod ai;
pub mod collision;
pub mod context;
pub mod entity;
pub mod factory;
pub mod input;
pub mod physics;
pub mod session;
pub mod tags;
pub mod world;

pub use ai::AiProcessor;
pub use context::SimContext;
pub use entity::{Entity, EntityId, ExplosionReason, Sprite};
pub use input::{InputEvent, InputProcessor, InputRequest, InputSource, Key, ScriptedInput};
pub use physics::Physics;
pub use session::{Session, SessionOutcome};
pub use tags::Tags;
pub use world::World;

use crate::error::SimError;

/// Shared admission step for newly spawned entities.
///
/// Every processor fills the attribute slots its tags own before the entity
/// joins the live collection.
pub trait Processor {
    fn initialize(&mut self, entities: &mut [Entity], ctx: &mut SimContext) -> Result<(), SimError>;
}
