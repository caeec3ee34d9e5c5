//! Error types
//!
//! The simulation has exactly one failure mode of its own: reading an entity
//! attribute that its tags never caused to be initialised. That is an
//! invariant breach, so it stops the simulation instead of being papered over.

use thiserror::Error;

use crate::sim::EntityId;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("entity {entity} has no `{attribute}` attribute")]
    MissingAttribute {
        entity: EntityId,
        attribute: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
