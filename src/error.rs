//! Error types for entity bookkeeping and level graphs.

use thiserror::Error;

use crate::ecs::EntitySlug;

/// Errors raised by the entity manager.
///
/// None of these ever escape a tick: `World::update` logs them and carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    #[error("Entity already exists: {0}")]
    DuplicateSlug(EntitySlug),

    #[error("Entity not found: {0}")]
    NotFound(EntitySlug),

    #[error("Entity {0} has no graphics")]
    NoGraphics(EntitySlug),

    #[error("Entity {0} cannot be its own parent")]
    SelfParent(EntitySlug),

    #[error("Parenting {child} to {parent} would create a cycle")]
    ParentCycle { child: EntitySlug, parent: EntitySlug },
}

/// Errors raised while building a level graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Vertex {0} does not belong to this graph")]
    UnknownVertex(usize),
}
