//! Tribal Graph
//!
//! A 2D entity/component simulation core: a directed level graph is
//! materialized into entities, the world is advanced one tick at a time from
//! raw input, clicks and bumps are resolved by circle overlap, and an
//! orthographic camera maps world positions onto the screen.

pub mod config;
pub mod core;
pub mod ecs;
pub mod error;
pub mod graph;
pub mod math;
pub mod world;

pub use config::SimConfig;
pub use ecs::{Entity, EntityManager, EntitySlug};
pub use error::{EntityError, GraphError};
pub use graph::{Graph, Node};
pub use world::{Input, World};
