//! Messages passed between the components of one entity within one tick.
//!
//! Delivery is a plain method call: `Siblings::send` runs every receiver's
//! `receive` before it returns, and nothing is queued across ticks.

use std::collections::BTreeSet;

use glam::DVec2;

use super::EntitySlug;

/// Which kind of component sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Graphics,
    Camera,
    Input,
    Animation,
    Collision,
    Edge,
    Button,
    Dispatch,
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Move by `displacement` in world space.
    UpdatePosition { displacement: DVec2, from: ComponentKind },
    /// New start point for a line.
    UpdateStart { position: DVec2, from: ComponentKind },
    /// New end point for a line.
    UpdateEnd { position: DVec2, from: ComponentKind },
    /// Overlapping the named entity more than any other.
    CollidedWith(EntitySlug),
    /// Every entity overlapped this tick.
    CollidedSet(BTreeSet<EntitySlug>),
    /// The entity was resolved as this tick's click target.
    Clicked,
}
