/// Behaviour components: input, animation, edges, buttons and dispatch
///
/// None of these hold a reference to another entity. Anything they need
/// from elsewhere in the world is looked up by slug during `update`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::components::{palette, Component, Graphics, ShapeColor};
use super::messages::{ComponentKind, Message};
use super::{EntityManager, EntitySlug, Siblings};
use crate::world::GameInput;

/// Turns the velocity the world targets at this entity into a displacement
#[derive(Debug, Clone)]
pub struct InputBinding {
    entity_slug: EntitySlug,
}

impl InputBinding {
    pub fn new(entity_slug: EntitySlug) -> Self {
        Self { entity_slug }
    }
}

impl Component for InputBinding {
    fn entity_slug(&self) -> &EntitySlug {
        &self.entity_slug
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Input
    }

    fn update(&mut self, siblings: &mut Siblings<'_>, _world: &EntityManager, input: &GameInput) {
        if let Some(target) = input.target(&self.entity_slug) {
            siblings.send(&Message::UpdatePosition {
                displacement: target.velocity,
                from: ComponentKind::Input,
            });
        }
    }
}

/// Constant-direction motion: `speed * time_step * direction` every tick
#[derive(Debug, Clone)]
pub struct FollowLine {
    entity_slug: EntitySlug,
    pub speed: f64,
    pub direction: DVec2,
}

impl FollowLine {
    pub fn new(entity_slug: EntitySlug, speed: f64, direction: DVec2) -> Self {
        Self {
            entity_slug,
            speed,
            direction,
        }
    }
}

impl Component for FollowLine {
    fn entity_slug(&self) -> &EntitySlug {
        &self.entity_slug
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Animation
    }

    fn update(&mut self, siblings: &mut Siblings<'_>, _world: &EntityManager, input: &GameInput) {
        let displacement = self.speed * input.time_step() * self.direction;
        siblings.send(&Message::UpdatePosition {
            displacement,
            from: ComponentKind::Animation,
        });
    }
}

/// Keeps a line's endpoints on two other entities.
#[derive(Debug, Clone)]
pub struct EdgeLink {
    entity_slug: EntitySlug,
    source: EntitySlug,
    destination: EntitySlug,
    source_position: DVec2,
    destination_position: DVec2,
}

impl EdgeLink {
    pub fn new(entity_slug: EntitySlug, source: EntitySlug, destination: EntitySlug) -> Self {
        Self {
            entity_slug,
            source,
            destination,
            source_position: DVec2::ZERO,
            destination_position: DVec2::ZERO,
        }
    }

    /// Endpoint positions to use until the endpoints are first seen
    pub fn with_positions(mut self, source: DVec2, destination: DVec2) -> Self {
        self.source_position = source;
        self.destination_position = destination;
        self
    }

    pub fn source(&self) -> &EntitySlug {
        &self.source
    }

    pub fn destination(&self) -> &EntitySlug {
        &self.destination
    }

    pub fn source_position(&self) -> DVec2 {
        self.source_position
    }

    pub fn destination_position(&self) -> DVec2 {
        self.destination_position
    }
}

fn graphics_position(world: &EntityManager, slug: &EntitySlug) -> Option<DVec2> {
    world
        .find(slug)
        .and_then(|e| e.graphics())
        .map(Graphics::world_position)
}

impl Component for EdgeLink {
    fn entity_slug(&self) -> &EntitySlug {
        &self.entity_slug
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Edge
    }

    fn update(&mut self, siblings: &mut Siblings<'_>, world: &EntityManager, _input: &GameInput) {
        if let Some(position) = graphics_position(world, &self.source) {
            self.source_position = position;
        }
        if let Some(position) = graphics_position(world, &self.destination) {
            self.destination_position = position;
        }

        siblings.send(&Message::UpdateStart {
            position: self.source_position,
            from: ComponentKind::Edge,
        });
        siblings.send(&Message::UpdateEnd {
            position: self.destination_position,
            from: ComponentKind::Edge,
        });
    }
}

/// Look of one toggle state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToggleConfig {
    #[serde(with = "crate::config::shape_color_serde")]
    pub color: ShapeColor,
}

impl ToggleConfig {
    pub fn new(color: ShapeColor) -> Self {
        Self { color }
    }
}

/// Flips between two looks each time its entity is clicked.
#[derive(Debug, Clone)]
pub struct ToggleButton {
    entity_slug: EntitySlug,
    toggled_config: ToggleConfig,
    not_toggled_config: ToggleConfig,
    toggled: bool,
    just_toggled: bool,
}

impl ToggleButton {
    pub fn new(entity_slug: EntitySlug, toggled: ToggleConfig, not_toggled: ToggleConfig) -> Self {
        Self {
            entity_slug,
            toggled_config: toggled,
            not_toggled_config: not_toggled,
            toggled: false,
            just_toggled: false,
        }
    }

    pub fn is_toggled(&self) -> bool {
        self.toggled
    }

    /// Whether the button flipped during the current tick
    pub fn just_toggled(&self) -> bool {
        self.just_toggled
    }

    fn current(&self) -> &ToggleConfig {
        if self.toggled {
            &self.toggled_config
        } else {
            &self.not_toggled_config
        }
    }
}

impl Component for ToggleButton {
    fn entity_slug(&self) -> &EntitySlug {
        &self.entity_slug
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Button
    }

    fn update(&mut self, siblings: &mut Siblings<'_>, _world: &EntityManager, input: &GameInput) {
        if input.clicked_entity() == Some(&self.entity_slug) {
            self.toggled = !self.toggled;
            self.just_toggled = true;
            log::debug!("{} toggled {}", self.entity_slug, if self.toggled { "on" } else { "off" });
            siblings.send(&Message::Clicked);
        }

        let color = self.current().color;
        if let Some(graphics) = siblings.find_mut::<Graphics>() {
            graphics.set_color(color);
        }
    }

    fn finalize_update(&mut self) {
        self.just_toggled = false;
    }
}

/// Colours of a tap button
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TapButtonCfg {
    #[serde(with = "crate::config::shape_color_serde")]
    pub idle: ShapeColor,
    #[serde(with = "crate::config::shape_color_serde")]
    pub tapped: ShapeColor,
}

impl Default for TapButtonCfg {
    fn default() -> Self {
        Self {
            idle: ShapeColor::fill(palette::GRAY),
            tapped: ShapeColor::fill(palette::WHITE),
        }
    }
}

/// Momentary button: shows its tapped look only in the tick it was clicked.
#[derive(Debug, Clone)]
pub struct TapButton {
    entity_slug: EntitySlug,
    config: TapButtonCfg,
    tapped_this_tick: bool,
    taps: u32,
}

impl TapButton {
    pub fn new(entity_slug: EntitySlug, config: TapButtonCfg) -> Self {
        Self {
            entity_slug,
            config,
            tapped_this_tick: false,
            taps: 0,
        }
    }

    pub fn tapped_this_tick(&self) -> bool {
        self.tapped_this_tick
    }

    pub fn taps(&self) -> u32 {
        self.taps
    }
}

impl Component for TapButton {
    fn entity_slug(&self) -> &EntitySlug {
        &self.entity_slug
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Button
    }

    fn update(&mut self, siblings: &mut Siblings<'_>, _world: &EntityManager, input: &GameInput) {
        if input.clicked_entity() == Some(&self.entity_slug) {
            self.tapped_this_tick = true;
            self.taps += 1;
            siblings.send(&Message::Clicked);
        }

        let color = if self.tapped_this_tick {
            self.config.tapped
        } else {
            self.config.idle
        };
        if let Some(graphics) = siblings.find_mut::<Graphics>() {
            graphics.set_color(color);
        }
    }

    fn finalize_update(&mut self) {
        self.tapped_this_tick = false;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispatchKind {
    Request,
    Response,
}

/// Records a request or response between two entities whenever its own
/// entity is clicked.
#[derive(Debug, Clone)]
pub struct Dispatch {
    entity_slug: EntitySlug,
    pub source: EntitySlug,
    pub destination: EntitySlug,
    pub dispatch_kind: DispatchKind,
    pending: bool,
    sent: u32,
}

impl Dispatch {
    pub fn new(entity_slug: EntitySlug, source: EntitySlug, destination: EntitySlug, dispatch_kind: DispatchKind) -> Self {
        Self {
            entity_slug,
            source,
            destination,
            dispatch_kind,
            pending: false,
            sent: 0,
        }
    }

    /// A dispatch was triggered this tick
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn sent(&self) -> u32 {
        self.sent
    }
}

impl Component for Dispatch {
    fn entity_slug(&self) -> &EntitySlug {
        &self.entity_slug
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Dispatch
    }

    fn update(&mut self, _siblings: &mut Siblings<'_>, _world: &EntityManager, _input: &GameInput) {}

    fn receive(&mut self, message: &Message) {
        if *message == Message::Clicked {
            self.pending = true;
            self.sent += 1;
            log::debug!(
                "{} dispatched {:?} {} -> {}",
                self.entity_slug,
                self.dispatch_kind,
                self.source,
                self.destination
            );
        }
    }

    fn finalize_update(&mut self) {
        self.pending = false;
    }
}
