/// Core components shared by every kind of entity
///
/// All positions are 64-bit world coordinates (DVec2) with a top-left origin:
/// x grows to the right and y grows downward.

use std::collections::BTreeSet;

use glam::{DMat3, DVec2, DVec3, Vec4};

use super::messages::{ComponentKind, Message};
use super::model::Model;
use super::spatial::Intersection;
use super::{AsAny, EntityManager, EntitySlug, Siblings};
use crate::math::{translate, Orientation};
use crate::world::GameInput;

/// RGBA colour, each channel in `[0, 1]`
pub type Rgba = Vec4;

/// Named colours used by the built-in entities
pub mod palette {
    use super::Rgba;

    pub const BLACK: Rgba = Rgba::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Rgba = Rgba::new(1.0, 1.0, 1.0, 1.0);
    pub const GREEN: Rgba = Rgba::new(0.0, 1.0, 0.0, 1.0);
    pub const YELLOW: Rgba = Rgba::new(1.0, 1.0, 0.0, 1.0);
    pub const BLUE_VIOLET: Rgba = Rgba::new(0.541, 0.169, 0.886, 1.0);
    pub const MAGENTA: Rgba = Rgba::new(1.0, 0.0, 1.0, 1.0);
    pub const GRAY: Rgba = Rgba::new(0.5, 0.5, 0.5, 1.0);
}

/// Capability interface implemented by every component.
///
/// `update` advances the component by one tick. It may message the other
/// components of its own entity through `siblings` and read (never write)
/// other entities through `world`.
pub trait Component: AsAny {
    fn entity_slug(&self) -> &EntitySlug;

    fn kind(&self) -> ComponentKind;

    fn update(&mut self, siblings: &mut Siblings<'_>, world: &EntityManager, input: &GameInput);

    fn receive(&mut self, _message: &Message) {}

    /// Called on active entities before anything else in a tick
    fn tick_reset(&mut self) {}

    /// Called on active entities after the update pass
    fn finalize_update(&mut self) {}
}

/// Fill and stroke pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeColor {
    pub fill: Rgba,
    pub stroke: Rgba,
}

impl ShapeColor {
    pub fn new(fill: Rgba, stroke: Rgba) -> Self {
        Self { fill, stroke }
    }

    /// Fill colour with the default black stroke
    pub fn fill(fill: Rgba) -> Self {
        Self::new(fill, palette::BLACK)
    }
}

impl Default for ShapeColor {
    fn default() -> Self {
        Self::new(palette::WHITE, palette::BLACK)
    }
}

/// Drawable state of an entity
#[derive(Debug, Clone)]
pub struct Graphics {
    entity_slug: EntitySlug,

    /// Local position; world position when there is no parent
    pub position: DVec2,
    pub radius: f64,
    pub model: Model,

    pub color_fill: Rgba,
    pub color_stroke: Rgba,
    pub stroke_weight: f64,

    /// Not everything drawn carries a label
    pub label: String,

    /// Cached by `rendering::update_screen_transforms`
    pub world_to_screen: DMat3,
    pub orientation: Orientation,

    /// Line endpoints, only meaningful for `Model::Line`
    pub start: DVec2,
    pub end: DVec2,

    /// Weak link to the parent entity, resolved by slug every update
    parent: Option<EntitySlug>,
    parent_offset: DVec2,
}

impl Graphics {
    pub fn new(entity_slug: EntitySlug) -> Self {
        Self {
            entity_slug,
            position: DVec2::ZERO,
            radius: 0.0,
            model: Model::Point,
            color_fill: palette::WHITE,
            color_stroke: palette::BLACK,
            stroke_weight: 1.0,
            label: String::new(),
            world_to_screen: DMat3::IDENTITY,
            orientation: Orientation::default(),
            start: DVec2::ZERO,
            end: DVec2::ZERO,
            parent: None,
            parent_offset: DVec2::ZERO,
        }
    }

    pub fn with_position(mut self, position: DVec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_color(mut self, color: ShapeColor) -> Self {
        self.set_color(color);
        self
    }

    pub fn with_stroke_weight(mut self, stroke_weight: f64) -> Self {
        self.stroke_weight = stroke_weight;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_endpoints(mut self, start: DVec2, end: DVec2) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    pub fn color(&self) -> ShapeColor {
        ShapeColor::new(self.color_fill, self.color_stroke)
    }

    pub fn set_color(&mut self, color: ShapeColor) {
        self.color_fill = color.fill;
        self.color_stroke = color.stroke;
    }

    pub fn parent(&self) -> Option<&EntitySlug> {
        self.parent.as_ref()
    }

    pub(crate) fn set_parent(&mut self, parent: Option<EntitySlug>) {
        if parent.is_none() {
            self.parent_offset = DVec2::ZERO;
        }
        self.parent = parent;
    }

    /// Position in world space, following the parent chain as of the last update
    pub fn world_position(&self) -> DVec2 {
        self.parent_offset + self.position
    }

    pub fn model_to_upright(&self) -> DMat3 {
        self.orientation.object_to_upright()
    }

    pub fn upright_to_world(&self) -> DMat3 {
        translate(self.world_position())
    }

    /// Model vertices carried through model -> upright -> world -> screen,
    /// using the cached `world_to_screen`
    pub fn render_model(&self) -> Vec<DVec3> {
        self.render_model_with(self.world_to_screen)
    }

    pub fn render_model_with(&self, world_to_screen: DMat3) -> Vec<DVec3> {
        let transform = world_to_screen * self.upright_to_world() * self.model_to_upright();
        self.model.vertices().iter().map(|v| transform * *v).collect()
    }
}

impl Component for Graphics {
    fn entity_slug(&self) -> &EntitySlug {
        &self.entity_slug
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Graphics
    }

    fn update(&mut self, _siblings: &mut Siblings<'_>, world: &EntityManager, _input: &GameInput) {
        // A vanished parent leaves the last resolved offset in place
        if let Some(parent) = &self.parent {
            if let Some(graphics) = world.find(parent).and_then(|e| e.graphics()) {
                self.parent_offset = graphics.world_position();
            }
        }
    }

    fn receive(&mut self, message: &Message) {
        match message {
            Message::UpdatePosition { displacement, .. } => self.position += *displacement,
            Message::UpdateStart { position, .. } => self.start = *position,
            Message::UpdateEnd { position, .. } => self.end = *position,
            _ => {}
        }
    }
}

/// Circular footprint used for hit-testing and bumping.
///
/// Solid collisions can be hit by other collisions. Sensors (the click
/// marker) can query for overlaps but are never hit themselves.
#[derive(Debug, Clone)]
pub struct Collision {
    entity_slug: EntitySlug,
    /// Local position, kept in step with the sibling graphics
    pub position: DVec2,
    pub radius: f64,
    solid: bool,
    collision_response: bool,
    collided: BTreeSet<EntitySlug>,
    /// Parent world position copied from the sibling graphics each update
    parent_offset: DVec2,
}

impl Collision {
    pub fn new(entity_slug: EntitySlug, position: DVec2, radius: f64) -> Self {
        Self {
            entity_slug,
            position,
            radius,
            solid: true,
            collision_response: false,
            collided: BTreeSet::new(),
            parent_offset: DVec2::ZERO,
        }
    }

    pub fn sensor(entity_slug: EntitySlug, position: DVec2, radius: f64) -> Self {
        Self {
            solid: false,
            ..Self::new(entity_slug, position, radius)
        }
    }

    /// Push the entity out of whatever it overlaps each update
    pub fn with_response(mut self, collision_response: bool) -> Self {
        self.collision_response = collision_response;
        self
    }

    pub fn is_solid(&self) -> bool {
        self.solid
    }

    pub fn collision_response(&self) -> bool {
        self.collision_response
    }

    /// Entities overlapped during this tick's update
    pub fn collided(&self) -> &BTreeSet<EntitySlug> {
        &self.collided
    }

    /// Footprint centre in world space, where the entity is drawn
    pub fn world_position(&self) -> DVec2 {
        self.parent_offset + self.position
    }

    pub(crate) fn clear_parent_offset(&mut self) {
        self.parent_offset = DVec2::ZERO;
    }

    fn resolve(&mut self, siblings: &mut Siblings<'_>, largest: &Intersection) {
        siblings.send(&Message::CollidedWith(largest.slug.clone()));
        siblings.send(&Message::CollidedSet(self.collided.clone()));

        let displacement = -largest.penetration();
        if displacement != DVec2::ZERO {
            self.position += displacement;
            siblings.send(&Message::UpdatePosition {
                displacement,
                from: ComponentKind::Collision,
            });
        }
    }
}

impl Component for Collision {
    fn entity_slug(&self) -> &EntitySlug {
        &self.entity_slug
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Collision
    }

    fn update(&mut self, siblings: &mut Siblings<'_>, world: &EntityManager, _input: &GameInput) {
        if let Some(graphics) = siblings.find::<Graphics>() {
            self.parent_offset = graphics.world_position() - graphics.position;
        }

        if !self.solid || !self.collision_response {
            return;
        }

        let hits = world.intersections(self);
        if hits.is_empty() {
            return;
        }
        self.collided.extend(hits.iter().map(|hit| hit.slug.clone()));

        if let Some(largest) = super::spatial::largest(hits) {
            log::trace!("{} pushed out of {}", self.entity_slug, largest.slug);
            self.resolve(siblings, &largest);
        }
    }

    fn receive(&mut self, message: &Message) {
        if let Message::UpdatePosition { displacement, from } = message {
            if *from != ComponentKind::Collision {
                self.position += *displacement;
            }
        }
    }

    fn tick_reset(&mut self) {
        self.collided.clear();
    }
}
