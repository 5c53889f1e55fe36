//! Entity/component model
//!
//! This module provides:
//! - `EntitySlug` identifiers shared by every index and routing map
//! - `Entity`, an ordered bundle of components updated in registration order
//! - `Siblings`, the view a component gets of the rest of its entity
//! - `EntityManager`, the owner of every entity and its derived indices

pub mod behaviors;
pub mod components;
pub mod hierarchy;
pub mod init;
pub mod manager;
pub mod messages;
pub mod model;
pub mod rendering;
pub mod spatial;

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::camera::OrthoCamera;
use crate::world::GameInput;
pub use components::{Collision, Component, Graphics, ShapeColor};
pub use manager::EntityManager;
pub use messages::{ComponentKind, Message};

/// Opaque, unique and stable identifier for an entity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntitySlug(String);

impl EntitySlug {
    pub fn new(slug: impl Into<String>) -> Self {
        Self(slug.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntitySlug {
    fn from(slug: &str) -> Self {
        Self(slug.to_string())
    }
}

impl From<String> for EntitySlug {
    fn from(slug: String) -> Self {
        Self(slug)
    }
}

impl fmt::Display for EntitySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upcasting to `Any` so components can be found by concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

fn downcast_ref<T: Component>(component: &dyn Component) -> Option<&T> {
    component.as_any().downcast_ref::<T>()
}

fn downcast_mut<T: Component>(component: &mut dyn Component) -> Option<&mut T> {
    component.as_any_mut().downcast_mut::<T>()
}

/// An addressable bundle of components.
///
/// Entities are normally created through the `EntityManager` factories; a
/// bare `Entity` is still useful on its own for driving components in tests.
pub struct Entity {
    slug: EntitySlug,
    components: Vec<Box<dyn Component>>,
    active: bool,
}

impl Entity {
    pub fn new(slug: EntitySlug) -> Self {
        Self {
            slug,
            components: Vec::new(),
            active: true,
        }
    }

    /// Builder form of `push_component`
    pub fn with_component(mut self, component: impl Component) -> Self {
        self.components.push(Box::new(component));
        self
    }

    pub fn push_component(&mut self, component: Box<dyn Component>) {
        self.components.push(component);
    }

    pub fn slug(&self) -> &EntitySlug {
        &self.slug
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn components(&self) -> impl Iterator<Item = &dyn Component> {
        self.components.iter().map(|c| c.as_ref())
    }

    /// First component of type `T`
    pub fn component<T: Component>(&self) -> Option<&T> {
        self.components.iter().find_map(|c| downcast_ref::<T>(c.as_ref()))
    }

    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .iter_mut()
            .find_map(|c| downcast_mut::<T>(c.as_mut()))
    }

    pub fn has<T: Component>(&self) -> bool {
        self.component::<T>().is_some()
    }

    pub fn graphics(&self) -> Option<&Graphics> {
        self.component::<Graphics>()
    }

    pub fn graphics_mut(&mut self) -> Option<&mut Graphics> {
        self.component_mut::<Graphics>()
    }

    pub fn camera(&self) -> Option<&OrthoCamera> {
        self.component::<OrthoCamera>()
    }

    pub fn camera_mut(&mut self) -> Option<&mut OrthoCamera> {
        self.component_mut::<OrthoCamera>()
    }

    pub fn collision(&self) -> Option<&Collision> {
        self.component::<Collision>()
    }

    pub fn collision_mut(&mut self) -> Option<&mut Collision> {
        self.component_mut::<Collision>()
    }

    /// Run every component's update in registration order.
    ///
    /// Each component sees the others through `Siblings`, so messages it sends
    /// reach the rest of this entity before the next component runs.
    pub fn update(&mut self, world: &EntityManager, input: &GameInput) {
        for i in 0..self.components.len() {
            let (before, rest) = self.components.split_at_mut(i);
            let Some((current, after)) = rest.split_first_mut() else {
                break;
            };
            let mut siblings = Siblings { before, after };
            current.update(&mut siblings, world, input);
        }
    }

    /// Deliver a message to every component.
    pub fn receive(&mut self, message: &Message) {
        for component in &mut self.components {
            component.receive(message);
        }
    }

    pub fn tick_reset(&mut self) {
        for component in &mut self.components {
            component.tick_reset();
        }
    }

    pub fn finalize_update(&mut self) {
        for component in &mut self.components {
            component.finalize_update();
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("slug", &self.slug)
            .field(
                "components",
                &self.components.iter().map(|c| c.kind()).collect::<Vec<_>>(),
            )
            .field("active", &self.active)
            .finish()
    }
}

/// The other components of the entity whose component is updating.
pub struct Siblings<'a> {
    before: &'a mut [Box<dyn Component>],
    after: &'a mut [Box<dyn Component>],
}

impl Siblings<'_> {
    /// Deliver `message` to every sibling, in registration order.
    pub fn send(&mut self, message: &Message) {
        for component in self.before.iter_mut().chain(self.after.iter_mut()) {
            component.receive(message);
        }
    }

    pub fn find<T: Component>(&self) -> Option<&T> {
        self.before
            .iter()
            .chain(self.after.iter())
            .find_map(|c| downcast_ref::<T>(c.as_ref()))
    }

    pub fn find_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find_map(|c| downcast_mut::<T>(c.as_mut()))
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
