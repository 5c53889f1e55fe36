//! Entity table and its derived indices.

use std::collections::HashMap;

use log::{debug, trace};

use super::components::{Collision, Component, Graphics};
use super::{Entity, EntitySlug};
use crate::core::camera::OrthoCamera;
use crate::error::EntityError;
use crate::world::GameInput;

/// Owns every entity.
///
/// Entities live in a flat table keyed by slug. Registration order is kept
/// separately and every index (scene, cameras, collidables) follows it, so
/// iteration never depends on hash order.
#[derive(Debug, Default)]
pub struct EntityManager {
    entities: HashMap<EntitySlug, Entity>,
    order: Vec<EntitySlug>,
    /// Registration rank of every live slug; ranks are never reused
    ranks: HashMap<EntitySlug, usize>,
    next_rank: usize,
    scene: Vec<EntitySlug>,
    cameras: Vec<EntitySlug>,
    collidables: Vec<EntitySlug>,
}

impl EntityManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity to the table and every index it qualifies for.
    ///
    /// Fails without touching the table if the slug is already taken.
    pub fn register(&mut self, entity: Entity) -> Result<&mut Entity, EntityError> {
        let slug = entity.slug().clone();
        if self.entities.contains_key(&slug) {
            return Err(EntityError::DuplicateSlug(slug));
        }

        debug!("Registered entity {} ({} components)", slug, entity.components().count());

        self.order.push(slug.clone());
        self.ranks.insert(slug.clone(), self.next_rank);
        self.next_rank += 1;
        self.index(&slug, &entity);
        Ok(self.entities.entry(slug).or_insert(entity))
    }

    /// Insert `slug` into every index it qualifies for, at its registration rank.
    ///
    /// A freshly registered entity has the highest rank and lands at the end.
    fn index(&mut self, slug: &EntitySlug, entity: &Entity) {
        let Some(&rank) = self.ranks.get(slug) else {
            return;
        };
        let ranks = &self.ranks;
        let add = |list: &mut Vec<EntitySlug>, qualifies: bool| {
            if !qualifies {
                return;
            }
            let found = list.binary_search_by_key(&rank, |s| ranks.get(s).copied().unwrap_or(usize::MAX));
            if let Err(at) = found {
                list.insert(at, slug.clone());
            }
        };
        add(&mut self.scene, entity.has::<Graphics>());
        add(&mut self.cameras, entity.has::<OrthoCamera>());
        add(&mut self.collidables, entity.has::<Collision>());
    }

    /// Attach another component to a registered entity and re-index it.
    pub fn add_component(&mut self, slug: &EntitySlug, component: Box<dyn Component>) -> Result<(), EntityError> {
        let mut entity = self
            .entities
            .remove(slug)
            .ok_or_else(|| EntityError::NotFound(slug.clone()))?;
        entity.push_component(component);
        self.index(slug, &entity);
        self.entities.insert(slug.clone(), entity);
        Ok(())
    }

    /// Remove an entity and prune it from every index.
    pub fn remove(&mut self, slug: &EntitySlug) -> Option<Entity> {
        let entity = self.entities.remove(slug)?;
        for list in [&mut self.order, &mut self.scene, &mut self.cameras, &mut self.collidables] {
            list.retain(|s| s != slug);
        }
        self.ranks.remove(slug);
        debug!("Removed entity {}", slug);
        Some(entity)
    }

    /// Inactive entities are skipped by every pass and by overlap queries.
    pub fn set_active(&mut self, slug: &EntitySlug, active: bool) -> Result<(), EntityError> {
        let entity = self
            .entities
            .get_mut(slug)
            .ok_or_else(|| EntityError::NotFound(slug.clone()))?;
        entity.set_active(active);
        Ok(())
    }

    pub fn find(&self, slug: &EntitySlug) -> Option<&Entity> {
        self.entities.get(slug)
    }

    pub fn find_mut(&mut self, slug: &EntitySlug) -> Option<&mut Entity> {
        self.entities.get_mut(slug)
    }

    pub fn contains(&self, slug: &EntitySlug) -> bool {
        self.entities.contains_key(slug)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Every entity in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.resolve(&self.order)
    }

    pub fn active_entities(&self) -> impl Iterator<Item = &Entity> {
        self.iter().filter(|e| e.is_active())
    }

    /// Drawable entities in registration order
    pub fn scene(&self) -> impl Iterator<Item = &Entity> {
        self.resolve(&self.scene)
    }

    pub fn cameras(&self) -> impl Iterator<Item = &Entity> {
        self.resolve(&self.cameras)
    }

    pub fn collidables(&self) -> impl Iterator<Item = &Entity> {
        self.resolve(&self.collidables)
    }

    /// The first registered camera
    pub fn camera(&self) -> Option<&Entity> {
        self.cameras().next()
    }

    fn resolve<'a>(&'a self, slugs: &'a [EntitySlug]) -> impl Iterator<Item = &'a Entity> {
        slugs.iter().filter_map(|slug| self.entities.get(slug))
    }

    /// Tick hook: clear last tick's per-tick state on every active entity
    pub fn begin_tick(&mut self) {
        for entity in self.entities.values_mut().filter(|e| e.is_active()) {
            entity.tick_reset();
        }
    }

    /// Update every active entity in registration order.
    pub fn update(&mut self, input: &GameInput) {
        for i in 0..self.order.len() {
            let slug = self.order[i].clone();
            self.update_entity(&slug, input);
        }
    }

    /// Update a single entity if it exists and is active.
    ///
    /// The entity is taken out of the table for the duration of its update so
    /// its components can read every other entity through `&self`.
    pub fn update_entity(&mut self, slug: &EntitySlug, input: &GameInput) -> bool {
        let Some(mut entity) = self.entities.remove(slug) else {
            trace!("Skipping update of missing entity {}", slug);
            return false;
        };

        let active = entity.is_active();
        if active {
            entity.update(self, input);
        }
        self.entities.insert(slug.clone(), entity);
        active
    }

    /// Commit end-of-tick state on every active entity
    pub fn finalize_tick(&mut self) {
        for slug in &self.order {
            if let Some(entity) = self.entities.get_mut(slug) {
                if entity.is_active() {
                    entity.finalize_update();
                }
            }
        }
    }
}
