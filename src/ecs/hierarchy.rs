/// Parent-child links between drawable entities
///
/// A child's graphics hold only the parent's slug. The link is resolved by
/// lookup on every update, so removing a parent never leaves a dangling
/// reference: the child just keeps its last resolved world position.

use super::{EntityManager, EntitySlug};
use crate::error::EntityError;

impl EntityManager {
    /// Attach `child` to `parent`, replacing any previous parent.
    ///
    /// Both entities must exist and have graphics. Links that would make an
    /// entity its own ancestor are rejected.
    pub fn set_parent(&mut self, child: &EntitySlug, parent: &EntitySlug) -> Result<(), EntityError> {
        if child == parent {
            return Err(EntityError::SelfParent(child.clone()));
        }
        self.require_graphics(parent)?;
        self.require_graphics(child)?;

        if self.ancestors(parent).any(|ancestor| ancestor == child) {
            return Err(EntityError::ParentCycle {
                child: child.clone(),
                parent: parent.clone(),
            });
        }

        if let Some(graphics) = self.find_mut(child).and_then(|e| e.graphics_mut()) {
            graphics.set_parent(Some(parent.clone()));
        }
        Ok(())
    }

    /// Detach `child` from its parent; its local position becomes its world position.
    pub fn clear_parent(&mut self, child: &EntitySlug) -> Result<(), EntityError> {
        self.require_graphics(child)?;
        if let Some(entity) = self.find_mut(child) {
            if let Some(graphics) = entity.graphics_mut() {
                graphics.set_parent(None);
            }
            if let Some(collision) = entity.collision_mut() {
                collision.clear_parent_offset();
            }
        }
        Ok(())
    }

    pub fn parent_of(&self, child: &EntitySlug) -> Option<&EntitySlug> {
        self.find(child)?.graphics()?.parent()
    }

    /// Direct children in registration order
    pub fn children_of<'a>(&'a self, parent: &'a EntitySlug) -> impl Iterator<Item = &'a EntitySlug> + 'a {
        self.scene()
            .filter(move |e| e.graphics().and_then(|g| g.parent()) == Some(parent))
            .map(|e| e.slug())
    }

    /// Children, grandchildren and so on, depth first
    pub fn descendants(&self, entity: &EntitySlug) -> Vec<EntitySlug> {
        let mut descendants = Vec::new();
        for child in self.children_of(entity) {
            descendants.push(child.clone());
            descendants.extend(self.descendants(child));
        }
        descendants
    }

    /// `entity` followed by its chain of parents
    fn ancestors<'a>(&'a self, entity: &'a EntitySlug) -> impl Iterator<Item = &'a EntitySlug> + 'a {
        std::iter::successors(Some(entity), move |slug| self.parent_of(slug))
    }

    fn require_graphics(&self, slug: &EntitySlug) -> Result<(), EntityError> {
        match self.find(slug) {
            None => Err(EntityError::NotFound(slug.clone())),
            Some(entity) if entity.graphics().is_none() => Err(EntityError::NoGraphics(slug.clone())),
            Some(_) => Ok(()),
        }
    }
}
