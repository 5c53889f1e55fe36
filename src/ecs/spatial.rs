/// Circle overlap queries
///
/// Every collidable is a circle (position + radius). Two circles overlap when
/// their centres are closer than the sum of their radii. Overlaps are ranked
/// by the exact area of the lens the two circles share, which makes the
/// result independent of table order; equal areas go to the entity that was
/// registered first.

use std::f64::consts::PI;

use glam::DVec2;

use super::components::{Collision, Component};
use super::{Entity, EntityManager, EntitySlug};

/// Overlap between a querying circle and one other collidable
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub slug: EntitySlug,
    /// How far the circles interpenetrate along `normal`
    pub depth: f64,
    /// Shared lens area
    pub area: f64,
    /// Unit vector from the querying centre toward the other centre
    /// (zero when the centres coincide)
    pub normal: DVec2,
}

impl Intersection {
    /// Penetration vector pointing into the other collidable
    pub fn penetration(&self) -> DVec2 {
        self.normal * self.depth
    }
}

/// Strict circle/circle overlap test (touching circles do not overlap)
pub fn circles_overlap(a: DVec2, ra: f64, b: DVec2, rb: f64) -> bool {
    a.distance(b) < ra + rb
}

/// Area of the intersection of two circles whose centres are `d` apart
pub fn lens_area(d: f64, r1: f64, r2: f64) -> f64 {
    if d >= r1 + r2 {
        return 0.0;
    }
    if d <= (r1 - r2).abs() {
        let r = r1.min(r2);
        return PI * r * r;
    }

    let a1 = ((d * d + r1 * r1 - r2 * r2) / (2.0 * d * r1)).clamp(-1.0, 1.0).acos();
    let a2 = ((d * d + r2 * r2 - r1 * r1) / (2.0 * d * r2)).clamp(-1.0, 1.0).acos();
    let kite = (-d + r1 + r2) * (d + r1 - r2) * (d - r1 + r2) * (d + r1 + r2);

    r1 * r1 * a1 + r2 * r2 * a2 - 0.5 * kite.max(0.0).sqrt()
}

/// Overlap of circle `(position, radius)` with `other`, if any
pub fn intersect(position: DVec2, radius: f64, other: &Collision) -> Option<Intersection> {
    let center = other.world_position();
    if !circles_overlap(position, radius, center, other.radius) {
        return None;
    }

    let d = position.distance(center);
    Some(Intersection {
        slug: other.entity_slug().clone(),
        depth: radius + other.radius - d,
        area: lens_area(d, radius, other.radius),
        normal: (center - position).normalize_or_zero(),
    })
}

/// Largest overlap by area; the first of equal areas wins
pub fn largest(intersections: impl IntoIterator<Item = Intersection>) -> Option<Intersection> {
    let mut best: Option<Intersection> = None;
    for candidate in intersections {
        match &best {
            Some(current) if candidate.area <= current.area => {}
            _ => best = Some(candidate),
        }
    }
    best
}

impl EntityManager {
    /// Every active solid collidable overlapping `collision`, in registration order.
    ///
    /// The querying entity itself is never reported.
    pub fn intersections(&self, collision: &Collision) -> Vec<Intersection> {
        let own = collision.entity_slug();
        self.collidables()
            .filter(|entity| entity.slug() != own && entity.is_active())
            .filter_map(|entity| entity.collision())
            .filter(|other| other.is_solid())
            .filter_map(|other| intersect(collision.world_position(), collision.radius, other))
            .collect()
    }

    pub fn largest_intersection(&self, collision: &Collision) -> Option<Intersection> {
        largest(self.intersections(collision))
    }

    /// Entity overlapping `entity`'s collision footprint the most
    pub fn largest_intersected_entity(&self, entity: &Entity) -> Option<&Entity> {
        let collision = entity.collision()?;
        let hit = self.largest_intersection(collision)?;
        self.find(&hit.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{Graphics, ShapeColor};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_overlap_is_strict() {
        assert!(circles_overlap(DVec2::ZERO, 1.0, DVec2::new(1.5, 0.0), 1.0));
        assert!(!circles_overlap(DVec2::ZERO, 1.0, DVec2::new(2.0, 0.0), 1.0));
    }

    #[test]
    fn test_lens_area() {
        assert_eq!(lens_area(2.0, 1.0, 1.0), 0.0);

        // Contained circle
        assert_abs_diff_eq!(lens_area(0.1, 1.0, 0.5), PI * 0.25, epsilon = 1e-12);

        // Unit circles one radius apart: 2π/3 - √3/2
        let expected = 2.0 * PI / 3.0 - 3.0_f64.sqrt() / 2.0;
        assert_abs_diff_eq!(lens_area(1.0, 1.0, 1.0), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_lens_area_shrinks_with_distance() {
        let mut previous = f64::INFINITY;
        for step in 0..20 {
            let area = lens_area(step as f64 * 0.1, 1.0, 0.65);
            assert!(area <= previous);
            previous = area;
        }
    }

    #[test]
    fn test_penetration_points_into_other() {
        let other = Collision::new("o".into(), DVec2::new(1.0, 0.0), 0.5);
        let hit = intersect(DVec2::ZERO, 0.75, &other).unwrap();

        assert_abs_diff_eq!(hit.depth, 0.25, epsilon = 1e-12);
        assert_eq!(hit.normal, DVec2::X);
        assert_abs_diff_eq!(hit.penetration().x, 0.25, epsilon = 1e-12);
    }

    #[test]
    fn test_coincident_centres_have_zero_normal() {
        let other = Collision::new("o".into(), DVec2::ZERO, 0.5);
        let hit = intersect(DVec2::ZERO, 0.5, &other).unwrap();
        assert_eq!(hit.normal, DVec2::ZERO);
        assert_eq!(hit.penetration(), DVec2::ZERO);
    }

    #[test]
    fn test_largest_prefers_bigger_area_then_first() {
        let hit = |slug: &str, area: f64| Intersection {
            slug: slug.into(),
            depth: 0.0,
            area,
            normal: DVec2::ZERO,
        };

        let best = largest(vec![hit("a", 1.0), hit("b", 2.0), hit("c", 2.0)]).unwrap();
        assert_eq!(best.slug, EntitySlug::from("b"));
        assert!(largest(Vec::<Intersection>::new()).is_none());
    }

    #[test]
    fn test_largest_intersected_entity() {
        let mut manager = EntityManager::new();
        manager
            .create_prop("far".into(), DVec2::new(1.05, 1.0), 0.1, ShapeColor::default(), false)
            .unwrap();
        manager
            .create_prop("near".into(), DVec2::new(1.02, 1.0), 0.1, ShapeColor::default(), false)
            .unwrap();
        manager
            .create_prop("away".into(), DVec2::new(5.0, 5.0), 0.1, ShapeColor::default(), false)
            .unwrap();

        let marker = Entity::new("marker".into())
            .with_component(Collision::sensor("marker".into(), DVec2::new(1.0, 1.0), 0.1));

        let hits = manager.intersections(marker.collision().unwrap());
        assert_eq!(hits.len(), 2);

        let clicked = manager.largest_intersected_entity(&marker).unwrap();
        assert_eq!(clicked.slug(), &EntitySlug::from("near"));
    }

    #[test]
    fn test_larger_overlap_wins_in_either_registration_order() {
        let marker = Entity::new("marker".into())
            .with_component(Collision::sensor("marker".into(), DVec2::new(1.0, 1.0), 0.1));

        for names in [["near", "far"], ["far", "near"]] {
            let mut manager = EntityManager::new();
            for name in names {
                let x = if name == "near" { 1.02 } else { 1.05 };
                manager
                    .create_prop(name.into(), DVec2::new(x, 1.0), 0.1, ShapeColor::default(), false)
                    .unwrap();
            }

            let clicked = manager.largest_intersected_entity(&marker).unwrap();
            assert_eq!(clicked.slug(), &EntitySlug::from("near"), "registered as {:?}", names);
        }
    }

    #[test]
    fn test_parented_collidable_is_hit_where_drawn() {
        let mut manager = EntityManager::new();
        manager
            .create_decoration("anchor".into(), Graphics::new("anchor".into()).with_position(DVec2::new(2.0, 0.0)))
            .unwrap();
        manager
            .create_prop("child".into(), DVec2::new(1.0, 1.0), 0.2, ShapeColor::default(), false)
            .unwrap();
        manager.set_parent(&"child".into(), &"anchor".into()).unwrap();
        manager.update(&crate::world::GameInput::new(crate::world::Input::idle()));

        let at_local = Entity::new("m".into()).with_component(Collision::sensor("m".into(), DVec2::new(1.0, 1.0), 0.1));
        let at_world = Entity::new("m".into()).with_component(Collision::sensor("m".into(), DVec2::new(3.0, 1.0), 0.1));

        assert!(manager.largest_intersected_entity(&at_local).is_none());
        assert_eq!(
            manager.largest_intersected_entity(&at_world).map(|e| e.slug().as_str()),
            Some("child")
        );
    }

    #[test]
    fn test_inactive_and_self_are_skipped() {
        let mut manager = EntityManager::new();
        manager
            .create_prop("a".into(), DVec2::ZERO, 0.5, ShapeColor::default(), false)
            .unwrap();
        manager
            .create_prop("b".into(), DVec2::new(0.1, 0.0), 0.5, ShapeColor::default(), false)
            .unwrap();
        manager.set_active(&"b".into(), false).unwrap();

        let a = manager.find(&"a".into()).unwrap();
        assert!(manager.largest_intersected_entity(a).is_none());
    }
}
