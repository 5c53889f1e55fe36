use glam::{DMat3, DVec2};

use crate::config::CameraConfigData;
use crate::ecs::messages::{ComponentKind, Message};
use crate::ecs::{Component, EntityManager, EntitySlug, Siblings};
use crate::math::{orthographic, scale, transform_about};
use crate::world::GameInput;

/// Orthographic camera over a world-space rectangle.
///
/// The rectangle is only ever moved through `translate`; the projection is
/// derived from the four bounds on demand.
#[derive(Debug, Clone)]
pub struct OrthoCamera {
    entity_slug: EntitySlug,
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
}

impl OrthoCamera {
    /// Camera looking at the 8x8 square with its top left corner at the origin
    pub fn new(entity_slug: EntitySlug) -> Self {
        Self::with_bounds(entity_slug, 0.0, 8.0, 0.0, 8.0)
    }

    /// Create a camera over an explicit world rectangle
    pub fn with_bounds(entity_slug: EntitySlug, left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            entity_slug,
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn from_config(entity_slug: EntitySlug, data: &CameraConfigData) -> Self {
        Self::with_bounds(entity_slug, data.left, data.right, data.top, data.bottom)
    }

    /// (left, right, top, bottom) in world space
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        (self.left, self.right, self.top, self.bottom)
    }

    /// Width of the viewing rectangle, rounded to hundredths
    pub fn width(&self) -> f64 {
        round2(self.right - self.left)
    }

    /// Height of the viewing rectangle, rounded to hundredths
    pub fn height(&self) -> f64 {
        round2(self.bottom - self.top)
    }

    /// Centre of the viewing rectangle in world space
    pub fn center(&self) -> DVec2 {
        DVec2::new((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    /// Projection of the viewing rectangle onto NDC
    pub fn world_to_ndc(&self) -> DMat3 {
        orthographic(self.left, self.right, self.top, self.bottom)
    }

    /// Shift all four bounds by the same displacement
    pub fn translate(&mut self, displacement: DVec2) {
        self.left += displacement.x;
        self.right += displacement.x;
        self.top += displacement.y;
        self.bottom += displacement.y;
    }

    /// Projection with a zoom applied about the rectangle's centre.
    ///
    /// The centre stays at NDC `(0, 0)` for every zoom factor.
    pub fn viewing_transform(&self, zoom: f64) -> DMat3 {
        self.world_to_ndc() * transform_about(self.center(), scale(zoom, zoom))
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl Component for OrthoCamera {
    fn entity_slug(&self) -> &EntitySlug {
        &self.entity_slug
    }

    fn kind(&self) -> ComponentKind {
        ComponentKind::Camera
    }

    fn update(&mut self, _siblings: &mut Siblings<'_>, _world: &EntityManager, _input: &GameInput) {}

    fn receive(&mut self, message: &Message) {
        if let Message::UpdatePosition { displacement, .. } = message {
            self.translate(*displacement);
        }
    }
}

impl From<&OrthoCamera> for CameraConfigData {
    fn from(camera: &OrthoCamera) -> Self {
        Self {
            left: camera.left,
            right: camera.right,
            top: camera.top,
            bottom: camera.bottom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2Ext;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_translate() {
        let mut camera = OrthoCamera::new("c1".into());

        camera.translate(DVec2::splat(2.0));

        let result = DVec2::ZERO.world_to_ndc(&camera);
        assert_abs_diff_eq!(result.x, -1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(result.y, 1.5, epsilon = 1e-12);
        assert_eq!(camera.bounds(), (2.0, 10.0, 2.0, 10.0));
    }

    #[test]
    fn test_size_is_rounded() {
        let camera = OrthoCamera::with_bounds("c1".into(), 0.1, 8.2049, 0.0, 4.999);
        assert_eq!(camera.width(), 8.1);
        assert_eq!(camera.height(), 5.0);
    }

    #[test]
    fn test_zoom_keeps_centre_fixed() {
        let camera = OrthoCamera::with_bounds("c1".into(), 2.0, 6.0, 1.0, 5.0);
        for zoom in [0.5, 1.0, 1.7, 3.0] {
            let centre = camera.viewing_transform(zoom).transform_point2(camera.center());
            assert_abs_diff_eq!(centre.x, 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(centre.y, 0.0, epsilon = 1e-12);
        }

        let zoomed = camera.viewing_transform(2.0).transform_point2(DVec2::new(5.0, 3.0));
        assert_abs_diff_eq!(zoomed.x, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_update_position_message_pans() {
        let mut camera = OrthoCamera::new("c1".into());
        camera.receive(&Message::UpdatePosition {
            displacement: DVec2::new(-1.0, 0.5),
            from: ComponentKind::Input,
        });
        assert_eq!(camera.bounds(), (-1.0, 7.0, 0.5, 8.5));
    }
}
