//! Conversions between world, normalized device and screen coordinates.
//!
//! Each conversion is its own affine step so they compose:
//! world -> NDC goes through the camera, NDC -> screen through the viewport.

use glam::{DMat3, DVec2, DVec3};

use super::matrix::orthographic;
use crate::core::camera::OrthoCamera;

pub trait Vec2Ext {
    /// Homogeneous point `(x, y, 1)`.
    fn point(self) -> DVec3;

    /// World to NDC through an explicit world rectangle.
    fn world_to_ndc_bounds(self, left: f64, right: f64, top: f64, bottom: f64) -> DVec2;

    /// World to NDC through the camera's base projection.
    fn world_to_ndc(self, camera: &OrthoCamera) -> DVec2;

    /// NDC back to world space.
    ///
    /// With a zoom the inverse of the camera's viewing transform is used,
    /// otherwise the inverse of its base projection. Returns `None` when the
    /// transform cannot be inverted (zero zoom, collapsed camera).
    fn ndc_to_world(self, camera: &OrthoCamera, zoom: Option<f64>) -> Option<DVec2>;

    /// NDC `[-1, 1]` to pixels `[0, width] x [0, height]`.
    ///
    /// Screen Y grows downward while NDC Y grows upward, so renderers pass
    /// `flip_y = true`.
    fn ndc_to_screen(self, width: f64, height: f64, flip_x: bool, flip_y: bool) -> DVec2;

    /// Inverse of `ndc_to_screen` with the same flags.
    fn screen_to_ndc(self, width: f64, height: f64, flip_x: bool, flip_y: bool) -> DVec2;
}

impl Vec2Ext for DVec2 {
    fn point(self) -> DVec3 {
        self.extend(1.0)
    }

    fn world_to_ndc_bounds(self, left: f64, right: f64, top: f64, bottom: f64) -> DVec2 {
        (orthographic(left, right, top, bottom) * self.point()).truncate()
    }

    fn world_to_ndc(self, camera: &OrthoCamera) -> DVec2 {
        (camera.world_to_ndc() * self.point()).truncate()
    }

    fn ndc_to_world(self, camera: &OrthoCamera, zoom: Option<f64>) -> Option<DVec2> {
        let transform = match zoom {
            Some(zoom) => camera.viewing_transform(zoom),
            None => camera.world_to_ndc(),
        };
        invert(transform).map(|inverse| (inverse * self.point()).truncate())
    }

    fn ndc_to_screen(self, width: f64, height: f64, flip_x: bool, flip_y: bool) -> DVec2 {
        DVec2::new(
            ndc_to_screen_axis(self.x, width, flip_x),
            ndc_to_screen_axis(self.y, height, flip_y),
        )
    }

    fn screen_to_ndc(self, width: f64, height: f64, flip_x: bool, flip_y: bool) -> DVec2 {
        DVec2::new(
            screen_to_ndc_axis(self.x, width, flip_x),
            screen_to_ndc_axis(self.y, height, flip_y),
        )
    }
}

fn invert(m: DMat3) -> Option<DMat3> {
    let determinant = m.determinant();
    if determinant == 0.0 || !determinant.is_finite() {
        return None;
    }
    Some(m.inverse())
}

fn ndc_to_screen_axis(value: f64, size: f64, flip: bool) -> f64 {
    let value = if flip { -value } else { value };
    (value + 1.0) * 0.5 * size
}

fn screen_to_ndc_axis(value: f64, size: f64, flip: bool) -> f64 {
    let ndc = value / size * 2.0 - 1.0;
    if flip {
        -ndc
    } else {
        ndc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_ndc_to_screen_flips_y() {
        let top_left = DVec2::new(-1.0, 1.0).ndc_to_screen(800.0, 600.0, false, true);
        assert_eq!(top_left, DVec2::new(0.0, 0.0));

        let bottom_right = DVec2::new(1.0, -1.0).ndc_to_screen(800.0, 600.0, false, true);
        assert_eq!(bottom_right, DVec2::new(800.0, 600.0));

        let unflipped = DVec2::new(1.0, 1.0).ndc_to_screen(800.0, 600.0, false, false);
        assert_eq!(unflipped, DVec2::new(800.0, 600.0));

        let flipped_x = DVec2::new(1.0, 0.0).ndc_to_screen(800.0, 600.0, true, false);
        assert_eq!(flipped_x, DVec2::new(0.0, 300.0));
    }

    #[test]
    fn test_screen_to_ndc_inverts_ndc_to_screen() {
        let ndc = DVec2::new(0.25, -0.75);
        let back = ndc
            .ndc_to_screen(1280.0, 720.0, false, true)
            .screen_to_ndc(1280.0, 720.0, false, true);
        assert_abs_diff_eq!(back.x, ndc.x, epsilon = 1e-12);
        assert_abs_diff_eq!(back.y, ndc.y, epsilon = 1e-12);
    }

    #[test]
    fn test_world_to_ndc_bounds() {
        let ndc = DVec2::new(5.0, 5.0).world_to_ndc_bounds(0.0, 5.0, 0.0, 5.0);
        assert_abs_diff_eq!(ndc.x, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ndc.y, -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ndc_to_world_round_trip() {
        let camera = OrthoCamera::new("c1".into());
        let world = DVec2::new(3.0, 6.5);

        let ndc = world.world_to_ndc(&camera);
        let back = ndc.ndc_to_world(&camera, None).unwrap();
        assert_abs_diff_eq!(back.x, world.x, epsilon = 1e-12);
        assert_abs_diff_eq!(back.y, world.y, epsilon = 1e-12);
    }

    #[test]
    fn test_ndc_to_world_with_zoom() {
        let camera = OrthoCamera::new("c1".into());

        // NDC centre is always the camera centre
        let centre = DVec2::ZERO.ndc_to_world(&camera, Some(2.0)).unwrap();
        assert_abs_diff_eq!(centre.x, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(centre.y, 4.0, epsilon = 1e-12);

        // Zoomed in 2x, the right edge of NDC only reaches a quarter width past centre
        let right = DVec2::new(1.0, 0.0).ndc_to_world(&camera, Some(2.0)).unwrap();
        assert_abs_diff_eq!(right.x, 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_ndc_to_world_rejects_zero_zoom() {
        let camera = OrthoCamera::new("c1".into());
        assert!(DVec2::ZERO.ndc_to_world(&camera, Some(0.0)).is_none());
    }
}
