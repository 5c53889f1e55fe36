//! Orientation container for model space rotations.

use glam::DMat3;

use super::matrix::Mat3Ext;

/// The matrices that describe the orientation of an object.
///
/// The stored matrix is always a rotation, so its inverse is its transpose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    object_to_upright: DMat3,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            object_to_upright: DMat3::IDENTITY,
        }
    }
}

impl Orientation {
    pub fn new(object_to_upright: DMat3) -> Self {
        Self { object_to_upright }
    }

    pub fn object_to_upright(&self) -> DMat3 {
        self.object_to_upright
    }

    pub fn upright_to_object(&self) -> DMat3 {
        self.object_to_upright.transpose()
    }

    /// Turn by `angle` radians in the drawing plane.
    pub fn rotate_z(&mut self, angle: f64) {
        self.object_to_upright = DMat3::from_rotation_z(angle) * self.object_to_upright;
    }

    /// Pull the rotation back onto an orthogonal matrix after accumulated drift.
    pub fn renormalize(&mut self) {
        self.object_to_upright = self.object_to_upright.renormalization();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::matrix::ORTHOGONAL_TOLERANCE;
    use approx::assert_abs_diff_eq;
    use glam::DVec3;

    #[test]
    fn test_defaults_to_identity() {
        let v = DVec3::new(1.0, 2.0, 3.0);
        let o = Orientation::default();
        assert_eq!(o.object_to_upright() * v, v);
        assert_eq!(o.upright_to_object() * v, v);
    }

    #[test]
    fn test_rotate_heading_90_degrees() {
        let o = Orientation::new(DMat3::from_rotation_y(90.0_f64.to_radians()));
        let ov = o.object_to_upright() * DVec3::Z;
        assert_abs_diff_eq!(ov.x, 1.0, epsilon = 1e-4);
        assert_abs_diff_eq!(ov.y, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(ov.z, 0.0, epsilon = 1e-4);

        let vo = o.upright_to_object() * ov;
        assert_abs_diff_eq!(vo.x, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(vo.y, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(vo.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_renormalize_after_many_small_turns() {
        let mut o = Orientation::default();
        for _ in 0..10_000 {
            o.rotate_z(0.001);
        }
        o.renormalize();
        assert!(o.object_to_upright().is_orthogonal(ORTHOGONAL_TOLERANCE));
    }
}
