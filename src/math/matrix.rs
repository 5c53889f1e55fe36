//! Matrix builders and corrections for 3x3 transforms.

use std::f64::consts::FRAC_PI_2;

use glam::{DMat3, DVec2, DVec3};

/// Default tolerance for `Mat3Ext::is_orthogonal`.
pub const ORTHOGONAL_TOLERANCE: f64 = 1e-9;

/// Sine of pitch beyond which heading and bank can no longer be told apart.
const GIMBAL_LOCK_THRESHOLD: f64 = 0.9999;

/// Orthographic projection of a world rectangle onto NDC.
///
/// left, right, top and bottom are in world coordinates. World space has its
/// origin at the top left, so `(left, top)` lands on `(-1, 1)` and
/// `(right, bottom)` lands on `(1, -1)`.
pub fn orthographic(left: f64, right: f64, top: f64, bottom: f64) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(2.0 / (right - left), 0.0, 0.0),
        DVec3::new(0.0, 2.0 / (top - bottom), 0.0),
        DVec3::new(
            -((right + left) / (right - left)),
            -((top + bottom) / (top - bottom)),
            1.0,
        ),
    )
}

/// Translation by `offset`.
pub fn translate(offset: DVec2) -> DMat3 {
    DMat3::from_cols(DVec3::X, DVec3::Y, offset.extend(1.0))
}

/// Non-uniform scale about the origin.
pub fn scale(x: f64, y: f64) -> DMat3 {
    DMat3::from_cols(
        DVec3::new(x, 0.0, 0.0),
        DVec3::new(0.0, y, 0.0),
        DVec3::Z,
    )
}

/// Apply `transformation` with `fixed_point` as its origin.
pub fn transform_about(fixed_point: DVec2, transformation: DMat3) -> DMat3 {
    translate(fixed_point) * transformation * translate(-fixed_point)
}

/// Heading, pitch and bank in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EulerAngles {
    pub heading: f64,
    pub pitch: f64,
    pub bank: f64,
}

/// Orthogonality checks and re-orthogonalization for rotation-like matrices.
///
/// Repeatedly composing rotations drifts away from orthogonality. Nothing in
/// the engine corrects that automatically; callers pick one of the
/// corrections below when they need it.
pub trait Mat3Ext {
    fn columns(&self) -> [DVec3; 3];

    /// Every column of `self - other` is no longer than `atol`.
    fn approx_eq(&self, other: &DMat3, atol: f64) -> bool;

    /// `M * Mᵗ` is the identity within `tolerance`.
    fn is_orthogonal(&self, tolerance: f64) -> bool;

    /// Gram-Schmidt: keep the direction of the first column, make the second
    /// perpendicular to it and rebuild the third from their cross product.
    fn orthogonalize(&self) -> DMat3;

    /// Iterative correction that treats all three axes alike.
    ///
    /// `k` damps each step; values around 0.25 converge without overshoot.
    /// Only a fixed number of steps run, so the result is close to
    /// orthogonal (within about 0.1) but not exactly so. Follow with
    /// `orthogonalize` when an exact basis is needed.
    fn orthogonalize_nonbiased(&self, k: f64) -> DMat3;

    /// First order Taylor expansion of `1 / |c|` applied to each column.
    fn taylor_series_normalization(&self) -> DMat3;

    /// Spread the x/y error evenly, rebuild z and renormalize.
    ///
    /// See <https://varunagrawal.github.io/2020/02/11/fast-orthogonalization/>
    fn renormalization(&self) -> DMat3;

    /// <https://gamemath.com/book/orient.html#converting_between_forms>
    fn euler_angles(&self) -> EulerAngles;
}

impl Mat3Ext for DMat3 {
    fn columns(&self) -> [DVec3; 3] {
        [self.x_axis, self.y_axis, self.z_axis]
    }

    fn approx_eq(&self, other: &DMat3, atol: f64) -> bool {
        (*self - *other)
            .columns()
            .iter()
            .all(|column| column.length() <= atol)
    }

    fn is_orthogonal(&self, tolerance: f64) -> bool {
        (*self * self.transpose()).approx_eq(&DMat3::IDENTITY, tolerance)
    }

    fn orthogonalize(&self) -> DMat3 {
        let [c0, c1, _] = self.columns();
        let c0p = c0.normalize();
        let c1p = (c1 - (c1.dot(c0p) / c0p.dot(c0p)) * c0p).normalize();
        let c2p = c0p.cross(c1p).normalize();
        DMat3::from_cols(c0p, c1p, c2p)
    }

    fn orthogonalize_nonbiased(&self, k: f64) -> DMat3 {
        let mut ortho = self.columns();
        for _ in 0..10 {
            let previous = ortho;
            for (i, column) in ortho.iter_mut().enumerate() {
                let mut corrected = previous[i];
                for (j, other) in previous.iter().enumerate() {
                    if i != j {
                        corrected -= k * (previous[i].dot(*other) / other.dot(*other)) * *other;
                    }
                }
                *column = corrected.normalize();
            }
        }
        DMat3::from_cols(ortho[0], ortho[1], ortho[2])
    }

    fn taylor_series_normalization(&self) -> DMat3 {
        let [x, y, z] = self.columns().map(taylor_normalize);
        DMat3::from_cols(x, y, z)
    }

    fn renormalization(&self) -> DMat3 {
        let [x, y, _] = self.columns();
        let error = x.dot(y);
        let x_orth = x - (0.5 * error) * y;
        let y_orth = y - (0.5 * error) * x;
        let z_orth = x_orth.cross(y_orth);

        DMat3::from_cols(
            taylor_normalize(x_orth).normalize(),
            taylor_normalize(y_orth).normalize(),
            taylor_normalize(z_orth).normalize(),
        )
    }

    fn euler_angles(&self) -> EulerAngles {
        // m32 can stray slightly outside [-1, 1] from rounding; clamp before asin.
        let sp = -self.z_axis.y;
        let pitch = if sp <= -1.0 {
            -FRAC_PI_2
        } else if sp >= 1.0 {
            FRAC_PI_2
        } else {
            sp.asin()
        };

        if sp.abs() > GIMBAL_LOCK_THRESHOLD {
            // Looking straight up or down: slam bank to zero, heading takes it all.
            EulerAngles {
                heading: (-self.x_axis.z).atan2(self.x_axis.x),
                pitch,
                bank: 0.0,
            }
        } else {
            EulerAngles {
                heading: self.z_axis.x.atan2(self.z_axis.z),
                pitch,
                bank: self.x_axis.y.atan2(self.y_axis.y),
            }
        }
    }
}

fn taylor_normalize(column: DVec3) -> DVec3 {
    0.5 * (3.0 - column.dot(column)) * column
}
