//! 2D affine and rotation math on top of glam's double precision types.
//!
//! Points are homogeneous `(x, y, 1)` vectors and every transform is a
//! column-major `DMat3`.

pub mod matrix;
pub mod orientation;
pub mod vector;

pub use matrix::{orthographic, scale, transform_about, translate, EulerAngles, Mat3Ext};
pub use orientation::Orientation;
pub use vector::Vec2Ext;
