pub mod camera;

pub use camera::OrthoCamera;
