use glam::DVec3;

/// Drawable shape of a `Graphics` component.
///
/// Vertices are homogeneous local-space points. Lines carry none of their own;
/// they are drawn from the graphics' start and end points instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Model {
    #[default]
    Point,
    Square,
    Label,
    Line,
}

const ORIGIN: [DVec3; 1] = [DVec3::new(0.0, 0.0, 1.0)];

impl Model {
    pub fn vertices(&self) -> &'static [DVec3] {
        match self {
            Model::Point | Model::Square | Model::Label => &ORIGIN,
            Model::Line => &[],
        }
    }
}
