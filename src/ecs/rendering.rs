/// Draw preparation for drawable entities
///
/// The simulation never produces pixels itself. It works out where each
/// drawable lands on screen and in what colour, and hands that to a
/// `Drawer` supplied by whichever backend is rendering.

use glam::{DMat3, DVec2, DVec3};
use log::warn;

use super::components::{Graphics, Rgba};
use super::model::Model;
use super::{EntityManager, EntitySlug};
use crate::core::camera::OrthoCamera;
use crate::math::{scale, translate, Vec2Ext};

/// Font size chosen from the zoom level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontTier {
    Small,
    Medium,
    Large,
}

impl FontTier {
    pub fn for_zoom(zoom: f64) -> Self {
        if zoom <= 0.8 {
            FontTier::Small
        } else if zoom <= 1.3 {
            FontTier::Medium
        } else {
            FontTier::Large
        }
    }
}

/// Drawing call surface implemented by a rendering backend
pub trait Drawer {
    fn fill(&mut self, color: Rgba);
    fn stroke(&mut self, color: Rgba);
    fn stroke_weight(&mut self, weight: f64);
    fn font(&mut self, tier: FontTier);
    /// Axis-aligned square centred on `center`, in pixels
    fn square_at(&mut self, center: DVec2, half_size: f64);
    fn line_segment(&mut self, start: DVec2, end: DVec2);
    fn text(&mut self, text: &str, position: DVec2);
}

/// Per-character advance widths, in pixels
pub trait FontMetrics {
    fn character_width(&self, tier: FontTier, c: char) -> f64;
}

/// Pixel size of the drawing surface and the zoom it is viewed at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, zoom: f64) -> Self {
        Self { width, height, zoom }
    }

    /// World to pixels through the camera's zoomed view; y grows downward
    pub fn world_to_screen(&self, camera: &OrthoCamera) -> DMat3 {
        let half = DVec2::new(self.width / 2.0, self.height / 2.0);
        translate(half) * scale(half.x, -half.y) * camera.viewing_transform(self.zoom)
    }

    /// Homogeneous world point to pixels
    pub fn to_screen(&self, camera: &OrthoCamera, point: DVec3) -> DVec2 {
        (self.world_to_screen(camera) * point).truncate()
    }

    /// Pixel half size of a square with world radius `radius`
    pub fn half_size(&self, camera: &OrthoCamera, radius: f64) -> f64 {
        radius * (self.width * self.zoom / (camera.width() / 2.0))
    }
}

/// Issue the draw calls for one graphics component.
pub fn draw_graphics(
    drawer: &mut dyn Drawer,
    metrics: &dyn FontMetrics,
    graphics: &Graphics,
    camera: &OrthoCamera,
    viewport: &Viewport,
) {
    drawer.fill(graphics.color_fill);
    drawer.stroke(graphics.color_stroke);

    match graphics.model {
        Model::Point => {}
        Model::Square => {
            if let Some(location) = anchor(graphics, camera, viewport) {
                drawer.square_at(location, viewport.half_size(camera, graphics.radius));
                if !graphics.label.is_empty() {
                    draw_label(drawer, metrics, &graphics.label, location, viewport);
                }
            }
        }
        Model::Label => {
            if let Some(location) = anchor(graphics, camera, viewport) {
                draw_label(drawer, metrics, &graphics.label, location, viewport);
            }
        }
        Model::Line => {
            drawer.stroke_weight(graphics.stroke_weight);
            let start = viewport.to_screen(camera, graphics.start.point());
            let end = viewport.to_screen(camera, graphics.end.point());
            drawer.line_segment(start, end);
        }
    }
}

/// Screen position of the model's first vertex
fn anchor(graphics: &Graphics, camera: &OrthoCamera, viewport: &Viewport) -> Option<DVec2> {
    graphics
        .render_model_with(viewport.world_to_screen(camera))
        .first()
        .map(|vertex| vertex.truncate())
}

fn draw_label(drawer: &mut dyn Drawer, metrics: &dyn FontMetrics, label: &str, location: DVec2, viewport: &Viewport) {
    let tier = FontTier::for_zoom(viewport.zoom);
    drawer.font(tier);

    let label_width: f64 = label.chars().map(|c| metrics.character_width(tier, c)).sum();
    drawer.text(label, DVec2::new(location.x - label_width / 3.0, location.y));
}

/// Cache the first camera's world-to-screen transform on every drawable, so
/// `Graphics::render_model` yields pixels.
///
/// Returns false, leaving everything untouched, when there is no camera.
pub fn update_screen_transforms(entities: &mut EntityManager, viewport: &Viewport) -> bool {
    let Some(transform) = entities
        .camera()
        .and_then(|e| e.camera())
        .map(|camera| viewport.world_to_screen(camera))
    else {
        warn!("No camera to place the scene on screen");
        return false;
    };

    let slugs: Vec<EntitySlug> = entities.scene().map(|e| e.slug().clone()).collect();
    for slug in &slugs {
        if let Some(graphics) = entities.find_mut(slug).and_then(|e| e.graphics_mut()) {
            graphics.world_to_screen = transform;
        }
    }
    true
}

/// Draw every active drawable through the first camera.
///
/// Returns how many entities were drawn.
pub fn draw_scene(
    drawer: &mut dyn Drawer,
    metrics: &dyn FontMetrics,
    entities: &EntityManager,
    viewport: &Viewport,
) -> usize {
    let Some(camera) = entities.camera().and_then(|e| e.camera()) else {
        warn!("No camera to draw the scene through");
        return 0;
    };

    let mut drawn = 0;
    for graphics in entities
        .scene()
        .filter(|e| e.is_active())
        .filter_map(|e| e.graphics())
    {
        draw_graphics(drawer, metrics, graphics, camera, viewport);
        drawn += 1;
    }
    drawn
}
