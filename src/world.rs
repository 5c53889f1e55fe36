//! The per-tick orchestrator.

use std::collections::HashMap;

use glam::DVec2;
use log::{debug, trace, warn};

use crate::config::SimConfig;
use crate::core::camera::OrthoCamera;
use crate::ecs::behaviors::InputBinding;
use crate::ecs::components::{palette, Collision, Graphics, ShapeColor};
use crate::ecs::model::Model;
use crate::ecs::{Entity, EntityManager, EntitySlug};
use crate::graph::{Graph, Node};
use crate::math::Vec2Ext;

pub const SCENE_SLUG: &str = "scene";
pub const CAMERA_SLUG: &str = "camera1";
pub const PLAYER_SLUG: &str = "player1";
pub const CLICK_SLUG: &str = "click-location";
/// Name the level graph is materialized under
pub const LEVEL_NAME: &str = "map";

/// Raw input snapshot for one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Input {
    /// Seconds since the last tick; NaN skips the tick
    pub time_step: f64,
    /// Camera pan this tick
    pub drag_displacement: DVec2,
    pub player_velocity: DVec2,
    /// Pointer position in NDC, if the pointer is over the view
    pub click_position: Option<DVec2>,
    /// Whether a click happened this tick
    pub mouse_clicked: bool,
    pub zoom: f64,
}

impl Input {
    /// No time passes and nothing moves
    pub fn idle() -> Self {
        Self {
            time_step: 0.0,
            drag_displacement: DVec2::ZERO,
            player_velocity: DVec2::ZERO,
            click_position: None,
            mouse_clicked: false,
            zoom: 1.0,
        }
    }

    pub fn with_time_step(time_step: f64) -> Self {
        Self {
            time_step,
            ..Self::idle()
        }
    }

    /// Click at `position` (NDC) during this tick
    pub fn click(mut self, position: DVec2) -> Self {
        self.click_position = Some(position);
        self.mouse_clicked = true;
        self
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::idle()
    }
}

/// Velocity the world routes to one entity this tick
#[derive(Debug, Clone, PartialEq)]
pub struct InputTarget {
    pub slug: EntitySlug,
    pub velocity: DVec2,
}

impl InputTarget {
    pub fn new(slug: EntitySlug, velocity: DVec2) -> Self {
        Self { slug, velocity }
    }
}

/// Input as seen by components: the raw snapshot plus per-entity routing.
#[derive(Debug, Clone)]
pub struct GameInput {
    input: Input,
    input_targets: HashMap<EntitySlug, InputTarget>,
    clicked_entity: Option<EntitySlug>,
}

impl GameInput {
    pub fn new(input: Input) -> Self {
        Self {
            input,
            input_targets: HashMap::new(),
            clicked_entity: None,
        }
    }

    pub fn with_target(mut self, target: InputTarget) -> Self {
        self.input_targets.insert(target.slug.clone(), target);
        self
    }

    pub fn with_clicked(mut self, clicked: Option<EntitySlug>) -> Self {
        self.clicked_entity = clicked;
        self
    }

    pub fn input(&self) -> &Input {
        &self.input
    }

    pub fn time_step(&self) -> f64 {
        self.input.time_step
    }

    pub fn target(&self, slug: &EntitySlug) -> Option<&InputTarget> {
        self.input_targets.get(slug)
    }

    /// Entity resolved as clicked; only set while that entity updates alone
    pub fn clicked_entity(&self) -> Option<&EntitySlug> {
        self.clicked_entity.as_ref()
    }
}

/// Owns the level graph and every entity, and advances them one tick at a time.
pub struct World {
    entity_graph: Graph<Node<String>>,
    entity_manager: EntityManager,
    config: SimConfig,
    click_marker: Option<EntitySlug>,
    last_clicked: Option<EntitySlug>,
    level_created: bool,
    tick: u64,
}

impl World {
    pub fn new(entity_graph: Graph<Node<String>>) -> Self {
        Self::with_config(entity_graph, &SimConfig::default())
    }

    /// Seed the scene, camera and player described by `config`.
    pub fn with_config(entity_graph: Graph<Node<String>>, config: &SimConfig) -> Self {
        let mut world = Self {
            entity_graph,
            entity_manager: EntityManager::new(),
            config: config.clone(),
            click_marker: None,
            last_clicked: None,
            level_created: false,
            tick: 0,
        };
        if let Err(e) = world.seed() {
            // The table is empty, so the fixed slugs cannot clash
            warn!("Failed to seed world: {}", e);
        }
        world
    }

    fn seed(&mut self) -> Result<(), crate::error::EntityError> {
        let config = &self.config;
        let manager = &mut self.entity_manager;

        manager.create_decoration(
            SCENE_SLUG.into(),
            Graphics::new(SCENE_SLUG.into()).with_color(ShapeColor::new(palette::WHITE, palette::BLACK)),
        )?;

        let camera = OrthoCamera::from_config(CAMERA_SLUG.into(), &config.camera);
        let camera_graphics = Graphics::new(CAMERA_SLUG.into())
            .with_position(camera.center())
            .with_color(ShapeColor::fill(palette::GREEN));
        manager
            .create_camera(CAMERA_SLUG.into(), camera, camera_graphics)?
            .push_component(Box::new(InputBinding::new(CAMERA_SLUG.into())));

        manager
            .create_prop(
                PLAYER_SLUG.into(),
                config.player.position,
                config.player.radius,
                config.player.color,
                true,
            )?
            .push_component(Box::new(InputBinding::new(PLAYER_SLUG.into())));
        Ok(())
    }

    /// Advance the world by one tick.
    pub fn update(&mut self, input: Input) {
        if input.time_step.is_nan() {
            trace!("Skipping tick with NaN time step");
            return;
        }
        self.tick += 1;
        trace!("Tick {} (dt = {})", self.tick, input.time_step);
        self.entity_manager.begin_tick();

        if let Some(click_position) = input.click_position {
            self.track_click(click_position, input.zoom);
        }

        let mut game_input = GameInput::new(input)
            .with_target(InputTarget::new(CAMERA_SLUG.into(), input.drag_displacement))
            .with_target(InputTarget::new(PLAYER_SLUG.into(), input.player_velocity));

        self.create_level();

        // Only the single most-overlapped entity reacts to a click, and it
        // does so alone before the general pass.
        if input.mouse_clicked {
            let clicked = self.resolve_click();
            if let Some(slug) = &clicked {
                debug!("Tick {}: clicked {}", self.tick, slug);
                game_input.clicked_entity = Some(slug.clone());
                self.entity_manager.update_entity(slug, &game_input);
            }
            self.last_clicked = clicked;
        }
        game_input.clicked_entity = None;

        self.entity_manager.update(&game_input);
        self.entity_manager.finalize_tick();
    }

    /// Move the click marker to the unprojected click, creating it on first use.
    fn track_click(&mut self, ndc: DVec2, zoom: f64) {
        let Some(position) = self
            .camera()
            .and_then(|camera| ndc.ndc_to_world(camera, Some(zoom)))
        else {
            warn!("Ignoring click at {:?}: cannot unproject with zoom {}", ndc, zoom);
            return;
        };

        if let Some(marker) = self
            .click_marker
            .as_ref()
            .and_then(|slug| self.entity_manager.find_mut(slug))
        {
            if let Some(graphics) = marker.graphics_mut() {
                graphics.position = position;
            }
            if let Some(collision) = marker.collision_mut() {
                collision.position = position;
            }
            return;
        }

        let slug = EntitySlug::from(CLICK_SLUG);
        let radius = self.config.click.marker_radius;
        let graphics = Graphics::new(slug.clone())
            .with_position(position)
            .with_radius(radius)
            .with_model(Model::Point);
        let collision = Collision::sensor(slug.clone(), position, radius);
        match self.entity_manager.create_prop_with(slug.clone(), collision, graphics) {
            Ok(_) => self.click_marker = Some(slug),
            Err(e) => warn!("Failed to create click marker: {}", e),
        }
    }

    fn resolve_click(&self) -> Option<EntitySlug> {
        let marker = self.click_marker()?;
        self.entity_manager
            .largest_intersected_entity(marker)
            .map(|e| e.slug().clone())
    }

    fn create_level(&mut self) {
        if self.level_created {
            return;
        }

        match self.entity_manager.create_from_graph_styled(
            LEVEL_NAME,
            &self.entity_graph,
            DVec2::ZERO,
            &self.config.level,
        ) {
            Ok(_) => self.level_created = true,
            // Nothing was created, so the next tick can try again
            Err(e) => warn!("Failed to create level: {}", e),
        }
    }

    pub fn entity_manager(&self) -> &EntityManager {
        &self.entity_manager
    }

    pub fn entity_manager_mut(&mut self) -> &mut EntityManager {
        &mut self.entity_manager
    }

    /// Drawable entities in registration order
    pub fn scene(&self) -> impl Iterator<Item = &Entity> {
        self.entity_manager.scene()
    }

    /// The active camera entity
    pub fn camera_entity(&self) -> Option<&Entity> {
        self.entity_manager.camera()
    }

    pub fn camera(&self) -> Option<&OrthoCamera> {
        self.camera_entity().and_then(|e| e.camera())
    }

    pub fn level_created(&self) -> bool {
        self.level_created
    }

    pub fn click_marker(&self) -> Option<&Entity> {
        self.click_marker
            .as_ref()
            .and_then(|slug| self.entity_manager.find(slug))
    }

    /// Entity resolved by the most recent click
    pub fn last_clicked(&self) -> Option<&EntitySlug> {
        self.last_clicked.as_ref()
    }

    /// Number of ticks that ran (NaN ticks excluded)
    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_entities() {
        let world = World::new(Graph::new());

        let slugs: Vec<_> = world.scene().map(|e| e.slug().as_str()).collect();
        assert_eq!(slugs, vec![SCENE_SLUG, CAMERA_SLUG, PLAYER_SLUG]);
        assert_eq!(world.camera_entity().unwrap().slug().as_str(), CAMERA_SLUG);
        assert!(!world.level_created());
        assert!(world.click_marker().is_none());
    }

    #[test]
    fn test_nan_tick_is_skipped() {
        let mut world = World::new(Graph::new());
        world.update(Input::with_time_step(f64::NAN));

        assert_eq!(world.tick(), 0);
        assert!(!world.level_created());

        world.update(Input::idle());
        assert_eq!(world.tick(), 1);
        assert!(world.level_created());
    }

    #[test]
    fn test_input_defaults() {
        let input = Input::default();
        assert_eq!(input.zoom, 1.0);
        assert!(input.click_position.is_none());

        let clicked = Input::idle().click(DVec2::new(0.5, 0.5));
        assert!(clicked.mouse_clicked);
        assert_eq!(clicked.click_position, Some(DVec2::new(0.5, 0.5)));
    }
}
