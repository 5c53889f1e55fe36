/// Entity factories and level materialization
///
/// Each factory builds an entity with a fixed bundle of components for its
/// role and registers it. Every factory fails with
/// `EntityError::DuplicateSlug` if the slug is taken.

use glam::DVec2;
use log::info;

use super::behaviors::{
    Dispatch, DispatchKind, EdgeLink, FollowLine, TapButton, TapButtonCfg, ToggleButton, ToggleConfig,
};
use super::components::{Collision, Graphics, ShapeColor};
use super::model::Model;
use super::{Entity, EntityManager, EntitySlug};
use crate::config::LevelStyle;
use crate::core::camera::OrthoCamera;
use crate::error::EntityError;
use crate::graph::{Graph, Node};

/// Slug of the entity materialized for vertex `index` of level `name`
pub fn vertex_slug(name: &str, index: usize) -> EntitySlug {
    format!("{}-vertex-{}", name, index).into()
}

/// Slug of the entity materialized for the `ordinal`th outgoing edge of `source`
pub fn edge_slug(name: &str, source: usize, destination: usize, ordinal: usize) -> EntitySlug {
    format!("{}-edge-{}-{}-{}", name, source, destination, ordinal).into()
}

fn prop_graphics(slug: &EntitySlug, position: DVec2, radius: f64, color: ShapeColor) -> Graphics {
    Graphics::new(slug.clone())
        .with_position(position)
        .with_radius(radius)
        .with_model(Model::Square)
        .with_color(color)
}

impl EntityManager {
    /// Decorations can be seen but not bumped into
    pub fn create_decoration(&mut self, slug: EntitySlug, graphics: Graphics) -> Result<&mut Entity, EntityError> {
        self.register(Entity::new(slug).with_component(graphics))
    }

    pub fn create_camera(
        &mut self,
        slug: EntitySlug,
        camera: OrthoCamera,
        graphics: Graphics,
    ) -> Result<&mut Entity, EntityError> {
        self.register(Entity::new(slug).with_component(camera).with_component(graphics))
    }

    /// Props can be seen and bumped into
    pub fn create_prop(
        &mut self,
        slug: EntitySlug,
        position: DVec2,
        radius: f64,
        color: ShapeColor,
        collision_response: bool,
    ) -> Result<&mut Entity, EntityError> {
        let graphics = prop_graphics(&slug, position, radius, color);
        let collision = Collision::new(slug.clone(), position, radius).with_response(collision_response);
        self.create_prop_with(slug, collision, graphics)
    }

    /// Prop from prebuilt parts
    pub fn create_prop_with(
        &mut self,
        slug: EntitySlug,
        collision: Collision,
        graphics: Graphics,
    ) -> Result<&mut Entity, EntityError> {
        self.register(Entity::new(slug).with_component(graphics).with_component(collision))
    }

    /// Decoration that drifts along `direction` at `speed` world units per second
    pub fn create_animated_decoration(
        &mut self,
        slug: EntitySlug,
        position: DVec2,
        radius: f64,
        color: ShapeColor,
        direction: DVec2,
        speed: f64,
    ) -> Result<&mut Entity, EntityError> {
        let graphics = prop_graphics(&slug, position, radius, color);
        let motion = FollowLine::new(slug.clone(), speed, direction);
        self.register(Entity::new(slug).with_component(graphics).with_component(motion))
    }

    /// Prop that drifts along `direction` at `speed` world units per second
    pub fn create_animated_prop(
        &mut self,
        slug: EntitySlug,
        position: DVec2,
        radius: f64,
        color: ShapeColor,
        direction: DVec2,
        speed: f64,
    ) -> Result<&mut Entity, EntityError> {
        let graphics = prop_graphics(&slug, position, radius, color);
        let motion = FollowLine::new(slug.clone(), speed, direction);
        let collision = Collision::new(slug.clone(), position, radius);
        self.register(
            Entity::new(slug)
                .with_component(graphics)
                .with_component(motion)
                .with_component(collision),
        )
    }

    pub fn create_toggle_button(
        &mut self,
        slug: EntitySlug,
        position: DVec2,
        radius: f64,
        toggled: ToggleConfig,
        not_toggled: ToggleConfig,
    ) -> Result<&mut Entity, EntityError> {
        let graphics = prop_graphics(&slug, position, radius, not_toggled.color);
        let collision = Collision::new(slug.clone(), position, radius);
        let button = ToggleButton::new(slug.clone(), toggled, not_toggled);
        self.register(
            Entity::new(slug)
                .with_component(graphics)
                .with_component(collision)
                .with_component(button),
        )
    }

    pub fn create_tap_button(
        &mut self,
        slug: EntitySlug,
        position: DVec2,
        radius: f64,
        cfg: TapButtonCfg,
    ) -> Result<&mut Entity, EntityError> {
        let graphics = prop_graphics(&slug, position, radius, cfg.idle);
        let collision = Collision::new(slug.clone(), position, radius);
        let button = TapButton::new(slug.clone(), cfg);
        self.register(
            Entity::new(slug)
                .with_component(graphics)
                .with_component(collision)
                .with_component(button),
        )
    }

    /// Tap button that records a `kind` dispatch from `source` to
    /// `destination` every time it is clicked
    #[allow(clippy::too_many_arguments)]
    pub fn create_dispatch_button(
        &mut self,
        slug: EntitySlug,
        position: DVec2,
        radius: f64,
        cfg: TapButtonCfg,
        source: EntitySlug,
        destination: EntitySlug,
        kind: DispatchKind,
    ) -> Result<&mut Entity, EntityError> {
        let graphics = prop_graphics(&slug, position, radius, cfg.idle);
        let collision = Collision::new(slug.clone(), position, radius);
        let button = TapButton::new(slug.clone(), cfg);
        let dispatch = Dispatch::new(slug.clone(), source, destination, kind);
        self.register(
            Entity::new(slug)
                .with_component(graphics)
                .with_component(collision)
                .with_component(button)
                .with_component(dispatch),
        )
    }

    /// Line decoration whose ends stay on `source` and `destination`
    pub fn create_edge(
        &mut self,
        slug: EntitySlug,
        source: EntitySlug,
        destination: EntitySlug,
        graphics: Graphics,
    ) -> Result<&mut Entity, EntityError> {
        let link = EdgeLink::new(slug.clone(), source, destination).with_positions(graphics.start, graphics.end);
        self.register(Entity::new(slug).with_component(graphics).with_component(link))
    }

    /// Materialize a level graph with the default look.
    pub fn create_from_graph(
        &mut self,
        name: &str,
        graph: &Graph<Node<String>>,
        origin: DVec2,
    ) -> Result<usize, EntityError> {
        self.create_from_graph_styled(name, graph, origin, &LevelStyle::default())
    }

    /// Materialize every vertex as a labelled prop at `origin + node position`
    /// and every edge as a line between the two vertex entities.
    ///
    /// Vertices are created in index order, then edges in source order. All
    /// slugs are checked first, so on error nothing has been created.
    /// Returns the number of entities created.
    pub fn create_from_graph_styled(
        &mut self,
        name: &str,
        graph: &Graph<Node<String>>,
        origin: DVec2,
        style: &LevelStyle,
    ) -> Result<usize, EntityError> {
        let vertices: Vec<_> = graph
            .vertices()
            .map(|v| (vertex_slug(name, v.index), v))
            .collect();
        let edges: Vec<_> = graph
            .vertices()
            .flat_map(|v| graph.edges(v).iter().enumerate())
            .map(|(ordinal, e)| {
                let slug = edge_slug(name, e.source.index, e.destination.index, ordinal);
                (slug, e)
            })
            .collect();

        let taken = vertices
            .iter()
            .map(|(slug, _)| slug)
            .chain(edges.iter().map(|(slug, _)| slug))
            .find(|slug| self.contains(slug));
        if let Some(slug) = taken {
            return Err(EntityError::DuplicateSlug(slug.clone()));
        }

        for (slug, vertex) in &vertices {
            let position = origin + vertex.data.position;
            let graphics = prop_graphics(slug, position, style.vertex_radius, style.vertex_color)
                .with_label(vertex.data.value.clone());
            let collision = Collision::new(slug.clone(), position, style.vertex_radius);
            self.create_prop_with(slug.clone(), collision, graphics)?;
        }

        for (slug, edge) in &edges {
            let graphics = Graphics::new(slug.clone())
                .with_model(Model::Line)
                .with_color(ShapeColor::new(style.edge_stroke, style.edge_stroke))
                .with_stroke_weight(style.edge_stroke_weight)
                .with_endpoints(
                    origin + edge.source.data.position,
                    origin + edge.destination.data.position,
                );
            self.create_edge(
                slug.clone(),
                vertex_slug(name, edge.source.index),
                vertex_slug(name, edge.destination.index),
                graphics,
            )?;
        }

        info!(
            "Materialized level '{}': {} vertices, {} edges",
            name,
            vertices.len(),
            edges.len()
        );
        Ok(vertices.len() + edges.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{GameInput, Input};

    fn triangle() -> Graph<Node<String>> {
        let mut graph = Graph::new();
        let a = graph.create_vertex(Node::new("a".to_string(), DVec2::new(1.0, 1.0)));
        let b = graph.create_vertex(Node::new("b".to_string(), DVec2::new(3.0, 1.0)));
        let c = graph.create_vertex(Node::new("c".to_string(), DVec2::new(2.0, 3.0)));
        graph.add_directed_edge(&a, &b, None).unwrap();
        graph.add_directed_edge(&b, &c, Some(2.0)).unwrap();
        graph.add_directed_edge(&c, &a, None).unwrap();
        graph.add_directed_edge(&a, &b, None).unwrap();
        graph
    }

    #[test]
    fn test_create_from_graph() {
        let mut manager = EntityManager::new();
        let created = manager
            .create_from_graph("map", &triangle(), DVec2::new(10.0, 0.0))
            .unwrap();

        assert_eq!(created, 7);
        let slugs: Vec<_> = manager.iter().map(|e| e.slug().to_string()).collect();
        assert_eq!(
            slugs,
            vec![
                "map-vertex-0",
                "map-vertex-1",
                "map-vertex-2",
                "map-edge-0-1-0",
                "map-edge-0-1-1",
                "map-edge-1-2-0",
                "map-edge-2-0-0",
            ]
        );

        let b = manager.find(&"map-vertex-1".into()).unwrap();
        assert_eq!(b.graphics().unwrap().position, DVec2::new(13.0, 1.0));
        assert_eq!(b.graphics().unwrap().label, "b");
        assert_eq!(b.collision().unwrap().position, DVec2::new(13.0, 1.0));

        let edge = manager.find(&"map-edge-2-0-0".into()).unwrap();
        let link = edge.component::<EdgeLink>().unwrap();
        assert_eq!(link.source(), &EntitySlug::from("map-vertex-2"));
        assert_eq!(link.destination(), &EntitySlug::from("map-vertex-0"));
        assert_eq!(edge.graphics().unwrap().model, Model::Line);
        assert!(edge.collision().is_none());
    }

    #[test]
    fn test_edges_follow_moved_vertices() {
        let mut manager = EntityManager::new();
        manager.create_from_graph("map", &triangle(), DVec2::ZERO).unwrap();

        manager
            .find_mut(&"map-vertex-2".into())
            .unwrap()
            .graphics_mut()
            .unwrap()
            .position = DVec2::new(5.0, 5.0);
        manager.update(&GameInput::new(Input::idle()));

        let edge = manager.find(&"map-edge-1-2-0".into()).unwrap().graphics().unwrap();
        assert_eq!(edge.start, DVec2::new(3.0, 1.0));
        assert_eq!(edge.end, DVec2::new(5.0, 5.0));
    }

    #[test]
    fn test_create_from_graph_is_atomic() {
        let mut manager = EntityManager::new();
        manager
            .create_decoration("map-edge-2-0-0".into(), Graphics::new("map-edge-2-0-0".into()))
            .unwrap();

        let result = manager.create_from_graph("map", &triangle(), DVec2::ZERO);

        assert_eq!(result, Err(EntityError::DuplicateSlug("map-edge-2-0-0".into())));
        assert_eq!(manager.len(), 1);

        // A second materialization under another name does not clash
        assert_eq!(manager.create_from_graph("other", &triangle(), DVec2::ZERO), Ok(7));
    }

    #[test]
    fn test_factory_bundles() {
        let mut manager = EntityManager::new();
        manager
            .create_toggle_button(
                "tb".into(),
                DVec2::ZERO,
                0.5,
                ToggleConfig::new(ShapeColor::default()),
                ToggleConfig::new(ShapeColor::default()),
            )
            .unwrap();
        manager
            .create_tap_button("tap".into(), DVec2::ONE, 0.5, TapButtonCfg::default())
            .unwrap();
        manager
            .create_animated_prop("drift".into(), DVec2::ZERO, 0.5, ShapeColor::default(), DVec2::Y, 2.0)
            .unwrap();

        let tb = manager.find(&"tb".into()).unwrap();
        assert!(tb.has::<ToggleButton>() && tb.collision().is_some() && tb.graphics().is_some());
        assert!(manager.find(&"tap".into()).unwrap().has::<TapButton>());

        manager
            .create_dispatch_button(
                "send".into(),
                DVec2::new(4.0, 4.0),
                0.5,
                TapButtonCfg::default(),
                "tb".into(),
                "tap".into(),
                DispatchKind::Request,
            )
            .unwrap();

        manager.update(&GameInput::new(Input::with_time_step(0.5)));
        let send = manager.find(&"send".into()).unwrap();
        let dispatch = send.component::<Dispatch>().unwrap();
        assert_eq!((dispatch.source.as_str(), dispatch.destination.as_str()), ("tb", "tap"));
        assert_eq!(dispatch.sent(), 0);

        manager.update_entity(
            &"send".into(),
            &GameInput::new(Input::idle()).with_clicked(Some("send".into())),
        );
        let dispatch = manager.find(&"send".into()).unwrap().component::<Dispatch>().unwrap();
        assert!(dispatch.is_pending());
        assert_eq!(dispatch.sent(), 1);

        let drift = manager.find(&"drift".into()).unwrap();
        assert_eq!(drift.graphics().unwrap().position, DVec2::new(0.0, 1.0));
        assert_eq!(drift.collision().unwrap().position, DVec2::new(0.0, 1.0));
    }
}
