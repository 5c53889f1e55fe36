use anyhow::Result;
use glam::DVec2;
use log::info;

use tribal_graph::ecs::behaviors::{Dispatch, DispatchKind, TapButtonCfg, ToggleButton, ToggleConfig};
use tribal_graph::ecs::components::{palette, ShapeColor};
use tribal_graph::ecs::init::vertex_slug;
use tribal_graph::ecs::rendering::{update_screen_transforms, Viewport};
use tribal_graph::world::{LEVEL_NAME, PLAYER_SLUG};
use tribal_graph::{Graph, GraphError, Input, Node, SimConfig, World};

const DEFAULT_CONFIG_PATH: &str = "config/sim.json";
const DEMO_TICKS: u32 = 120;
const TIME_STEP: f64 = 1.0 / 60.0;
const BUTTON_SLUG: &str = "demo-toggle";
const BUTTON_POSITION: DVec2 = DVec2::new(6.0, 6.0);
const DISPATCH_SLUG: &str = "demo-dispatch";
const DISPATCH_POSITION: DVec2 = DVec2::new(2.0, 6.5);
const SCREEN_SIZE: (f64, f64) = (1280.0, 720.0);

/// Four rooms joined in a loop with one shortcut
fn demo_graph() -> Result<Graph<Node<String>>, GraphError> {
    let mut graph = Graph::new();
    let hall = graph.create_vertex(Node::new("hall".to_string(), DVec2::new(2.0, 2.0)));
    let kitchen = graph.create_vertex(Node::new("kitchen".to_string(), DVec2::new(6.0, 2.0)));
    let cellar = graph.create_vertex(Node::new("cellar".to_string(), DVec2::new(6.0, 5.0)));
    let attic = graph.create_vertex(Node::new("attic".to_string(), DVec2::new(2.0, 5.0)));

    graph.add_directed_edge(&hall, &kitchen, Some(4.0))?;
    graph.add_directed_edge(&kitchen, &cellar, Some(3.0))?;
    graph.add_directed_edge(&cellar, &attic, Some(4.0))?;
    graph.add_directed_edge(&attic, &hall, Some(3.0))?;
    graph.add_undirected_edge(&hall, &cellar, None)?;
    Ok(graph)
}

/// Synthetic input: a malformed first frame, a short pan, a walk and three clicks
fn demo_input(world: &World, tick: u32, zoom: f64) -> Input {
    if tick == 0 {
        return Input::with_time_step(f64::NAN);
    }

    let mut input = Input::with_time_step(TIME_STEP);
    input.zoom = zoom;
    if (10..20).contains(&tick) {
        input.drag_displacement = DVec2::new(0.05, 0.0);
    }
    if (20..80).contains(&tick) {
        input.player_velocity = DVec2::new(0.0, 0.02);
    }
    let target = match tick {
        40 | 90 => Some(BUTTON_POSITION),
        60 => Some(DISPATCH_POSITION),
        _ => None,
    };
    if let (Some(target), Some(camera)) = (target, world.camera()) {
        input = input.click(camera.viewing_transform(zoom).transform_point2(target));
    }
    input
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("=== Tribal Graph Starting ===");
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = SimConfig::load_or_default(&config_path);

    let mut world = World::with_config(demo_graph()?, &config);
    world.entity_manager_mut().create_toggle_button(
        BUTTON_SLUG.into(),
        BUTTON_POSITION,
        0.3,
        ToggleConfig::new(ShapeColor::fill(palette::MAGENTA)),
        ToggleConfig::new(ShapeColor::fill(palette::BLUE_VIOLET)),
    )?;
    world.entity_manager_mut().create_dispatch_button(
        DISPATCH_SLUG.into(),
        DISPATCH_POSITION,
        0.3,
        TapButtonCfg::default(),
        vertex_slug(LEVEL_NAME, 0),
        vertex_slug(LEVEL_NAME, 2),
        DispatchKind::Request,
    )?;

    for tick in 0..DEMO_TICKS {
        let input = demo_input(&world, tick, config.zoom);
        world.update(input);
    }

    let toggled = world
        .entity_manager()
        .find(&BUTTON_SLUG.into())
        .and_then(|e| e.component::<ToggleButton>())
        .map(ToggleButton::is_toggled)
        .unwrap_or(false);
    let dispatched = world
        .entity_manager()
        .find(&DISPATCH_SLUG.into())
        .and_then(|e| e.component::<Dispatch>())
        .map(Dispatch::sent)
        .unwrap_or(0);

    let viewport = Viewport::new(SCREEN_SIZE.0, SCREEN_SIZE.1, config.zoom);
    update_screen_transforms(world.entity_manager_mut(), &viewport);
    let player = world
        .entity_manager()
        .find(&PLAYER_SLUG.into())
        .and_then(|e| e.graphics());
    let player_world = player.map(|g| g.world_position());
    let player_screen = player.and_then(|g| g.render_model().first().map(|v| v.truncate()));

    info!("Ran {} ticks over {} entities", world.tick(), world.entity_manager().len());
    info!("Camera bounds: {:?}", world.camera().map(|c| c.bounds()));
    info!("Player at {:?} (screen {:?})", player_world, player_screen);
    info!("Last clicked: {:?}, button toggled: {}", world.last_clicked(), toggled);
    info!("Dispatches sent: {}", dispatched);
    info!("Simulation shutdown complete.");
    Ok(())
}
