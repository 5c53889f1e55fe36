/// Tests to verify screen-to-world coordinate transformations
/// This ensures click picking matches where things are drawn

use glam::DVec2;
use tribal_graph::core::OrthoCamera;
use tribal_graph::ecs::rendering::Viewport;
use tribal_graph::math::Vec2Ext;

/// Pixel back to world, the way a backend turns a mouse position into a click
fn screen_to_world(screen: DVec2, camera: &OrthoCamera, viewport: &Viewport) -> DVec2 {
    screen
        .screen_to_ndc(viewport.width, viewport.height, false, true)
        .ndc_to_world(camera, Some(viewport.zoom))
        .unwrap()
}

#[test]
fn test_picking_matches_drawn_position() {
    let camera = OrthoCamera::with_bounds("c".into(), 0.0, 8.0, 0.0, 8.0);

    for zoom in [0.5, 1.0, 2.0] {
        let viewport = Viewport::new(1280.0, 720.0, zoom);
        for world in [DVec2::new(4.0, 4.0), DVec2::new(1.25, 6.5), DVec2::new(7.9, 0.1)] {
            let screen = viewport.to_screen(&camera, world.point());
            let picked = screen_to_world(screen, &camera, &viewport);

            println!("zoom {}: {:?} -> {:?} -> {:?}", zoom, world, screen, picked);
            assert!((picked - world).length() < 1e-9, "picked {:?}, drew {:?}", picked, world);
        }
    }
}

#[test]
fn test_screen_corners() {
    let camera = OrthoCamera::with_bounds("c".into(), 0.0, 8.0, 0.0, 8.0);
    let viewport = Viewport::new(800.0, 600.0, 1.0);

    // World top-left is the top-left pixel, y grows downwards on both
    let top_left = screen_to_world(DVec2::ZERO, &camera, &viewport);
    let bottom_right = screen_to_world(DVec2::new(800.0, 600.0), &camera, &viewport);

    assert!(top_left.length() < 1e-9, "top left was {:?}", top_left);
    assert!((bottom_right - DVec2::new(8.0, 8.0)).length() < 1e-9, "bottom right was {:?}", bottom_right);
}

#[test]
fn test_zoom_keeps_centre_pixel() {
    let camera = OrthoCamera::with_bounds("c".into(), 2.0, 6.0, 1.0, 5.0);

    for zoom in [0.25, 1.0, 3.0] {
        let viewport = Viewport::new(640.0, 480.0, zoom);
        let picked = screen_to_world(DVec2::new(320.0, 240.0), &camera, &viewport);
        assert!((picked - camera.center()).length() < 1e-9, "zoom {} picked {:?}", zoom, picked);
    }
}

#[test]
fn test_panned_camera_picks_shifted_world() {
    let mut camera = OrthoCamera::with_bounds("c".into(), 0.0, 8.0, 0.0, 8.0);
    let viewport = Viewport::new(800.0, 800.0, 1.0);
    let before = screen_to_world(DVec2::new(100.0, 100.0), &camera, &viewport);

    camera.translate(DVec2::new(1.0, -2.0));
    let after = screen_to_world(DVec2::new(100.0, 100.0), &camera, &viewport);

    assert!((after - before - DVec2::new(1.0, -2.0)).length() < 1e-9);
}
