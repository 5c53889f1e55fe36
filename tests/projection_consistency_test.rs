/// Regression tests for orthographic projection consistency
/// These tests pin the sign conventions every conversion relies on

use glam::DVec2;
use tribal_graph::core::OrthoCamera;
use tribal_graph::math::{orthographic, Mat3Ext, Vec2Ext};

fn assert_near(actual: DVec2, expected: DVec2, what: &str) {
    let diff = (actual - expected).length();
    println!("{}: {:?} (expected {:?}, diff {})", what, actual, expected, diff);
    assert!(diff < 1e-9, "{} mismatch: got {:?}, expected {:?}", what, actual, expected);
}

#[test]
fn test_world_to_ndc_corners() {
    // Top-left world origin maps to the top-left of NDC, y flips
    assert_near(DVec2::new(0.0, 0.0).world_to_ndc_bounds(0.0, 5.0, 0.0, 5.0), DVec2::new(-1.0, 1.0), "top left");
    assert_near(DVec2::new(2.5, 2.5).world_to_ndc_bounds(0.0, 5.0, 0.0, 5.0), DVec2::new(0.0, 0.0), "centre");
    assert_near(DVec2::new(5.0, 5.0).world_to_ndc_bounds(0.0, 5.0, 0.0, 5.0), DVec2::new(1.0, -1.0), "bottom right");
}

#[test]
fn test_camera_matches_free_projection() {
    // The camera must not build its own variant of the projection
    let camera = OrthoCamera::with_bounds("c".into(), -3.0, 5.0, 1.0, 7.0);
    let free = orthographic(-3.0, 5.0, 1.0, 7.0);

    for point in [DVec2::ZERO, DVec2::new(-3.0, 1.0), DVec2::new(4.2, 6.9)] {
        assert_near(point.world_to_ndc(&camera), (free * point.point()).truncate(), "camera vs free");
    }
}

#[test]
fn test_translate_shifts_projection() {
    let mut camera = OrthoCamera::new("c".into());
    camera.translate(DVec2::new(2.0, 2.0));

    assert_near(DVec2::ZERO.world_to_ndc(&camera), DVec2::new(-1.5, 1.5), "origin after pan");
}

#[test]
fn test_unit_zoom_matches_base_projection() {
    let camera = OrthoCamera::with_bounds("c".into(), 1.0, 9.0, 2.0, 6.0);
    let base = camera.world_to_ndc();
    let zoomed = camera.viewing_transform(1.0);

    assert!(base.approx_eq(&zoomed, 1e-12), "zoom 1.0 must be the identity scale");
}

#[test]
fn test_ndc_round_trip_at_every_zoom() {
    let camera = OrthoCamera::with_bounds("c".into(), 1.0, 9.0, 2.0, 6.0);
    let world = DVec2::new(3.3, 4.4);

    for zoom in [0.5, 0.8, 1.0, 1.3, 2.0, 4.0] {
        let ndc = camera.viewing_transform(zoom).transform_point2(world);
        let back = ndc.ndc_to_world(&camera, Some(zoom)).unwrap();
        assert_near(back, world, &format!("round trip at zoom {}", zoom));
    }
}
