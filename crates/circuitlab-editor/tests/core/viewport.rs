use circuitlab_core::Point;
use circuitlab_editor::{Bounds, Viewport};
use circuitlab_settings::ViewSettings;

#[test]
fn test_viewport_creation() {
    let vp = Viewport::new(1200.0, 800.0);
    assert_eq!(vp.zoom(), 1.0);
    assert_eq!(vp.pan(), (0.0, 0.0));
    assert_eq!(vp.screen_to_world(Point::new(10.0, 20.0)), Point::new(10.0, 20.0));
}

#[test]
fn test_y_grows_downward_in_both_spaces() {
    let vp = Viewport::new(1200.0, 800.0);
    let top = vp.world_to_screen(Point::new(0.0, 0.0));
    let lower = vp.world_to_screen(Point::new(0.0, 100.0));
    assert!(lower.y > top.y);
}

#[test]
fn test_screen_to_world_with_zoom_and_pan() {
    let mut vp = Viewport::new(1200.0, 600.0);
    vp.set_zoom(2.0);
    vp.set_pan(100.0, 50.0);
    let world = vp.screen_to_world(Point::new(300.0, 250.0));
    assert!((world.x - 100.0).abs() < 0.01);
    assert!((world.y - 100.0).abs() < 0.01);
}

#[test]
fn test_roundtrip_conversion() {
    let mut vp = Viewport::new(1200.0, 800.0);
    vp.set_zoom(1.7);
    vp.set_pan(75.0, -125.0);

    let original = Point::new(123.45, 456.78);
    let roundtrip = vp.screen_to_world(vp.world_to_screen(original));
    assert!((roundtrip.x - original.x).abs() < 1e-9);
    assert!((roundtrip.y - original.y).abs() < 1e-9);
}

#[test]
fn test_zoom_is_clamped() {
    let mut vp = Viewport::default();
    vp.set_zoom(0.05);
    assert_eq!(vp.zoom(), 0.4);
    vp.set_zoom(10.0);
    assert_eq!(vp.zoom(), 2.5);
    vp.set_zoom(f64::NAN);
    assert_eq!(vp.zoom(), 2.5);
}

#[test]
fn test_custom_zoom_limits() {
    let settings = ViewSettings {
        min_zoom: 0.5,
        max_zoom: 4.0,
        ..Default::default()
    };
    let mut vp = Viewport::from_settings(&settings);
    vp.set_zoom(3.5);
    assert_eq!(vp.zoom(), 3.5);
    assert_eq!(vp.zoom_limits(), (0.5, 4.0));
}

#[test]
fn test_zoom_at_keeps_cursor_fixed() {
    let mut vp = Viewport::default();
    vp.set_pan(40.0, 30.0);
    let cursor = Point::new(500.0, 400.0);
    let before = vp.screen_to_world(cursor);

    vp.zoom_at(cursor, 2.0);
    let after = vp.screen_to_world(cursor);
    assert_eq!(vp.zoom(), 2.0);
    assert!((before.x - after.x).abs() < 1e-9);
    assert!((before.y - after.y).abs() < 1e-9);
}

#[test]
fn test_wheel_up_zooms_in() {
    let mut vp = Viewport::default();
    vp.apply_wheel(-100.0, Point::new(0.0, 0.0), 0.001);
    assert!((vp.zoom() - 1.1).abs() < 1e-9);
    vp.apply_wheel(5000.0, Point::new(0.0, 0.0), 0.001);
    assert_eq!(vp.zoom(), 0.4);
}

#[test]
fn test_fit_to_bounds_centers_content() {
    let mut vp = Viewport::new(1000.0, 500.0);
    vp.fit_to_bounds(&Bounds::new(0.0, 0.0, 400.0, 200.0), 0.0);
    assert_eq!(vp.zoom(), 2.5);

    let center = vp.world_to_screen(Point::new(200.0, 100.0));
    assert!((center.x - 500.0).abs() < 1e-9);
    assert!((center.y - 250.0).abs() < 1e-9);
}

#[test]
fn test_reset_and_display() {
    let mut vp = Viewport::default();
    vp.set_zoom(2.0);
    vp.pan_by(10.0, 5.0);
    assert_eq!(vp.to_string(), "Zoom: 2.00x | Pan: (10.0, 5.0)");
    vp.reset();
    assert_eq!(vp.zoom(), 1.0);
    assert_eq!(vp.pan(), (0.0, 0.0));
}
