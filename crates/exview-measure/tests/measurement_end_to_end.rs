//! Pointer-driven measurement sessions against a real camera and scene

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use approx::{assert_abs_diff_eq, assert_relative_eq};
use exview_core::{MeshGeometry, NodeId, PerspectiveCamera, SceneGraph, Transform, Viewport};
use exview_measure::{
    LengthUnit, MeasurementConfig, MeasurementEngine, MeasurementPhase, MeasurementStep, SnapKind, SnapResult,
    SnapTarget,
};
use glam::{Vec2, Vec3};

/// A 3 x 1 panel on z = 0 seen head-on
fn panel_scene() -> (SceneGraph, NodeId) {
    let mut scene = SceneGraph::new();
    let root = scene.spawn("assembly");
    let panel = scene.spawn_child(root, "panel", Transform::IDENTITY).unwrap();
    scene.get_node_mut(panel).unwrap().mesh = Some(MeshGeometry::indexed(
        vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(3.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ],
        vec![0, 1, 2, 0, 2, 3],
    ));
    scene.update_transforms();
    (scene, root)
}

fn camera() -> PerspectiveCamera {
    PerspectiveCamera::looking_at(Vec3::new(1.5, 0.5, 6.0), Vec3::new(1.5, 0.5, 0.0)).with_viewport(800.0, 800.0)
}

fn engine_for(scene: &SceneGraph, root: NodeId, config: MeasurementConfig) -> MeasurementEngine {
    let mut engine = MeasurementEngine::new(config);
    engine.build_snap_structures(scene, root);
    engine.enable_measurement();
    engine
}

fn click(
    engine: &mut MeasurementEngine,
    scene: &SceneGraph,
    camera: &PerspectiveCamera,
    cursor: Vec2,
) -> Option<MeasurementStep> {
    engine.pointer_down(cursor);
    engine.pointer_up(scene, camera, cursor)
}

/// Cursors a few pixels inside the bottom corners of the panel
fn corner_cursors(camera: &PerspectiveCamera) -> (Vec2, Vec2) {
    let left = camera.project(Vec3::ZERO).unwrap() + Vec2::new(0.004, 0.008);
    let right = camera.project(Vec3::new(3.0, 0.0, 0.0)).unwrap() + Vec2::new(-0.004, 0.008);
    (left, right)
}

fn synthetic(position: Vec3, kind: SnapKind) -> SnapResult {
    SnapResult {
        position,
        kind,
        target: SnapTarget::Vertex {
            node: NodeId::new(0, 0),
            vertex: 0,
        },
        distance: 1.0,
    }
}

#[test]
fn test_two_vertex_clicks_measure_panel_width() {
    let (scene, root) = panel_scene();
    let camera = camera();
    let config = MeasurementConfig::default().with_snap_priority(&[SnapKind::Vertex]);
    let mut engine = engine_for(&scene, root, config);
    let (left, right) = corner_cursors(&camera);

    assert!(engine.records().is_empty());
    assert!(matches!(click(&mut engine, &scene, &camera, left), Some(MeasurementStep::Started(_))));
    assert_eq!(engine.phase(), MeasurementPhase::FirstPointPlaced);

    let Some(MeasurementStep::Completed(record)) = click(&mut engine, &scene, &camera, right) else {
        panic!("second click should complete the measurement");
    };
    assert_eq!(engine.records().len(), 1);
    assert_eq!(record.start, Vec3::ZERO);
    assert_eq!(record.end, Vec3::new(3.0, 0.0, 0.0));
    assert_eq!(record.label, "3.00 m");
    assert_eq!(record.unit, LengthUnit::Meters);
    assert!(!record.approximate);
}

#[test]
fn test_visual_scale_divides_world_distance() {
    let (scene, root) = panel_scene();
    let camera = camera();
    let config = MeasurementConfig::default()
        .with_snap_priority(&[SnapKind::Vertex])
        .with_visual_scale(2.0);
    let mut engine = engine_for(&scene, root, config);
    let (left, right) = corner_cursors(&camera);

    click(&mut engine, &scene, &camera, left);
    click(&mut engine, &scene, &camera, right);

    let record = &engine.records()[0];
    assert_eq!(record.world_distance, 3.0);
    assert_relative_eq!(record.physical_distance, 1.5);
    assert_eq!(record.label, "1.50 m");

    engine.set_visual_scale(1.0);
    assert_eq!(engine.records()[0].label, "3.00 m");
}

#[test]
fn test_face_clicks_are_approximate() {
    let (scene, root) = panel_scene();
    let camera = camera();
    let config = MeasurementConfig::default().with_snap_priority(&[SnapKind::Face]);
    let mut engine = engine_for(&scene, root, config);

    let a = camera.project(Vec3::new(0.5, 0.7, 0.0)).unwrap();
    let b = camera.project(Vec3::new(2.5, 0.7, 0.0)).unwrap();
    click(&mut engine, &scene, &camera, a);
    click(&mut engine, &scene, &camera, b);

    let record = &engine.records()[0];
    assert!(record.approximate);
    assert_abs_diff_eq!(record.world_distance, 2.0, epsilon = 1e-3);
    assert_eq!(record.label, "≈ 2.00 m");
}

#[test]
fn test_drag_does_not_place_a_point() {
    let (scene, root) = panel_scene();
    let camera = camera();
    let mut engine = engine_for(&scene, root, MeasurementConfig::default());
    let (left, _) = corner_cursors(&camera);

    engine.pointer_down(left);
    // 40 pixels of travel on an 800 pixel viewport
    let step = engine.pointer_up(&scene, &camera, left + Vec2::new(0.1, 0.0));
    assert!(step.is_none());
    assert_eq!(engine.phase(), MeasurementPhase::Idle);

    assert!(camera.pixel_distance(left, left + Vec2::new(0.1, 0.0)) > engine.config().drag_threshold);
}

#[test]
fn test_disabled_engine_ignores_clicks() {
    let (scene, root) = panel_scene();
    let camera = camera();
    let mut engine = engine_for(&scene, root, MeasurementConfig::default());
    engine.disable_measurement();
    let (left, _) = corner_cursors(&camera);

    assert!(click(&mut engine, &scene, &camera, left).is_none());
    assert!(engine.pending_point().is_none());
}

#[test]
fn test_preview_label_is_throttled() {
    let (scene, root) = panel_scene();
    let camera = camera();
    let config = MeasurementConfig::default().with_snap_priority(&[SnapKind::Vertex]);
    let mut engine = engine_for(&scene, root, config);
    let (left, right) = corner_cursors(&camera);

    let snaps = Rc::new(Cell::new(0));
    {
        let snaps = Rc::clone(&snaps);
        engine.on_snap_detected(move |_| snaps.set(snaps.get() + 1));
    }

    let t0 = Instant::now();
    assert!(engine.pointer_move(&scene, &camera, right, t0).is_none());
    click(&mut engine, &scene, &camera, left);

    let first = engine.pointer_move(&scene, &camera, right, t0).unwrap();
    assert!(first.label_refreshed);
    assert_eq!(first.label, "3.00 m");
    assert_eq!(first.end, Vec3::new(3.0, 0.0, 0.0));

    // Off the panel: geometry follows the cursor, label waits for the interval
    let off = Vec2::new(0.0, 0.6);
    let second = engine.pointer_move(&scene, &camera, off, t0 + Duration::from_millis(16)).unwrap();
    assert!(!second.label_refreshed);
    assert_eq!(second.label, first.label);
    assert!(second.world_distance.is_finite());
    assert_ne!(second.end, first.end);

    let third = engine.pointer_move(&scene, &camera, off, t0 + Duration::from_millis(120)).unwrap();
    assert!(third.label_refreshed);
    assert_ne!(third.label, first.label);

    assert_eq!(snaps.get(), 4);
}

#[test]
fn test_consecutive_records_share_unit_hysteresis() {
    let mut engine = MeasurementEngine::default();
    engine.enable_measurement();

    let mut measure = |span: f32| {
        engine.place_point(synthetic(Vec3::ZERO, SnapKind::Vertex));
        match engine.place_point(synthetic(Vec3::X * span, SnapKind::Vertex)) {
            Some(MeasurementStep::Completed(record)) => record.label,
            other => panic!("expected a record, got {other:?}"),
        }
    };

    assert_eq!(measure(0.999), "999 mm");
    assert_eq!(measure(1.21), "1.21 m");
    assert_eq!(measure(0.999), "0.999 m");
    assert_eq!(measure(0.79), "790 mm");
}
