//! Tests for the rotation drag lifecycle
//!
//! These tests validate:
//! - handle markers travel within their angle bounds and snap back on release
//! - the host-visible accumulated rotation survives drag end
//! - the driven object turns by the incremental drag quaternion
//! - anchor modes, parented and unparented targets

use freeform_controls::prelude::*;
use freeform_controls::rotation_between;
use freeform_scene::prelude::*;
use glam::{Quat, Vec3};

struct Fixture {
    scene: SceneGraph,
    object: NodeId,
    camera: NodeId,
}

fn fixture() -> Fixture {
    let mut scene = SceneGraph::new();
    let root = scene.root();
    let object = scene
        .spawn_child(
            root,
            Node::mesh(
                "cube",
                Mesh::new(Geometry::cuboid(1.0, 1.0, 1.0), Material::new(Color::GRAY)),
            ),
        )
        .unwrap();
    let camera = scene
        .spawn_child(
            root,
            Node::camera("camera").with_position(Vec3::new(0.0, 2.0, 8.0)),
        )
        .unwrap();
    Fixture { scene, object, camera }
}

fn quat_eq(a: Quat, b: Quat) -> bool {
    a.dot(b).abs() > 0.9999
}

#[test]
fn test_drag_sequence_on_x_handle() {
    let Fixture { mut scene, object, camera } = fixture();
    let mut controls = Controls::new(&mut scene, object, camera, ControlsOptions::default()).unwrap();
    controls.update_matrix_world(&mut scene).unwrap();

    let x = controls.handle_by_name("xr_handle").unwrap().node();
    let (lo, hi) = controls.rotation_x().unwrap().angle_bounds();
    let rest = controls.rotation_x().unwrap().mid_angle();

    controls
        .process_drag_start(DragStart { point: Vec3::new(0.0, 1.0, 0.0), handle: x })
        .unwrap();
    assert_eq!(controls.drag_state(), DragState::DraggingRotation);

    let points = [
        Vec3::new(0.0, 1.0, 0.2),
        Vec3::new(0.0, 1.0, 0.5),
        Vec3::new(0.0, 0.8, 0.9),
    ];
    let mut previous = rest;
    for (point, ratio) in points.into_iter().zip([10.0, 20.0, 30.0]) {
        controls
            .process_drag(&mut scene, Drag::new(point, x).with_ratio(ratio))
            .unwrap();
        controls.update_matrix_world(&mut scene).unwrap();

        let angle = controls.rotation_x().unwrap().current_angle();
        assert!(angle > previous);
        assert!(angle >= lo - 1e-6 && angle <= hi + 1e-6);
        previous = angle;
    }

    controls.process_drag_end(&mut scene, DragEnd { handle: x }).unwrap();
    assert_eq!(controls.drag_state(), DragState::Idle);
    assert!((controls.rotation_x().unwrap().current_angle() - rest).abs() < 1e-6);

    assert!(controls.is_object_rotation_updated());
    let accumulated = controls.get_object_rotation();
    assert!((accumulated.x - 0.6).abs() < 1e-5);
    assert_eq!(accumulated.y, 0.0);
    assert_eq!(accumulated.z, 0.0);
}

#[test]
fn test_object_follows_drag_quaternion() {
    let Fixture { mut scene, object, camera } = fixture();
    let mut controls = Controls::new(&mut scene, object, camera, ControlsOptions::default()).unwrap();
    controls.update_matrix_world(&mut scene).unwrap();
    let z = controls.rotation_z().unwrap().node();

    controls
        .process_drag_start(DragStart { point: Vec3::X, handle: z })
        .unwrap();
    controls
        .process_drag(&mut scene, Drag::new(Vec3::Y, z))
        .unwrap();
    controls.update_matrix_world(&mut scene).unwrap();

    let rotation = scene.world_rotation(object).unwrap();
    assert!((rotation * Vec3::X - Vec3::Y).length() < 1e-5);
    assert!(quat_eq(rotation, Quat::from_rotation_z(core::f32::consts::FRAC_PI_2)));
    assert!(scene.world_position(object).unwrap().length() < 1e-5);
}

#[test]
fn test_orientation_kept_after_release() {
    let Fixture { mut scene, object, camera } = fixture();
    let mut controls = Controls::new(&mut scene, object, camera, ControlsOptions::default()).unwrap();
    controls.update_matrix_world(&mut scene).unwrap();
    let y = controls.rotation_y().unwrap().node();

    controls
        .process_drag_start(DragStart { point: Vec3::X, handle: y })
        .unwrap();
    controls
        .process_drag(&mut scene, Drag::new(Vec3::new(1.0, 0.0, -1.0), y).with_ratio(3.0))
        .unwrap();
    controls.update_matrix_world(&mut scene).unwrap();
    let during = scene.world_rotation(object).unwrap();

    controls.process_drag_end(&mut scene, DragEnd { handle: y }).unwrap();
    for _ in 0..3 {
        controls.update_matrix_world(&mut scene).unwrap();
    }
    assert!(quat_eq(scene.world_rotation(object).unwrap(), during));
}

#[test]
fn test_zero_ratio_drag_changes_nothing() {
    let Fixture { mut scene, object, camera } = fixture();
    let mut controls = Controls::new(&mut scene, object, camera, ControlsOptions::default()).unwrap();
    controls.update_matrix_world(&mut scene).unwrap();
    let x = controls.rotation_x().unwrap().node();

    controls
        .process_drag_start(DragStart { point: Vec3::Y, handle: x })
        .unwrap();
    controls
        .process_drag(&mut scene, Drag::new(Vec3::Z, x).with_ratio(0.0))
        .unwrap();
    controls.update_matrix_world(&mut scene).unwrap();

    assert!(!controls.is_object_rotation_updated());
    assert!(quat_eq(scene.world_rotation(object).unwrap(), Quat::IDENTITY));
    let handle = controls.rotation_x().unwrap();
    assert_eq!(handle.current_angle(), handle.mid_angle());
}

#[test]
fn test_parented_object_keeps_world_position() {
    let Fixture { mut scene, camera, .. } = fixture();
    let root = scene.root();
    let parent = scene
        .spawn_child(
            root,
            Node::group("turntable")
                .with_position(Vec3::new(3.0, 0.0, -2.0))
                .with_rotation(Quat::from_rotation_y(0.7)),
        )
        .unwrap();
    let object = scene
        .spawn_child(
            parent,
            Node::mesh(
                "part",
                Mesh::new(Geometry::sphere(0.5, 8, 8), Material::default()),
            )
            .with_position(Vec3::new(0.0, 1.0, 1.0))
            .with_rotation(Quat::from_rotation_x(0.3)),
        )
        .unwrap();

    let mut controls = Controls::new(&mut scene, object, camera, ControlsOptions::default()).unwrap();
    controls.update_matrix_world(&mut scene).unwrap();
    let start_position = scene.world_position(object).unwrap();
    let start_rotation = scene.world_rotation(object).unwrap();
    assert!((scene.world_position(controls.node()).unwrap() - start_position).length() < 1e-5);

    let z = controls.rotation_z().unwrap().node();
    let from = start_position + Vec3::X;
    let to = start_position + Vec3::new(1.0, 1.0, 0.0);
    controls
        .process_drag_start(DragStart { point: from, handle: z })
        .unwrap();
    controls
        .process_drag(&mut scene, Drag::new(to, z).with_ratio(2.0))
        .unwrap();
    controls.update_matrix_world(&mut scene).unwrap();

    let delta = rotation_between(Vec3::X, Vec3::new(1.0, 1.0, 0.0));
    assert_eq!(scene.parent(object).unwrap(), Some(parent));
    assert!((scene.world_position(object).unwrap() - start_position).length() < 1e-4);
    assert!(quat_eq(scene.world_rotation(object).unwrap(), delta * start_rotation));
}

#[test]
fn test_inherit_mode_follows_object() {
    let Fixture { mut scene, object, camera } = fixture();
    let orientation = Quat::from_rotation_y(0.25);
    let options = ControlsOptions::default()
        .with_mode(AnchorMode::Inherit)
        .with_orientation(orientation);
    let mut controls = Controls::new(&mut scene, object, camera, options).unwrap();
    controls.update_matrix_world(&mut scene).unwrap();

    let x = controls.rotation_x().unwrap().node();
    controls
        .process_drag_start(DragStart { point: Vec3::Y, handle: x })
        .unwrap();
    controls
        .process_drag(&mut scene, Drag::new(Vec3::new(0.0, 1.0, 1.0), x).with_ratio(5.0))
        .unwrap();
    controls.update_matrix_world(&mut scene).unwrap();

    let object_rotation = scene.world_rotation(object).unwrap();
    let controls_rotation = scene.world_rotation(controls.node()).unwrap();
    assert!(!quat_eq(object_rotation, Quat::IDENTITY));
    assert!(quat_eq(controls_rotation, object_rotation * orientation));
}

#[test]
fn test_fixed_mode_keeps_controls_orientation() {
    let Fixture { mut scene, object, camera } = fixture();
    let mut controls = Controls::new(&mut scene, object, camera, ControlsOptions::default()).unwrap();
    controls.update_matrix_world(&mut scene).unwrap();

    let y = controls.rotation_y().unwrap().node();
    controls
        .process_drag_start(DragStart { point: Vec3::X, handle: y })
        .unwrap();
    controls
        .process_drag(&mut scene, Drag::new(Vec3::new(0.0, 0.0, -1.0), y).with_ratio(5.0))
        .unwrap();
    controls.update_matrix_world(&mut scene).unwrap();

    assert!(quat_eq(scene.world_rotation(controls.node()).unwrap(), Quat::IDENTITY));
}

#[test]
fn test_drag_sequence_on_unparented_target() {
    let mut scene = SceneGraph::new();
    let object = scene.spawn(Node::mesh(
        "loose",
        Mesh::new(Geometry::sphere(1.0, 8, 8), Material::default()),
    ));
    let camera = scene.spawn(Node::camera("camera").with_position(Vec3::new(0.0, 0.0, 8.0)));
    assert_eq!(scene.parent(object).unwrap(), None);

    let mut controls = Controls::new(&mut scene, object, camera, ControlsOptions::default()).unwrap();
    controls.update_matrix_world(&mut scene).unwrap();

    let x = controls.rotation_x().unwrap().node();
    let (lo, hi) = controls.rotation_x().unwrap().angle_bounds();
    let rest = controls.rotation_x().unwrap().mid_angle();

    controls
        .process_drag_start(DragStart { point: Vec3::Y, handle: x })
        .unwrap();
    let points = [
        Vec3::new(0.0, 1.0, 0.3),
        Vec3::new(0.0, 0.9, 0.6),
        Vec3::new(0.0, 0.6, 1.0),
    ];
    for (point, ratio) in points.into_iter().zip([10.0, 20.0, 30.0]) {
        controls
            .process_drag(&mut scene, Drag::new(point, x).with_ratio(ratio))
            .unwrap();
        controls.update_matrix_world(&mut scene).unwrap();

        let angle = controls.rotation_x().unwrap().current_angle();
        assert!(angle >= lo - 1e-6 && angle <= hi + 1e-6);
        assert!(scene.world_position(object).unwrap().length() < 1e-5);
    }
    assert!(!quat_eq(scene.world_rotation(object).unwrap(), Quat::IDENTITY));

    controls.process_drag_end(&mut scene, DragEnd { handle: x }).unwrap();
    controls.update_matrix_world(&mut scene).unwrap();
    assert_eq!(controls.rotation_x().unwrap().current_angle(), rest);
    assert_eq!(scene.parent(object).unwrap(), None);

    let accumulated = controls.get_object_rotation();
    assert!(accumulated.x != 0.0);
    assert!((accumulated.x - 0.6).abs() < 1e-5);
}
