//! Headless rotation demo
//!
//! Drives each default rotation handle through a short scripted drag and logs
//! what a host would see: marker travel, object orientation and the
//! accumulated rotation.
//!
//! Run with: cargo run -p headless_rotate -- [options.toml]
//! Set RUST_LOG=trace to follow every drag step.

use std::process::ExitCode;

use freeform_controls::prelude::*;
use freeform_scene::prelude::*;
use glam::{EulerRot, Quat, Vec3};

const STEPS: usize = 6;
const STEP_RATIO: f32 = 8.0;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> freeform_controls::Result<()> {
    let options = match std::env::args().nth(1) {
        Some(path) => ControlsOptions::load(path)?,
        None => ControlsOptions::default().with_computed_bounds(true),
    };

    let mut scene = SceneGraph::new();
    let root = scene.root();
    let object = scene.spawn_child(
        root,
        Node::mesh(
            "crate",
            Mesh::new(Geometry::cuboid(1.0, 1.0, 1.0), Material::new(Color::GRAY)),
        )
        .with_position(Vec3::new(0.0, 0.5, 0.0)),
    )?;
    let camera = scene.spawn_child(
        root,
        Node::camera("camera")
            .with_position(Vec3::new(0.0, 2.0, 6.0))
            .with_rotation(Quat::from_rotation_x(-0.3)),
    )?;

    let mut controls = Controls::new(&mut scene, object, camera, options)?;
    controls.update_matrix_world(&mut scene)?;
    log::info!(
        "Controls ready: mode={:?} separation={:.3} handles={}",
        controls.mode(),
        controls.bounding_sphere_radius(),
        controls.handles().len()
    );

    for name in [DefaultHandleName::Xr, DefaultHandleName::Yr, DefaultHandleName::Zr] {
        drag_handle(&mut scene, &mut controls, name)?;
    }

    let (x, y, z) = scene.world_rotation(object)?.to_euler(EulerRot::XYZ);
    log::info!("Final object orientation (xyz radians): ({:.3}, {:.3}, {:.3})", x, y, z);

    controls.dispose(&mut scene)?;
    log::info!("Scene left with {} node(s)", scene.node_count());
    Ok(())
}

/// Sweep the pointer a quarter turn around the handle's axis.
fn drag_handle(scene: &mut SceneGraph, controls: &mut Controls, name: DefaultHandleName) -> freeform_controls::Result<()> {
    let handle = controls
        .handle_by_name(name.as_str())
        .ok_or_else(|| ControlsError::HandleNotFound(name.to_string()))?
        .node();
    let center = scene.world_position(controls.object())?;
    let axis = name.axis().unit_vector();
    let start = axis.any_orthonormal_vector();

    controls.process_drag_start(DragStart { point: center + start, handle })?;
    for step in 1..=STEPS {
        let angle = core::f32::consts::FRAC_PI_2 * step as f32 / STEPS as f32;
        let point = center + Quat::from_axis_angle(axis, angle) * start;
        controls.process_drag(scene, Drag::new(point, handle).with_ratio(STEP_RATIO))?;
        controls.update_matrix_world(scene)?;

        if let Some(rotation) = controls.handle(handle).and_then(Handle::as_rotation) {
            log::debug!("{} step {}: marker at {:.3} rad", name, step, rotation.current_angle());
        }
    }
    controls.process_drag_end(scene, DragEnd { handle })?;
    controls.update_matrix_world(scene)?;

    if controls.is_object_rotation_updated() {
        let accumulated = controls.get_object_rotation();
        log::info!("{} released, accumulated rotation {:?}", name, accumulated);
    }
    Ok(())
}
