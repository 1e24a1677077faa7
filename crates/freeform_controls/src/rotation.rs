//! Rotation handle: a partial ring with a draggable marker.
//!
//! The marker travels along a clamped arc. Its rest angle (`mid_angle`) is the
//! end of the visual sweep, and travel is allowed symmetrically on both sides
//! of it:
//!
//! ```text
//! max_angle = start + (end - start) / 2
//! mid_angle = end
//! min_angle = mid_angle - (max_angle - mid_angle)
//! ```
//!
//! `max_angle` is not necessarily numerically larger than `min_angle`, so
//! clamping always uses the ordered pair from [`RotationHandle::angle_bounds`].

use core::f32::consts::PI;

use glam::{Quat, Vec3};

use freeform_scene::{Color, Geometry, Material, Mesh, Node, NodeId, SceneGraph};

use crate::error::Result;
use crate::handle::HandleGroup;

pub const DEFAULT_RING_RADIUS: f32 = 1.0;
pub const DEFAULT_HANDLEBAR_RADIUS: f32 = 0.2;
pub const DEFAULT_RING_TUBE: f32 = 0.05;
pub const DEFAULT_RING_OPACITY: f32 = 0.5;
/// Angular extent of the ring geometry
pub const RING_ARC: f32 = PI * 0.4;
/// Radians of marker travel per unit of drag ratio
pub const DRAG_RATIO_TO_RADIANS: f32 = 0.005;

pub const DEFAULT_COLOR_RING: u32 = 0xf0ff00;
pub const DEFAULT_COLOR_HANDLEBAR: u32 = 0xf0f0f0;

/// Construction parameters for a [`RotationHandle`]
#[derive(Clone, Debug, PartialEq)]
pub struct RotationHandleDesc {
    pub name: String,
    pub color: Color,
    pub ring_radius: f32,
    /// Start of the visual sweep (radians)
    pub start_angle: f32,
    /// End of the visual sweep (radians); also the marker's rest angle
    pub end_angle: f32,
    /// Flip the sign of marker travel
    pub reverse_axis: bool,
}

impl Default for RotationHandleDesc {
    fn default() -> Self {
        Self {
            name: "rotation_handle".to_string(),
            color: Color::from_hex(DEFAULT_COLOR_RING),
            ring_radius: DEFAULT_RING_RADIUS,
            start_angle: PI / 2.0,
            end_angle: PI,
            reverse_axis: false,
        }
    }
}

impl RotationHandleDesc {
    pub fn new(name: impl Into<String>, color: Color, ring_radius: f32) -> Self {
        Self {
            name: name.into(),
            color,
            ring_radius,
            ..Self::default()
        }
    }

    /// Set the visual sweep (builder pattern)
    pub fn with_sweep(mut self, start_angle: f32, end_angle: f32) -> Self {
        self.start_angle = start_angle;
        self.end_angle = end_angle;
        self
    }

    /// Set reverse-axis travel (builder pattern)
    pub fn with_reverse_axis(mut self, reverse_axis: bool) -> Self {
        self.reverse_axis = reverse_axis;
        self
    }
}

/// Ring + marker widget for rotation about one axis.
#[derive(Clone, Debug)]
pub struct RotationHandle {
    name: String,
    node: NodeId,
    ring: NodeId,
    handlebar: NodeId,
    axis: Vec3,
    ring_radius: f32,
    pivot: Vec3,
    min_angle: f32,
    mid_angle: f32,
    max_angle: f32,
    current_angle: f32,
    reverse_axis: bool,
    camera: Option<NodeId>,
}

impl RotationHandle {
    /// Spawn the handle's nodes (an unparented group holding ring and marker)
    /// and place the marker at rest.
    pub fn new(scene: &mut SceneGraph, desc: RotationHandleDesc) -> Result<Self> {
        let ring_radius = if desc.ring_radius > 0.0 {
            desc.ring_radius
        } else {
            log::warn!(
                "Rotation handle '{}' given non-positive ring radius {}, using {}",
                desc.name,
                desc.ring_radius,
                DEFAULT_RING_RADIUS
            );
            DEFAULT_RING_RADIUS
        };

        let max_angle = desc.start_angle + (desc.end_angle - desc.start_angle) / 2.0;
        let mid_angle = desc.end_angle;
        let min_angle = mid_angle - (max_angle - mid_angle);

        let node = scene.spawn(Node::group(desc.name.clone()));

        let ring_material = Material::new(desc.color)
            .with_opacity(DEFAULT_RING_OPACITY)
            .overlay();
        let ring = scene.spawn_child(
            node,
            Node::mesh(
                format!("{}_ring", desc.name),
                Mesh::new(
                    Geometry::torus(ring_radius, DEFAULT_RING_TUBE, 3, 64, RING_ARC),
                    ring_material,
                ),
            )
            .with_rotation(Quat::from_rotation_z(max_angle)),
        )?;

        let mut handlebar_node = Node::mesh(
            format!("{}_handlebar", desc.name),
            Mesh::new(
                Geometry::sphere(DEFAULT_HANDLEBAR_RADIUS, 8, 8),
                Material::new(Color::from_hex(DEFAULT_COLOR_HANDLEBAR)).overlay(),
            ),
        );
        handlebar_node.render_order = 1;
        let handlebar = scene.spawn_child(node, handlebar_node)?;

        let handle = Self {
            name: desc.name,
            node,
            ring,
            handlebar,
            axis: Vec3::Z,
            ring_radius,
            pivot: Vec3::ZERO,
            min_angle,
            mid_angle,
            max_angle,
            current_angle: mid_angle,
            reverse_axis: desc.reverse_axis,
            camera: None,
        };
        handle.place_handlebar(scene)?;
        Ok(handle)
    }

    /// Rotation axis in the handle's local frame
    pub fn axis(&self) -> Vec3 {
        self.axis
    }

    /// Set the rotation axis; also seeds the node's `up` vector.
    pub fn set_axis(&mut self, scene: &mut SceneGraph, axis: Vec3) -> Result<()> {
        self.axis = axis.normalize_or_zero();
        scene.get_mut(self.node)?.up = self.axis;
        Ok(())
    }

    pub fn ring_radius(&self) -> f32 {
        self.ring_radius
    }

    pub fn min_angle(&self) -> f32 {
        self.min_angle
    }

    pub fn mid_angle(&self) -> f32 {
        self.mid_angle
    }

    pub fn max_angle(&self) -> f32 {
        self.max_angle
    }

    pub fn current_angle(&self) -> f32 {
        self.current_angle
    }

    /// Ordered `(low, high)` travel range
    pub fn angle_bounds(&self) -> (f32, f32) {
        (
            self.min_angle.min(self.max_angle),
            self.min_angle.max(self.max_angle),
        )
    }

    pub fn reverse_axis(&self) -> bool {
        self.reverse_axis
    }

    pub fn ring(&self) -> NodeId {
        self.ring
    }

    pub fn handlebar(&self) -> NodeId {
        self.handlebar
    }

    pub fn camera(&self) -> Option<NodeId> {
        self.camera
    }

    /// Billboard toward `camera` every frame, or stop with `None`.
    pub fn set_camera(&mut self, camera: Option<NodeId>) {
        self.camera = camera;
    }

    /// Marker offset for an angle, in the handle's local frame
    pub fn handlebar_offset(&self, angle: f32) -> Vec3 {
        let (sin, cos) = angle.sin_cos();
        self.pivot + Vec3::new(cos, sin, 0.0) * self.ring_radius
    }

    fn place_handlebar(&self, scene: &mut SceneGraph) -> Result<()> {
        scene.get_mut(self.handlebar)?.position = self.handlebar_offset(self.current_angle);
        Ok(())
    }

    /// Orient the handle so its world orientation equals the camera's and point
    /// `up` from the handle toward the camera.
    fn face_camera(&self, scene: &mut SceneGraph, camera: NodeId) -> Result<()> {
        let parent_rotation = match scene.parent(self.node)? {
            Some(parent) => scene.world_rotation(parent)?,
            None => Quat::IDENTITY,
        };
        let (camera_position, camera_rotation, _) = scene.decompose_world(camera)?;

        scene.get_mut(self.node)?.rotation = (parent_rotation.inverse() * camera_rotation).normalize();
        let world_position = scene.world_position(self.node)?;
        scene.get_mut(self.node)?.up = camera_position - world_position;
        Ok(())
    }
}

impl HandleGroup for RotationHandle {
    fn node(&self) -> NodeId {
        self.node
    }

    fn name(&self) -> &str {
        &self.name
    }

    /// Only the marker is pickable; the ring is a visual affordance.
    fn interactive_objects(&self) -> Vec<NodeId> {
        vec![self.handlebar]
    }

    fn set_color(&self, scene: &mut SceneGraph, color: Color) -> Result<()> {
        for id in [self.ring, self.handlebar] {
            if let Some(mesh) = scene.get_mut(id)?.mesh_mut() {
                mesh.material.color = color;
            }
        }
        Ok(())
    }

    fn update_handle_rotation(&mut self, scene: &mut SceneGraph, drag_ratio: f32) -> Result<()> {
        if drag_ratio == 0.0 || !drag_ratio.is_finite() {
            return Ok(());
        }

        let delta = drag_ratio * DRAG_RATIO_TO_RADIANS;
        let (low, high) = self.angle_bounds();
        self.current_angle += if self.reverse_axis { -delta } else { delta };
        self.current_angle = self.current_angle.clamp(low, high);

        log::trace!("{}: marker angle {:.4}", self.name, self.current_angle);
        self.place_handlebar(scene)
    }

    fn reset_handlebar_position(&mut self, scene: &mut SceneGraph) -> Result<()> {
        self.current_angle = self.mid_angle;
        self.place_handlebar(scene)
    }

    fn update_matrix_world(&mut self, scene: &mut SceneGraph) -> Result<()> {
        if let Some(camera) = self.camera {
            self.face_camera(scene, camera)?;
        }
        scene.update_world(self.node)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x_like(scene: &mut SceneGraph, reverse_axis: bool) -> RotationHandle {
        RotationHandle::new(
            scene,
            RotationHandleDesc::new("test", Color::RED, 1.5)
                .with_sweep(0.0, PI * 0.4)
                .with_reverse_axis(reverse_axis),
        )
        .unwrap()
    }

    #[test]
    fn test_angle_derivation() {
        let mut scene = SceneGraph::new();
        let handle = x_like(&mut scene, false);
        assert!((handle.max_angle() - PI * 0.2).abs() < 1e-6);
        assert!((handle.mid_angle() - PI * 0.4).abs() < 1e-6);
        assert!((handle.min_angle() - PI * 0.6).abs() < 1e-6);
        assert_eq!(handle.current_angle(), handle.mid_angle());
        assert_eq!(handle.angle_bounds(), (handle.max_angle(), handle.min_angle()));
    }

    #[test]
    fn test_marker_starts_at_rest_angle() {
        let mut scene = SceneGraph::new();
        let handle = x_like(&mut scene, false);
        let position = scene.get(handle.handlebar()).unwrap().position;
        let expected = Vec3::new((PI * 0.4).cos(), (PI * 0.4).sin(), 0.0) * 1.5;
        assert!((position - expected).length() < 1e-5);
    }

    #[test]
    fn test_ring_rotated_to_max_angle() {
        let mut scene = SceneGraph::new();
        let handle = x_like(&mut scene, false);
        let ring = scene.get(handle.ring()).unwrap();
        assert!(ring.rotation.dot(Quat::from_rotation_z(PI * 0.2)).abs() > 0.9999);
    }

    #[test]
    fn test_zero_ratio_is_noop() {
        let mut scene = SceneGraph::new();
        let mut handle = x_like(&mut scene, false);
        handle.update_handle_rotation(&mut scene, 0.0).unwrap();
        assert_eq!(handle.current_angle(), handle.mid_angle());
        handle.update_handle_rotation(&mut scene, f32::NAN).unwrap();
        assert_eq!(handle.current_angle(), handle.mid_angle());
    }

    #[test]
    fn test_angle_stays_clamped() {
        let mut scene = SceneGraph::new();
        let mut handle = x_like(&mut scene, false);
        let (low, high) = handle.angle_bounds();
        let ratios = [50.0, 120.0, -400.0, 3.0, 1e4, -1e4, 7.5, -0.25];
        for ratio in ratios.iter().cycle().take(64) {
            handle.update_handle_rotation(&mut scene, *ratio).unwrap();
            assert!(handle.current_angle() >= low && handle.current_angle() <= high);
        }
    }

    #[test]
    fn test_reverse_axis_symmetry() {
        let mut scene = SceneGraph::new();
        let mut forward = x_like(&mut scene, false);
        let mut reverse = x_like(&mut scene, true);
        forward.update_handle_rotation(&mut scene, 12.0).unwrap();
        reverse.update_handle_rotation(&mut scene, 12.0).unwrap();
        let d_forward = forward.current_angle() - forward.mid_angle();
        let d_reverse = reverse.current_angle() - reverse.mid_angle();
        assert!((d_forward + d_reverse).abs() < 1e-6);
        assert!((d_forward - 12.0 * DRAG_RATIO_TO_RADIANS).abs() < 1e-6);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut scene = SceneGraph::new();
        let mut handle = x_like(&mut scene, false);
        handle.update_handle_rotation(&mut scene, 40.0).unwrap();
        handle.reset_handlebar_position(&mut scene).unwrap();
        let once = scene.get(handle.handlebar()).unwrap().position;
        handle.reset_handlebar_position(&mut scene).unwrap();
        let twice = scene.get(handle.handlebar()).unwrap().position;
        assert_eq!(once, twice);
        assert_eq!(handle.current_angle(), handle.mid_angle());
    }

    #[test]
    fn test_set_color_paints_ring_and_marker() {
        let mut scene = SceneGraph::new();
        let handle = x_like(&mut scene, false);
        let marker = scene.get(handle.handlebar()).unwrap().mesh_ref().unwrap().material.color;
        assert_ne!(marker, Color::RED);

        handle.set_color(&mut scene, Color::BLUE).unwrap();
        for id in [handle.ring(), handle.handlebar()] {
            let color = scene.get(id).unwrap().mesh_ref().unwrap().material.color;
            assert_eq!(color, Color::BLUE);
        }
    }

    #[test]
    fn test_only_marker_is_interactive() {
        let mut scene = SceneGraph::new();
        let handle = x_like(&mut scene, false);
        assert_eq!(handle.interactive_objects(), vec![handle.handlebar()]);
    }

    #[test]
    fn test_billboard_matches_camera_orientation() {
        let mut scene = SceneGraph::new();
        let root = scene.root();
        let parent = scene
            .spawn_child(
                root,
                Node::group("controls")
                    .with_position(Vec3::new(1.0, 0.0, 0.0))
                    .with_rotation(Quat::from_rotation_y(0.8)),
            )
            .unwrap();
        let camera_rotation = Quat::from_rotation_x(-0.4) * Quat::from_rotation_y(0.3);
        let camera = scene
            .spawn_child(
                root,
                Node::camera("camera")
                    .with_position(Vec3::new(0.0, 2.0, 10.0))
                    .with_rotation(camera_rotation),
            )
            .unwrap();

        let mut handle = x_like(&mut scene, false);
        scene.add_child(parent, handle.node()).unwrap();
        handle.set_camera(Some(camera));
        handle.update_matrix_world(&mut scene).unwrap();

        let world = scene.world_rotation(handle.node()).unwrap();
        assert!(world.dot(camera_rotation).abs() > 0.9999);
        let up = scene.get(handle.node()).unwrap().up;
        assert!((up - Vec3::new(-1.0, 2.0, 10.0)).length() < 1e-4);
    }
}
