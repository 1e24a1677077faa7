//! The controls orchestrator.
//!
//! [`Controls`] owns the rotation handles for one target object and turns
//! host drag events into rotation of that object.
//!
//! # Frame flow
//!
//! ```text
//! host pointer layer ─▶ process_drag_start / process_drag / process_drag_end
//!                                     │
//!                                     ▼
//!                      drag quaternion + handle marker travel
//!                                     │
//! host render loop ───▶ update_matrix_world (every frame, any drag state)
//!                                     │
//!                                     ▼
//!                 object orientation / controls anchoring / billboarding
//! ```
//!
//! Rotation deltas are incremental: every `process_drag` measures the arc from
//! the previous drag point to the new one around the object's world position,
//! so the object turns with pointer velocity rather than absolute offset.

use core::f32::consts::PI;

use glam::{Quat, Vec3};

use freeform_scene::{Color, Node, NodeId, NodeKind, SceneGraph};

use crate::error::{ControlsError, Result};
use crate::handle::{Axis, DefaultHandleName, Handle, HandleGroup};
use crate::options::{AnchorMode, ControlsOptions, TranslationLimit, DEFAULT_DAMPING_FACTOR};
use crate::rotation::{RotationHandle, RotationHandleDesc};

/// Host-visible rotation units per unit of drag ratio
pub const ACCUMULATED_ROTATION_PER_RATIO: f32 = 0.01;

/// What the controls are currently driving.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    DraggingRotation,
    /// Reserved for translation handles; no handle kind enters it yet
    DraggingTranslation,
}

/// Pointer went down on a handle
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragStart {
    pub point: Vec3,
    pub handle: NodeId,
}

/// Pointer moved while a handle is held
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Drag {
    pub point: Vec3,
    pub handle: NodeId,
    /// Host-supplied scalar proportional to this frame's pointer movement
    pub drag_ratio: f32,
}

impl Drag {
    /// Drag event with a ratio of 1
    pub fn new(point: Vec3, handle: NodeId) -> Self {
        Self {
            point,
            handle,
            drag_ratio: 1.0,
        }
    }

    /// Set the drag ratio (builder pattern)
    pub fn with_ratio(mut self, drag_ratio: f32) -> Self {
        self.drag_ratio = drag_ratio;
        self
    }
}

/// Pointer released
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragEnd {
    pub handle: NodeId,
}

/// Shortest rotation taking direction `from` onto direction `to`.
///
/// Degenerate (zero-length) inputs yield the identity.
pub fn rotation_between(from: Vec3, to: Vec3) -> Quat {
    let from = from.normalize_or_zero();
    let to = to.normalize_or_zero();
    if from == Vec3::ZERO || to == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    Quat::from_rotation_arc(from, to)
}

/// Rotation handles anchored to one target object.
pub struct Controls {
    node: NodeId,
    object: NodeId,
    camera: NodeId,
    handles: Vec<Handle>,
    options: ControlsOptions,
    mode: AnchorMode,
    drag_state: DragState,
    damping_factor: f32,
    damping_coefficient: f32,
    bounding_sphere_radius: f32,
    initial_self_rotation: Quat,
    drag_start_point: Vec3,
    drag_incremental_start_point: Vec3,
    handle_target_rotation: Quat,
    object_target_rotation: Quat,
    object_world_position: Vec3,
    anchor_rotation: Vec3,
    anchor_rotation_updated: bool,
    translation_limit: Option<TranslationLimit>,
    translation_anchor: Option<Vec3>,
}

impl Controls {
    /// Build controls for `object`, viewed through `camera`.
    ///
    /// The controls group is spawned under the scene root and gets one
    /// rotation handle per principal axis.
    pub fn new(
        scene: &mut SceneGraph,
        object: NodeId,
        camera: NodeId,
        options: ControlsOptions,
    ) -> Result<Self> {
        scene.get(object)?;
        scene.get(camera)?;

        let initial_self_rotation = options.initial_orientation();
        let root = scene.root();
        let node = scene.spawn_child(
            root,
            Node::group("controls").with_rotation(initial_self_rotation),
        )?;

        let bounding_sphere_radius = compute_object_bounds(scene, object, &options)?;
        let object_world_position = scene.world_position(object)?;
        let object_target_rotation = scene.world_rotation(object)?;
        scene.set_world_position(node, object_world_position)?;

        let mut controls = Self {
            node,
            object,
            camera,
            handles: Vec::with_capacity(3),
            mode: options.mode,
            options,
            drag_state: DragState::Idle,
            damping_factor: DEFAULT_DAMPING_FACTOR,
            damping_coefficient: 1.0,
            bounding_sphere_radius,
            initial_self_rotation,
            drag_start_point: Vec3::ZERO,
            drag_incremental_start_point: Vec3::ZERO,
            handle_target_rotation: Quat::IDENTITY,
            object_target_rotation,
            object_world_position,
            anchor_rotation: Vec3::ZERO,
            anchor_rotation_updated: false,
            translation_limit: None,
            translation_anchor: None,
        };
        controls.setup_default_rotation(scene)?;
        Ok(controls)
    }

    fn setup_default_rotation(&mut self, scene: &mut SceneGraph) -> Result<()> {
        let radius = self.bounding_sphere_radius * self.options.rotation_radius_scale;
        let layout = [
            (DefaultHandleName::Xr, Color::RED, 0.0, 0.4, false),
            (DefaultHandleName::Yr, Color::GREEN, 0.7, 1.1, true),
            (DefaultHandleName::Zr, Color::BLUE, 1.4, 1.8, true),
        ];

        for (name, color, start, end, reverse_axis) in layout {
            let desc = RotationHandleDesc::new(name.as_str(), color, radius)
                .with_sweep(PI * start, PI * end)
                .with_reverse_axis(reverse_axis);
            let mut handle = RotationHandle::new(scene, desc)?;
            handle.set_axis(scene, name.axis().unit_vector())?;
            handle.set_camera(Some(self.camera));

            let node = scene.get_mut(handle.node())?;
            match name.axis() {
                Axis::X => {
                    node.rotate_local(Vec3::Y, PI / 2.0);
                    node.rotate_local(Vec3::Z, PI);
                }
                Axis::Y => node.rotate_local(Vec3::X, PI / 2.0),
                Axis::Z => {}
            }

            self.setup_handle(scene, handle)?;
        }
        Ok(())
    }

    /// Register a handle and parent it under the controls group.
    ///
    /// Handles are unique by node; registering the same node twice is ignored.
    pub fn setup_handle(&mut self, scene: &mut SceneGraph, handle: impl Into<Handle>) -> Result<NodeId> {
        let handle = handle.into();
        let id = handle.node();
        if self.handle_index(id).is_some() {
            log::debug!("Handle {} already registered", handle.name());
            return Ok(id);
        }
        scene.add_child(self.node, id)?;
        log::debug!("Registered handle {} ({:?})", handle.name(), id);
        self.handles.push(handle);
        Ok(id)
    }

    /// Remove the controls group and every handle node from the scene.
    ///
    /// The controls own nodes in `scene`; dropping a `Controls` without
    /// calling this leaves them in the graph. The target object and camera
    /// are left untouched.
    pub fn dispose(self, scene: &mut SceneGraph) -> Result<()> {
        scene.remove(self.node)?;
        log::debug!("Disposed controls {:?} with {} handle(s)", self.node, self.handles.len());
        Ok(())
    }

    /// The controls' group node
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// The driven object
    pub fn object(&self) -> NodeId {
        self.object
    }

    pub fn camera(&self) -> NodeId {
        self.camera
    }

    pub fn options(&self) -> &ControlsOptions {
        &self.options
    }

    pub fn mode(&self) -> AnchorMode {
        self.mode
    }

    pub fn drag_state(&self) -> DragState {
        self.drag_state
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_state != DragState::Idle
    }

    /// Separation baseline used to size the handles
    pub fn bounding_sphere_radius(&self) -> f32 {
        self.bounding_sphere_radius
    }

    pub fn handles(&self) -> &[Handle] {
        &self.handles
    }

    fn handle_index(&self, id: NodeId) -> Option<usize> {
        self.handles.iter().position(|h| h.node() == id)
    }

    pub fn handle(&self, id: NodeId) -> Option<&Handle> {
        self.handle_index(id).map(|i| &self.handles[i])
    }

    pub fn handle_by_name(&self, name: &str) -> Option<&Handle> {
        self.handles.iter().find(|h| h.name() == name)
    }

    fn default_rotation(&self, name: DefaultHandleName) -> Option<&RotationHandle> {
        self.handle_by_name(name.as_str()).and_then(Handle::as_rotation)
    }

    pub fn rotation_x(&self) -> Option<&RotationHandle> {
        self.default_rotation(DefaultHandleName::Xr)
    }

    pub fn rotation_y(&self) -> Option<&RotationHandle> {
        self.default_rotation(DefaultHandleName::Yr)
    }

    pub fn rotation_z(&self) -> Option<&RotationHandle> {
        self.default_rotation(DefaultHandleName::Zr)
    }

    /// Owning handle of a pickable node from [`Controls::interactive_objects`]
    pub fn handle_for_object(&self, object: NodeId) -> Option<NodeId> {
        self.handles
            .iter()
            .find(|h| h.interactive_objects().contains(&object))
            .map(HandleGroup::node)
    }

    // ------------------------------------------------------------------
    // Host-visible rotation
    // ------------------------------------------------------------------

    /// Peek the dirty flag without clearing it.
    pub fn is_object_rotation_updated(&self) -> bool {
        self.anchor_rotation_updated
    }

    /// Read the accumulated rotation and clear the dirty flag.
    ///
    /// Each component is the sum of `drag_ratio * 0.01` over drags of the
    /// matching axis handle; it is not a composed rotation.
    pub fn get_object_rotation(&mut self) -> Vec3 {
        self.anchor_rotation_updated = false;
        self.anchor_rotation
    }

    /// Overwrite the accumulator (the dirty flag is left untouched).
    pub fn set_object_rotation(&mut self, rotation: Vec3) {
        self.anchor_rotation = rotation;
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    /// Weight on rotation increments, clamped to `[0, 1]`.
    pub fn set_damping_factor(&mut self, damping_factor: f32) {
        self.damping_factor = if damping_factor.is_nan() {
            0.0
        } else {
            damping_factor.clamp(0.0, 1.0)
        };
    }

    pub fn damping_factor(&self) -> f32 {
        self.damping_factor
    }

    /// `exp(-damping_factor * |drag_ratio|^3)` from the most recent rotation
    /// drag; 1 before any drag. Computed regardless of
    /// [`ControlsOptions::is_damping_enabled`].
    pub fn damping_coefficient(&self) -> f32 {
        self.damping_coefficient
    }

    /// Limit translation around the controls' current position, or clear the
    /// limit with `None`.
    pub fn set_translation_limit(&mut self, scene: &SceneGraph, limit: Option<TranslationLimit>) -> Result<()> {
        self.translation_anchor = match limit {
            Some(_) => Some(scene.get(self.node)?.position),
            None => None,
        };
        self.translation_limit = limit;
        Ok(())
    }

    pub fn translation_limit(&self) -> Option<&TranslationLimit> {
        self.translation_limit.as_ref()
    }

    /// Anchor captured with the current limit; `None` while no limit is set.
    pub fn translation_anchor(&self) -> Option<Vec3> {
        self.translation_anchor
    }

    // ------------------------------------------------------------------
    // Drag lifecycle
    // ------------------------------------------------------------------

    pub fn process_drag_start(&mut self, start: DragStart) -> Result<()> {
        let handle = self
            .handle(start.handle)
            .ok_or(ControlsError::UnknownHandle(start.handle))?;
        let is_rotation = handle.is_rotation();
        log::debug!("Drag started on {} at {:?}", handle.name(), start.point);

        self.drag_start_point = start.point;
        self.drag_incremental_start_point = start.point;
        self.drag_state = if is_rotation {
            DragState::DraggingRotation
        } else {
            DragState::Idle
        };
        Ok(())
    }

    pub fn process_drag(&mut self, scene: &mut SceneGraph, drag: Drag) -> Result<()> {
        let index = self
            .handle_index(drag.handle)
            .ok_or(ControlsError::UnknownHandle(drag.handle))?;

        if self.drag_state != DragState::DraggingRotation {
            return Ok(());
        }
        let ratio = drag.drag_ratio;
        if ratio == 0.0 || !ratio.is_finite() {
            return Ok(());
        }

        self.damping_coefficient = (-self.damping_factor * ratio.abs().powi(3)).exp();

        let from = self.drag_incremental_start_point - self.object_world_position;
        let to = drag.point - self.object_world_position;
        self.handle_target_rotation = rotation_between(from, to);

        let handle = &mut self.handles[index];
        if self.mode == AnchorMode::Fixed {
            scene.apply_world_rotation(handle.node(), self.handle_target_rotation)?;
        }
        handle.update_handle_rotation(scene, ratio)?;

        if let Some(name) = DefaultHandleName::from_name(handle.name()) {
            let increment = ratio * ACCUMULATED_ROTATION_PER_RATIO;
            match name.axis() {
                Axis::X => self.anchor_rotation.x += increment,
                Axis::Y => self.anchor_rotation.y += increment,
                Axis::Z => self.anchor_rotation.z += increment,
            }
            self.anchor_rotation_updated = true;
        }

        self.object_target_rotation = (self.handle_target_rotation * self.object_target_rotation).normalize();
        self.drag_incremental_start_point = drag.point;

        log::trace!(
            "Drag ratio {} on {}: k={:.4} delta={:?}",
            ratio,
            handle.name(),
            self.damping_coefficient,
            self.handle_target_rotation
        );
        Ok(())
    }

    /// Finish a drag. Every handle's marker snaps back to rest; the object's
    /// orientation is kept.
    pub fn process_drag_end(&mut self, scene: &mut SceneGraph, end: DragEnd) -> Result<()> {
        let handle = self
            .handle(end.handle)
            .ok_or(ControlsError::UnknownHandle(end.handle))?;
        log::debug!("Drag ended on {}", handle.name());

        self.drag_state = DragState::Idle;
        for handle in &mut self.handles {
            handle.reset_handlebar_position(scene)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Visibility
    // ------------------------------------------------------------------

    /// Set visibility of the named handles. Fails without changing anything
    /// if any name is unknown.
    pub fn show_by_names<S: AsRef<str>>(&self, scene: &mut SceneGraph, names: &[S], visible: bool) -> Result<()> {
        let targets = names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                self.handle_by_name(name)
                    .ok_or_else(|| ControlsError::HandleNotFound(name.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        for handle in targets {
            handle.set_visible(scene, visible)?;
        }
        Ok(())
    }

    pub fn show_all(&self, scene: &mut SceneGraph, visible: bool) -> Result<()> {
        for handle in &self.handles {
            handle.set_visible(scene, visible)?;
        }
        Ok(())
    }

    /// Pickable nodes of every currently visible handle
    pub fn interactive_objects(&self, scene: &SceneGraph) -> Result<Vec<NodeId>> {
        let mut objects = Vec::new();
        for handle in &self.handles {
            if handle.is_visible(scene)? {
                objects.extend(handle.interactive_objects());
            }
        }
        Ok(objects)
    }

    // ------------------------------------------------------------------
    // Per-frame reconciliation
    // ------------------------------------------------------------------

    /// Reconcile the object, the controls group and the handles. Call once per
    /// frame regardless of drag state.
    pub fn update_matrix_world(&mut self, scene: &mut SceneGraph) -> Result<()> {
        scene.update_world(self.object)?;
        self.object_world_position = scene.world_position(self.object)?;

        let parent_world_rotation = match scene.parent(self.object)? {
            Some(parent) => scene.decompose_world(parent)?.1,
            None => Quat::IDENTITY,
        };
        let object_target_position = scene.world_position(self.node)?;
        self.object_target_rotation = (parent_world_rotation.inverse() * self.object_target_rotation).normalize();

        match self.drag_state {
            DragState::DraggingTranslation => {
                scene.set_world_position(self.object, object_target_position)?;
            }
            DragState::DraggingRotation => {
                scene.get_mut(self.object)?.rotation = self.object_target_rotation;
                scene.set_world_position(self.object, object_target_position)?;
            }
            DragState::Idle => {
                scene.set_world_position(self.node, self.object_world_position)?;
            }
        }

        self.object_target_rotation = scene.world_rotation(self.object)?;
        if self.mode == AnchorMode::Inherit && self.drag_state != DragState::DraggingTranslation {
            scene.set_world_rotation(self.node, self.object_target_rotation * self.initial_self_rotation)?;
        }

        scene.update_world(self.object)?;
        scene.update_world(self.node)?;
        for handle in &mut self.handles {
            handle.update_matrix_world(scene)?;
        }
        Ok(())
    }
}

fn compute_object_bounds(scene: &SceneGraph, object: NodeId, options: &ControlsOptions) -> Result<f32> {
    if !options.use_computed_bounds {
        return Ok(options.separation);
    }

    let node = scene.get(object)?;
    match &node.kind {
        NodeKind::Mesh(mesh) => {
            let radius = mesh.geometry.bounding_sphere().radius;
            Ok(radius / 2.0 + options.separation)
        }
        other => {
            log::warn!(
                "Bounds can only be computed for mesh nodes, received '{}' of type {}. \
                 Falling back to the default separation.",
                node.name,
                other.type_name()
            );
            Ok(options.separation)
        }
    }
}
