//! Scene node records

use glam::{Mat4, Quat, Vec3};

use crate::geometry::Geometry;
use crate::id::NodeId;
use crate::material::Material;

/// Renderable shape plus its material
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
}

impl Mesh {
    pub fn new(geometry: Geometry, material: Material) -> Self {
        Self { geometry, material }
    }
}

/// What a node is, beyond its transform
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Top-level scene root
    Scene,
    /// Pure transform node
    Group,
    /// Viewpoint; looks down its local -Z
    Camera,
    /// Renderable primitive
    Mesh(Mesh),
}

impl NodeKind {
    /// Short type tag used in log output
    pub fn type_name(&self) -> &'static str {
        match self {
            NodeKind::Scene => "Scene",
            NodeKind::Group => "Group",
            NodeKind::Camera => "Camera",
            NodeKind::Mesh(_) => "Mesh",
        }
    }
}

/// A node in the scene graph.
///
/// The local transform (`position`, `rotation`, `scale`) is relative to the
/// parent. Hierarchy links are owned by the graph and only readable here.
#[derive(Clone, Debug)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// Free direction vector, interpreted by whoever owns the node
    pub up: Vec3,
    pub visible: bool,
    pub render_order: i32,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) world: Mat4,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            up: Vec3::Y,
            visible: true,
            render_order: 0,
            parent: None,
            children: Vec::new(),
            world: Mat4::IDENTITY,
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn camera(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Camera)
    }

    pub fn mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self::new(name, NodeKind::Mesh(mesh))
    }

    /// Set position (builder pattern)
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Set rotation (builder pattern)
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Set scale (builder pattern)
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Local transform as a matrix (translation * rotation * scale)
    #[inline]
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Rotate about an axis expressed in the node's own frame
    pub fn rotate_local(&mut self, axis: Vec3, angle: f32) {
        self.rotation = (self.rotation * Quat::from_axis_angle(axis.normalize(), angle)).normalize();
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// World matrix as of the last [`SceneGraph::update_world`](crate::SceneGraph::update_world)
    pub fn cached_world(&self) -> Mat4 {
        self.world
    }

    pub fn mesh_ref(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self) -> Option<&mut Mesh> {
        match &mut self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}
