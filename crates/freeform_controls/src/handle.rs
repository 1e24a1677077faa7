//! Handle capability set and the handle variants the controls can own.

use core::fmt;

use glam::Vec3;

use freeform_scene::{Color, NodeId, SceneGraph};

use crate::error::Result;
use crate::rotation::RotationHandle;

/// Principal axis
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn unit_vector(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }
}

/// Stable names of the handles every [`Controls`](crate::Controls) creates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DefaultHandleName {
    /// Rotation about the x-axis
    Xr,
    /// Rotation about the y-axis
    Yr,
    /// Rotation about the z-axis
    Zr,
}

impl DefaultHandleName {
    pub const fn as_str(self) -> &'static str {
        match self {
            DefaultHandleName::Xr => "xr_handle",
            DefaultHandleName::Yr => "yr_handle",
            DefaultHandleName::Zr => "zr_handle",
        }
    }

    pub const fn axis(self) -> Axis {
        match self {
            DefaultHandleName::Xr => Axis::X,
            DefaultHandleName::Yr => Axis::Y,
            DefaultHandleName::Zr => Axis::Z,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "xr_handle" => Some(DefaultHandleName::Xr),
            "yr_handle" => Some(DefaultHandleName::Yr),
            "zr_handle" => Some(DefaultHandleName::Zr),
            _ => None,
        }
    }
}

impl AsRef<str> for DefaultHandleName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for DefaultHandleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capabilities every draggable widget provides.
///
/// A handle is a group node in the scene plus the state that drives its
/// children. Methods that touch geometry take the scene the handle lives in.
pub trait HandleGroup {
    /// The handle's group node
    fn node(&self) -> NodeId;

    /// Stable name key used by visibility lookups
    fn name(&self) -> &str;

    /// Nodes the host should hit-test; a handle may also own purely visual nodes.
    fn interactive_objects(&self) -> Vec<NodeId>;

    /// Recolor every mesh that forms the handle.
    fn set_color(&self, scene: &mut SceneGraph, color: Color) -> Result<()>;

    /// Advance the handle's marker by a host drag ratio.
    fn update_handle_rotation(&mut self, scene: &mut SceneGraph, drag_ratio: f32) -> Result<()>;

    /// Snap the marker back to its rest position.
    fn reset_handlebar_position(&mut self, scene: &mut SceneGraph) -> Result<()>;

    /// Per-frame refresh of the handle's own transform and its world matrices.
    fn update_matrix_world(&mut self, scene: &mut SceneGraph) -> Result<()> {
        scene.update_world(self.node())?;
        Ok(())
    }
}

/// A handle owned by [`Controls`](crate::Controls).
#[derive(Debug)]
pub enum Handle {
    Rotation(RotationHandle),
}

impl Handle {
    pub fn is_rotation(&self) -> bool {
        matches!(self, Handle::Rotation(_))
    }

    pub fn as_rotation(&self) -> Option<&RotationHandle> {
        match self {
            Handle::Rotation(handle) => Some(handle),
        }
    }

    pub fn as_rotation_mut(&mut self) -> Option<&mut RotationHandle> {
        match self {
            Handle::Rotation(handle) => Some(handle),
        }
    }

    /// Whether the handle's group node is visible
    pub fn is_visible(&self, scene: &SceneGraph) -> Result<bool> {
        Ok(scene.get(self.node())?.visible)
    }

    pub fn set_visible(&self, scene: &mut SceneGraph, visible: bool) -> Result<()> {
        scene.get_mut(self.node())?.visible = visible;
        Ok(())
    }
}

impl From<RotationHandle> for Handle {
    fn from(handle: RotationHandle) -> Self {
        Handle::Rotation(handle)
    }
}

impl HandleGroup for Handle {
    fn node(&self) -> NodeId {
        match self {
            Handle::Rotation(h) => h.node(),
        }
    }

    fn name(&self) -> &str {
        match self {
            Handle::Rotation(h) => h.name(),
        }
    }

    fn interactive_objects(&self) -> Vec<NodeId> {
        match self {
            Handle::Rotation(h) => h.interactive_objects(),
        }
    }

    fn set_color(&self, scene: &mut SceneGraph, color: Color) -> Result<()> {
        match self {
            Handle::Rotation(h) => h.set_color(scene, color),
        }
    }

    fn update_handle_rotation(&mut self, scene: &mut SceneGraph, drag_ratio: f32) -> Result<()> {
        match self {
            Handle::Rotation(h) => h.update_handle_rotation(scene, drag_ratio),
        }
    }

    fn reset_handlebar_position(&mut self, scene: &mut SceneGraph) -> Result<()> {
        match self {
            Handle::Rotation(h) => h.reset_handlebar_position(scene),
        }
    }

    fn update_matrix_world(&mut self, scene: &mut SceneGraph) -> Result<()> {
        match self {
            Handle::Rotation(h) => h.update_matrix_world(scene),
        }
    }
}
