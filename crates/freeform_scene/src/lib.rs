//! # freeform_scene - Scene Graph
//!
//! A small retained scene graph: nodes with local transforms arranged in a
//! parent/child hierarchy under a single `Scene` root.
//!
//! The graph guarantees the operations interactive controls rely on:
//! - world matrices composed from the current ancestor chain
//! - world matrix decomposition into position / orientation / scale
//! - reparenting that preserves the world transform ([`SceneGraph::attach`])
//!
//! ```ignore
//! use freeform_scene::prelude::*;
//!
//! let mut scene = SceneGraph::new();
//! let root = scene.root();
//! let pivot = scene.spawn_child(root, Node::group("pivot"))?;
//! let ball = scene.spawn_child(pivot, Node::mesh("ball", Mesh::new(
//!     Geometry::sphere(1.0, 16, 16),
//!     Material::new(Color::RED),
//! )))?;
//! scene.update_world(root)?;
//! ```

pub mod error;
pub mod geometry;
pub mod graph;
pub mod id;
pub mod material;
pub mod node;

pub use error::{Result, SceneError};
pub use geometry::{BoundingSphere, Geometry};
pub use graph::SceneGraph;
pub use id::NodeId;
pub use material::{Color, ColorParseError, Material};
pub use node::{Mesh, Node, NodeKind};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{Result, SceneError};
    pub use crate::geometry::{BoundingSphere, Geometry};
    pub use crate::graph::SceneGraph;
    pub use crate::id::NodeId;
    pub use crate::material::{Color, Material};
    pub use crate::node::{Mesh, Node, NodeKind};
}
