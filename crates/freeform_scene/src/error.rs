//! Error types for scene graph operations

use thiserror::Error;

use crate::id::NodeId;

/// Errors raised by [`SceneGraph`](crate::SceneGraph) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SceneError {
    /// The id does not refer to a live node (never existed or was removed)
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),
    /// Parenting `child` under `parent` would close a loop
    #[error("Cycle detected: {child:?} is an ancestor of {parent:?}")]
    CycleDetected { child: NodeId, parent: NodeId },
    /// A node cannot be its own parent
    #[error("Node {0:?} cannot be parented to itself")]
    SelfParent(NodeId),
    /// The scene root is owned by the graph
    #[error("The scene root cannot be removed or reparented")]
    RootRemoval,
}

/// Result type alias
pub type Result<T> = core::result::Result<T, SceneError>;
