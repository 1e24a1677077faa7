//! Error types for the controls

use thiserror::Error;

use freeform_scene::{NodeId, SceneError};

/// Errors raised by [`Controls`](crate::Controls) and its handles.
#[derive(Debug, Error)]
pub enum ControlsError {
    /// Scene graph lookup or hierarchy failure
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
    /// `show_by_names` was given a name no owned handle carries
    #[error("handle: {0} not found")]
    HandleNotFound(String),
    /// A drag event referenced a node that is not one of this instance's handles
    #[error("Node {0:?} is not a handle of these controls")]
    UnknownHandle(NodeId),
    /// Malformed options file
    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
    /// Options file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = core::result::Result<T, ControlsError>;
