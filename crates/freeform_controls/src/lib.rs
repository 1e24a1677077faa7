//! # freeform_controls - Object Rotation Controls
//!
//! Interactive handles that let a user rotate a scene object by dragging
//! camera-facing rings around it.
//!
//! [`Controls`] owns three [`RotationHandle`]s named `xr_handle`, `yr_handle`
//! and `zr_handle`. The host application:
//! - hit-tests [`Controls::interactive_objects`] and resolves the hit with
//!   [`Controls::handle_for_object`]
//! - forwards pointer events as [`DragStart`] / [`Drag`] / [`DragEnd`]
//! - calls [`Controls::update_matrix_world`] once per frame
//! - polls [`Controls::get_object_rotation`] for the accumulated rotation
//! - calls [`Controls::dispose`] to remove the handles from the scene
//!
//! ```ignore
//! use freeform_controls::prelude::*;
//!
//! let mut controls = Controls::new(&mut scene, object, camera, ControlsOptions::default())?;
//! let x = controls.rotation_x().map(|h| h.node()).unwrap();
//!
//! controls.process_drag_start(DragStart { point, handle: x })?;
//! controls.process_drag(&mut scene, Drag::new(next_point, x).with_ratio(12.0))?;
//! controls.update_matrix_world(&mut scene)?;
//! controls.process_drag_end(&mut scene, DragEnd { handle: x })?;
//!
//! if controls.is_object_rotation_updated() {
//!     let rotation = controls.get_object_rotation();
//! }
//! ```

pub mod controls;
pub mod error;
pub mod handle;
pub mod options;
pub mod rotation;

pub use controls::{rotation_between, Controls, Drag, DragEnd, DragStart, DragState};
pub use error::{ControlsError, Result};
pub use handle::{Axis, DefaultHandleName, Handle, HandleGroup};
pub use options::{AnchorMode, ControlsOptions, SnapTranslation, TranslationLimit};
pub use rotation::{RotationHandle, RotationHandleDesc};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::controls::{Controls, Drag, DragEnd, DragStart, DragState};
    pub use crate::error::{ControlsError, Result};
    pub use crate::handle::{Axis, DefaultHandleName, Handle, HandleGroup};
    pub use crate::options::{AnchorMode, ControlsOptions, TranslationLimit};
    pub use crate::rotation::{RotationHandle, RotationHandleDesc};
}
