//! Construction options for [`Controls`](crate::Controls).
//!
//! Options deserialize from TOML with every field optional:
//!
//! ```toml
//! mode = "inherit"
//! separation = 0.75
//! rotation_radius_scale = 2.0
//! orientation = [0.0, 0.0, 0.0, 1.0]
//! ```

use std::path::Path;

use glam::Quat;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub const DEFAULT_CONTROLS_SEPARATION: f32 = 0.5;
pub const DEFAULT_ROTATION_RADIUS_SCALE: f32 = 3.0;
pub const DEFAULT_EYE_ROTATION_SCALE: f32 = 1.25;
pub const DEFAULT_PLANE_SIZE_SCALE: f32 = 0.75;
pub const DEFAULT_TRANSLATION_DISTANCE_SCALE: f32 = 1.0;
pub const DEFAULT_DAMPING_FACTOR: f32 = 0.8;

/// Whether the controls follow the object's orientation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorMode {
    /// The controls keep their own orientation as the object rotates
    #[default]
    Fixed,
    /// The controls rotate together with the object
    Inherit,
}

/// Per-axis snap-to-grid switches for translation handles
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapTranslation {
    pub x: bool,
    pub y: bool,
    pub z: bool,
}

/// Translation bounds relative to the anchor captured by
/// [`Controls::set_translation_limit`](crate::Controls::set_translation_limit).
///
/// Each axis holds `[negative, positive]` unit limits, or `None` for no limit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationLimit {
    pub x: Option<[f32; 2]>,
    pub y: Option<[f32; 2]>,
    pub z: Option<[f32; 2]>,
}

/// Options recognised by [`Controls::new`](crate::Controls::new).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsOptions {
    /// Anchor mode for the controls
    pub mode: AnchorMode,
    /// Baseline distance between the object and its handles; scales the
    /// rotation ring radius
    pub separation: f32,
    /// Derive the separation from the target mesh's bounding sphere
    /// (`radius / 2 + separation`)
    pub use_computed_bounds: bool,
    /// Orientation applied to the whole controls instance, `[x, y, z, w]`
    pub orientation: Option<Quat>,
    /// Host hint: hide the other handles of this instance while dragging
    pub hide_other_handles_on_drag: bool,
    /// Host hint: hide other controls instances while dragging
    pub hide_other_controls_instances_on_drag: bool,
    /// Host hint: display the drag interaction plane
    pub show_helper_plane: bool,
    pub is_damping_enabled: bool,
    /// Ring radius multiplier for the axis rotation handles
    pub rotation_radius_scale: f32,
    pub eye_rotation_radius_scale: f32,
    pub pick_plane_size_scale: f32,
    pub translation_distance_scale: f32,
    /// Rendering hint: highlight the axis being manipulated
    pub highlight_axis: bool,
    pub snap_translation: SnapTranslation,
}

impl Default for ControlsOptions {
    fn default() -> Self {
        Self {
            mode: AnchorMode::Fixed,
            separation: DEFAULT_CONTROLS_SEPARATION,
            use_computed_bounds: false,
            orientation: None,
            hide_other_handles_on_drag: true,
            hide_other_controls_instances_on_drag: true,
            show_helper_plane: false,
            is_damping_enabled: true,
            rotation_radius_scale: DEFAULT_ROTATION_RADIUS_SCALE,
            eye_rotation_radius_scale: DEFAULT_EYE_ROTATION_SCALE,
            pick_plane_size_scale: DEFAULT_PLANE_SIZE_SCALE,
            translation_distance_scale: DEFAULT_TRANSLATION_DISTANCE_SCALE,
            highlight_axis: true,
            snap_translation: SnapTranslation::default(),
        }
    }
}

impl ControlsOptions {
    /// Parse options from a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let options = Self::from_toml_str(&content)?;
        log::info!("Loaded controls options from {:?}", path);
        Ok(options)
    }

    /// Set the anchor mode (builder pattern)
    pub fn with_mode(mut self, mode: AnchorMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the separation (builder pattern)
    pub fn with_separation(mut self, separation: f32) -> Self {
        self.separation = separation;
        self
    }

    /// Set the initial orientation (builder pattern)
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = Some(orientation);
        self
    }

    /// Enable bounds-derived separation (builder pattern)
    pub fn with_computed_bounds(mut self, enabled: bool) -> Self {
        self.use_computed_bounds = enabled;
        self
    }

    /// Normalised initial orientation, identity when unset
    pub fn initial_orientation(&self) -> Quat {
        match self.orientation {
            Some(q) if q.length_squared() > 0.0 => q.normalize(),
            _ => Quat::IDENTITY,
        }
    }
}
