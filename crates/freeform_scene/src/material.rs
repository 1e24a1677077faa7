//! Colors and flat materials

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// Linear RGB color with components in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0);
    pub const RED: Self = Self::new(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::new(0.0, 0.5019608, 0.0);
    pub const LIME: Self = Self::new(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::new(0.0, 0.0, 1.0);
    pub const YELLOW: Self = Self::new(1.0, 1.0, 0.0);
    pub const CYAN: Self = Self::new(0.0, 1.0, 1.0);
    pub const MAGENTA: Self = Self::new(1.0, 0.0, 1.0);
    pub const GRAY: Self = Self::new(0.5019608, 0.5019608, 0.5019608);

    #[inline]
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value
    pub fn from_hex(hex: u32) -> Self {
        Self::new(
            ((hex >> 16) & 0xff) as f32 / 255.0,
            ((hex >> 8) & 0xff) as f32 / 255.0,
            (hex & 0xff) as f32 / 255.0,
        )
    }

    /// Pack into `0xRRGGBB`, rounding each channel
    pub fn to_hex(self) -> u32 {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        channel(self.r) << 16 | channel(self.g) << 8 | channel(self.b)
    }

    fn from_name(name: &str) -> Option<Self> {
        let color = match name {
            "white" => Self::WHITE,
            "black" => Self::BLACK,
            "red" => Self::RED,
            "green" => Self::GREEN,
            "lime" => Self::LIME,
            "blue" => Self::BLUE,
            "yellow" => Self::YELLOW,
            "cyan" | "aqua" => Self::CYAN,
            "magenta" | "fuchsia" => Self::MAGENTA,
            "gray" | "grey" => Self::GRAY,
            _ => return None,
        };
        Some(color)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

/// Returned when a color string is neither `#rrggbb` nor a known name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid color: {0}")]
pub struct ColorParseError(pub String);

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if let Some(color) = Self::from_name(&lower) {
            return Ok(color);
        }

        let digits = lower.strip_prefix('#').unwrap_or(&lower);
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError(trimmed.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex)
            .map_err(|_| ColorParseError(trimmed.to_string()))
    }
}

/// Unlit material applied to a mesh node
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub depth_test: bool,
    pub depth_write: bool,
}

impl Material {
    /// Opaque material with depth testing
    pub fn new(color: Color) -> Self {
        Self {
            color,
            ..Self::default()
        }
    }

    /// Set opacity (builder pattern). Opacity below 1 implies transparency.
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self.transparent = self.transparent || self.opacity < 1.0;
        self
    }

    /// Draw on top of everything (builder pattern)
    pub fn overlay(mut self) -> Self {
        self.depth_test = false;
        self.depth_write = false;
        self.transparent = true;
        self
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            opacity: 1.0,
            transparent: false,
            depth_test: true,
            depth_write: true,
        }
    }
}
