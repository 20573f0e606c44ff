//! # Brush
//!
//! Session-wide tool settings. These are not stored per-stroke: a stroke bakes the settings in effect when it
//! began into its color, base size, and per-point sizes.

use crate::util::Unit;

/// Settings for ink strokes.
#[derive(Clone, Copy, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BrushSettings {
    /// Stroke width in logical units, before pressure mapping.
    pub size: f64,
    pub color: crate::color::Color,
    pub pressure_enabled: bool,
    /// How strongly pressure modulates width. See [`BrushSettings::width_for`]
    pub pressure_factor: f64,
}
impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            size: 5.0,
            color: crate::color::Color::BLACK,
            pressure_enabled: true,
            pressure_factor: 1.0,
        }
    }
}
impl BrushSettings {
    /// Map a pressure value to a point width.
    ///
    /// `base * (0.5 + pressure * factor)` when pressure is enabled, `base` otherwise.
    #[must_use]
    pub fn width_for(&self, base_size: f64, pressure: Unit) -> f64 {
        if self.pressure_enabled {
            base_size * pressure.get().mul_add(self.pressure_factor, 0.5)
        } else {
            base_size
        }
    }
}

#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Default,
    strum::AsRefStr,
    strum::EnumIter,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EraserMode {
    /// Punch holes in the layer's pixels.
    #[default]
    Pixel,
    /// Remove whole strokes near the pointer.
    Stroke,
    /// Drag out a rectangle, removing every stroke touching it on release.
    Rect,
}

#[derive(Clone, Copy, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct EraserSettings {
    /// Diameter for pixel erasing, and hit distance for stroke erasing, in logical units.
    pub size: f64,
    pub mode: EraserMode,
}
impl Default for EraserSettings {
    fn default() -> Self {
        Self {
            size: 20.0,
            mode: EraserMode::default(),
        }
    }
}
