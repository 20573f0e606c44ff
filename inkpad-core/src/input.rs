//! # Pointer input
//!
//! Raw pointer events as delivered by the host, and their normalization into samples the builders can use.

use crate::util::Unit;

/// Pressure assumed for devices that don't report one.
pub const DEFAULT_PRESSURE: Unit = Unit::HALF;

#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Default,
    strum::AsRefStr,
    strum::EnumString,
    serde::Serialize,
    serde::Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PointerType {
    #[default]
    Mouse,
    Touch,
    Pen,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, strum::AsRefStr)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The pointer left the canvas. Ends a session the same way as `Up`.
    Leave,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct PointerEvent {
    /// Logical position.
    pub x: f64,
    pub y: f64,
    /// As reported by the device, if at all.
    pub pressure: Option<f64>,
    pub pointer_type: PointerType,
}
impl PointerEvent {
    /// A mouse event with no pressure information.
    #[must_use]
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressure: None,
            pointer_type: PointerType::Mouse,
        }
    }
    #[must_use]
    pub fn with_pressure(self, pressure: f64) -> Self {
        Self {
            pressure: Some(pressure),
            ..self
        }
    }
    /// Validate and default the event's fields. `None` if the position is unusable.
    ///
    /// Missing, zero, and non-finite pressures become [`DEFAULT_PRESSURE`], others are clamped to `[0, 1]`.
    /// Many mice and touchscreens report a zero pressure while a button is held.
    #[must_use]
    pub fn normalize(&self) -> Option<Sample> {
        if !self.x.is_finite() || !self.y.is_finite() {
            log::trace!("dropping {:?} event with non-finite position", self.pointer_type);
            return None;
        }
        let pressure = self
            .pressure
            .filter(|&p| p != 0.0)
            .and_then(Unit::saturating)
            .unwrap_or(DEFAULT_PRESSURE);
        Some(Sample {
            pos: [self.x, self.y],
            pressure,
        })
    }
}

/// A normalized pointer position, ready to be recorded.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Sample {
    pub pos: [f64; 2],
    pub pressure: Unit,
}
