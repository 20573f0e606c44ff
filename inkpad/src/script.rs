//! # Scripts
//!
//! A script is a TOML file of `[[step]]` tables, each holding exactly one pointer event or command, replayed
//! in order against an engine:
//!
//! ```toml
//! [[step]]
//! brush_color = "#3366cc"
//! [[step]]
//! down = { x = 10, y = 10, pressure = 0.4, pointer = "pen" }
//! [[step]]
//! move = { x = 40, y = 25 }
//! [[step]]
//! up = { x = 40, y = 25 }
//! [[step]]
//! undo = 1
//! ```
//!
//! Commands that take no argument are given a repeat count instead. `resize` keeps any of `width`,
//! `height`, and `scale_factor` it doesn't mention from the current canvas.

use inkpad_core::{
    brush::EraserMode,
    color::Color,
    events::NotificationSink,
    input::{PointerEvent, PointerPhase, PointerType},
    state::Canvas,
    surface::Surface,
    Engine,
};

#[derive(Clone, Copy, PartialEq, Debug, serde::Deserialize)]
pub struct PointerStep {
    pub x: f64,
    pub y: f64,
    pub pressure: Option<f64>,
    #[serde(default)]
    pub pointer: PointerType,
}
impl From<PointerStep> for PointerEvent {
    fn from(step: PointerStep) -> Self {
        Self {
            x: step.x,
            y: step.y,
            pressure: step.pressure,
            pointer_type: step.pointer,
        }
    }
}

/// A new canvas, relative to the current one.
#[derive(Clone, Copy, PartialEq, Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResizeStep {
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub scale_factor: Option<f64>,
}
impl ResizeStep {
    #[must_use]
    pub fn apply_to(&self, current: Canvas) -> Canvas {
        Canvas {
            width: self.width.unwrap_or(current.width),
            height: self.height.unwrap_or(current.height),
            scale_factor: self.scale_factor.unwrap_or(current.scale_factor),
        }
    }
}

#[derive(Clone, PartialEq, Debug, serde::Deserialize, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Step {
    Down(PointerStep),
    Move(PointerStep),
    Up(PointerStep),
    Leave(PointerStep),
    BrushSize(f64),
    BrushColor(Color),
    PressureEnabled(bool),
    PressureFactor(f64),
    EraserSize(f64),
    EraserMode(EraserMode),
    Erasing(bool),
    NewLayer(usize),
    SwitchLayer(usize),
    DeleteLayer(usize),
    ClearLayer(usize),
    LayerVisibility { index: usize, visible: bool },
    LayerOpacity { index: usize, opacity: f64 },
    RenameLayer { index: usize, name: String },
    Undo(usize),
    Redo(usize),
    Resize(ResizeStep),
}

#[derive(Clone, PartialEq, Debug, Default, serde::Deserialize)]
pub struct Script {
    #[serde(default)]
    pub step: Vec<Step>,
}
impl Script {
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        let string = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&string)?)
    }
    /// Apply every step in order, handing each step's notifications to `on_step` as they happen.
    pub fn run<S, N>(&self, engine: &mut Engine<S, N>, mut on_step: impl FnMut(&mut Engine<S, N>))
    where
        S: Surface,
        N: NotificationSink,
    {
        for (idx, step) in self.step.iter().enumerate() {
            log::trace!("step {idx}: {}", step.as_ref());
            step.apply(engine);
            on_step(engine);
        }
    }
}

impl Step {
    pub fn apply<S: Surface, N: NotificationSink>(&self, engine: &mut Engine<S, N>) {
        match self.clone() {
            Self::Down(p) => engine.pointer(PointerPhase::Down, p.into()),
            Self::Move(p) => engine.pointer(PointerPhase::Move, p.into()),
            Self::Up(p) => engine.pointer(PointerPhase::Up, p.into()),
            Self::Leave(p) => engine.pointer(PointerPhase::Leave, p.into()),
            Self::BrushSize(size) => engine.set_brush_size(size),
            Self::BrushColor(color) => engine.set_brush_color(color),
            Self::PressureEnabled(enabled) => engine.set_pressure_enabled(enabled),
            Self::PressureFactor(factor) => engine.set_pressure_factor(factor),
            Self::EraserSize(size) => engine.set_eraser_size(size),
            Self::EraserMode(mode) => engine.set_eraser_mode(mode),
            Self::Erasing(erasing) => engine.set_erasing(erasing),
            Self::NewLayer(times) => (0..times).for_each(|_| engine.create_layer()),
            Self::SwitchLayer(index) => engine.switch_layer(index),
            Self::DeleteLayer(index) => engine.delete_layer(index),
            Self::ClearLayer(index) => engine.clear_layer(index),
            Self::LayerVisibility { index, visible } => engine.set_layer_visibility(index, visible),
            Self::LayerOpacity { index, opacity } => engine.set_layer_opacity(index, opacity),
            Self::RenameLayer { index, name } => engine.rename_layer(index, name),
            Self::Undo(times) => (0..times).for_each(|_| engine.undo()),
            Self::Redo(times) => (0..times).for_each(|_| engine.redo()),
            Self::Resize(resize) => engine.resize(resize.apply_to(*engine.document().canvas())),
        }
    }
}
