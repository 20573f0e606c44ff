//! # inkpad-core
//!
//! A layered freehand annotation engine. Pointer events become vector strokes, strokes are cached as raster
//! layers, and the layers are composited into a display. Everything structural is undoable.
//!
//! Start at [`engine::Engine`].

pub mod brush;
pub mod color;
pub mod compositor;
pub mod engine;
pub mod eraser;
pub mod events;
pub mod history;
pub mod id;
pub mod input;
pub mod state;
pub mod stroke;
pub mod surface;
pub mod util;

pub use engine::{Engine, EngineConfig, Stats};
pub use id::Id;
