//! # Compositor
//!
//! Produces the displayed image from the layer stack, and regenerates layer surfaces from their strokes.

use crate::{state::layer::Layer, stroke::builder::render_stroke, surface::Surface};

/// Clear the layer's surface and replay every stroke in paint order.
pub fn rebuild_layer<S: Surface>(layer: &mut Layer<S>) {
    let Layer {
        strokes, surface, ..
    } = layer;
    surface.clear();
    for stroke in strokes.iter() {
        render_stroke(stroke, surface);
    }
    log::trace!("rebuilt {} from {} strokes", layer.id, layer.strokes.len());
}

/// Rebuild every layer of the stack.
pub fn rebuild_all<S: Surface>(layers: &mut [Layer<S>]) {
    for layer in layers {
        rebuild_layer(layer);
    }
}

/// Clear `display` and blend every visible layer onto it, bottom to top, at the layer's opacity.
pub fn composite_display<S: Surface>(layers: &[Layer<S>], display: &mut S) {
    display.clear();
    for layer in layers.iter().filter(|layer| layer.visible) {
        display.composite_from(&layer.surface, layer.opacity);
    }
}
