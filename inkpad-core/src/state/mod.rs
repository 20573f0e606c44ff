//! # State
//!
//! The document: an ordered, never-empty stack of layers, one of which is active.
//!
//! Operations here keep the document's own invariants and rebuild layer surfaces where strokes change.
//! Compositing the display and recording history is left to the caller.

pub mod document;
pub mod layer;

pub use document::Canvas;
pub use layer::{Layer, LayerID};

use crate::surface::{Surface, SurfaceError};

#[derive(Debug)]
pub struct Document<S> {
    canvas: Canvas,
    /// Bottom to top. Invariant: never empty.
    layers: Vec<Layer<S>>,
    /// Invariant: valid index into `layers`.
    current: usize,
    /// Count of layers ever created, for default names.
    layers_created: usize,
}

impl<S: Surface> Document<S> {
    /// A document with a single empty layer.
    pub fn new(canvas: Canvas) -> Result<Self, SurfaceError> {
        let surface = S::allocate(&canvas)?;
        let mut this = Self {
            canvas,
            layers: Vec::with_capacity(1),
            current: 0,
            layers_created: 0,
        };
        let name = this.next_name();
        this.layers.push(Layer::new(name, surface));
        Ok(this)
    }
    fn next_name(&mut self) -> String {
        self.layers_created += 1;
        format!("Layer {}", self.layers_created)
    }
    /// Append an empty layer on top of the stack and make it active, returning its index.
    ///
    /// Nothing changes if its surface could not be allocated.
    pub fn create_layer(&mut self) -> Result<usize, SurfaceError> {
        let surface = S::allocate(&self.canvas)?;
        let name = self.next_name();
        log::debug!("creating {name:?}");
        self.layers.push(Layer::new(name, surface));
        self.current = self.layers.len() - 1;
        Ok(self.current)
    }
    /// Make the layer at `index` active. `false` if out of range.
    pub fn switch_layer(&mut self, index: usize) -> bool {
        if index >= self.layers.len() {
            return false;
        }
        self.current = index;
        true
    }
    /// Remove the layer at `index`. Refused if it is the last layer, or `index` is out of range.
    pub fn delete_layer(&mut self, index: usize) -> bool {
        if self.layers.len() <= 1 || index >= self.layers.len() {
            return false;
        }
        let removed = self.layers.remove(index);
        log::debug!("deleted {:?} ({})", removed.name, removed.id);
        self.current = self.current.min(self.layers.len() - 1);
        true
    }
    /// Remove every stroke of the layer at `index` and blank its surface.
    pub fn clear_layer(&mut self, index: usize) -> bool {
        let Some(layer) = self.layers.get_mut(index) else {
            return false;
        };
        layer.strokes.clear();
        crate::compositor::rebuild_layer(layer);
        true
    }
    pub fn set_visibility(&mut self, index: usize, visible: bool) -> bool {
        let Some(layer) = self.layers.get_mut(index) else {
            return false;
        };
        layer.visible = visible;
        true
    }
    /// Set a layer's opacity, clamped to `[0, 1]`. Non-finite values are ignored.
    pub fn set_opacity(&mut self, index: usize, opacity: f64) -> bool {
        let (Some(layer), Some(opacity)) = (
            self.layers.get_mut(index),
            crate::util::Unit::saturating(opacity),
        ) else {
            return false;
        };
        layer.opacity = opacity;
        true
    }
    pub fn rename_layer(&mut self, index: usize, name: String) -> bool {
        let Some(layer) = self.layers.get_mut(index) else {
            return false;
        };
        layer.name = name;
        true
    }
    /// Reallocate every layer at the new canvas size and replay its strokes.
    ///
    /// Every new surface is allocated before any is swapped in, so on error nothing has changed.
    pub fn resize(&mut self, canvas: Canvas) -> Result<(), SurfaceError> {
        let surfaces = self
            .layers
            .iter()
            .map(|_| S::allocate(&canvas))
            .collect::<Result<Vec<_>, _>>()?;
        for (layer, surface) in self.layers.iter_mut().zip(surfaces) {
            layer.surface = surface;
            crate::compositor::rebuild_layer(layer);
        }
        self.canvas = canvas;
        Ok(())
    }
}

impl<S> Document<S> {
    #[must_use]
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
    #[must_use]
    pub fn layers(&self) -> &[Layer<S>] {
        &self.layers
    }
    #[must_use]
    pub fn layer(&self, index: usize) -> Option<&Layer<S>> {
        self.layers.get(index)
    }
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }
    #[must_use]
    pub fn current_layer(&self) -> &Layer<S> {
        // Invariant upheld by every mutator.
        &self.layers[self.current]
    }
    pub fn current_layer_mut(&mut self) -> &mut Layer<S> {
        &mut self.layers[self.current]
    }
    /// Find a layer and its current index by ID.
    pub fn layer_by_id_mut(&mut self, id: LayerID) -> Option<(usize, &mut Layer<S>)> {
        self.layers
            .iter_mut()
            .enumerate()
            .find(|(_, layer)| layer.id == id)
    }
    /// Number of ink strokes over all layers. Pixel erases are not counted.
    #[must_use]
    pub fn total_strokes(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|layer| &layer.strokes)
            .filter(|stroke| stroke.is_ink())
            .count()
    }
    /// Replace the whole layer stack, as when restoring history.
    ///
    /// Refused if it would break the document's invariants.
    pub(crate) fn replace_layers(&mut self, layers: Vec<Layer<S>>, current: usize) -> bool {
        if current >= layers.len() {
            return false;
        }
        self.layers = layers;
        self.current = current;
        true
    }
}
