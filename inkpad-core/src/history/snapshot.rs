use crate::{
    state::{Document, Layer, LayerID},
    stroke::Stroke,
    surface::{Surface, SurfaceError},
    util::Unit,
};

/// The vector state of one layer at the time of capture.
#[derive(Clone, PartialEq, Debug)]
pub struct LayerSnapshot {
    pub id: LayerID,
    pub name: String,
    pub visible: bool,
    pub opacity: Unit,
    pub strokes: Vec<Stroke>,
}

/// A deep copy of the document's vector state. Raster surfaces are not included, they are rebuilt from the
/// strokes on restore.
#[derive(Clone, PartialEq, Debug)]
pub struct Snapshot {
    layers: Vec<LayerSnapshot>,
    current: usize,
}
impl Snapshot {
    #[must_use]
    pub fn capture<S>(document: &Document<S>) -> Self {
        let layers = document
            .layers()
            .iter()
            .map(|layer| LayerSnapshot {
                id: layer.id,
                name: layer.name.clone(),
                visible: layer.visible,
                opacity: layer.opacity,
                strokes: layer.strokes.clone(),
            })
            .collect();
        Self {
            layers,
            current: document.current_index(),
        }
    }
    #[must_use]
    pub fn layers(&self) -> &[LayerSnapshot] {
        &self.layers
    }
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }
    /// Number of ink strokes, as [`Document::total_strokes`].
    #[must_use]
    pub fn total_strokes(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|layer| &layer.strokes)
            .filter(|stroke| stroke.is_ink())
            .count()
    }
    /// Replace the document's layers and active index with copies of this snapshot, on freshly allocated
    /// surfaces at the document's current canvas size.
    ///
    /// Layers still alive in the document keep their live name, visibility, and opacity. Layers that have
    /// since been deleted come back as they were.
    ///
    /// All surfaces are allocated before the document is touched, so on error nothing has changed.
    pub fn restore<S: Surface>(&self, document: &mut Document<S>) -> Result<(), SurfaceError> {
        let canvas = *document.canvas();
        let surfaces = self
            .layers
            .iter()
            .map(|_| S::allocate(&canvas))
            .collect::<Result<Vec<_>, _>>()?;

        let mut layers: Vec<Layer<S>> = self
            .layers
            .iter()
            .zip(surfaces)
            .map(|(snapshot, surface)| {
                let live = document.layers().iter().find(|live| live.id == snapshot.id);
                Layer {
                    id: snapshot.id,
                    name: live.map_or_else(|| snapshot.name.clone(), |live| live.name.clone()),
                    visible: live.map_or(snapshot.visible, |live| live.visible),
                    opacity: live.map_or(snapshot.opacity, |live| live.opacity),
                    strokes: snapshot.strokes.clone(),
                    surface,
                }
            })
            .collect();
        crate::compositor::rebuild_all(&mut layers);

        let replaced = document.replace_layers(layers, self.current);
        debug_assert!(replaced, "captured snapshot has an invalid layer index");
        Ok(())
    }
}
