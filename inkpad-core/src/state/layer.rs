use crate::{
    stroke::Stroke,
    util::Unit,
};

/// Layers are namespaced without their surface type, so IDs are shared between surface kinds.
pub type LayerID = crate::id::Id<Layer<()>>;

/// One independently visible sheet of strokes, with its own raster cache.
///
/// `surface` is derived data: it must always be reproducible by replaying `strokes` in order.
#[derive(Debug)]
pub struct Layer<S> {
    pub id: LayerID,
    pub name: String,
    pub visible: bool,
    pub opacity: Unit,
    /// Paint order, first is bottom.
    pub strokes: Vec<Stroke>,
    pub surface: S,
}
impl<S> Layer<S> {
    /// An empty, visible, fully opaque layer.
    pub fn new(name: String, surface: S) -> Self {
        Self {
            id: LayerID::default(),
            name,
            visible: true,
            opacity: Unit::ONE,
            strokes: Vec::new(),
            surface,
        }
    }
}
