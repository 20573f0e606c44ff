//! # Notifications
//!
//! Fire-and-forget messages from the engine to its host, delivered in the order the mutations happened.

use crate::stroke::Stroke;

bitflags::bitflags! {
    #[derive(Copy, Clone, Eq, PartialEq, Hash, bytemuck::Pod, bytemuck::Zeroable, Debug)]
    /// Capabilities advertised by the engine on startup.
    #[rustfmt::skip]
    #[repr(transparent)]
    pub struct Features : u8 {
        /// Pen pressure modulates stroke width.
        const PRESSURE =     0b0000_0001;
        /// Multiple layers, with visibility and opacity.
        const LAYERS =       0b0000_0010;
        const UNDO_REDO =    0b0000_0100;
        const PIXEL_ERASE =  0b0000_1000;
        const STROKE_ERASE = 0b0001_0000;
        const RECT_ERASE =   0b0010_0000;
    }
}

#[derive(Clone, PartialEq, Debug, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum Notification {
    /// The engine has been constructed and is accepting input.
    Ready {
        version: &'static str,
        features: Features,
    },
    /// A stroke was committed to a layer.
    StrokeAdded { stroke: Stroke, layer_index: usize },
    /// The active layer, or the layer stack, changed.
    LayerChanged {
        current_layer: usize,
        total_layers: usize,
        layer_name: String,
    },
}

/// Somewhere to deliver [`Notification`]s.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

impl NotificationSink for crossbeam::channel::Sender<Notification> {
    fn notify(&mut self, notification: Notification) {
        if let Err(crossbeam::channel::SendError(lost)) = self.send(notification) {
            // Nobody is listening, that's their prerogative.
            log::trace!("dropped {} notification", lost.as_ref());
        }
    }
}
/// Collects every notification, for inspection.
impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}
/// Discards every notification.
impl NotificationSink for () {
    fn notify(&mut self, _: Notification) {}
}
