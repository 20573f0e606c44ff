#[derive(Copy, Clone, PartialEq, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// The drawable area. Strokes are stored in logical units, surfaces are allocated in physical pixels.
pub struct Canvas {
    /// Width in logical pixels.
    pub width: f64,
    /// Height in logical pixels.
    pub height: f64,
    /// Ratio of physical pixels per logical pixel (the device pixel ratio).
    pub scale_factor: f64,
}
impl Canvas {
    /// Get the size of the canvas, in rounded physical pixels.
    /// Non-finite or negative dimensions come out as zero.
    #[must_use]
    pub fn size_physical_pixels(&self) -> [u32; 2] {
        [self.width, self.height]
            .map(|logical| logical * self.scale_factor)
            // `as` saturates, NaN becomes 0.
            .map(|physical| physical.round() as u32)
    }
}
impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1080.0,
            height: 1080.0,
            scale_factor: 1.0,
        }
    }
}
