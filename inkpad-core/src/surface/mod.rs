//! # Surfaces
//!
//! A surface is a 2D raster target owned by a layer or by the display. The engine only ever talks to
//! surfaces through the [`Surface`] trait, in logical coordinates. Implementations map those to physical
//! pixels using the canvas' scale factor.
//!
//! Two implementations are provided: [`raster::RasterSurface`], a software RGBA buffer, and
//! [`recording::RecordingSurface`], which keeps a list of the calls made on it for inspection.

pub mod raster;
pub mod recording;

pub use raster::RasterSurface;
pub use recording::RecordingSurface;

use crate::{color::Color, state::document::Canvas, util::Rect, util::Unit};

/// Largest surface we are willing to allocate, in physical pixels.
pub const MAX_PIXELS: u64 = 1 << 28;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("surface has no area ({width}x{height})")]
    ZeroSized { width: u32, height: u32 },
    #[error("surface of {width}x{height} is too large")]
    TooLarge { width: u32, height: u32 },
}

/// Check that a canvas can back a surface, returning its physical size.
pub fn validate(canvas: &Canvas) -> Result<[u32; 2], SurfaceError> {
    let [width, height] = canvas.size_physical_pixels();
    if width == 0 || height == 0 {
        Err(SurfaceError::ZeroSized { width, height })
    } else if u64::from(width) * u64::from(height) > MAX_PIXELS {
        Err(SurfaceError::TooLarge { width, height })
    } else {
        Ok([width, height])
    }
}

/// Dash pattern of [`Surface::stroke_dashed_rect`], in logical units: (on, off).
pub const DASH: (f64, f64) = (6.0, 4.0);

pub trait Surface: Sized {
    /// Allocate a new, fully transparent surface covering `canvas`.
    fn allocate(canvas: &Canvas) -> Result<Self, SurfaceError>;
    /// Reallocate at a new size. On error, `self` is left unchanged. Contents are cleared on success.
    fn resize(&mut self, canvas: &Canvas) -> Result<(), SurfaceError>;
    /// Set every pixel to transparent.
    fn clear(&mut self);
    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Color);
    /// Stroke the quadratic bezier `from -> to` with control point `control`, with round caps.
    fn stroke_quadratic(
        &mut self,
        from: [f64; 2],
        control: [f64; 2],
        to: [f64; 2],
        width: f64,
        color: Color,
    );
    /// Stroke a straight segment with round caps.
    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], width: f64, color: Color);
    /// Make pixels within the circle transparent (destination-out).
    fn erase_circle(&mut self, center: [f64; 2], radius: f64);
    /// Blend `other` over `self`, with every source pixel's alpha multiplied by `alpha`.
    fn composite_from(&mut self, other: &Self, alpha: Unit);
    /// Outline `rect` with a one unit dashed line. Used for previews only.
    fn stroke_dashed_rect(&mut self, rect: Rect, color: Color) {
        let corners = [
            rect.min,
            [rect.max[0], rect.min[1]],
            rect.max,
            [rect.min[0], rect.max[1]],
        ];
        for i in 0..corners.len() {
            let from = corners[i];
            let to = corners[(i + 1) % corners.len()];
            let length = crate::util::distance_sq(from, to).sqrt();
            if length <= 0.0 {
                continue;
            }
            let dir = [(to[0] - from[0]) / length, (to[1] - from[1]) / length];
            let at = |t: f64| [from[0] + dir[0] * t, from[1] + dir[1] * t];
            let mut start = 0.0;
            while start < length {
                let end = (start + DASH.0).min(length);
                self.stroke_line(at(start), at(end), 1.0, color);
                start += DASH.0 + DASH.1;
            }
        }
    }
}
