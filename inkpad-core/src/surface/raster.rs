//! Software rasterizer. Pixels are premultiplied RGBA `f32`, shapes are antialiased over a one physical
//! pixel ramp at their edge.

use super::{Surface, SurfaceError};
use crate::{color::Color, state::document::Canvas, util::Unit};

/// Upper bound on the number of segments a quadratic is flattened into.
const MAX_CURVE_SEGMENTS: usize = 64;
/// Approximate segment length when flattening, in physical pixels.
const CURVE_TOLERANCE_PX: f64 = 2.0;

#[derive(Copy, Clone, PartialEq)]
enum Op {
    /// Premultiplied source-over.
    Over([f32; 4]),
    /// Destination-out with full strength.
    Erase,
}

#[derive(Clone, PartialEq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    scale: f64,
    /// Row-major, premultiplied.
    pixels: Vec<[f32; 4]>,
}
impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("scale", &self.scale)
            .finish_non_exhaustive()
    }
}
impl RasterSurface {
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
    #[must_use]
    pub fn scale_factor(&self) -> f64 {
        self.scale
    }
    /// Premultiplied pixel at physical coordinates, or `None` if out of bounds.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.index(x, y)).copied()
    }
    /// Premultiplied pixel nearest to a logical position.
    #[must_use]
    pub fn pixel_at(&self, pos: [f64; 2]) -> Option<[f32; 4]> {
        let [x, y] = pos.map(|c| c * self.scale);
        if x < 0.0 || y < 0.0 {
            return None;
        }
        self.pixel(x as u32, y as u32)
    }
    /// All pixels, row-major and premultiplied.
    #[must_use]
    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }
    /// Raw bytes of the premultiplied float buffer.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
    /// Export as straight-alpha, 8 bit per channel RGBA, row-major.
    #[must_use]
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 4);
        for &[r, g, b, a] in &self.pixels {
            if a <= 0.0 {
                out.extend_from_slice(&[0; 4]);
                continue;
            }
            let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
            out.extend_from_slice(&[to_u8(r / a), to_u8(g / a), to_u8(b / a), to_u8(a)]);
        }
        out
    }
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
    /// Blend `op` over every pixel whose center lies within `radius` of the shape described by `distance`.
    ///
    /// `bounds` is the logical bounding box of the shape's skeleton (without radius).
    fn rasterize(
        &mut self,
        bounds: crate::util::Rect,
        radius: f64,
        op: Op,
        distance: impl Fn([f64; 2]) -> f64,
    ) {
        if !(radius > 0.0) || !radius.is_finite() {
            return;
        }
        let scale = self.scale;
        let bounds = bounds.inflate(radius);
        // One extra pixel for the antialiasing ramp.
        let to_px = |v: f64, max: u32| (v * scale).clamp(0.0, f64::from(max));
        let x0 = (to_px(bounds.min[0], self.width) - 1.0).max(0.0) as u32;
        let y0 = (to_px(bounds.min[1], self.height) - 1.0).max(0.0) as u32;
        let x1 = ((to_px(bounds.max[0], self.width) + 1.0).ceil() as u32).min(self.width);
        let y1 = ((to_px(bounds.max[1], self.height) + 1.0).ceil() as u32).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let center = [
                    (f64::from(x) + 0.5) / scale,
                    (f64::from(y) + 0.5) / scale,
                ];
                let coverage = ((radius - distance(center)) * scale + 0.5).clamp(0.0, 1.0) as f32;
                if coverage <= 0.0 {
                    continue;
                }
                let idx = self.index(x, y);
                let dst = &mut self.pixels[idx];
                match op {
                    Op::Over(src) => {
                        let inv = 1.0 - src[3] * coverage;
                        for c in 0..4 {
                            dst[c] = src[c].mul_add(coverage, dst[c] * inv);
                        }
                    }
                    Op::Erase => {
                        let keep = 1.0 - coverage;
                        for c in dst.iter_mut() {
                            *c *= keep;
                        }
                    }
                }
            }
        }
    }
    fn stroke_polyline(&mut self, points: &[[f64; 2]], width: f64, color: Color) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let bounds = rest
            .iter()
            .fold(crate::util::Rect::from_corners(*first, *first), |r, p| {
                r.union_point(*p)
            });
        // Single coverage pass over the union of all segments, so joins aren't blended twice.
        self.rasterize(bounds, width * 0.5, Op::Over(color.premultiplied()), |p| {
            if points.len() == 1 {
                return crate::util::distance_sq(p, *first).sqrt();
            }
            points
                .windows(2)
                .map(|seg| segment_distance(p, seg[0], seg[1]))
                .fold(f64::INFINITY, f64::min)
        });
    }
}

/// Distance from `p` to the segment `a -> b`.
fn segment_distance(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len_sq = ab[0].mul_add(ab[0], ab[1] * ab[1]);
    let t = if len_sq > 0.0 {
        (ap[0].mul_add(ab[0], ap[1] * ab[1]) / len_sq).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let closest = [ab[0].mul_add(t, a[0]), ab[1].mul_add(t, a[1])];
    crate::util::distance_sq(p, closest).sqrt()
}

/// Flatten a quadratic bezier into a polyline, including both endpoints.
fn flatten_quadratic(from: [f64; 2], control: [f64; 2], to: [f64; 2], scale: f64) -> Vec<[f64; 2]> {
    // Control polygon length bounds the curve length from above.
    let estimate = crate::util::distance_sq(from, control).sqrt()
        + crate::util::distance_sq(control, to).sqrt();
    let segments = ((estimate * scale / CURVE_TOLERANCE_PX).ceil() as usize).clamp(1, MAX_CURVE_SEGMENTS);
    (0..=segments)
        .map(|i| {
            let t = i as f64 / segments as f64;
            let mt = 1.0 - t;
            let (a, b, c) = (mt * mt, 2.0 * mt * t, t * t);
            [
                a * from[0] + b * control[0] + c * to[0],
                a * from[1] + b * control[1] + c * to[1],
            ]
        })
        .collect()
}

impl Surface for RasterSurface {
    fn allocate(canvas: &Canvas) -> Result<Self, SurfaceError> {
        let [width, height] = super::validate(canvas)?;
        Ok(Self {
            width,
            height,
            scale: canvas.scale_factor,
            pixels: vec![[0.0; 4]; width as usize * height as usize],
        })
    }
    fn resize(&mut self, canvas: &Canvas) -> Result<(), SurfaceError> {
        *self = Self::allocate(canvas)?;
        Ok(())
    }
    fn clear(&mut self) {
        self.pixels.fill([0.0; 4]);
    }
    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Color) {
        let bounds = crate::util::Rect::from_corners(center, center);
        self.rasterize(bounds, radius, Op::Over(color.premultiplied()), |p| {
            crate::util::distance_sq(p, center).sqrt()
        });
    }
    fn stroke_quadratic(
        &mut self,
        from: [f64; 2],
        control: [f64; 2],
        to: [f64; 2],
        width: f64,
        color: Color,
    ) {
        let points = flatten_quadratic(from, control, to, self.scale);
        self.stroke_polyline(&points, width, color);
    }
    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], width: f64, color: Color) {
        self.stroke_polyline(&[from, to], width, color);
    }
    fn erase_circle(&mut self, center: [f64; 2], radius: f64) {
        let bounds = crate::util::Rect::from_corners(center, center);
        self.rasterize(bounds, radius, Op::Erase, |p| {
            crate::util::distance_sq(p, center).sqrt()
        });
    }
    fn composite_from(&mut self, other: &Self, alpha: Unit) {
        if (self.width, self.height) != (other.width, other.height) {
            log::warn!(
                "compositing mismatched surfaces {}x{} onto {}x{}",
                other.width,
                other.height,
                self.width,
                self.height
            );
        }
        let alpha = alpha.get() as f32;
        if alpha <= 0.0 {
            return;
        }
        let width = self.width.min(other.width);
        let height = self.height.min(other.height);
        for y in 0..height {
            for x in 0..width {
                let src = other.pixels[other.index(x, y)];
                if src[3] <= 0.0 {
                    continue;
                }
                let idx = self.index(x, y);
                let dst = &mut self.pixels[idx];
                let inv = 1.0 - src[3] * alpha;
                for c in 0..4 {
                    dst[c] = src[c].mul_add(alpha, dst[c] * inv);
                }
            }
        }
    }
}
