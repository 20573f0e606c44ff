//! # Strokes
//!
//! Vector strokes as recorded from a pointer. Strokes are the ground truth of a layer: the layer's raster
//! surface is only a cache that can be regenerated by replaying its strokes.

pub mod builder;

use crate::util::{self, Rect, Unit};

pub type StrokeID = crate::id::Id<Stroke>;

/// A single recorded pointer sample, in logical units.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub pressure: Unit,
    /// Final width of the stroke at this point, after pressure mapping.
    pub size: f64,
}
impl Point {
    #[must_use]
    pub fn pos(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, strum::AsRefStr)]
pub enum StrokeKind {
    /// Paints the stroke's color.
    Ink,
    /// Removes pixels beneath each point, as a circle of the point's size.
    Erase,
}

#[derive(Clone, PartialEq, Debug)]
pub struct Stroke {
    pub id: StrokeID,
    pub kind: StrokeKind,
    pub color: crate::color::Color,
    pub base_size: f64,
    /// Invariant: non-empty once committed to a layer.
    pub points: Vec<Point>,
}
impl Stroke {
    /// An empty in-progress stroke with a fresh ID.
    #[must_use]
    pub fn new(kind: StrokeKind, color: crate::color::Color, base_size: f64) -> Self {
        Self {
            id: StrokeID::default(),
            kind,
            color,
            base_size,
            points: Vec::new(),
        }
    }
    #[must_use]
    pub fn is_ink(&self) -> bool {
        self.kind == StrokeKind::Ink
    }
    /// Bounding box of the painted area, including each point's radius. `None` if empty.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let (first, rest) = self.points.split_first()?;
        let radius = |p: &Point| p.size * 0.5;
        let start = Rect::from_corners(first.pos(), first.pos()).inflate(radius(first));
        Some(rest.iter().fold(start, |rect, point| {
            let r = radius(point);
            rect.union_point([point.x - r, point.y - r])
                .union_point([point.x + r, point.y + r])
        }))
    }
}

/// Whether any recorded point of `stroke` lies within `threshold` of `point`.
///
/// Only sample points are tested, not the curve between them.
#[must_use]
pub fn is_point_near_stroke(point: [f64; 2], stroke: &Stroke, threshold: f64) -> bool {
    let threshold_sq = threshold * threshold;
    stroke
        .points
        .iter()
        .any(|p| util::distance_sq(p.pos(), point) <= threshold_sq)
}
