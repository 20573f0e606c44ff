//! # Erasing
//!
//! Three policies, chosen by [`EraserMode`](crate::brush::EraserMode):
//! * Pixel: record an erase stroke, punching holes into the layer as the pointer moves. See
//!   [`StrokeBuilder::begin_erase`](crate::stroke::builder::StrokeBuilder::begin_erase).
//! * Stroke: remove every ink stroke with a sample near the pointer.
//! * Rect: drag out a rectangle, then remove every ink stroke whose bounds touch it.
//!
//! Erase strokes themselves are never hit by stroke or rect erasing.

use crate::{
    color::Color,
    state::layer::Layer,
    stroke::{is_point_near_stroke, Stroke},
    surface::Surface,
    util::Rect,
};

/// Indices into a layer's stroke list. Most erases hit a handful of strokes at most.
pub type Hits = smallvec::SmallVec<[usize; 8]>;

/// Color of the rectangle drawn while dragging in rect mode.
pub const RECT_PREVIEW_COLOR: Color = Color::BLACK;

/// Indices of every ink stroke with a sample within `threshold` of `point`, topmost first.
#[must_use]
pub fn strokes_near(strokes: &[Stroke], point: [f64; 2], threshold: f64) -> Hits {
    strokes
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, stroke)| stroke.is_ink() && is_point_near_stroke(point, stroke, threshold))
        .map(|(idx, _)| idx)
        .collect()
}

/// Indices of every ink stroke whose bounds intersect `rect`, topmost first.
///
/// A rectangle without area hits nothing.
#[must_use]
pub fn strokes_in_rect(strokes: &[Stroke], rect: Rect) -> Hits {
    if rect.is_empty() {
        return Hits::new();
    }
    strokes
        .iter()
        .enumerate()
        .rev()
        .filter(|(_, stroke)| {
            stroke.is_ink()
                && stroke
                    .bounds()
                    .is_some_and(|bounds| bounds.intersects(&rect))
        })
        .map(|(idx, _)| idx)
        .collect()
}

/// Remove the strokes at `hits` in one pass and rebuild the layer if any were removed.
///
/// Returns the number removed.
pub fn remove_strokes<S: Surface>(layer: &mut Layer<S>, hits: &[usize]) -> usize {
    if hits.is_empty() {
        return 0;
    }
    let before = layer.strokes.len();
    let mut idx = 0;
    layer.strokes.retain(|_| {
        let keep = !hits.contains(&idx);
        idx += 1;
        keep
    });
    let removed = before - layer.strokes.len();
    if removed > 0 {
        crate::compositor::rebuild_layer(layer);
    }
    removed
}

/// Stroke-mode erase at `point`. Returns the number of strokes removed.
pub fn erase_strokes_at<S: Surface>(layer: &mut Layer<S>, point: [f64; 2], threshold: f64) -> usize {
    let hits = strokes_near(&layer.strokes, point, threshold);
    remove_strokes(layer, &hits)
}

/// Rect-mode erase of `rect`. Returns the number of strokes removed.
pub fn erase_strokes_in_rect<S: Surface>(layer: &mut Layer<S>, rect: Rect) -> usize {
    let hits = strokes_in_rect(&layer.strokes, rect);
    remove_strokes(layer, &hits)
}

/// Outline the pending rect-mode selection on the display.
pub fn draw_rect_preview<S: Surface>(display: &mut S, rect: Rect) {
    display.stroke_dashed_rect(rect, RECT_PREVIEW_COLOR);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        state::document::Canvas,
        stroke::{test::stroke_through, StrokeKind},
        surface::{recording::DrawOp, RecordingSurface},
    };
    fn layer(strokes: Vec<Stroke>) -> Layer<RecordingSurface> {
        let mut layer = Layer::new(
            "Eraser".to_owned(),
            RecordingSurface::allocate(&Canvas::default()).unwrap(),
        );
        layer.strokes = strokes;
        layer
    }
    #[test]
    fn near_strokes_removed_together() {
        let near_a = stroke_through(&[[0.0, 0.0], [53.0, 54.0]]);
        let far = stroke_through(&[[90.0, 50.0], [100.0, 100.0]]);
        let near_b = stroke_through(&[[50.0, 45.0]]);
        let mut layer = layer(vec![near_a, far.clone(), near_b]);

        assert_eq!(strokes_near(&layer.strokes, [50.0, 50.0], 10.0).as_slice(), [2, 0]);
        assert_eq!(erase_strokes_at(&mut layer, [50.0, 50.0], 10.0), 2);
        assert_eq!(layer.strokes, [far]);
        // Rebuilt once.
        assert_eq!(
            layer
                .surface
                .ops
                .iter()
                .filter(|op| **op == DrawOp::Clear)
                .count(),
            1
        );
    }
    #[test]
    fn miss_does_not_rebuild() {
        let mut layer = layer(vec![stroke_through(&[[0.0, 0.0]])]);
        assert_eq!(erase_strokes_at(&mut layer, [500.0, 500.0], 10.0), 0);
        assert!(layer.surface.ops.is_empty());
    }
    #[test]
    fn erase_strokes_are_immune() {
        let mut erase = stroke_through(&[[0.0, 0.0]]);
        erase.kind = StrokeKind::Erase;
        let strokes = vec![erase];
        assert!(strokes_near(&strokes, [0.0, 0.0], 10.0).is_empty());
        let rect = Rect::from_corners([-5.0, -5.0], [5.0, 5.0]);
        assert!(strokes_in_rect(&strokes, rect).is_empty());
    }
    #[test]
    fn rect_hits_bounds() {
        // Bounds of a size-4 stroke reach 2 units past its points.
        let inside = stroke_through(&[[10.0, 10.0], [20.0, 20.0]]);
        let grazing = stroke_through(&[[32.0, 10.0]]);
        let outside = stroke_through(&[[40.0, 40.0]]);
        let mut layer = layer(vec![inside, grazing, outside.clone()]);
        let rect = Rect::from_corners([30.0, 0.0], [0.0, 30.0]);
        assert_eq!(erase_strokes_in_rect(&mut layer, rect), 2);
        assert_eq!(layer.strokes, [outside]);
    }
    #[test]
    fn empty_rect_hits_nothing() {
        let layer = layer(vec![stroke_through(&[[10.0, 10.0]])]);
        let click = Rect::from_corners([10.0, 10.0], [10.0, 10.0]);
        assert!(strokes_in_rect(&layer.strokes, click).is_empty());
    }
}
