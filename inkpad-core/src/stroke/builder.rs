//! # Stroke building and replay
//!
//! Strokes are smoothed by drawing a quadratic curve from the midpoint of each pair of neighboring samples,
//! through the sample itself, to the next midpoint. The curve is drawn incrementally as points arrive, one
//! segment per point, and in full when a layer is replayed.

use super::{Point, Stroke, StrokeKind};
use crate::{
    brush::BrushSettings,
    input::Sample,
    state::layer::Layer,
    surface::Surface,
    util::midpoint,
};

/// An open drawing session, recording into a stroke that is not yet part of any layer.
///
/// Segments are drawn onto the layer passed to each call as they arrive.
#[derive(Debug)]
pub struct StrokeBuilder {
    stroke: Stroke,
}
impl StrokeBuilder {
    /// Start an ink stroke with the brush's current color and size, drawing its first dot.
    pub fn begin<S: Surface>(sample: Sample, layer: &mut Layer<S>, brush: &BrushSettings) -> Self {
        let stroke = Stroke::new(StrokeKind::Ink, brush.color, brush.size);
        Self::start(stroke, sample, layer, brush)
    }
    /// Start an erase stroke of a fixed diameter, erasing beneath the first point.
    pub fn begin_erase<S: Surface>(sample: Sample, layer: &mut Layer<S>, size: f64) -> Self {
        let stroke = Stroke::new(StrokeKind::Erase, crate::color::Color::TRANSPARENT, size);
        // Erase strokes ignore pressure, brush settings are never consulted.
        Self::start(stroke, sample, layer, &BrushSettings::default())
    }
    fn start<S: Surface>(
        stroke: Stroke,
        sample: Sample,
        layer: &mut Layer<S>,
        brush: &BrushSettings,
    ) -> Self {
        let mut this = Self { stroke };
        this.extend(sample, layer, brush);
        this
    }
    /// Record a new sample and draw the segment it completes.
    pub fn extend<S: Surface>(&mut self, sample: Sample, layer: &mut Layer<S>, brush: &BrushSettings) {
        let size = match self.stroke.kind {
            StrokeKind::Ink => brush.width_for(self.stroke.base_size, sample.pressure),
            StrokeKind::Erase => self.stroke.base_size,
        };
        self.stroke.points.push(Point {
            x: sample.pos[0],
            y: sample.pos[1],
            pressure: sample.pressure,
            size,
        });
        render_segment(&self.stroke, &mut layer.surface);
    }
    #[must_use]
    pub fn stroke(&self) -> &Stroke {
        &self.stroke
    }
    /// Draw the final tail of the stroke and append it to `layer`.
    ///
    /// Returns the committed stroke, or `None` if there was nothing to commit.
    pub fn commit<S: Surface>(self, layer: &mut Layer<S>) -> Option<&Stroke> {
        if self.stroke.points.is_empty() {
            return None;
        }
        render_tail(&self.stroke, &mut layer.surface);
        layer.strokes.push(self.stroke);
        layer.strokes.last()
    }
}

/// Draw the segment completed by the newest point of an in-progress stroke.
///
/// O(1) regardless of stroke length.
pub fn render_segment<S: Surface>(stroke: &Stroke, surface: &mut S) {
    let points = stroke.points.as_slice();
    match (stroke.kind, points) {
        (_, []) => (),
        (StrokeKind::Erase, [.., last]) => surface.erase_circle(last.pos(), last.size * 0.5),
        (StrokeKind::Ink, [only]) => surface.fill_circle(only.pos(), only.size * 0.5, stroke.color),
        (StrokeKind::Ink, [first, second]) => surface.stroke_line(
            first.pos(),
            midpoint(first.pos(), second.pos()),
            first.size,
            stroke.color,
        ),
        (StrokeKind::Ink, [.., a, b, c]) => surface.stroke_quadratic(
            midpoint(a.pos(), b.pos()),
            b.pos(),
            midpoint(b.pos(), c.pos()),
            b.size,
            stroke.color,
        ),
    }
}

/// Draw the straight tail from the last midpoint to the last point, which incremental rendering leaves out.
fn render_tail<S: Surface>(stroke: &Stroke, surface: &mut S) {
    if stroke.kind != StrokeKind::Ink {
        return;
    }
    if let [.., prev, last] = stroke.points.as_slice() {
        surface.stroke_line(
            midpoint(prev.pos(), last.pos()),
            last.pos(),
            last.size,
            stroke.color,
        );
    }
}

/// Draw a complete stroke, as when rebuilding a layer from its stroke list.
pub fn render_stroke<S: Surface>(stroke: &Stroke, surface: &mut S) {
    let points = stroke.points.as_slice();
    if stroke.kind == StrokeKind::Erase {
        for point in points {
            surface.erase_circle(point.pos(), point.size * 0.5);
        }
        return;
    }
    match points {
        [] => (),
        [only] => surface.fill_circle(only.pos(), only.size * 0.5, stroke.color),
        [first, last] => surface.stroke_line(first.pos(), last.pos(), last.size, stroke.color),
        [.., prev, last] => {
            for window in points.windows(3) {
                let [a, b, c] = [window[0], window[1], window[2]];
                surface.stroke_quadratic(
                    midpoint(a.pos(), b.pos()),
                    b.pos(),
                    midpoint(b.pos(), c.pos()),
                    b.size,
                    stroke.color,
                );
            }
            surface.stroke_line(
                midpoint(prev.pos(), last.pos()),
                last.pos(),
                last.size,
                stroke.color,
            );
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        state::document::Canvas,
        stroke::test::stroke_through,
        surface::{recording::DrawOp, RecordingSurface},
        util::Unit,
    };
    fn layer() -> Layer<RecordingSurface> {
        let surface = RecordingSurface::allocate(&Canvas::default()).unwrap();
        Layer::new("Test".to_owned(), surface)
    }
    fn sample(x: f64, y: f64) -> Sample {
        Sample {
            pos: [x, y],
            pressure: Unit::HALF,
        }
    }
    #[test]
    fn replay_single_point_is_dot() {
        let mut surface = RecordingSurface::allocate(&Canvas::default()).unwrap();
        render_stroke(&stroke_through(&[[3.0, 4.0]]), &mut surface);
        assert_eq!(
            surface.ops,
            [DrawOp::FillCircle {
                center: [3.0, 4.0],
                radius: 2.0,
                color: crate::color::Color::BLACK
            }]
        );
    }
    #[test]
    fn replay_midpoint_quadratics() {
        let mut surface = RecordingSurface::allocate(&Canvas::default()).unwrap();
        let stroke = stroke_through(&[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0]]);
        render_stroke(&stroke, &mut surface);
        let black = crate::color::Color::BLACK;
        assert_eq!(
            surface.ops,
            [
                DrawOp::Quadratic {
                    from: [5.0, 0.0],
                    control: [10.0, 0.0],
                    to: [10.0, 5.0],
                    width: 4.0,
                    color: black
                },
                DrawOp::Quadratic {
                    from: [10.0, 5.0],
                    control: [10.0, 10.0],
                    to: [5.0, 10.0],
                    width: 4.0,
                    color: black
                },
                DrawOp::Line {
                    from: [5.0, 10.0],
                    to: [0.0, 10.0],
                    width: 4.0,
                    color: black
                },
            ]
        );
    }
    #[test]
    fn replay_two_points_is_line() {
        let mut surface = RecordingSurface::allocate(&Canvas::default()).unwrap();
        render_stroke(&stroke_through(&[[0.0, 0.0], [8.0, 0.0]]), &mut surface);
        assert_eq!(
            surface.ops,
            [DrawOp::Line {
                from: [0.0, 0.0],
                to: [8.0, 0.0],
                width: 4.0,
                color: crate::color::Color::BLACK
            }]
        );
    }
    #[test]
    fn incremental_is_one_op_per_point() {
        let mut layer = layer();
        let brush = BrushSettings::default();
        let mut builder = StrokeBuilder::begin(sample(0.0, 0.0), &mut layer, &brush);
        for i in 1..50 {
            let before = layer.surface.ops.len();
            builder.extend(sample(f64::from(i), 0.0), &mut layer, &brush);
            assert_eq!(layer.surface.ops.len(), before + 1);
        }
        assert_eq!(builder.stroke().points.len(), 50);
        let committed = builder.commit(&mut layer).unwrap().clone();
        assert_eq!(layer.strokes, [committed]);
        // dot, line, 48 quadratics, tail.
        assert_eq!(layer.surface.ops.len(), 51);
    }
    #[test]
    fn pressure_maps_width() {
        let mut layer = layer();
        let brush = BrushSettings {
            size: 10.0,
            pressure_factor: 1.0,
            pressure_enabled: true,
            ..Default::default()
        };
        let mut builder = StrokeBuilder::begin(sample(0.0, 0.0), &mut layer, &brush);
        builder.extend(
            Sample {
                pos: [1.0, 0.0],
                pressure: Unit::ONE,
            },
            &mut layer,
            &brush,
        );
        let sizes: Vec<_> = builder.stroke().points.iter().map(|p| p.size).collect();
        assert_eq!(sizes, [10.0, 15.0]);
        assert_eq!(builder.stroke().base_size, 10.0);
    }
    #[test]
    fn erase_stroke_has_fixed_size() {
        let mut layer = layer();
        let brush = BrushSettings::default();
        let mut builder = StrokeBuilder::begin_erase(sample(0.0, 0.0), &mut layer, 20.0);
        builder.extend(
            Sample {
                pos: [5.0, 0.0],
                pressure: Unit::ONE,
            },
            &mut layer,
            &brush,
        );
        let stroke = builder.commit(&mut layer).unwrap();
        assert_eq!(stroke.kind, StrokeKind::Erase);
        assert!(stroke.points.iter().all(|p| p.size == 20.0));
        assert_eq!(
            layer.surface.ops,
            [
                DrawOp::EraseCircle {
                    center: [0.0, 0.0],
                    radius: 10.0
                },
                DrawOp::EraseCircle {
                    center: [5.0, 0.0],
                    radius: 10.0
                },
            ]
        );
    }
}
