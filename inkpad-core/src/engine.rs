//! # Engine
//!
//! Owns the document, its display, and its history, and routes pointer input to the active tool.
//!
//! A session spans pointer-down to pointer-up or pointer-leave. While erasing is off, a session draws an ink
//! stroke onto the active layer. While erasing is on, the [`EraserMode`] decides what a session does.
//! Every structural change ends in exactly one history snapshot.
//!
//! Nothing here fails loudly. Out of range indices, undo or redo at the ends of history, and surfaces that
//! could not be allocated all leave the engine as it was.

use crate::{
    brush::{BrushSettings, EraserMode, EraserSettings},
    color::Color,
    compositor, eraser,
    events::{Features, Notification, NotificationSink},
    history::{History, Snapshot},
    input::{PointerEvent, PointerPhase},
    state::{Canvas, Document, LayerID},
    stroke::builder::StrokeBuilder,
    surface::{Surface, SurfaceError},
    util::Rect,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything the engine can do, reported on [`Notification::Ready`].
pub const FEATURES: Features = Features::all();

/// Initial engine state.
#[derive(Clone, Debug, Default)]
pub struct EngineConfig {
    pub canvas: Canvas,
    pub brush: BrushSettings,
    pub eraser: EraserSettings,
    /// Maximum number of history snapshots, see [`History::new`].
    pub history_limit: Option<usize>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Stats {
    pub total_layers: usize,
    pub total_strokes: usize,
    pub current_layer: usize,
}

#[derive(Debug)]
enum Session {
    /// Recording an ink or pixel-erase stroke into `layer`.
    Stroke {
        layer: LayerID,
        builder: StrokeBuilder,
    },
    /// Removing whole strokes as the pointer passes over them.
    StrokeErase,
    /// Dragging out a rectangle to erase on release.
    RectErase {
        layer: LayerID,
        anchor: [f64; 2],
        corner: [f64; 2],
    },
}

pub struct Engine<S, N = ()> {
    document: Document<S>,
    display: S,
    history: History,
    brush: BrushSettings,
    eraser: EraserSettings,
    erasing: bool,
    session: Option<Session>,
    sink: N,
}

impl<S: Surface, N: NotificationSink> Engine<S, N> {
    /// Create an engine with one empty layer and an initial history snapshot.
    ///
    /// Fails only if the canvas cannot back a surface.
    pub fn new(config: EngineConfig, sink: N) -> Result<Self, SurfaceError> {
        let document = Document::new(config.canvas)?;
        let display = S::allocate(&config.canvas)?;
        let history = config.history_limit.map_or_else(History::default, History::new);
        let mut this = Self {
            document,
            display,
            history,
            brush: config.brush,
            eraser: config.eraser,
            erasing: false,
            session: None,
            sink,
        };
        this.composite();
        this.push_history();
        log::info!(
            "engine {VERSION} ready, {}x{} @ {}x",
            config.canvas.width,
            config.canvas.height,
            config.canvas.scale_factor
        );
        this.sink.notify(Notification::Ready {
            version: VERSION,
            features: FEATURES,
        });
        Ok(this)
    }

    // ================ Tool settings ================

    /// Set the base ink width. Ignored unless finite and positive.
    pub fn set_brush_size(&mut self, size: f64) {
        if size.is_finite() && size > 0.0 {
            self.brush.size = size;
        } else {
            log::warn!("ignoring brush size {size}");
        }
    }
    pub fn set_brush_color(&mut self, color: Color) {
        self.brush.color = color;
    }
    pub fn set_pressure_enabled(&mut self, enabled: bool) {
        self.brush.pressure_enabled = enabled;
    }
    /// Ignored unless finite and non-negative.
    pub fn set_pressure_factor(&mut self, factor: f64) {
        if factor.is_finite() && factor >= 0.0 {
            self.brush.pressure_factor = factor;
        } else {
            log::warn!("ignoring pressure factor {factor}");
        }
    }
    /// Ignored unless finite and positive.
    pub fn set_eraser_size(&mut self, size: f64) {
        if size.is_finite() && size > 0.0 {
            self.eraser.size = size;
        } else {
            log::warn!("ignoring eraser size {size}");
        }
    }
    /// Change the erase policy, ending any open session first.
    pub fn set_eraser_mode(&mut self, mode: EraserMode) {
        if mode != self.eraser.mode {
            self.end_session();
            self.eraser.mode = mode;
        }
    }
    /// Switch between drawing and erasing, ending any open session first.
    pub fn set_erasing(&mut self, erasing: bool) {
        if erasing != self.erasing {
            self.end_session();
            self.erasing = erasing;
        }
    }

    // ================ Layers ================

    /// Append a new empty layer and make it active.
    pub fn create_layer(&mut self) {
        self.end_session();
        match self.document.create_layer() {
            Ok(_) => {
                self.composite();
                self.push_history();
                self.notify_layer_changed();
            }
            Err(err) => log::warn!("failed to create layer: {err}"),
        }
    }
    /// Make the layer at `index` active. An open session keeps drawing into its original layer.
    pub fn switch_layer(&mut self, index: usize) {
        if self.document.switch_layer(index) {
            self.notify_layer_changed();
        }
    }
    /// Remove the layer at `index`, unless it is the last one.
    pub fn delete_layer(&mut self, index: usize) {
        self.end_session();
        if self.document.delete_layer(index) {
            self.composite();
            self.push_history();
            self.notify_layer_changed();
        }
    }
    /// Remove every stroke from the layer at `index`.
    pub fn clear_layer(&mut self, index: usize) {
        self.end_session();
        if self.document.clear_layer(index) {
            self.composite();
            self.push_history();
        }
    }
    pub fn set_layer_visibility(&mut self, index: usize, visible: bool) {
        if self.document.set_visibility(index, visible) {
            self.composite();
        }
    }
    /// Opacity is clamped to `[0, 1]`, non-finite values are ignored.
    pub fn set_layer_opacity(&mut self, index: usize, opacity: f64) {
        if self.document.set_opacity(index, opacity) {
            self.composite();
        }
    }
    pub fn rename_layer(&mut self, index: usize, name: impl Into<String>) {
        if self.document.rename_layer(index, name.into()) && index == self.document.current_index() {
            self.notify_layer_changed();
        }
    }

    // ================ History ================

    pub fn undo(&mut self) {
        self.end_session();
        let before = self.layer_position();
        if self.history.undo(&mut self.document) {
            self.after_restore(before);
        }
    }
    pub fn redo(&mut self) {
        self.end_session();
        let before = self.layer_position();
        if self.history.redo(&mut self.document) {
            self.after_restore(before);
        }
    }
    fn after_restore(&mut self, before: (usize, usize)) {
        self.composite();
        if self.layer_position() != before {
            self.notify_layer_changed();
        }
    }

    // ================ Canvas ================

    /// Reallocate every surface at a new canvas size or scale, replaying each layer's strokes.
    ///
    /// If the new canvas cannot back a surface, nothing changes.
    pub fn resize(&mut self, canvas: Canvas) {
        self.end_session();
        let resized = S::allocate(&canvas).and_then(|display| {
            self.document.resize(canvas)?;
            Ok(display)
        });
        match resized {
            Ok(display) => self.display = display,
            Err(err) => {
                log::warn!("failed to resize to {}x{}: {err}", canvas.width, canvas.height);
                return;
            }
        }
        log::debug!(
            "resized to {}x{} @ {}x",
            canvas.width,
            canvas.height,
            canvas.scale_factor
        );
        self.composite();
    }

    // ================ Pointer input ================

    pub fn pointer(&mut self, phase: PointerPhase, event: PointerEvent) {
        match phase {
            PointerPhase::Down => self.pointer_down(event),
            PointerPhase::Move => self.pointer_move(event),
            PointerPhase::Up => self.pointer_up(event),
            PointerPhase::Leave => self.pointer_leave(event),
        }
    }
    /// Start a session at the event's position. A session already open is ended first.
    pub fn pointer_down(&mut self, event: PointerEvent) {
        let Some(sample) = event.normalize() else {
            return;
        };
        if self.session.is_some() {
            log::debug!("pointer down during an open session, ending it");
            self.end_session();
        }
        let erasing = self.erasing.then_some(self.eraser.mode);
        let layer = self.document.current_layer_mut();
        let layer_id = layer.id;
        let session = match erasing {
            None => Session::Stroke {
                layer: layer_id,
                builder: StrokeBuilder::begin(sample, layer, &self.brush),
            },
            Some(EraserMode::Pixel) => Session::Stroke {
                layer: layer_id,
                builder: StrokeBuilder::begin_erase(sample, layer, self.eraser.size),
            },
            Some(EraserMode::Stroke) => {
                self.erase_strokes_at(sample.pos);
                Session::StrokeErase
            }
            Some(EraserMode::Rect) => Session::RectErase {
                layer: layer_id,
                anchor: sample.pos,
                corner: sample.pos,
            },
        };
        log::trace!("begin {:?} at {:?}", erasing, sample.pos);
        if matches!(session, Session::Stroke { .. }) {
            self.composite();
        }
        self.session = Some(session);
    }
    /// Extend the open session. Moves without a session are ignored.
    pub fn pointer_move(&mut self, event: PointerEvent) {
        let Some(sample) = event.normalize() else {
            return;
        };
        let Some(mut session) = self.session.take() else {
            return;
        };
        match &mut session {
            Session::Stroke { layer, builder } => {
                if let Some((_, layer)) = self.document.layer_by_id_mut(*layer) {
                    builder.extend(sample, layer, &self.brush);
                    self.composite();
                }
            }
            Session::StrokeErase => self.erase_strokes_at(sample.pos),
            Session::RectErase { anchor, corner, .. } => {
                *corner = sample.pos;
                self.composite();
                eraser::draw_rect_preview(&mut self.display, Rect::from_corners(*anchor, *corner));
            }
        }
        self.session = Some(session);
    }
    /// End the open session. A rect selection takes the event's position as its final corner.
    pub fn pointer_up(&mut self, event: PointerEvent) {
        if let (Some(sample), Some(Session::RectErase { corner, .. })) =
            (event.normalize(), self.session.as_mut())
        {
            *corner = sample.pos;
        }
        self.end_session();
    }
    /// Identical to [`Engine::pointer_up`]: the open session is committed, not discarded.
    pub fn pointer_leave(&mut self, event: PointerEvent) {
        self.pointer_up(event);
    }
    /// Commit whatever the open session produced.
    fn end_session(&mut self) {
        let Some(session) = self.session.take() else {
            return;
        };
        match session {
            Session::Stroke { layer, builder } => {
                let Some((layer_index, layer)) = self.document.layer_by_id_mut(layer) else {
                    log::warn!("layer {layer} vanished during a session, discarding stroke");
                    return;
                };
                let Some(stroke) = builder.commit(layer) else {
                    return;
                };
                log::trace!("committed {} with {} points", stroke.id, stroke.points.len());
                let added = stroke.is_ink().then(|| Notification::StrokeAdded {
                    stroke: stroke.clone(),
                    layer_index,
                });
                self.composite();
                self.push_history();
                if let Some(added) = added {
                    self.sink.notify(added);
                }
            }
            // Each hit was already recorded as it happened.
            Session::StrokeErase => (),
            Session::RectErase {
                layer,
                anchor,
                corner,
            } => {
                let rect = Rect::from_corners(anchor, corner);
                let removed = self
                    .document
                    .layer_by_id_mut(layer)
                    .map_or(0, |(_, layer)| eraser::erase_strokes_in_rect(layer, rect));
                // Also clears the preview.
                self.composite();
                if removed > 0 {
                    log::debug!("rect erase removed {removed} strokes");
                    self.push_history();
                }
            }
        }
    }
    fn erase_strokes_at(&mut self, point: [f64; 2]) {
        let layer = self.document.current_layer_mut();
        let removed = eraser::erase_strokes_at(layer, point, self.eraser.size);
        if removed > 0 {
            log::debug!("stroke erase removed {removed} strokes");
            self.composite();
            self.push_history();
        }
    }

    fn composite(&mut self) {
        compositor::composite_display(self.document.layers(), &mut self.display);
    }
    fn push_history(&mut self) {
        self.history.push(Snapshot::capture(&self.document));
    }
}

impl<S, N: NotificationSink> Engine<S, N> {
    fn layer_position(&self) -> (usize, usize) {
        (self.document.current_index(), self.document.layers().len())
    }
    fn notify_layer_changed(&mut self) {
        let layer_name = self.document.current_layer().name.clone();
        self.sink.notify(Notification::LayerChanged {
            current_layer: self.document.current_index(),
            total_layers: self.document.layers().len(),
            layer_name,
        });
    }
}

impl<S, N> Engine<S, N> {
    #[must_use]
    pub fn stats(&self) -> Stats {
        Stats {
            total_layers: self.document.layers().len(),
            total_strokes: self.document.total_strokes(),
            current_layer: self.document.current_index(),
        }
    }
    #[must_use]
    pub fn document(&self) -> &Document<S> {
        &self.document
    }
    /// The composited image of every visible layer.
    #[must_use]
    pub fn display(&self) -> &S {
        &self.display
    }
    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }
    #[must_use]
    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }
    #[must_use]
    pub fn eraser(&self) -> &EraserSettings {
        &self.eraser
    }
    #[must_use]
    pub fn is_erasing(&self) -> bool {
        self.erasing
    }
    /// Whether a pointer session is open.
    #[must_use]
    pub fn in_session(&self) -> bool {
        self.session.is_some()
    }
    pub fn sink_mut(&mut self) -> &mut N {
        &mut self.sink
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        surface::{recording::DrawOp, RasterSurface, RecordingSurface},
        util::Unit,
    };
    type TestEngine = Engine<RecordingSurface, Vec<Notification>>;
    fn config() -> EngineConfig {
        EngineConfig {
            canvas: Canvas {
                width: 128.0,
                height: 128.0,
                scale_factor: 1.0,
            },
            ..Default::default()
        }
    }
    fn engine() -> TestEngine {
        let mut engine = Engine::new(config(), Vec::new()).unwrap();
        engine.sink_mut().clear();
        engine
    }
    fn at(x: f64, y: f64) -> PointerEvent {
        PointerEvent::at(x, y).with_pressure(0.5)
    }
    fn draw(engine: &mut TestEngine, points: &[[f64; 2]]) {
        let (first, rest) = points.split_first().unwrap();
        engine.pointer_down(at(first[0], first[1]));
        for p in rest {
            engine.pointer_move(at(p[0], p[1]));
        }
        let last = points.last().unwrap();
        engine.pointer_up(at(last[0], last[1]));
    }
    fn strokes(engine: &TestEngine) -> Vec<Vec<crate::stroke::Stroke>> {
        engine
            .document()
            .layers()
            .iter()
            .map(|layer| layer.strokes.clone())
            .collect()
    }

    #[test]
    fn ready_on_construction() {
        let engine: TestEngine = Engine::new(config(), Vec::new()).unwrap();
        let [Notification::Ready { version, features }] = engine.sink.as_slice() else {
            panic!("expected ready, got {:?}", engine.sink);
        };
        assert_eq!(*version, VERSION);
        assert!(features.contains(Features::UNDO_REDO | Features::RECT_ERASE));
        assert_eq!(engine.history().len(), 1);
    }
    #[test]
    fn zero_canvas_fails() {
        let config = EngineConfig {
            canvas: Canvas {
                width: 0.0,
                ..config().canvas
            },
            ..config()
        };
        assert!(Engine::<RecordingSurface>::new(config, ()).is_err());
    }
    #[test]
    fn draw_commits_one_stroke() {
        let mut engine = engine();
        let history_before = engine.history().len();
        draw(&mut engine, &[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]]);
        let layer = engine.document().current_layer();
        assert_eq!(layer.strokes.len(), 1);
        assert_eq!(layer.strokes[0].points.len(), 3);
        assert!(layer.strokes[0]
            .points
            .iter()
            .all(|p| p.pressure == Unit::HALF));
        assert_eq!(engine.history().len(), history_before + 1);
        assert!(matches!(
            engine.sink.as_slice(),
            [Notification::StrokeAdded { layer_index: 0, .. }]
        ));
    }
    #[test]
    fn three_new_layers() {
        let mut engine = engine();
        for _ in 0..3 {
            engine.create_layer();
        }
        assert_eq!(engine.document().layers().len(), 4);
        assert_eq!(engine.document().current_index(), 3);
        assert_eq!(engine.sink.len(), 3);
        let Some(Notification::LayerChanged {
            current_layer,
            total_layers,
            layer_name,
        }) = engine.sink.last()
        else {
            panic!("expected layer change");
        };
        assert_eq!((*current_layer, *total_layers), (3, 4));
        assert_eq!(layer_name, "Layer 4");
    }
    #[test]
    fn history_caps_at_thirty() {
        let mut engine = engine();
        for i in 0..31 {
            let x = f64::from(i);
            draw(&mut engine, &[[x, 0.0]]);
        }
        assert_eq!(engine.history().len(), 30);
        assert_eq!(engine.stats().total_strokes, 31);
    }
    #[test]
    fn stroke_erase_removes_near_strokes_once() {
        let mut engine = engine();
        draw(&mut engine, &[[10.0, 10.0], [53.0, 54.0]]);
        draw(&mut engine, &[[50.0, 45.0]]);
        draw(&mut engine, &[[90.0, 50.0], [100.0, 100.0]]);
        let history_before = engine.history().len();

        engine.set_erasing(true);
        engine.set_eraser_mode(EraserMode::Stroke);
        engine.set_eraser_size(10.0);
        engine.pointer_down(at(50.0, 50.0));
        engine.pointer_up(at(50.0, 50.0));

        let layer = engine.document().current_layer();
        assert_eq!(layer.strokes.len(), 1);
        assert_eq!(layer.strokes[0].points[0].pos(), [90.0, 50.0]);
        assert_eq!(engine.history().len(), history_before + 1);
    }
    #[test]
    fn undo_at_start_changes_nothing() {
        let mut engine = engine();
        let stats = engine.stats();
        let display = engine.display().ops.clone();
        engine.undo();
        assert_eq!(engine.stats(), stats);
        assert_eq!(engine.display().ops, display);
        assert_eq!(engine.history().cursor(), Some(0));
        assert!(engine.sink.is_empty());
    }
    #[test]
    fn undo_redo_restores_strokes() {
        let mut engine = engine();
        for i in 0..4 {
            let y = f64::from(i) * 10.0;
            draw(&mut engine, &[[0.0, y], [20.0, y], [40.0, y + 5.0]]);
        }
        let full = strokes(&engine);
        engine.undo();
        engine.undo();
        assert_eq!(engine.stats().total_strokes, 2);
        engine.redo();
        engine.redo();
        assert_eq!(strokes(&engine), full);
    }
    #[test]
    fn switch_never_touches_strokes() {
        let mut engine = engine();
        draw(&mut engine, &[[1.0, 1.0], [2.0, 2.0]]);
        engine.create_layer();
        draw(&mut engine, &[[3.0, 3.0]]);
        let before = strokes(&engine);
        for index in [0, 1, 2, usize::MAX] {
            engine.switch_layer(index);
            assert_eq!(strokes(&engine), before);
        }
        assert_eq!(engine.document().current_index(), 1);
    }
    #[test]
    fn delete_last_layer_refused() {
        let mut engine = engine();
        let history_before = engine.history().len();
        for index in [0, 1, 7] {
            engine.delete_layer(index);
        }
        assert_eq!(engine.document().layers().len(), 1);
        assert_eq!(engine.history().len(), history_before);
        assert!(engine.sink.is_empty());
    }
    #[test]
    fn delete_is_undoable() {
        let mut engine = engine();
        engine.create_layer();
        draw(&mut engine, &[[5.0, 5.0]]);
        engine.delete_layer(1);
        assert_eq!(engine.stats().total_layers, 1);
        engine.undo();
        assert_eq!(
            engine.stats(),
            Stats {
                total_layers: 2,
                total_strokes: 1,
                current_layer: 1
            }
        );
    }
    #[test]
    fn leave_commits_like_up() {
        let mut engine = engine();
        engine.pointer_down(at(0.0, 0.0));
        engine.pointer_move(at(5.0, 5.0));
        engine.pointer_leave(at(f64::NAN, 0.0));
        assert!(!engine.in_session());
        assert_eq!(engine.stats().total_strokes, 1);
    }
    #[test]
    fn overlapping_down_ends_session() {
        let mut engine = engine();
        engine.pointer_down(at(0.0, 0.0));
        engine.pointer_move(at(5.0, 5.0));
        engine.pointer_down(at(50.0, 50.0));
        engine.pointer_up(at(50.0, 50.0));
        let layer = engine.document().current_layer();
        assert_eq!(layer.strokes.len(), 2);
        assert_eq!(layer.strokes[0].points.len(), 2);
        assert_eq!(layer.strokes[1].points.len(), 1);
    }
    #[test]
    fn bad_events_ignored() {
        let mut engine = engine();
        engine.pointer_down(at(f64::NAN, 0.0));
        assert!(!engine.in_session());
        engine.pointer_move(at(1.0, 1.0));
        engine.pointer_up(at(1.0, 1.0));
        assert_eq!(engine.stats().total_strokes, 0);

        engine.pointer_down(at(0.0, 0.0));
        engine.pointer_move(at(f64::INFINITY, 3.0));
        engine.pointer_up(at(0.0, 0.0));
        assert_eq!(engine.document().current_layer().strokes[0].points.len(), 1);
    }
    #[test]
    fn hidden_layers_not_composited() {
        let mut engine = engine();
        engine.create_layer();
        engine.set_layer_visibility(0, false);
        engine.set_layer_opacity(1, 0.25);
        let composites: Vec<_> = engine
            .display()
            .visible_ops()
            .iter()
            .filter_map(|op| match op {
                DrawOp::Composite { alpha, .. } => Some(alpha.get()),
                _ => None,
            })
            .collect();
        assert_eq!(composites, [0.25]);
    }
    #[test]
    fn rect_erase_on_release() {
        let mut engine = engine();
        draw(&mut engine, &[[10.0, 10.0], [20.0, 20.0]]);
        draw(&mut engine, &[[100.0, 100.0]]);
        let history_before = engine.history().len();
        engine.set_erasing(true);
        engine.set_eraser_mode(EraserMode::Rect);

        engine.pointer_down(at(0.0, 0.0));
        engine.pointer_move(at(30.0, 30.0));
        assert!(matches!(
            engine.display().ops.last(),
            Some(DrawOp::DashedRect { .. })
        ));
        // Nothing removed until release.
        assert_eq!(engine.stats().total_strokes, 2);
        engine.pointer_up(at(30.0, 30.0));

        assert_eq!(engine.stats().total_strokes, 1);
        assert_eq!(engine.history().len(), history_before + 1);
        assert!(!engine
            .display()
            .ops
            .iter()
            .any(|op| matches!(op, DrawOp::DashedRect { .. })));
    }
    #[test]
    fn rect_click_removes_nothing() {
        let mut engine = engine();
        draw(&mut engine, &[[10.0, 10.0]]);
        let history_before = engine.history().len();
        engine.set_erasing(true);
        engine.set_eraser_mode(EraserMode::Rect);
        engine.pointer_down(at(10.0, 10.0));
        engine.pointer_up(at(10.0, 10.0));
        assert_eq!(engine.stats().total_strokes, 1);
        assert_eq!(engine.history().len(), history_before);
    }
    #[test]
    fn failed_resize_keeps_state() {
        let mut engine = engine();
        draw(&mut engine, &[[10.0, 10.0]]);
        let canvas = *engine.document().canvas();
        engine.resize(Canvas {
            scale_factor: 0.0,
            ..canvas
        });
        assert_eq!(*engine.document().canvas(), canvas);
        assert_eq!(engine.display().resizes, 0);
        engine.resize(Canvas {
            scale_factor: 2.0,
            ..canvas
        });
        assert_eq!(engine.display().size, [256, 256]);
        assert_eq!(
            engine.document().current_layer().surface.size,
            engine.display().size
        );
    }

    thread_local! {
        /// Allocations [`Flaky`] will allow before failing, on this test's thread.
        static ALLOCATIONS_LEFT: std::cell::Cell<usize> = const { std::cell::Cell::new(usize::MAX) };
    }
    /// A recording surface whose allocation starts failing once its budget runs out.
    #[derive(Debug)]
    struct Flaky(RecordingSurface);
    impl Surface for Flaky {
        fn allocate(canvas: &Canvas) -> Result<Self, SurfaceError> {
            let left = ALLOCATIONS_LEFT.get();
            if left == 0 {
                return Err(SurfaceError::TooLarge {
                    width: 0,
                    height: 0,
                });
            }
            ALLOCATIONS_LEFT.set(left - 1);
            RecordingSurface::allocate(canvas).map(Self)
        }
        fn resize(&mut self, canvas: &Canvas) -> Result<(), SurfaceError> {
            self.0.resize(canvas)
        }
        fn clear(&mut self) {
            self.0.clear();
        }
        fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Color) {
            self.0.fill_circle(center, radius, color);
        }
        fn stroke_quadratic(
            &mut self,
            from: [f64; 2],
            control: [f64; 2],
            to: [f64; 2],
            width: f64,
            color: Color,
        ) {
            self.0.stroke_quadratic(from, control, to, width, color);
        }
        fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], width: f64, color: Color) {
            self.0.stroke_line(from, to, width, color);
        }
        fn erase_circle(&mut self, center: [f64; 2], radius: f64) {
            self.0.erase_circle(center, radius);
        }
        fn composite_from(&mut self, other: &Self, alpha: Unit) {
            self.0.composite_from(&other.0, alpha);
        }
    }
    fn surface_sizes(engine: &Engine<Flaky>) -> (Vec<[u32; 2]>, [u32; 2]) {
        let layers = engine
            .document()
            .layers()
            .iter()
            .map(|layer| layer.surface.0.size)
            .collect();
        (layers, engine.display().0.size)
    }
    fn flaky_engine() -> Engine<Flaky> {
        ALLOCATIONS_LEFT.set(usize::MAX);
        let mut engine: Engine<Flaky> = Engine::new(config(), ()).unwrap();
        engine.create_layer();
        engine.create_layer();
        engine
    }
    #[test]
    fn resize_is_all_or_nothing() {
        // Display, then each of three layers. Fail on every one in turn.
        for budget in 0..4 {
            let mut engine = flaky_engine();
            let canvas = *engine.document().canvas();
            let before = surface_sizes(&engine);

            ALLOCATIONS_LEFT.set(budget);
            engine.resize(Canvas {
                scale_factor: 2.0,
                ..canvas
            });
            assert_eq!(*engine.document().canvas(), canvas, "budget {budget}");
            assert_eq!(surface_sizes(&engine), before, "budget {budget}");
        }
        let mut engine = flaky_engine();
        ALLOCATIONS_LEFT.set(4);
        let canvas = *engine.document().canvas();
        engine.resize(Canvas {
            scale_factor: 2.0,
            ..canvas
        });
        assert_eq!(surface_sizes(&engine), (vec![[256, 256]; 3], [256, 256]));
    }
    #[test]
    fn pixel_erase_not_counted() {
        let mut engine = engine();
        draw(&mut engine, &[[10.0, 10.0], [20.0, 20.0]]);
        let stats = engine.stats();
        engine.set_erasing(true);
        engine.set_eraser_mode(EraserMode::Pixel);
        // One over the stroke, one over nothing.
        draw(&mut engine, &[[15.0, 15.0]]);
        draw(&mut engine, &[[100.0, 100.0]]);
        assert_eq!(engine.document().current_layer().strokes.len(), 3);
        assert_eq!(engine.stats(), stats);
        assert_eq!(engine.history().present().map(Snapshot::total_strokes), Some(1));
    }
    #[test]
    fn create_layer_is_one_step() {
        let mut engine = engine();
        draw(&mut engine, &[[5.0, 5.0]]);
        let history_before = engine.history().len();
        engine.create_layer();
        assert_eq!(engine.history().len(), history_before + 1);
        engine.undo();
        assert_eq!(
            engine.stats(),
            Stats {
                total_layers: 1,
                total_strokes: 1,
                current_layer: 0
            }
        );
    }
    #[test]
    fn clear_layer_is_undoable() {
        let mut engine = engine();
        draw(&mut engine, &[[5.0, 5.0], [10.0, 10.0]]);
        draw(&mut engine, &[[50.0, 50.0]]);
        let before = strokes(&engine);
        let history_before = engine.history().len();
        engine.clear_layer(0);
        assert_eq!(engine.history().len(), history_before + 1);
        assert_eq!(engine.stats().total_strokes, 0);
        assert_eq!(engine.document().current_layer().surface.ops, [DrawOp::Clear]);
        engine.undo();
        assert_eq!(strokes(&engine), before);
        assert_eq!(engine.history().len(), history_before + 1);
        // Out of range records nothing.
        engine.clear_layer(3);
        assert_eq!(engine.history().cursor(), Some(history_before - 1));
    }

    fn raster_engine() -> Engine<RasterSurface> {
        let mut engine: Engine<RasterSurface> = Engine::new(config(), ()).unwrap();
        engine.set_pressure_enabled(false);
        engine.set_brush_size(8.0);
        engine
    }
    fn alpha_at(engine: &Engine<RasterSurface>, pos: [f64; 2]) -> f32 {
        engine.display().pixel_at(pos).unwrap()[3]
    }
    fn draw_raster(engine: &mut Engine<RasterSurface>, points: &[[f64; 2]]) {
        let (first, rest) = points.split_first().unwrap();
        engine.pointer_down(PointerEvent::at(first[0], first[1]));
        for p in rest {
            engine.pointer_move(PointerEvent::at(p[0], p[1]));
        }
        engine.pointer_up(PointerEvent::at(0.0, 0.0));
    }
    #[test]
    fn pixel_erase_survives_replay() {
        let mut engine = raster_engine();
        draw_raster(&mut engine, &[[10.0, 64.0], [64.0, 64.0], [118.0, 64.0]]);
        assert_eq!(alpha_at(&engine, [64.0, 64.0]), 1.0);

        engine.set_erasing(true);
        engine.set_eraser_size(20.0);
        draw_raster(&mut engine, &[[64.0, 64.0]]);
        assert_eq!(alpha_at(&engine, [64.0, 64.0]), 0.0);
        assert_eq!(alpha_at(&engine, [100.0, 64.0]), 1.0);

        // Replaying the layer must not bring the pixels back.
        let canvas = *engine.document().canvas();
        engine.resize(Canvas {
            scale_factor: 2.0,
            ..canvas
        });
        assert_eq!(alpha_at(&engine, [64.0, 64.0]), 0.0);
        assert_eq!(alpha_at(&engine, [100.0, 64.0]), 1.0);

        // But undo does.
        engine.undo();
        assert_eq!(alpha_at(&engine, [64.0, 64.0]), 1.0);
        engine.redo();
        assert_eq!(alpha_at(&engine, [64.0, 64.0]), 0.0);
    }
    #[test]
    fn live_drawing_matches_replay() {
        let mut engine = raster_engine();
        draw_raster(
            &mut engine,
            &[[10.0, 10.0], [40.0, 30.0], [60.0, 80.0], [100.0, 90.0]],
        );
        let live = engine.document().current_layer().surface.clone();
        // Rebuild via replay by undoing and redoing.
        engine.undo();
        engine.redo();
        let replayed = &engine.document().current_layer().surface;
        for pos in [[40.0, 30.0], [60.0, 80.0], [100.0, 90.0], [5.0, 120.0]] {
            assert_eq!(live.pixel_at(pos), replayed.pixel_at(pos), "at {pos:?}");
        }
    }
}
