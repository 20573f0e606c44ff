//! A headless surface that draws nothing and instead remembers what it was asked to draw.

use super::{Surface, SurfaceError};
use crate::{color::Color, state::document::Canvas, util::Rect, util::Unit};

/// One call made on a [`RecordingSurface`].
#[derive(Clone, PartialEq, Debug)]
pub enum DrawOp {
    Clear,
    FillCircle {
        center: [f64; 2],
        radius: f64,
        color: Color,
    },
    Quadratic {
        from: [f64; 2],
        control: [f64; 2],
        to: [f64; 2],
        width: f64,
        color: Color,
    },
    Line {
        from: [f64; 2],
        to: [f64; 2],
        width: f64,
        color: Color,
    },
    EraseCircle {
        center: [f64; 2],
        radius: f64,
    },
    DashedRect {
        rect: Rect,
        color: Color,
    },
    /// Another recording was blitted on top, carrying a copy of its ops at that time.
    Composite { alpha: Unit, source: Vec<DrawOp> },
}

#[derive(Clone, PartialEq, Debug)]
pub struct RecordingSurface {
    pub size: [u32; 2],
    pub scale_factor: f64,
    /// Ops since the last clear, clear included.
    pub ops: Vec<DrawOp>,
    /// Number of times this surface was reallocated.
    pub resizes: usize,
}
impl RecordingSurface {
    /// Ops drawn since the last `clear`, excluding the clear itself.
    #[must_use]
    pub fn visible_ops(&self) -> &[DrawOp] {
        let start = self
            .ops
            .iter()
            .rposition(|op| *op == DrawOp::Clear)
            .map_or(0, |idx| idx + 1);
        &self.ops[start..]
    }
}

impl Surface for RecordingSurface {
    fn allocate(canvas: &Canvas) -> Result<Self, SurfaceError> {
        let size = super::validate(canvas)?;
        Ok(Self {
            size,
            scale_factor: canvas.scale_factor,
            ops: Vec::new(),
            resizes: 0,
        })
    }
    fn resize(&mut self, canvas: &Canvas) -> Result<(), SurfaceError> {
        self.size = super::validate(canvas)?;
        self.scale_factor = canvas.scale_factor;
        self.ops.clear();
        self.resizes += 1;
        Ok(())
    }
    fn clear(&mut self) {
        // Nothing before a clear can be observed anymore.
        self.ops.clear();
        self.ops.push(DrawOp::Clear);
    }
    fn fill_circle(&mut self, center: [f64; 2], radius: f64, color: Color) {
        self.ops.push(DrawOp::FillCircle {
            center,
            radius,
            color,
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
        self.ops.push(DrawOp::Quadratic {
            from,
            control,
            to,
            width,
            color,
        });
    }
    fn stroke_line(&mut self, from: [f64; 2], to: [f64; 2], width: f64, color: Color) {
        self.ops.push(DrawOp::Line {
            from,
            to,
            width,
            color,
        });
    }
    fn erase_circle(&mut self, center: [f64; 2], radius: f64) {
        self.ops.push(DrawOp::EraseCircle { center, radius });
    }
    fn composite_from(&mut self, other: &Self, alpha: Unit) {
        self.ops.push(DrawOp::Composite {
            alpha,
            source: other.visible_ops().to_vec(),
        });
    }
    fn stroke_dashed_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::DashedRect { rect, color });
    }
}
