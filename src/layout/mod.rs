//! Page layout as a display list.
//!
//! Coordinates are PDF points with the origin at the bottom-left of the page,
//! so "moving down the page" means decreasing `y`.

mod account_tables;
mod chrome;
mod paginate;
mod summary;
mod transactions;

use std::ops::Range;

use crate::assets::{AssetDims, ImageSlot};
use crate::config::LayoutConfig;
use crate::fonts::{FontRole, Fonts};
use crate::model::BilingualLabel;
use crate::text_fit::{TextMeasure, fit_single_line};

pub use account_tables::render_account_tables;
pub use chrome::{render_chrome, render_footer_stack};
pub use paginate::layout_statement;
pub use summary::{render_summary, summary_height};
pub use transactions::{RowView, render_body_row, render_header_row, table_x};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub x: f32,
    /// Bottom edge.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Box hanging down from `top`.
    pub fn from_top(x: f32, top: f32, width: f32, height: f32) -> Self {
        Self::new(x, top - height, width, height)
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawOp {
    Image {
        slot: ImageSlot,
        bounds: Bounds,
    },
    Fill {
        bounds: Bounds,
        color: [u8; 3],
    },
    Stroke {
        bounds: Bounds,
        line_width: f32,
        color: [u8; 3],
    },
    Text {
        text: String,
        x: f32,
        baseline: f32,
        size: f32,
        font: FontRole,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageKind {
    First,
    Continuation,
    Summary,
}

#[derive(Clone, Debug)]
pub struct Page {
    pub kind: PageKind,
    /// Transaction rows drawn on this page; empty on the summary page.
    pub rows: Range<usize>,
    pub row_height: f32,
    /// Vertical space between the table header and the footer stack.
    pub available_height: f32,
    pub ops: Vec<DrawOp>,
}

/// Regular and bold metrics, borrowed for the duration of a layout pass.
#[derive(Clone, Copy)]
pub struct Typefaces<'a> {
    pub regular: &'a dyn TextMeasure,
    pub bold: &'a dyn TextMeasure,
}

impl<'a> From<&'a Fonts> for Typefaces<'a> {
    fn from(fonts: &'a Fonts) -> Self {
        Self {
            regular: &fonts.regular,
            bold: &fonts.bold,
        }
    }
}

pub struct LayoutContext<'a> {
    pub config: &'a LayoutConfig,
    pub fonts: Typefaces<'a>,
    pub images: &'a AssetDims,
}

#[derive(Default)]
pub struct Canvas {
    ops: Vec<DrawOp>,
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_ops(self) -> Vec<DrawOp> {
        self.ops
    }

    pub fn image(&mut self, slot: ImageSlot, bounds: Bounds) {
        self.ops.push(DrawOp::Image { slot, bounds });
    }

    pub fn fill(&mut self, bounds: Bounds, color: [u8; 3]) {
        self.ops.push(DrawOp::Fill { bounds, color });
    }

    pub fn stroke(&mut self, bounds: Bounds, line_width: f32, color: [u8; 3]) {
        self.ops.push(DrawOp::Stroke {
            bounds,
            line_width,
            color,
        });
    }

    pub fn text(&mut self, text: &str, x: f32, baseline: f32, size: f32, font: FontRole) {
        if text.is_empty() {
            return;
        }
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            baseline,
            size,
            font,
        });
    }

    /// Draw `text` on `baseline`, aligned inside `[left, left + width]`.
    #[allow(clippy::too_many_arguments)]
    pub fn aligned_text(
        &mut self,
        measure: &dyn TextMeasure,
        text: &str,
        left: f32,
        width: f32,
        baseline: f32,
        size: f32,
        align: HAlign,
        font: FontRole,
    ) {
        let text_w = measure.text_width(text, size);
        let x = match align {
            HAlign::Left => left,
            HAlign::Center => left + (width - text_w) / 2.0,
            HAlign::Right => left + width - text_w,
        };
        self.text(text, x, baseline, size, font);
    }
}

/// Baseline that centres a line of `size` vertically in a box of `height` below `top`.
pub(crate) fn centered_baseline(top: f32, height: f32, size: f32, ascender_ratio: f32) -> f32 {
    top - (height - size) / 2.0 - size * ascender_ratio
}

/// Primary label in the upper half of `cell`, secondary in the lower half,
/// each shrunk to the cell width if needed.
pub(crate) fn stacked_label(
    canvas: &mut Canvas,
    ctx: &LayoutContext,
    cell: Bounds,
    label: &BilingualLabel,
    sizes: (f32, f32),
    align: HAlign,
) {
    let pad = ctx.config.cell_padding;
    let inner_w = (cell.width - 2.0 * pad).max(0.0);
    let half = cell.height / 2.0;
    let (primary_size, secondary_size) = sizes;
    let floor = ctx.config.body_min_font_size;

    let bold = ctx.fonts.bold;
    let size = fit_single_line(
        bold,
        &label.primary,
        inner_w,
        primary_size,
        floor.min(primary_size),
    );
    let baseline = centered_baseline(cell.top(), half, size, bold.ascender_ratio());
    canvas.aligned_text(
        bold,
        &label.primary,
        cell.x + pad,
        inner_w,
        baseline,
        size,
        align,
        FontRole::Bold,
    );

    let regular = ctx.fonts.regular;
    let size = fit_single_line(
        regular,
        &label.secondary,
        inner_w,
        secondary_size,
        floor.min(secondary_size),
    );
    let baseline = centered_baseline(cell.top() - half, half, size, regular.ascender_ratio());
    canvas.aligned_text(
        regular,
        &label.secondary,
        cell.x + pad,
        inner_w,
        baseline,
        size,
        align,
        FontRole::Regular,
    );
}

/// Single-line value shrunk between `start` and `floor` to fit `cell`, vertically centred.
pub(crate) fn fitted_value(
    canvas: &mut Canvas,
    ctx: &LayoutContext,
    cell: Bounds,
    text: &str,
    (start, floor): (f32, f32),
    align: HAlign,
) -> f32 {
    let pad = ctx.config.cell_padding;
    let inner_w = (cell.width - 2.0 * pad).max(0.0);
    let regular = ctx.fonts.regular;
    let size = fit_single_line(regular, text, inner_w, start, floor);
    let baseline = centered_baseline(cell.top(), cell.height, size, regular.ascender_ratio());
    canvas.aligned_text(
        regular,
        text,
        cell.x + pad,
        inner_w,
        baseline,
        size,
        align,
        FontRole::Regular,
    );
    size
}
