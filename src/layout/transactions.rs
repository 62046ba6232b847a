use rust_decimal::Decimal;

use crate::fonts::FontRole;
use crate::model::{Column, ColumnKey, TransactionLine, format_amount};
use crate::text_fit::{fit_single_line, wrap_and_clamp};

use super::{Bounds, Canvas, HAlign, LayoutContext, centered_baseline, stacked_label};

/// One transaction with its resolved running balance.
#[derive(Clone, Copy)]
pub struct RowView<'a> {
    pub line: &'a TransactionLine,
    pub balance: Decimal,
}

impl RowView<'_> {
    pub fn cell_text(&self, key: ColumnKey) -> String {
        let amount = self.line.amount;
        match key {
            ColumnKey::Balance => format_amount(self.balance),
            ColumnKey::Credit if amount > Decimal::ZERO => format_amount(amount),
            ColumnKey::Debit if amount < Decimal::ZERO => format_amount(amount.abs()),
            ColumnKey::Credit | ColumnKey::Debit => String::new(),
            ColumnKey::Description => self.line.description(),
            ColumnKey::Reference => match self.line.reference.as_deref().map(str::trim) {
                Some(r) if !r.is_empty() => r.to_string(),
                _ => "-".to_string(),
            },
            ColumnKey::Date => self.line.posting_date.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Left edge that centres `columns` on the page.
pub fn table_x(ctx: &LayoutContext, columns: &[Column]) -> f32 {
    let total: f32 = columns.iter().map(|c| c.width).sum();
    (ctx.config.page_width - total) / 2.0
}

/// Draw the filled, bordered header band. Returns its height.
pub fn render_header_row(
    canvas: &mut Canvas,
    ctx: &LayoutContext,
    columns: &[Column],
    x: f32,
    top: f32,
) -> f32 {
    let cfg = ctx.config;
    let height = cfg.table_header_height;
    let sizes = (cfg.header_primary_size, cfg.header_secondary_size);

    let mut cell_x = x;
    for column in columns {
        let cell = Bounds::from_top(cell_x, top, column.width, height);
        canvas.fill(cell, cfg.header_fill);
        stacked_label(canvas, ctx, cell, &column.header, sizes, HAlign::Center);
        canvas.stroke(cell, cfg.border_width, cfg.border_color);
        cell_x += column.width;
    }
    height
}

/// Draw one body row of `height` below `top`. The balance stays on one line and
/// shrinks to fit; every other cell wraps and is clamped to the lines that fit.
pub fn render_body_row(
    canvas: &mut Canvas,
    ctx: &LayoutContext,
    columns: &[Column],
    x: f32,
    top: f32,
    height: f32,
    row: RowView,
) {
    let cfg = ctx.config;
    let pad = cfg.cell_padding;
    let regular = ctx.fonts.regular;
    let ascender = regular.ascender_ratio();
    let size = cfg.body_font_size;
    let line_h = cfg.line_height(size);
    let max_lines = ((height - 2.0 * pad).max(0.0) / line_h).floor() as usize;

    let mut cell_x = x;
    for column in columns {
        let cell = Bounds::from_top(cell_x, top, column.width, height);
        let inner_w = (column.width - 2.0 * pad).max(0.0);
        let text = row.cell_text(column.key);
        let align = if column.key.is_numeric() {
            HAlign::Right
        } else {
            HAlign::Center
        };

        let text_x = cell.x + pad;
        if column.key == ColumnKey::Balance {
            let fit = fit_single_line(regular, &text, inner_w, size, cfg.body_min_font_size);
            let baseline = centered_baseline(top, height, fit, ascender);
            canvas.aligned_text(
                regular,
                &text,
                text_x,
                inner_w,
                baseline,
                fit,
                align,
                FontRole::Regular,
            );
        } else {
            let lines = wrap_and_clamp(regular, &text, inner_w, max_lines, size);
            let block_h = lines.len() as f32 * line_h;
            let first_top = top - (height - block_h) / 2.0;
            for (i, line) in lines.iter().enumerate() {
                let line_top = first_top - i as f32 * line_h;
                let baseline = centered_baseline(line_top, line_h, size, ascender);
                canvas.aligned_text(
                    regular,
                    line,
                    text_x,
                    inner_w,
                    baseline,
                    size,
                    align,
                    FontRole::Regular,
                );
            }
        }

        canvas.stroke(cell, cfg.border_width, cfg.border_color);
        cell_x += column.width;
    }
}
