use rust_decimal::Decimal;

use crate::assets::ImageSlot;
use crate::model::{BilingualLabel, SummaryValues, format_amount};

use super::{Bounds, Canvas, HAlign, LayoutContext, fitted_value, stacked_label};

const ROWS: usize = 5;

fn table_height(ctx: &LayoutContext) -> f32 {
    ROWS as f32 * ctx.config.summary_row_height
}

fn stamp_height(ctx: &LayoutContext) -> f32 {
    ctx.images.stamp.height_for_width(ctx.config.stamp_width)
}

/// Total height of the stamp/table block plus the date strip.
pub fn summary_height(ctx: &LayoutContext) -> f32 {
    let cfg = ctx.config;
    stamp_height(ctx).max(table_height(ctx)) + cfg.date_strip_gap + cfg.date_strip_height
}

/// Draw the stamp, the five-row balance table beside it and the issue
/// date/time strip underneath. Returns the height consumed below `top`.
pub fn render_summary(
    canvas: &mut Canvas,
    ctx: &LayoutContext,
    top: f32,
    values: &SummaryValues,
) -> f32 {
    let cfg = ctx.config;
    let labels = &cfg.labels;
    let left = cfg.content_left();

    canvas.image(
        ImageSlot::Stamp,
        Bounds::from_top(left, top, cfg.stamp_width, stamp_height(ctx)),
    );

    let table_x = left + cfg.stamp_width + cfg.summary_gap;
    let table_w = cfg.content_width() - cfg.stamp_width - cfg.summary_gap;
    let label_w = table_w * cfg.summary_label_ratio;
    let value_w = table_w - label_w;
    let row_h = cfg.summary_row_height;
    let value_sizes = (cfg.summary_value_size, cfg.summary_value_min_size);
    let label_sizes = (cfg.header_primary_size, cfg.header_secondary_size);

    let rows: [(&BilingualLabel, Decimal, bool); ROWS] = [
        (&labels.book_value, values.book_value, false),
        (&labels.facilities, values.facilities, false),
        (&labels.non_settlement_items, values.non_settlement_items, false),
        (&labels.held_balance, values.held_balance, false),
        (&labels.available_balance, values.available_balance, true),
    ];

    for (i, (label, amount, highlight)) in rows.into_iter().enumerate() {
        let row_top = top - i as f32 * row_h;
        let value_cell = Bounds::from_top(table_x, row_top, value_w, row_h);
        let label_cell = Bounds::from_top(table_x + value_w, row_top, label_w, row_h);
        let row = Bounds::from_top(table_x, row_top, table_w, row_h);

        if highlight {
            canvas.fill(row, cfg.highlight_fill);
        }
        fitted_value(canvas, ctx, value_cell, &format_amount(amount), value_sizes, HAlign::Left);
        stacked_label(canvas, ctx, label_cell, label, label_sizes, HAlign::Right);

        canvas.stroke(value_cell, cfg.border_width, cfg.border_color);
        canvas.stroke(label_cell, cfg.border_width, cfg.border_color);
        if highlight {
            canvas.stroke(row, cfg.highlight_border_width, cfg.border_color);
        }
    }

    let block_h = stamp_height(ctx).max(table_height(ctx));
    let strip_top = top - block_h - cfg.date_strip_gap;
    let cell_w = cfg.content_width() / 3.0;
    let strip_cells = [
        Bounds::from_top(left, strip_top, cell_w, cfg.date_strip_height),
        Bounds::from_top(left + cell_w, strip_top, cell_w, cfg.date_strip_height),
        Bounds::from_top(left + 2.0 * cell_w, strip_top, cell_w, cfg.date_strip_height),
    ];
    let strip_sizes = (cfg.body_font_size, cfg.body_min_font_size);
    fitted_value(canvas, ctx, strip_cells[0], &values.issue_date, strip_sizes, HAlign::Center);
    fitted_value(canvas, ctx, strip_cells[1], &values.issue_time, strip_sizes, HAlign::Center);
    stacked_label(canvas, ctx, strip_cells[2], &labels.issued_at, label_sizes, HAlign::Right);
    for cell in strip_cells {
        canvas.stroke(cell, cfg.border_width, cfg.border_color);
    }

    block_h + cfg.date_strip_gap + cfg.date_strip_height
}
