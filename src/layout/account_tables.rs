use crate::model::{AccountInfo, BilingualLabel};

use super::{Bounds, Canvas, HAlign, LayoutContext, fitted_value, stacked_label};

const ROWS: usize = 3;

/// Draw the two 3x2 account tables side by side, labels in the right-hand
/// column and values in the left. Returns the height consumed below `top`.
pub fn render_account_tables(
    canvas: &mut Canvas,
    ctx: &LayoutContext,
    top: f32,
    account: &AccountInfo,
) -> f32 {
    let cfg = ctx.config;
    let labels = &cfg.labels;
    let table_w = (cfg.content_width() - cfg.account_table_gap) / 2.0;
    let left_x = cfg.content_left();
    let right_x = left_x + table_w + cfg.account_table_gap;

    let left_rows = [
        (&labels.account_number, account.account_number.as_str()),
        (&labels.currency, account.currency.as_str()),
        (&labels.branch, account.branch.as_str()),
    ];
    let right_rows = [
        (&labels.customer_name, account.name.as_str()),
        (&labels.account_type, account.account_type.as_str()),
        (&labels.period, account.period.as_str()),
    ];

    draw_table(canvas, ctx, left_x, top, table_w, &left_rows);
    draw_table(canvas, ctx, right_x, top, table_w, &right_rows);

    ROWS as f32 * cfg.account_row()
}

fn draw_table(
    canvas: &mut Canvas,
    ctx: &LayoutContext,
    x: f32,
    top: f32,
    width: f32,
    rows: &[(&BilingualLabel, &str); ROWS],
) {
    let cfg = ctx.config;
    let row_h = cfg.account_row();
    // Compact rows shrink the stacked labels with them.
    let scale = (row_h / cfg.account_row_height).min(1.0);
    let label_sizes = (
        cfg.label_primary_size * scale,
        cfg.label_secondary_size * scale,
    );
    let label_w = width * cfg.account_label_ratio;
    let value_w = width - label_w;

    for (i, (label, value)) in rows.iter().enumerate() {
        let row_top = top - i as f32 * row_h;
        let value_cell = Bounds::from_top(x, row_top, value_w, row_h);
        let label_cell = Bounds::from_top(x + value_w, row_top, label_w, row_h);

        let value = value.trim();
        let value = if value.is_empty() {
            cfg.labels.placeholder.as_str()
        } else {
            value
        };
        fitted_value(
            canvas,
            ctx,
            value_cell,
            value,
            (cfg.value_font_size, cfg.value_min_font_size),
            HAlign::Left,
        );
        stacked_label(canvas, ctx, label_cell, label, label_sizes, HAlign::Right);

        canvas.stroke(value_cell, cfg.border_width, cfg.border_color);
        canvas.stroke(label_cell, cfg.border_width, cfg.border_color);
    }
}
