use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::model::{Column, Statement, SummaryValues, resolve_balances};

use super::{
    Canvas, LayoutContext, Page, PageKind, RowView, render_account_tables, render_body_row,
    render_chrome, render_footer_stack, render_header_row, render_summary, summary_height,
    table_x,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    FirstPage,
    ContinuationPage,
    SummaryPage,
    Done,
}

/// Lay the statement out page by page: one first page (even with no rows),
/// continuation pages until every row is placed, then exactly one summary page.
pub fn layout_statement(
    statement: &Statement,
    ctx: &LayoutContext,
    issued_at: NaiveDateTime,
) -> Vec<Page> {
    let cfg = ctx.config;
    let balances = resolve_balances(&statement.lines);
    let first_columns = cfg.resolve_columns(&cfg.first_page_columns);
    let continuation_columns = cfg.resolve_columns(&cfg.continuation_columns);

    let total = statement.lines.len();
    let mut cursor = 0usize;
    let mut pages = Vec::new();
    let mut state = State::FirstPage;

    while state != State::Done {
        state = match state {
            State::FirstPage | State::ContinuationPage => {
                let (kind, columns) = if state == State::FirstPage {
                    (PageKind::First, &first_columns)
                } else {
                    (PageKind::Continuation, &continuation_columns)
                };
                let page = data_page(ctx, statement, &balances, kind, columns, cursor);
                cursor = page.rows.end;
                pages.push(page);
                if cursor < total {
                    State::ContinuationPage
                } else {
                    State::SummaryPage
                }
            }
            State::SummaryPage => {
                let values = SummaryValues::compute(&balances, &statement.adjustments, issued_at);
                pages.push(summary_page(ctx, &values));
                State::Done
            }
            State::Done => State::Done,
        };
    }

    pages
}

fn data_page(
    ctx: &LayoutContext,
    statement: &Statement,
    balances: &[Decimal],
    kind: PageKind,
    columns: &[Column],
    cursor: usize,
) -> Page {
    let cfg = ctx.config;
    let mut canvas = Canvas::new();
    let is_first = kind == PageKind::First;

    let banner_h = render_chrome(&mut canvas, ctx, is_first);
    let floor = render_footer_stack(&mut canvas, ctx);

    let mut top = if banner_h > 0.0 {
        cfg.page_height - cfg.banner_top_margin - banner_h - cfg.section_gap
    } else {
        cfg.page_height - cfg.top_margin
    };
    if is_first {
        top -= render_account_tables(&mut canvas, ctx, top, &statement.account);
        top -= cfg.section_gap;
    }

    let x = table_x(ctx, columns);
    let body_top = top - render_header_row(&mut canvas, ctx, columns, x, top);
    let available_height = (body_top - floor - cfg.table_bottom_gap).max(0.0);

    let cap = if is_first {
        cfg.first_page_row_cap
    } else {
        cfg.continuation_row_cap
    };
    let remaining = statement.lines.len() - cursor;
    let rows = cap.max(1).min(remaining);
    let row_height = if rows == 0 {
        0.0
    } else {
        available_height / rows as f32
    };

    for (i, (line, balance)) in statement.lines[cursor..cursor + rows]
        .iter()
        .zip(&balances[cursor..cursor + rows])
        .enumerate()
    {
        let row = RowView {
            line,
            balance: *balance,
        };
        let row_top = body_top - i as f32 * row_height;
        render_body_row(&mut canvas, ctx, columns, x, row_top, row_height, row);
    }

    log::debug!(
        "{kind:?} page: rows {}..{} row_h={row_height:.2} available={available_height:.2}",
        cursor,
        cursor + rows
    );

    Page {
        kind,
        rows: cursor..cursor + rows,
        row_height,
        available_height,
        ops: canvas.into_ops(),
    }
}

fn summary_page(ctx: &LayoutContext, values: &SummaryValues) -> Page {
    let cfg = ctx.config;
    let mut canvas = Canvas::new();

    render_chrome(&mut canvas, ctx, false);
    let floor = render_footer_stack(&mut canvas, ctx);

    let top = (floor + cfg.summary_footer_gap + summary_height(ctx))
        .min(cfg.page_height - cfg.summary_min_top);
    render_summary(&mut canvas, ctx, top, values);

    log::debug!("Summary page: top={top:.2} book={}", values.book_value);

    Page {
        kind: PageKind::Summary,
        rows: 0..0,
        row_height: 0.0,
        available_height: (top - floor).max(0.0),
        ops: canvas.into_ops(),
    }
}
