mod common;

use std::str::FromStr;

use rust_decimal::Decimal;

use certified_statement::LayoutConfig;
use certified_statement::assets::ImageSlot;
use certified_statement::layout::{DrawOp, Page, PageKind, layout_statement};
use certified_statement::model::format_amount;
use certified_statement::text_fit::ELLIPSIS;
use common::{asset_dims, context, issued_at, statement_with_rows, texts};

const EPS: f32 = 0.01;

fn layout(rows: usize, config: &LayoutConfig) -> Vec<Page> {
    let images = asset_dims();
    let ctx = context(config, &images);
    layout_statement(&statement_with_rows(rows), &ctx, issued_at())
}

fn note_top(page: &Page) -> f32 {
    page.ops
        .iter()
        .find_map(|op| match op {
            DrawOp::Image {
                slot: ImageSlot::Note,
                bounds,
            } => Some(bounds.top()),
            _ => None,
        })
        .expect("every page draws the note image")
}

fn has_image(page: &Page, wanted: ImageSlot) -> bool {
    page.ops
        .iter()
        .any(|op| matches!(op, DrawOp::Image { slot, .. } if *slot == wanted))
}

#[test]
fn empty_statement_has_first_and_summary_pages() {
    let pages = layout(0, &LayoutConfig::default());
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].kind, PageKind::First);
    assert_eq!(pages[0].rows, 0..0);
    assert_eq!(pages[1].kind, PageKind::Summary);
}

#[test]
fn rows_fill_first_page_then_continuations() {
    let pages = layout(100, &LayoutConfig::default());
    let kinds: Vec<PageKind> = pages.iter().map(|p| p.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PageKind::First,
            PageKind::Continuation,
            PageKind::Continuation,
            PageKind::Summary
        ]
    );
    assert_eq!(pages[0].rows, 0..33);
    assert_eq!(pages[1].rows, 33..76);
    assert_eq!(pages[2].rows, 76..100);
    assert_eq!(pages[3].rows, 0..0);
}

#[test]
fn exact_cap_does_not_add_empty_page() {
    let pages = layout(33, &LayoutConfig::default());
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].rows, 0..33);
    assert_eq!(pages[1].kind, PageKind::Summary);
}

#[test]
fn custom_caps_are_respected() {
    let config = LayoutConfig {
        first_page_row_cap: 5,
        continuation_row_cap: 10,
        ..LayoutConfig::default()
    };
    let pages = layout(26, &config);
    let ranges: Vec<_> = pages.iter().map(|p| p.rows.clone()).collect();
    assert_eq!(ranges, vec![0..5, 5..15, 15..25, 25..26, 0..0]);
}

#[test]
fn rows_share_available_height() {
    for page in layout(100, &LayoutConfig::default())
        .iter()
        .filter(|p| p.kind != PageKind::Summary)
    {
        let rows = page.rows.len() as f32;
        assert!(page.row_height > 0.0);
        assert!(page.row_height * rows <= page.available_height + EPS);
    }
}

#[test]
fn nothing_is_stroked_below_the_note() {
    for page in layout(100, &LayoutConfig::default()) {
        let floor = note_top(&page);
        for op in &page.ops {
            if let DrawOp::Stroke { bounds, .. } = op {
                assert!(
                    bounds.y >= floor - EPS,
                    "{:?} page stroke at {} below note top {}",
                    page.kind,
                    bounds.y,
                    floor
                );
            }
        }
    }
}

#[test]
fn banner_only_on_first_page_background_everywhere() {
    let pages = layout(50, &LayoutConfig::default());
    assert!(has_image(&pages[0], ImageSlot::Banner));
    for page in &pages[1..] {
        assert!(!has_image(page, ImageSlot::Banner));
    }
    for page in &pages {
        assert!(has_image(page, ImageSlot::Background));
        assert!(has_image(page, ImageSlot::Footer));
    }
    assert!(has_image(pages.last().unwrap(), ImageSlot::Stamp));
}

#[test]
fn rows_appear_once_in_order() {
    let pages = layout(100, &LayoutConfig::default());
    let seen: Vec<String> = pages
        .iter()
        .flat_map(texts)
        .filter(|t| t.starts_with("row"))
        .map(str::to_string)
        .collect();
    let expected: Vec<String> = (0..100).map(|i| format!("row{i:03}")).collect();
    assert_eq!(seen, expected);
}

#[test]
fn long_account_name_shrinks_to_value_floor() {
    let config = LayoutConfig::default();
    let images = asset_dims();
    let ctx = context(&config, &images);
    let mut statement = statement_with_rows(3);
    statement.account.name = "X".repeat(200);

    let pages = layout_statement(&statement, &ctx, issued_at());
    let size = pages[0]
        .ops
        .iter()
        .find_map(|op| match op {
            DrawOp::Text { text, size, .. } if text == &statement.account.name => Some(*size),
            _ => None,
        })
        .expect("account name is drawn");
    assert_eq!(size, config.value_min_font_size);
}

#[test]
fn empty_account_fields_show_placeholder() {
    let config = LayoutConfig::default();
    let images = asset_dims();
    let ctx = context(&config, &images);
    let mut statement = statement_with_rows(1);
    statement.account.branch = "   ".to_string();

    let pages = layout_statement(&statement, &ctx, issued_at());
    assert!(texts(&pages[0]).contains(&config.labels.placeholder.as_str()));
}

#[test]
fn summary_page_shows_book_and_available_balances() {
    let config = LayoutConfig::default();
    let images = asset_dims();
    let ctx = context(&config, &images);
    let mut statement = statement_with_rows(2);
    statement.adjustments.held_balance = Decimal::from_str("5").unwrap();

    // 10.00 + 10.01
    let pages = layout_statement(&statement, &ctx, issued_at());
    let summary = pages.last().unwrap();
    let drawn = texts(summary);
    let book = format_amount(Decimal::from_str("20.01").unwrap());
    let available = format_amount(Decimal::from_str("15.01").unwrap());
    assert!(drawn.contains(&book.as_str()));
    assert!(drawn.contains(&available.as_str()));
    assert!(drawn.contains(&"2024-05-01"));
    assert!(drawn.contains(&"09:30"));
    assert!(summary.ops.iter().any(|op| matches!(
        op,
        DrawOp::Stroke { line_width, .. } if *line_width == config.highlight_border_width
    )));
}

#[test]
fn summary_stays_above_footer_stack() {
    let pages = layout(10, &LayoutConfig::default());
    let summary = pages.last().unwrap();
    let floor = note_top(summary);
    for op in &summary.ops {
        if let DrawOp::Image {
            slot: ImageSlot::Stamp,
            bounds,
        } = op
        {
            assert!(bounds.y >= floor);
        }
    }
}

#[test]
fn compact_account_tables_leave_more_room() {
    let regular = layout(40, &LayoutConfig::default());
    let compact = layout(
        40,
        &LayoutConfig {
            compact_account_tables: true,
            ..LayoutConfig::default()
        },
    );
    assert!(compact[0].available_height > regular[0].available_height);
}

#[test]
fn footer_spans_full_page_width_on_bottom_margin() {
    let config = LayoutConfig::default();
    for page in layout(50, &config) {
        let footer = page
            .ops
            .iter()
            .find_map(|op| match op {
                DrawOp::Image {
                    slot: ImageSlot::Footer,
                    bounds,
                } => Some(*bounds),
                _ => None,
            })
            .expect("every page draws the footer image");
        assert_eq!(footer.x, 0.0);
        assert_eq!(footer.width, config.page_width);
        assert_eq!(footer.y, config.bottom_margin);
        assert!(note_top(&page) > footer.top());
    }
}

#[test]
fn long_description_is_clamped_and_centred_in_its_row() {
    let config = LayoutConfig {
        first_page_row_cap: 10,
        ..LayoutConfig::default()
    };
    let images = asset_dims();
    let ctx = context(&config, &images);
    let mut statement = statement_with_rows(10);
    statement.lines[0].narrative1 = "word ".repeat(200);

    let pages = layout_statement(&statement, &ctx, issued_at());
    let page = &pages[0];
    let row_h = page.row_height;
    let row_top = note_top(page) + config.table_bottom_gap + page.available_height;
    let line_h = config.line_height(config.body_font_size);
    let max_lines = ((row_h - 2.0 * config.cell_padding) / line_h).floor() as usize;
    assert!(max_lines >= 2, "row of {row_h} should hold several lines");

    let lines: Vec<(&str, f32)> = page
        .ops
        .iter()
        .filter_map(|op| match op {
            DrawOp::Text { text, baseline, .. } if text.starts_with("word") => {
                Some((text.as_str(), *baseline))
            }
            _ => None,
        })
        .collect();

    assert_eq!(lines.len(), max_lines);
    let (last, _) = lines[lines.len() - 1];
    assert!(last.ends_with(ELLIPSIS));
    for (_, baseline) in &lines {
        assert!(*baseline <= row_top && *baseline >= row_top - row_h);
    }

    // equal slack above the first line and below the last
    let ascent = config.body_font_size * 0.75;
    let first_baseline = lines[0].1;
    let last_baseline = lines[lines.len() - 1].1;
    let block_top = first_baseline + ascent + (line_h - config.body_font_size) / 2.0;
    let block_bottom = block_top - lines.len() as f32 * line_h;
    assert!(last_baseline > block_bottom);
    let above = row_top - block_top;
    let below = block_bottom - (row_top - row_h);
    assert!((above - below).abs() < EPS, "above {above} below {below}");
}
