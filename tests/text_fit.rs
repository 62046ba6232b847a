mod common;

use certified_statement::text_fit::{ELLIPSIS, TextMeasure, fit_single_line, wrap_and_clamp};
use common::{FixedAdvance, HALF_EM};

struct NoEllipsisGlyph;

impl TextMeasure for NoEllipsisGlyph {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        HALF_EM.text_width(text, size)
    }

    fn supports(&self, ch: char) -> bool {
        ch != '\u{2026}'
    }
}

#[test]
fn fit_keeps_start_size_when_text_fits() {
    assert_eq!(fit_single_line(&HALF_EM, "hello", 100.0, 10.0, 4.0), 10.0);
}

#[test]
fn fit_shrinks_in_half_point_steps() {
    // 5 chars at half an em: 2.5 * size <= 20 first holds at 8pt
    let size = fit_single_line(&HALF_EM, "hello", 20.0, 10.0, 4.0);
    assert_eq!(size, 8.0);
    assert!(HALF_EM.text_width("hello", size) <= 20.0);
}

#[test]
fn fit_stops_at_floor_when_nothing_fits() {
    assert_eq!(fit_single_line(&HALF_EM, "hello", 1.0, 10.0, 4.0), 4.0);
}

#[test]
fn fit_never_returns_below_start_when_floor_is_higher() {
    assert_eq!(fit_single_line(&HALF_EM, "hello", 1.0, 6.0, 9.0), 6.0);
}

#[test]
fn fit_is_idempotent() {
    let wide = FixedAdvance { em: 0.6 };
    for width in [5.0, 17.0, 33.3, 48.0, 500.0] {
        let first = fit_single_line(&wide, "1,234,567.89", width, 9.0, 4.5);
        let second = fit_single_line(&wide, "1,234,567.89", width, first, 4.5);
        assert_eq!(first, second, "width {width}");
        assert!((4.5..=9.0).contains(&first));
    }
}

#[test]
fn wrap_breaks_on_whitespace() {
    let lines = wrap_and_clamp(&HALF_EM, "alpha beta gamma", 60.0, 5, 10.0);
    assert_eq!(lines, vec!["alpha beta", "gamma"]);
}

#[test]
fn wrap_clamps_and_ellipsizes_last_line() {
    let lines = wrap_and_clamp(&HALF_EM, "alpha beta gamma delta", 30.0, 2, 10.0);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "alpha");
    assert!(lines[1].ends_with(ELLIPSIS));
    assert!(HALF_EM.text_width(&lines[1], 10.0) <= 30.0);
}

#[test]
fn wrap_keeps_all_lines_when_they_fit() {
    let lines = wrap_and_clamp(&HALF_EM, "alpha beta gamma delta", 30.0, 4, 10.0);
    assert_eq!(lines, vec!["alpha", "beta", "gamma", "delta"]);
    assert!(lines.iter().all(|l| !l.ends_with(ELLIPSIS)));
}

#[test]
fn wrap_never_exceeds_max_lines() {
    let text = "one two three four five six seven eight nine ten";
    for max_lines in 1..6 {
        let lines = wrap_and_clamp(&HALF_EM, text, 25.0, max_lines, 10.0);
        assert!(lines.len() <= max_lines);
    }
}

#[test]
fn wrap_treats_zero_max_lines_as_one() {
    let lines = wrap_and_clamp(&HALF_EM, "alpha beta", 30.0, 0, 10.0);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].ends_with(ELLIPSIS));
}

#[test]
fn wrap_empty_text_is_single_empty_line() {
    assert_eq!(wrap_and_clamp(&HALF_EM, "", 30.0, 3, 10.0), vec![String::new()]);
    assert_eq!(wrap_and_clamp(&HALF_EM, "   ", 30.0, 3, 10.0), vec![String::new()]);
}

#[test]
fn wrap_leaves_overlong_word_whole() {
    let lines = wrap_and_clamp(&HALF_EM, "supercalifragilistic", 30.0, 3, 10.0);
    assert_eq!(lines, vec!["supercalifragilistic"]);
}

#[test]
fn clamped_line_is_empty_when_ellipsis_alone_overflows() {
    // the ellipsis is 5pt wide at 10pt, the cell 4pt
    let lines = wrap_and_clamp(&HALF_EM, "alpha beta gamma", 4.0, 1, 10.0);
    assert_eq!(lines, vec![String::new()]);
}

#[test]
fn ellipsis_falls_back_to_ascii_dots() {
    let lines = wrap_and_clamp(&NoEllipsisGlyph, "alpha beta gamma", 30.0, 2, 10.0);
    assert_eq!(lines, vec!["alpha", "bet..."]);
}
