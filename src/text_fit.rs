//! Single-line font fitting and greedy wrap with ellipsis clamping.

/// Decrement used while shrinking text towards the font floor.
pub const FIT_STEP: f32 = 0.5;

pub const ELLIPSIS: &str = "\u{2026}";
const ASCII_ELLIPSIS: &str = "...";

/// Text metrics needed by the layout engine.
pub trait TextMeasure {
    /// Advance width of `text` at `size` points.
    fn text_width(&self, text: &str, size: f32) -> f32;

    /// Ascent as a fraction of the font size.
    fn ascender_ratio(&self) -> f32 {
        0.75
    }

    fn supports(&self, _ch: char) -> bool {
        true
    }
}

/// Largest size in `[min_size, start_size]`, walking down in [`FIT_STEP`]s, at which
/// `text` fits in `max_width`. Returns the floor when nothing fits; the caller draws
/// the overflowing text anyway.
pub fn fit_single_line(
    measure: &dyn TextMeasure,
    text: &str,
    max_width: f32,
    start_size: f32,
    min_size: f32,
) -> f32 {
    let floor = min_size.min(start_size);
    let mut size = start_size;
    while size > floor && measure.text_width(text, size) > max_width {
        size = (size - FIT_STEP).max(floor);
    }
    size
}

/// Greedy word wrap at `width`, keeping at most `max_lines` lines. When lines are
/// dropped, the last kept line loses trailing characters until it fits with an
/// ellipsis appended; if the ellipsis alone is wider than `width` that line is
/// left empty. A single word wider than `width` stays whole on its line.
pub fn wrap_and_clamp(
    measure: &dyn TextMeasure,
    text: &str,
    width: f32,
    max_lines: usize,
    size: f32,
) -> Vec<String> {
    let max_lines = max_lines.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure.text_width(&candidate, size) > width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    lines.push(current);

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            *last = ellipsize(measure, last, width, size);
        }
    }
    lines
}

fn ellipsize(measure: &dyn TextMeasure, line: &str, width: f32, size: f32) -> String {
    let marker = if ELLIPSIS.chars().all(|c| measure.supports(c)) {
        ELLIPSIS
    } else {
        ASCII_ELLIPSIS
    };
    if measure.text_width(marker, size) > width {
        return String::new();
    }
    let mut base = line.to_string();
    loop {
        let candidate = format!("{}{marker}", base.trim_end());
        if base.is_empty() || measure.text_width(&candidate, size) <= width {
            return candidate;
        }
        base.pop();
    }
}
