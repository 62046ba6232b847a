use crate::assets::ImageSlot;

use super::{Bounds, Canvas, LayoutContext};

/// Draw the full-page background and, on the first page, the top banner.
/// Returns the banner height, or 0 when no banner was drawn.
pub fn render_chrome(canvas: &mut Canvas, ctx: &LayoutContext, is_first_page: bool) -> f32 {
    let cfg = ctx.config;
    canvas.image(
        ImageSlot::Background,
        Bounds::new(0.0, 0.0, cfg.page_width, cfg.page_height),
    );

    let Some(banner) = ctx.images.banner.filter(|_| is_first_page) else {
        return 0.0;
    };
    let width = cfg.page_width - 2.0 * cfg.side_margin;
    let height = banner.height_for_width(width);
    canvas.image(
        ImageSlot::Banner,
        Bounds::from_top(
            cfg.side_margin,
            cfg.page_height - cfg.banner_top_margin,
            width,
            height,
        ),
    );
    height
}

/// Draw the footer image across the full page width on the bottom margin, with
/// the note image stacked above it. Returns the top of the note image; nothing
/// else may go below it.
pub fn render_footer_stack(canvas: &mut Canvas, ctx: &LayoutContext) -> f32 {
    let cfg = ctx.config;
    let width = cfg.page_width;

    let footer_h = ctx.images.footer.height_for_width(width);
    let footer = Bounds::new(0.0, cfg.bottom_margin, width, footer_h);
    canvas.image(ImageSlot::Footer, footer);

    let note_h = ctx.images.note.height_for_width(width);
    let note = Bounds::new(0.0, footer.top() + cfg.footer_gap, width, note_h);
    canvas.image(ImageSlot::Note, note);

    note.top()
}
