use std::collections::{BTreeMap, HashMap};

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::assets::{ImageAsset, ImageData, ImageSlot, StatementAssets};
use crate::config::LayoutConfig;
use crate::error::Error;
use crate::fonts::{EncodedText, FontRole, Fonts};
use crate::layout::{DrawOp, Page};

const FONT_ROLES: [(FontRole, &str); 2] = [(FontRole::Regular, "F1"), (FontRole::Bold, "F2")];

fn rgb(color: [u8; 3]) -> (f32, f32, f32) {
    let [r, g, b] = color;
    (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

fn write_image(
    pdf: &mut Pdf,
    xobj_ref: Ref,
    image: &ImageAsset,
    alloc: &mut impl FnMut() -> Ref,
) {
    let (w, h) = (image.pixel_width as i32, image.pixel_height as i32);
    match &image.data {
        ImageData::Jpeg { data, gray } => {
            let mut xobj = pdf.image_xobject(xobj_ref, data);
            xobj.filter(Filter::DctDecode);
            xobj.width(w);
            xobj.height(h);
            if *gray {
                xobj.color_space().device_gray();
            } else {
                xobj.color_space().device_rgb();
            }
            xobj.bits_per_component(8);
        }
        ImageData::Flate { rgb, alpha } => {
            let smask_ref = alpha.as_ref().map(|alpha| {
                let mask_ref = alloc();
                let mut mask = pdf.image_xobject(mask_ref, alpha);
                mask.filter(Filter::FlateDecode);
                mask.width(w);
                mask.height(h);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                mask_ref
            });

            let mut xobj = pdf.image_xobject(xobj_ref, rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w);
            xobj.height(h);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
        }
    }
}

fn draw_op(
    content: &mut Content,
    op: &DrawOp,
    fonts: &Fonts,
    image_names: &HashMap<ImageSlot, String>,
    used_glyphs: &mut HashMap<FontRole, BTreeMap<u16, String>>,
) {
    match op {
        DrawOp::Image { slot, bounds } => {
            let Some(name) = image_names.get(slot) else {
                log::warn!("No image loaded for {}; skipped", slot.name());
                return;
            };
            content
                .save_state()
                .transform([bounds.width, 0.0, 0.0, bounds.height, bounds.x, bounds.y])
                .x_object(Name(name.as_bytes()))
                .restore_state();
        }
        DrawOp::Fill { bounds, color } => {
            let (r, g, b) = rgb(*color);
            content
                .save_state()
                .set_fill_rgb(r, g, b)
                .rect(bounds.x, bounds.y, bounds.width, bounds.height)
                .fill_nonzero()
                .restore_state();
        }
        DrawOp::Stroke {
            bounds,
            line_width,
            color,
        } => {
            let (r, g, b) = rgb(*color);
            content
                .save_state()
                .set_line_width(*line_width)
                .set_stroke_rgb(r, g, b)
                .rect(bounds.x, bounds.y, bounds.width, bounds.height)
                .stroke()
                .restore_state();
        }
        DrawOp::Text {
            text,
            x,
            baseline,
            size,
            font,
        } => {
            let pdf_name = FONT_ROLES
                .iter()
                .find(|(role, _)| role == font)
                .map(|(_, name)| *name)
                .unwrap_or("F1");
            let used = used_glyphs.entry(*font).or_default();
            let encoded = fonts.get(*font).encode(text, used);

            content
                .begin_text()
                .set_font(Name(pdf_name.as_bytes()), *size)
                .next_line(*x, *baseline);
            match encoded {
                EncodedText::WinAnsi(bytes) => {
                    content.show(Str(&bytes));
                }
                EncodedText::Glyphs(glyphs) => {
                    let mut shown = content.show_positioned();
                    let mut items = shown.items();
                    for (gid, adjust) in glyphs {
                        items.show(Str(&gid.to_be_bytes()));
                        if adjust.abs() > 0.01 {
                            items.adjust(adjust);
                        }
                    }
                }
            }
            content.end_text();
        }
    }
}

/// Serialize laid-out pages into a PDF document.
pub fn render(
    pages: &[Page],
    assets: &StatementAssets,
    fonts: &Fonts,
    config: &LayoutConfig,
) -> Result<Vec<u8>, Error> {
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();

    // Phase 1: images, written once and shared by every page
    let mut image_names: HashMap<ImageSlot, String> = HashMap::new();
    let mut image_xobjects: Vec<(String, Ref)> = Vec::new();
    for slot in ImageSlot::ALL {
        let Some(image) = assets.get(slot) else {
            continue;
        };
        let xobj_ref = alloc();
        let pdf_name = format!("Im{}", image_xobjects.len() + 1);
        write_image(&mut pdf, xobj_ref, image, &mut alloc);
        image_xobjects.push((pdf_name.clone(), xobj_ref));
        image_names.insert(slot, pdf_name);
    }

    let font_refs: Vec<(FontRole, &str, Ref)> = FONT_ROLES
        .iter()
        .map(|&(role, name)| (role, name, alloc()))
        .collect();

    // Phase 2: one content stream per page
    let mut used_glyphs: HashMap<FontRole, BTreeMap<u16, String>> = HashMap::new();
    let mut page_ids = Vec::with_capacity(pages.len());
    for page in pages {
        let mut content = Content::new();
        for op in &page.ops {
            draw_op(&mut content, op, fonts, &image_names, &mut used_glyphs);
        }

        let page_id = alloc();
        let content_id = alloc();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&content.finish(), 6);
        pdf.stream(content_id, &compressed).filter(Filter::FlateDecode);

        let mut pdf_page = pdf.page(page_id);
        pdf_page
            .media_box(Rect::new(0.0, 0.0, config.page_width, config.page_height))
            .parent(pages_id)
            .contents(content_id);
        let mut resources = pdf_page.resources();
        {
            let mut font_dict = resources.fonts();
            for (_, name, font_ref) in &font_refs {
                font_dict.pair(Name(name.as_bytes()), *font_ref);
            }
        }
        {
            let mut xobjects = resources.x_objects();
            for (name, xobj_ref) in &image_xobjects {
                xobjects.pair(Name(name.as_bytes()), *xobj_ref);
            }
        }
        drop(resources);
        drop(pdf_page);
        page_ids.push(page_id);
    }

    // Phase 3: fonts, now that every shown glyph is known
    let no_glyphs = BTreeMap::new();
    for (role, _, font_ref) in &font_refs {
        let used = used_glyphs.get(role).unwrap_or(&no_glyphs);
        fonts.get(*role).write(&mut pdf, *font_ref, &mut alloc, used)?;
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    let bytes = pdf.finish();
    log::info!(
        "Rendered {} pages ({} bytes) in {:.1}ms",
        pages.len(),
        bytes.len(),
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Ok(bytes)
}
