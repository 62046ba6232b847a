use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Filter, Name, Pdf, Rect, Ref, Str};
use rustybuzz::{Direction, UnicodeBuffer};
use ttf_parser::{Face, GlyphId};

use crate::error::Error;
use crate::text_fit::TextMeasure;

/// (lowercase family name, bold, italic) -> (file path, face index within TTC)
type FontLookup = HashMap<(String, bool, bool), (PathBuf, u32)>;

static FONT_INDEX: OnceLock<FontLookup> = OnceLock::new();

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

fn read_font_style(data: &[u8], face_index: u32) -> Option<(String, bool, bool)> {
    let face = Face::parse(data, face_index).ok()?;
    let family = font_family_name(&face)?;
    Some((family, face.is_bold(), face.is_italic()))
}

fn font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    // 1. User-configured directories via STATEMENT_FONTS env var
    if let Ok(val) = std::env::var("STATEMENT_FONTS") {
        let sep = if cfg!(windows) { ';' } else { ':' };
        for part in val.split(sep) {
            let trimmed = part.trim();
            if !trimmed.is_empty() {
                dirs.push(PathBuf::from(trimmed));
            }
        }
    }

    // 2. Platform-specific system font directories
    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend([
            "/usr/share/fonts".into(),
            "/usr/local/share/fonts".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

fn scan_font_dirs() -> FontLookup {
    let mut index = FontLookup::new();

    // Recursive walk using a stack
    let mut stack: Vec<PathBuf> = font_directories();
    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            let is_collection = match path.extension().and_then(|e| e.to_str()) {
                Some("ttf" | "otf" | "TTF" | "OTF") => false,
                Some("ttc" | "TTC") => true,
                _ => continue,
            };
            let Ok(data) = std::fs::read(&path) else {
                continue;
            };
            let face_count = if is_collection {
                ttf_parser::fonts_in_collection(&data).unwrap_or(1)
            } else {
                1
            };
            for face_idx in 0..face_count {
                if let Some((family, bold, italic)) = read_font_style(&data, face_idx) {
                    index
                        .entry((family.to_lowercase(), bold, italic))
                        .or_insert((path.clone(), face_idx));
                }
            }
        }
    }
    index
}

/// Look up an upright font file by family name. Falls back to the regular
/// variant when bold is not installed.
fn find_font_file(family: &str, bold: bool) -> Option<(PathBuf, u32)> {
    let index = FONT_INDEX.get_or_init(scan_font_dirs);
    let key = family.to_lowercase();
    index
        .get(&(key.clone(), bold, false))
        .or_else(|| if bold { index.get(&(key, false, false)) } else { None })
        .cloned()
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
/// Characters outside the code page are dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars().filter_map(winansi_byte).collect()
}

fn winansi_byte(c: char) -> Option<u8> {
    match c as u32 {
        0x0000..=0x007F => Some(c as u8),
        0x00A0..=0x00FF => Some(c as u8), // Latin-1 supplement maps directly
        0x20AC => Some(0x80),
        0x201A => Some(0x82),
        0x0192 => Some(0x83),
        0x201E => Some(0x84),
        0x2026 => Some(0x85),
        0x2020 => Some(0x86),
        0x2021 => Some(0x87),
        0x02C6 => Some(0x88),
        0x2030 => Some(0x89),
        0x0160 => Some(0x8A),
        0x2039 => Some(0x8B),
        0x0152 => Some(0x8C),
        0x017D => Some(0x8E),
        0x2018 => Some(0x91),
        0x2019 => Some(0x92),
        0x201C => Some(0x93),
        0x201D => Some(0x94),
        0x2022 => Some(0x95), // bullet
        0x2013 => Some(0x96),
        0x2014 => Some(0x97),
        0x02DC => Some(0x98),
        0x2122 => Some(0x99),
        0x0161 => Some(0x9A),
        0x203A => Some(0x9B),
        0x0153 => Some(0x9C),
        0x017E => Some(0x9E),
        0x0178 => Some(0x9F),
        _ => None,
    }
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,                          // space
            33..=47 => 333.0,                     // punctuation
            48..=57 => 556.0,                     // digits
            58..=64 => 333.0,                     // more punctuation
            73 | 74 => 278.0,                     // I J (narrow uppercase)
            77 => 833.0,                          // M (wide)
            65..=90 => 667.0,                     // uppercase A-Z (average)
            91..=96 => 333.0,                     // brackets etc.
            102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
            109 | 119 => 833.0,                   // m w (wide)
            97..=122 => 556.0,                    // lowercase a-z (average)
            133 => 1000.0,                        // ellipsis
            _ => 556.0,
        })
        .collect()
}

fn identity_system_info() -> SystemInfo<'static> {
    SystemInfo {
        registry: Str(b"Adobe"),
        ordering: Str(b"Identity"),
        supplement: 0,
    }
}

fn detect_direction(text: &str) -> Direction {
    let rtl = text.chars().any(|ch| {
        matches!(
            ch as u32,
            0x0590..=0x08FF | 0xFB1D..=0xFDFF | 0xFE70..=0xFEFF | 0x1EE00..=0x1EEFF
        )
    });
    if rtl {
        Direction::RightToLeft
    } else {
        Direction::LeftToRight
    }
}

/// Where to get the two faces the statement uses.
#[derive(Clone, Debug, Default)]
pub struct FontSource {
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
    /// Installed family to look up when no explicit file is given.
    pub family: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FontRole {
    Regular,
    Bold,
}

struct EmbeddedFace {
    data: Vec<u8>,
    index: u32,
    ps_name: String,
    units_per_em: f32,
    ascender_ratio: f32,
}

enum FontKind {
    Builtin {
        base_font: &'static str,
        widths_1000: Vec<f32>,
    },
    Embedded(EmbeddedFace),
}

pub struct ShapedGlyph {
    pub gid: u16,
    /// Advance after shaping, in 1/1000 em.
    pub advance: f32,
    /// Source text this glyph was produced from.
    pub text: String,
}

pub(crate) enum EncodedText {
    WinAnsi(Vec<u8>),
    /// Glyph id with its TJ adjustment against the default advance.
    Glyphs(Vec<(u16, f32)>),
}

pub struct LoadedFont {
    kind: FontKind,
    warned_dropped: Cell<bool>,
    /// Unit-size shaped widths by text; fitting asks for the same string repeatedly.
    width_cache: RefCell<HashMap<String, f32>>,
}

impl LoadedFont {
    pub fn helvetica(role: FontRole) -> Self {
        let base_font = match role {
            FontRole::Regular => "Helvetica",
            FontRole::Bold => "Helvetica-Bold",
        };
        Self::new(FontKind::Builtin {
            base_font,
            widths_1000: helvetica_widths(),
        })
    }

    pub fn from_file(path: &Path, face_index: u32) -> Result<Self, Error> {
        let data = std::fs::read(path)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
        Self::from_bytes(data, face_index)
            .map_err(|reason| Error::Font(format!("{}: {reason}", path.display())))
    }

    pub fn from_bytes(data: Vec<u8>, index: u32) -> Result<Self, String> {
        let face = Face::parse(&data, index).map_err(|e| e.to_string())?;
        if rustybuzz::Face::from_slice(&data, index).is_none() {
            return Err("font cannot be shaped".to_string());
        }
        let units_per_em = face.units_per_em() as f32;
        let ascender_ratio = face.ascender() as f32 / units_per_em;
        let ps_name = font_family_name(&face)
            .unwrap_or_else(|| "EmbeddedFont".to_string())
            .replace(' ', "");
        Ok(Self::new(FontKind::Embedded(EmbeddedFace {
            data,
            index,
            ps_name,
            units_per_em,
            ascender_ratio,
        })))
    }

    fn new(kind: FontKind) -> Self {
        Self {
            kind,
            warned_dropped: Cell::new(false),
            width_cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &str {
        match &self.kind {
            FontKind::Builtin { base_font, .. } => base_font,
            FontKind::Embedded(face) => &face.ps_name,
        }
    }

    /// Shape `text` into positioned glyphs in visual order. Builtin fonts are not shaped.
    pub fn shape(&self, text: &str) -> Vec<ShapedGlyph> {
        let FontKind::Embedded(face) = &self.kind else {
            return Vec::new();
        };
        let Some(hb_face) = rustybuzz::Face::from_slice(&face.data, face.index) else {
            return Vec::new();
        };

        let mut buffer = UnicodeBuffer::new();
        buffer.push_str(text);
        buffer.set_direction(detect_direction(text));
        let output = rustybuzz::shape(&hb_face, &[], buffer);

        let infos = output.glyph_infos();
        let positions = output.glyph_positions();
        let mut starts: Vec<usize> = infos.iter().map(|g| g.cluster as usize).collect();
        starts.sort_unstable();
        starts.dedup();

        let scale = 1000.0 / face.units_per_em;
        infos
            .iter()
            .zip(positions)
            .map(|(info, pos)| {
                let start = (info.cluster as usize).min(text.len());
                let end = starts
                    .iter()
                    .copied()
                    .find(|&s| s > start)
                    .unwrap_or(text.len())
                    .min(text.len());
                ShapedGlyph {
                    gid: info.glyph_id as u16,
                    advance: pos.x_advance as f32 * scale,
                    text: text.get(start..end).unwrap_or_default().to_string(),
                }
            })
            .collect()
    }

    fn unit_width(&self, text: &str) -> f32 {
        if let Some(w) = self.width_cache.borrow().get(text) {
            return *w;
        }
        let width = match &self.kind {
            FontKind::Builtin { widths_1000, .. } => to_winansi_bytes(text)
                .iter()
                .filter(|&&b| b >= 32)
                .map(|&b| widths_1000[(b - 32) as usize])
                .sum(),
            FontKind::Embedded(_) => self.shape(text).iter().map(|g| g.advance).sum(),
        };
        self.width_cache.borrow_mut().insert(text.to_string(), width);
        width
    }

    pub(crate) fn encode(&self, text: &str, used: &mut BTreeMap<u16, String>) -> EncodedText {
        match &self.kind {
            FontKind::Builtin { .. } => {
                let bytes = to_winansi_bytes(text);
                if bytes.len() != text.chars().count() && !self.warned_dropped.replace(true) {
                    log::warn!(
                        "{} cannot encode some characters in {text:?}; configure a Unicode font",
                        self.name()
                    );
                }
                EncodedText::WinAnsi(bytes)
            }
            FontKind::Embedded(face) => {
                let Ok(parsed) = Face::parse(&face.data, face.index) else {
                    return EncodedText::Glyphs(Vec::new());
                };
                let scale = 1000.0 / face.units_per_em;
                let glyphs = self
                    .shape(text)
                    .into_iter()
                    .map(|g| {
                        let default_adv = parsed
                            .glyph_hor_advance(GlyphId(g.gid))
                            .map(|a| a as f32 * scale)
                            .unwrap_or(0.0);
                        let source = used.entry(g.gid).or_default();
                        if source.is_empty() {
                            *source = g.text;
                        }
                        (g.gid, default_adv - g.advance)
                    })
                    .collect();
                EncodedText::Glyphs(glyphs)
            }
        }
    }

    /// Write the font objects. `used` maps every glyph shown to its source text.
    pub(crate) fn write(
        &self,
        pdf: &mut Pdf,
        font_ref: Ref,
        alloc: &mut impl FnMut() -> Ref,
        used: &BTreeMap<u16, String>,
    ) -> Result<(), Error> {
        let face = match &self.kind {
            FontKind::Builtin { base_font, .. } => {
                pdf.type1_font(font_ref)
                    .base_font(Name(base_font.as_bytes()))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
                return Ok(());
            }
            FontKind::Embedded(face) => face,
        };
        let parsed = Face::parse(&face.data, face.index)
            .map_err(|e| Error::Font(format!("{}: {e}", face.ps_name)))?;

        let cid_ref = alloc();
        let descriptor_ref = alloc();
        let data_ref = alloc();
        let cmap_ref = alloc();

        let units = face.units_per_em;
        let to_1000 = |v: f32| v / units * 1000.0;
        let bb = parsed.global_bounding_box();
        let bbox = Rect::new(
            to_1000(bb.x_min as f32),
            to_1000(bb.y_min as f32),
            to_1000(bb.x_max as f32),
            to_1000(bb.y_max as f32),
        );
        let cap_height = parsed
            .capital_height()
            .map(|h| to_1000(h as f32))
            .unwrap_or(700.0);

        let data_len = i32::try_from(face.data.len())
            .map_err(|_| Error::Font(format!("{} is too large to embed", face.ps_name)))?;
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&face.data, 6);
        pdf.stream(data_ref, &compressed)
            .filter(Filter::FlateDecode)
            .pair(Name(b"Length1"), data_len);

        let ps_name = face.ps_name.as_bytes();
        pdf.font_descriptor(descriptor_ref)
            .name(Name(ps_name))
            .flags(FontFlags::NON_SYMBOLIC)
            .bbox(bbox)
            .italic_angle(0.0)
            .ascent(to_1000(parsed.ascender() as f32))
            .descent(to_1000(parsed.descender() as f32))
            .cap_height(cap_height)
            .stem_v(80.0)
            .font_file2(data_ref);

        let mut cid = pdf.cid_font(cid_ref);
        cid.subtype(CidFontType::Type2)
            .base_font(Name(ps_name))
            .system_info(identity_system_info())
            .font_descriptor(descriptor_ref)
            .default_width(0.0);
        {
            let mut widths = cid.widths();
            for &gid in used.keys() {
                let advance = parsed
                    .glyph_hor_advance(GlyphId(gid))
                    .map(|a| to_1000(a as f32))
                    .unwrap_or(0.0);
                widths.consecutive(gid, [advance]);
            }
        }
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        drop(cid);

        let mut cmap = UnicodeCmap::new(Name(b"Custom"), identity_system_info());
        for (&gid, text) in used {
            if !text.is_empty() {
                cmap.pair_with_multiple(gid, text.chars());
            }
        }
        let cmap_data = cmap.finish();
        pdf.cmap(cmap_ref, &cmap_data);

        pdf.type0_font(font_ref)
            .base_font(Name(ps_name))
            .encoding_predefined(Name(b"Identity-H"))
            .descendant_font(cid_ref)
            .to_unicode(cmap_ref);

        Ok(())
    }
}

impl TextMeasure for LoadedFont {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        self.unit_width(text) * size / 1000.0
    }

    fn ascender_ratio(&self) -> f32 {
        match &self.kind {
            FontKind::Builtin { .. } => 0.718,
            FontKind::Embedded(face) => face.ascender_ratio,
        }
    }

    fn supports(&self, ch: char) -> bool {
        match &self.kind {
            FontKind::Builtin { .. } => winansi_byte(ch).is_some(),
            FontKind::Embedded(face) => Face::parse(&face.data, face.index)
                .ok()
                .and_then(|f| f.glyph_index(ch))
                .is_some(),
        }
    }
}

/// The regular and bold faces of one statement.
pub struct Fonts {
    pub regular: LoadedFont,
    pub bold: LoadedFont,
}

impl Fonts {
    pub fn builtin() -> Self {
        Self {
            regular: LoadedFont::helvetica(FontRole::Regular),
            bold: LoadedFont::helvetica(FontRole::Bold),
        }
    }

    /// Explicit files win, then an installed family, then built-in Helvetica.
    /// An explicit file that cannot be read is an error.
    pub fn load(source: &FontSource) -> Result<Self, Error> {
        let family = source.family.as_deref();
        let regular = Self::resolve(source.regular.as_deref(), family, FontRole::Regular)?;
        let bold = match (&source.bold, &source.regular) {
            (Some(_), _) | (None, None) => {
                Self::resolve(source.bold.as_deref(), family, FontRole::Bold)?
            }
            // A lone regular file doubles as bold rather than mixing in Helvetica.
            (None, Some(path)) => LoadedFont::from_file(path, 0)?,
        };
        log::info!("Fonts: regular={} bold={}", regular.name(), bold.name());
        Ok(Self { regular, bold })
    }

    fn resolve(
        path: Option<&Path>,
        family: Option<&str>,
        role: FontRole,
    ) -> Result<LoadedFont, Error> {
        if let Some(path) = path {
            return LoadedFont::from_file(path, 0);
        }
        if let Some(family) = family {
            let found = find_font_file(family, role == FontRole::Bold)
                .and_then(|(path, index)| LoadedFont::from_file(&path, index).ok());
            if let Some(font) = found {
                return Ok(font);
            }
            log::warn!("Font not found: {family} ({role:?}), using Helvetica");
        }
        Ok(LoadedFont::helvetica(role))
    }

    pub fn get(&self, role: FontRole) -> &LoadedFont {
        match role {
            FontRole::Regular => &self.regular,
            FontRole::Bold => &self.bold,
        }
    }
}
