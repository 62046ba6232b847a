use std::path::{Path, PathBuf};

use image::{ColorType, DynamicImage, ImageFormat};
use rayon::prelude::*;

use crate::error::Error;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Background,
    Banner,
    Note,
    Footer,
    Stamp,
}

impl ImageSlot {
    pub const ALL: [ImageSlot; 5] = [
        ImageSlot::Background,
        ImageSlot::Banner,
        ImageSlot::Note,
        ImageSlot::Footer,
        ImageSlot::Stamp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ImageSlot::Background => "background",
            ImageSlot::Banner => "banner",
            ImageSlot::Note => "note",
            ImageSlot::Footer => "footer",
            ImageSlot::Stamp => "stamp",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ImageDims {
    pub width: u32,
    pub height: u32,
}

impl ImageDims {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Display height for `display_width` keeping the pixel aspect ratio.
    pub fn height_for_width(&self, display_width: f32) -> f32 {
        if self.width == 0 {
            return 0.0;
        }
        display_width * self.height as f32 / self.width as f32
    }
}

/// Pixel sizes of the loaded images; all the layout engine needs to know about them.
#[derive(Clone, Debug)]
pub struct AssetDims {
    pub background: ImageDims,
    pub banner: Option<ImageDims>,
    pub note: ImageDims,
    pub footer: ImageDims,
    pub stamp: ImageDims,
}

pub(crate) enum ImageData {
    /// Baseline JPEG passed through untouched.
    Jpeg { data: Vec<u8>, gray: bool },
    /// Zlib-compressed 8-bit RGB samples, plus an optional compressed alpha plane.
    Flate { rgb: Vec<u8>, alpha: Option<Vec<u8>> },
}

pub struct ImageAsset {
    pub pixel_width: u32,
    pub pixel_height: u32,
    pub(crate) data: ImageData,
}

impl ImageAsset {
    pub fn decode(name: &str, bytes: Vec<u8>) -> Result<Self, Error> {
        let fail = |reason: String| Error::AssetLoad {
            name: name.to_string(),
            reason,
        };
        let format = image::guess_format(&bytes).map_err(|e| fail(e.to_string()))?;
        let decoded = image::load_from_memory_with_format(&bytes, format)
            .map_err(|e| fail(e.to_string()))?;
        let (pixel_width, pixel_height) = (decoded.width(), decoded.height());
        if pixel_width == 0 || pixel_height == 0 {
            return Err(fail("image has no pixels".to_string()));
        }

        let data = match (format, decoded.color()) {
            (ImageFormat::Jpeg, ColorType::Rgb8) => ImageData::Jpeg { data: bytes, gray: false },
            (ImageFormat::Jpeg, ColorType::L8) => ImageData::Jpeg { data: bytes, gray: true },
            _ => flate_image(&decoded),
        };

        log::debug!("Decoded asset {name}: {pixel_width}x{pixel_height} {format:?}");
        Ok(Self {
            pixel_width,
            pixel_height,
            data,
        })
    }

    pub fn dims(&self) -> ImageDims {
        ImageDims::new(self.pixel_width, self.pixel_height)
    }
}

fn flate_image(decoded: &DynamicImage) -> ImageData {
    let rgba = decoded.to_rgba8();
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = rgba
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    let alpha = has_alpha.then(|| {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6)
    });

    ImageData::Flate {
        rgb: miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6),
        alpha,
    }
}

/// Where the template images live on disk.
#[derive(Clone, Debug)]
pub struct AssetPaths {
    /// Full-page background, pre-rasterized from the watermark document.
    pub background: PathBuf,
    pub banner: Option<PathBuf>,
    pub note: PathBuf,
    pub footer: PathBuf,
    pub stamp: PathBuf,
}

impl AssetPaths {
    /// Find `background`, `banner`, `note`, `footer` and `stamp` images in `dir`.
    /// Only the banner may be missing.
    pub fn from_dir(dir: &Path) -> Result<Self, Error> {
        let required = |slot: ImageSlot| {
            find_image(dir, slot.name()).ok_or_else(|| Error::AssetLoad {
                name: slot.name().to_string(),
                reason: format!("no {}.{{png,jpg,jpeg}} in {}", slot.name(), dir.display()),
            })
        };
        Ok(Self {
            background: required(ImageSlot::Background)?,
            banner: find_image(dir, ImageSlot::Banner.name()),
            note: required(ImageSlot::Note)?,
            footer: required(ImageSlot::Footer)?,
            stamp: required(ImageSlot::Stamp)?,
        })
    }

    fn entries(&self) -> Vec<(ImageSlot, &Path)> {
        let mut entries = vec![
            (ImageSlot::Background, self.background.as_path()),
            (ImageSlot::Note, self.note.as_path()),
            (ImageSlot::Footer, self.footer.as_path()),
            (ImageSlot::Stamp, self.stamp.as_path()),
        ];
        if let Some(banner) = &self.banner {
            entries.push((ImageSlot::Banner, banner.as_path()));
        }
        entries
    }
}

fn find_image(dir: &Path, stem: &str) -> Option<PathBuf> {
    IMAGE_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{stem}.{ext}")))
        .find(|p| p.is_file())
}

pub struct StatementAssets {
    pub background: ImageAsset,
    pub banner: Option<ImageAsset>,
    pub note: ImageAsset,
    pub footer: ImageAsset,
    pub stamp: ImageAsset,
}

impl StatementAssets {
    pub fn get(&self, slot: ImageSlot) -> Option<&ImageAsset> {
        match slot {
            ImageSlot::Background => Some(&self.background),
            ImageSlot::Banner => self.banner.as_ref(),
            ImageSlot::Note => Some(&self.note),
            ImageSlot::Footer => Some(&self.footer),
            ImageSlot::Stamp => Some(&self.stamp),
        }
    }

    pub fn dims(&self) -> AssetDims {
        AssetDims {
            background: self.background.dims(),
            banner: self.banner.as_ref().map(ImageAsset::dims),
            note: self.note.dims(),
            footer: self.footer.dims(),
            stamp: self.stamp.dims(),
        }
    }
}

/// Read and decode every asset concurrently. Any failure aborts the whole load.
pub fn load_assets(paths: &AssetPaths) -> Result<StatementAssets, Error> {
    let loaded = paths
        .entries()
        .into_par_iter()
        .map(|(slot, path)| {
            let bytes = std::fs::read(path).map_err(|e| Error::AssetLoad {
                name: slot.name().to_string(),
                reason: format!("{}: {e}", path.display()),
            })?;
            ImageAsset::decode(slot.name(), bytes).map(|asset| (slot, asset))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let mut background = None;
    let mut banner = None;
    let mut note = None;
    let mut footer = None;
    let mut stamp = None;
    for (slot, asset) in loaded {
        let target = match slot {
            ImageSlot::Background => &mut background,
            ImageSlot::Banner => &mut banner,
            ImageSlot::Note => &mut note,
            ImageSlot::Footer => &mut footer,
            ImageSlot::Stamp => &mut stamp,
        };
        *target = Some(asset);
    }

    let missing = |slot: ImageSlot| Error::AssetLoad {
        name: slot.name().to_string(),
        reason: "not loaded".to_string(),
    };
    Ok(StatementAssets {
        background: background.ok_or_else(|| missing(ImageSlot::Background))?,
        banner,
        note: note.ok_or_else(|| missing(ImageSlot::Note))?,
        footer: footer.ok_or_else(|| missing(ImageSlot::Footer))?,
        stamp: stamp.ok_or_else(|| missing(ImageSlot::Stamp))?,
    })
}
