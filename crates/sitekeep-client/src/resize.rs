//! Fixed-size image variants for the site's avatar and logo.
//!
//! Each [`Preset`] reads one source image from the images directory and
//! writes a resized copy per [`Variant`] next to it. Resizing is exact
//! (aspect ratio is not preserved) with Lanczos3 filtering.

use std::path::{Path, PathBuf};

use image::codecs::ico::{IcoEncoder, IcoFrame};
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType};
use sitekeep_core::error::AppError;

use crate::optimizer::{encode_jpeg, encode_png, image_error};

#[derive(Debug, Clone, Copy)]
pub struct Variant {
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

const fn square(name: &'static str, side: u32) -> Variant {
    Variant {
        name,
        width: side,
        height: side,
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Encoding {
    Jpeg { quality: u8 },
    Png,
}

impl Encoding {
    fn extension(self) -> &'static str {
        match self {
            Encoding::Jpeg { .. } => "jpg",
            Encoding::Png => "png",
        }
    }
}

/// A source image and the variants generated from it.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    pub label: &'static str,
    /// File name of the source, relative to the images directory.
    pub source: &'static str,
    /// Output files are named `<prefix><variant>.<ext>`.
    pub output_prefix: &'static str,
    pub encoding: Encoding,
    pub variants: &'static [Variant],
}

pub const AVATAR: Preset = Preset {
    label: "avatar",
    source: "author_.jpg",
    output_prefix: "author_",
    encoding: Encoding::Jpeg { quality: 90 },
    variants: &[
        square("avatar_large", 150),
        square("avatar_medium", 120),
        square("avatar_small", 80),
        square("avatar_navbar", 60),
        square("avatar_favicon", 48),
        square("web", 120),
    ],
};

pub const LOGO: Preset = Preset {
    label: "logo",
    source: "logo.png",
    output_prefix: "logo_",
    encoding: Encoding::Png,
    variants: &[
        square("logo_navbar", 180),
        square("logo_header", 240),
        square("logo_medium", 120),
        square("logo_small", 80),
        square("favicon", 64),
        square("favicon_small", 32),
        square("web", 200),
    ],
};

/// Source for the favicon, produced by the `favicon` variant of [`LOGO`].
pub const FAVICON_SOURCE: &str = "logo_favicon.png";
pub const FAVICON_FILE: &str = "favicon.ico";
pub const FAVICON_SIZES: &[u32] = &[32, 64];

/// One file written by this module.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GeneratedFile {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
}

impl GeneratedFile {
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

/// Generate every variant of `preset` inside `dir`.
pub fn generate(dir: &Path, preset: &Preset) -> Result<Vec<GeneratedFile>, AppError> {
    let source = load(&dir.join(preset.source))?;
    tracing::info!(
        preset = preset.label,
        width = source.width(),
        height = source.height(),
        "Loaded source image"
    );

    let ext = preset.encoding.extension();
    let mut generated = Vec::with_capacity(preset.variants.len());
    for variant in preset.variants {
        let resized = source.resize_exact(variant.width, variant.height, FilterType::Lanczos3);
        let bytes = match preset.encoding {
            Encoding::Jpeg { quality } => encode_jpeg(&resized, quality)?,
            Encoding::Png => encode_png(&resized)?,
        };
        let path = dir.join(format!("{}{}.{ext}", preset.output_prefix, variant.name));
        generated.push(write(path, variant.width, variant.height, &bytes)?);
    }

    Ok(generated)
}

/// Build a multi-resolution `favicon.ico` from the 64px logo variant.
pub fn write_favicon(dir: &Path) -> Result<GeneratedFile, AppError> {
    let source = load(&dir.join(FAVICON_SOURCE))?;

    let rasters: Vec<_> = FAVICON_SIZES
        .iter()
        .map(|&side| source.resize_exact(side, side, FilterType::Lanczos3).to_rgba8())
        .collect();
    let frames = rasters
        .iter()
        .map(|raster| {
            IcoFrame::as_png(
                raster.as_raw(),
                raster.width(),
                raster.height(),
                ExtendedColorType::Rgba8,
            )
        })
        .collect::<Result<Vec<_>, _>>()
        .map_err(image_error)?;

    let mut bytes = Vec::new();
    IcoEncoder::new(&mut bytes)
        .encode_images(&frames)
        .map_err(image_error)?;

    let largest = FAVICON_SIZES.iter().copied().max().unwrap_or_default();
    write(dir.join(FAVICON_FILE), largest, largest, &bytes)
}

fn load(path: &Path) -> Result<DynamicImage, AppError> {
    let data = std::fs::read(path)?;
    image::load_from_memory(&data).map_err(image_error)
}

fn write(path: PathBuf, width: u32, height: u32, bytes: &[u8]) -> Result<GeneratedFile, AppError> {
    std::fs::write(&path, bytes)?;
    tracing::debug!(path = %path.display(), width, height, bytes = bytes.len(), "Wrote variant");
    Ok(GeneratedFile {
        path,
        width,
        height,
        size_bytes: bytes.len() as u64,
    })
}
