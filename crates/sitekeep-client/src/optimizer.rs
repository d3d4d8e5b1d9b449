use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};
use jpeg_encoder::{ColorType as JpegColor, Encoder as JpegEncoder};
use sitekeep_core::error::AppError;
use sitekeep_core::models::{AssetFormat, Optimized};
use sitekeep_core::traits::Optimizer;

pub const DEFAULT_JPEG_QUALITY: u8 = 85;

/// Re-encoder using the image crate.
///
/// JPEGs are flattened to 8-bit RGB and re-encoded as progressive JPEG at
/// a fixed quality.
/// PNGs are re-encoded losslessly with maximum compression. Anything else
/// is passed through untouched.
#[derive(Debug, Clone)]
pub struct ImageRsOptimizer {
    jpeg_quality: u8,
}

impl ImageRsOptimizer {
    pub fn new() -> Self {
        Self::with_jpeg_quality(DEFAULT_JPEG_QUALITY)
    }

    pub fn with_jpeg_quality(quality: u8) -> Self {
        Self {
            jpeg_quality: quality.clamp(1, 100),
        }
    }
}

impl Default for ImageRsOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer for ImageRsOptimizer {
    fn optimize(&self, data: &[u8]) -> Result<Optimized, AppError> {
        let Ok(format) = image::guess_format(data) else {
            return Ok(passthrough(data));
        };

        match format {
            ImageFormat::Jpeg => {
                let img = decode(data, format)?;
                Ok(Optimized {
                    format: AssetFormat::Jpeg,
                    bytes: encode_jpeg(&img, self.jpeg_quality)?,
                })
            }
            ImageFormat::Png => {
                let img = decode(data, format)?;
                Ok(Optimized {
                    format: AssetFormat::Png,
                    bytes: encode_png(&img)?,
                })
            }
            _ => Ok(passthrough(data)),
        }
    }
}

fn passthrough(data: &[u8]) -> Optimized {
    Optimized {
        format: AssetFormat::Other,
        bytes: data.to_vec(),
    }
}

fn decode(data: &[u8], format: ImageFormat) -> Result<DynamicImage, AppError> {
    image::load_from_memory_with_format(data, format).map_err(image_error)
}

pub(crate) fn image_error(e: image::ImageError) -> AppError {
    AppError::ImageError(e.to_string())
}

/// Encode as progressive JPEG with optimized Huffman tables, after
/// dropping alpha and widening to RGB.
pub(crate) fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, AppError> {
    let rgb = img.to_rgb8();
    let (Ok(width), Ok(height)) = (u16::try_from(rgb.width()), u16::try_from(rgb.height())) else {
        return Err(AppError::ImageError(format!(
            "{}x{} exceeds the JPEG dimension limit",
            rgb.width(),
            rgb.height()
        )));
    };

    let mut out = Vec::new();
    let mut encoder = JpegEncoder::new(&mut out, quality);
    encoder.set_progressive(true);
    encoder.set_optimized_huffman_tables(true);
    encoder
        .encode(rgb.as_raw(), width, height, JpegColor::Rgb)
        .map_err(|e| AppError::ImageError(e.to_string()))?;
    Ok(out)
}

/// Encode as PNG with best compression and adaptive row filters.
pub(crate) fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, AppError> {
    let mut out = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive);
    img.write_with_encoder(encoder).map_err(image_error)?;
    Ok(out)
}
