//! Pixel extraction of a crop from the full-resolution source image.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbImage, RgbaImage, imageops};

use crate::config::CropConfig;
use crate::error::CropError;
use crate::geometry::NormalizedRect;
use crate::transform::{self, PixelRegion};

/// Where the encoded source image lives.
#[derive(Clone, Debug, PartialEq)]
pub enum ImageSource {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

impl ImageSource {
    pub fn decode(&self) -> Result<DynamicImage, CropError> {
        let decoded = match self {
            ImageSource::Path(path) => image::open(path),
            ImageSource::Bytes(bytes) => image::load_from_memory(bytes),
        };
        decoded.map_err(CropError::Decode)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExtractSettings {
    pub jpeg_quality: u8,
    pub max_surface_side: u32,
}

impl Default for ExtractSettings {
    fn default() -> Self {
        Self::from(&CropConfig::default())
    }
}

impl From<&CropConfig> for ExtractSettings {
    fn from(config: &CropConfig) -> Self {
        Self {
            jpeg_quality: config.jpeg_quality,
            max_surface_side: config.max_surface_side,
        }
    }
}

/// The cropped raster and its JPEG encoding.
#[derive(Clone, Debug)]
pub struct CropOutput {
    pub image: RgbaImage,
    pub encoded: Vec<u8>,
    /// Source pixels the crop was taken from.
    pub region: PixelRegion,
}

impl CropOutput {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Decodes `source` and extracts `rect` from it at full resolution.
pub fn extract_crop(
    source: &ImageSource,
    rect: &NormalizedRect,
    settings: &ExtractSettings,
) -> Result<CropOutput, CropError> {
    let image = source.decode()?;
    crop_decoded(&image, rect, settings)
}

/// Copies the pixels under `rect` into a new surface of the same size. The
/// region is rounded to whole pixels; any part of it past the image border
/// stays transparent.
pub fn crop_decoded(
    image: &DynamicImage,
    rect: &NormalizedRect,
    settings: &ExtractSettings,
) -> Result<CropOutput, CropError> {
    let region = transform::to_pixel_region(rect, image.width(), image.height());
    let mut surface = create_surface(region.width, region.height, settings)?;

    let visible_w = region.width.min(image.width().saturating_sub(region.x));
    let visible_h = region.height.min(image.height().saturating_sub(region.y));
    if visible_w > 0 && visible_h > 0 {
        let pixels = imageops::crop_imm(image, region.x, region.y, visible_w, visible_h).to_image();
        imageops::replace(&mut surface, &pixels, 0, 0);
    }

    let encoded = encode_jpeg(&surface, settings.jpeg_quality)?;
    log::debug!(
        "extracted {}x{} crop at ({}, {}), {} bytes",
        region.width,
        region.height,
        region.x,
        region.y,
        encoded.len()
    );

    Ok(CropOutput {
        image: surface,
        encoded,
        region,
    })
}

fn create_surface(width: u32, height: u32, settings: &ExtractSettings) -> Result<RgbaImage, CropError> {
    let fail = |reason: &str| CropError::Surface {
        width,
        height,
        reason: reason.to_owned(),
    };
    if width == 0 || height == 0 {
        return Err(fail("crop is empty"));
    }
    if width > settings.max_surface_side || height > settings.max_surface_side {
        return Err(fail("larger than the maximum surface side"));
    }
    Ok(RgbaImage::new(width, height))
}

fn encode_jpeg(surface: &RgbaImage, quality: u8) -> Result<Vec<u8>, CropError> {
    let rgb: RgbImage = surface.convert();
    let mut buffer = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(&rgb)
        .map_err(|err| CropError::Surface {
            width: surface.width(),
            height: surface.height(),
            reason: err.to_string(),
        })?;
    Ok(buffer.into_inner())
}
