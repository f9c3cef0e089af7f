//! Image file I/O.
//!
//! Decoding and encoding are delegated to the `image` crate; the format is
//! chosen from the file extension (`.ppm` for the binary PPM files the
//! pipeline is usually fed).

use std::path::Path;

use image::RgbImage;
use tracing::debug;

use crate::buffer::PixelBuffer;
use crate::error::{RasterError, RasterResult};

/// Read an image file into an RGB pixel buffer.
pub fn read_image(path: impl AsRef<Path>) -> RasterResult<PixelBuffer> {
    let path = path.as_ref();
    let decoded = image::open(path)
        .map_err(|e| RasterError::decode(path, e))?
        .into_rgb8();

    let buffer = from_rgb_image(&decoded)?;
    debug!(
        path = %path.display(),
        width = buffer.width(),
        height = buffer.height(),
        "Read image"
    );
    Ok(buffer)
}

/// Write a pixel buffer to an image file.
pub fn write_image(buffer: &PixelBuffer, path: impl AsRef<Path>) -> RasterResult<()> {
    let path = path.as_ref();
    let img = to_rgb_image(buffer).ok_or_else(|| {
        RasterError::encode(
            path,
            format!("{}x{} buffer cannot be encoded", buffer.width(), buffer.height()),
        )
    })?;
    img.save(path).map_err(|e| RasterError::encode(path, e))?;
    debug!(
        path = %path.display(),
        width = buffer.width(),
        height = buffer.height(),
        "Wrote image"
    );
    Ok(())
}

/// Convert a decoded `image` buffer. Zero-sized images are rejected.
pub fn from_rgb_image(img: &RgbImage) -> RasterResult<PixelBuffer> {
    let (width, height) = (img.width() as usize, img.height() as usize);
    if width == 0 || height == 0 {
        return Err(RasterError::EmptyImage { width, height });
    }
    PixelBuffer::from_rgb_bytes(width, height, img.as_raw())
}

/// Convert to an `image` buffer. Returns `None` if a dimension overflows `u32`.
pub fn to_rgb_image(buffer: &PixelBuffer) -> Option<RgbImage> {
    let width = u32::try_from(buffer.width()).ok()?;
    let height = u32::try_from(buffer.height()).ok()?;
    RgbImage::from_raw(width, height, buffer.to_rgb_bytes())
}
