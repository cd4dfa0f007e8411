//! Image and font loading via the `image` and `ab_glyph` crates.

use ab_glyph::FontArc;
use image::RgbImage;
use std::path::Path;

use crate::util::{DecodeError, DecodeResult};

/// Loads an image from disk as 8-bit RGB.
pub fn load_rgb_image<P: AsRef<Path>>(path: P) -> DecodeResult<RgbImage> {
    let img = image::open(path).map_err(|err| DecodeError::ImageIo {
        reason: err.to_string(),
    })?;
    Ok(img.to_rgb8())
}

/// Saves an RGB image; the format follows the file extension.
pub fn save_rgb_image<P: AsRef<Path>>(image: &RgbImage, path: P) -> DecodeResult<()> {
    image.save(path).map_err(|err| DecodeError::ImageIo {
        reason: err.to_string(),
    })
}

/// Loads a TrueType or OpenType font for captions.
pub fn load_font<P: AsRef<Path>>(path: P) -> DecodeResult<FontArc> {
    let bytes = std::fs::read(path).map_err(|err| DecodeError::ImageIo {
        reason: err.to_string(),
    })?;
    FontArc::try_from_vec(bytes).map_err(|err| DecodeError::ImageIo {
        reason: err.to_string(),
    })
}
