//! Image file output for canvas snapshots.

use crate::error::SurfaceError;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::path::Path;

/// Pick the encoder from the file extension (case-insensitive).
///
/// Only `.png`, `.jpg` and `.webp` are accepted.
pub fn format_for_path(path: &Path) -> Result<ImageFormat, SurfaceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => Ok(ImageFormat::Png),
        Some("jpg") => Ok(ImageFormat::Jpeg),
        Some("webp") => Ok(ImageFormat::WebP),
        _ => Err(SurfaceError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Encode `image` to `path`. Nothing is written when the extension is rejected.
pub fn save_image(image: &RgbaImage, path: &Path) -> Result<(), SurfaceError> {
    let format = format_for_path(path)?;
    match format {
        // JPEG has no alpha channel.
        ImageFormat::Jpeg => {
            DynamicImage::ImageRgba8(image.clone())
                .to_rgb8()
                .save_with_format(path, format)?;
        }
        _ => image.save_with_format(path, format)?,
    }
    log::info!("saved {}x{} image to {}", image.width(), image.height(), path.display());
    Ok(())
}

/// Decode an image file into straight-alpha RGBA8.
pub fn load_image(path: &Path) -> Result<RgbaImage, SurfaceError> {
    let img = image::open(path)?;
    log::debug!("loaded image {} ({}x{})", path.display(), img.width(), img.height());
    Ok(img.to_rgba8())
}
