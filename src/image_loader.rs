//! Image file loading for the analysis pipeline
//!
//! This module is an adapter around the `image` crate. It turns any format
//! the crate can decode (JPEG, PNG, WebP, TIFF, BMP with the enabled
//! features) into an RGBA [`ImageSample`]. The analysis pipeline never calls
//! it; callers load samples here and hand them to
//! [`QualityPipeline::analyze`](crate::QualityPipeline::analyze).

use image::ImageReader;
use std::path::Path;

use crate::error::{AnalysisError, Result};
use crate::sample::ImageSample;

/// Load an image from disk as an RGBA sample
///
/// # Errors
///
/// Returns `AnalysisError::ImageLoadError` if:
/// - File cannot be opened
/// - Format cannot be detected or is not supported
/// - Decoding fails
///
/// # Example
///
/// ```rust,no_run
/// use fry_colorscan::image_loader::load_image;
/// use std::path::Path;
///
/// let sample = load_image(Path::new("batch_17.jpg"))?;
/// println!("Loaded image: {}x{}", sample.width(), sample.height());
/// # Ok::<(), fry_colorscan::AnalysisError>(())
/// ```
pub fn load_image(path: &Path) -> Result<ImageSample> {
    let reader = ImageReader::open(path)
        .map_err(|e| {
            AnalysisError::image_load(format!("Failed to open image file: {}", path.display()), e)
        })?
        .with_guessed_format()
        .map_err(|e| {
            AnalysisError::image_load(format!("Failed to detect format: {}", path.display()), e)
        })?;

    let decoded = reader.decode().map_err(|e| {
        AnalysisError::image_load(format!("Failed to decode image: {}", path.display()), e)
    })?;

    log::debug!(
        "loaded {} ({}x{})",
        path.display(),
        decoded.width(),
        decoded.height()
    );

    Ok(ImageSample::from_rgba_image(decoded.to_rgba8()))
}

/// File extensions the loader is built to decode
pub fn supported_extensions() -> &'static [&'static str] {
    &["jpg", "jpeg", "png", "webp", "tif", "tiff", "bmp"]
}

/// Check if a file extension is supported
pub fn is_supported_extension(ext: &str) -> bool {
    let ext_lower = ext.to_lowercase();
    supported_extensions().contains(&ext_lower.as_str())
}
