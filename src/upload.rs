//! Validated file uploads.
//!
//! Extension-allowlisted, size-capped writes under a generated filename.
//! Raster images are downsampled to fit a bounding box before hitting
//! disk; other allowed types are written verbatim.

use std::path::Path;

use crate::config::UploadConfig;

/// Maximum bounding box for stored images.
const MAX_IMAGE_DIMENSION: u32 = 1200;

/// Extensions that go through the image decoder.
const RESIZABLE_EXTENSIONS: &[&str] = &[".jpg", ".jpeg", ".png"];

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("File type {0:?} is not allowed")]
    Extension(String),

    #[error("File too large, maximum is {0} bytes")]
    TooLarge(u64),

    #[error("Invalid image: {0}")]
    Image(#[from] image::ImageError),

    #[error("Write failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Validate and store an uploaded file. Returns the generated filename
/// (random, so concurrent uploads can never overwrite each other).
pub fn save(
    dir: &Path,
    config: &UploadConfig,
    original_filename: &str,
    bytes: &[u8],
) -> Result<String, UploadError> {
    let ext = extension_of(original_filename);
    if !config.allowed_extensions.iter().any(|allowed| allowed == &ext) {
        return Err(UploadError::Extension(ext));
    }

    if bytes.len() as u64 > config.max_file_size {
        return Err(UploadError::TooLarge(config.max_file_size));
    }

    std::fs::create_dir_all(dir)?;

    let filename = format!("{}{}", uuid::Uuid::new_v4(), ext);
    let filepath = dir.join(&filename);

    if RESIZABLE_EXTENSIONS.contains(&ext.as_str()) {
        // thumbnail() fits the bounding box, preserves aspect ratio, and
        // never upscales smaller images
        let img = image::load_from_memory(bytes)?;
        img.thumbnail(MAX_IMAGE_DIMENSION, MAX_IMAGE_DIMENSION)
            .save(&filepath)?;
    } else {
        std::fs::write(&filepath, bytes)?;
    }

    Ok(filename)
}

/// Lowercased extension including the leading dot, or "" when absent.
fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}
