//! Dimension reading with the `image` crate.
//!
//! Only the header is decoded, so identifying a large scan is cheap. The
//! format is guessed from the file contents rather than the extension, which
//! catches a JPEG saved as `.png` as long as the decoder for it is compiled in.

use super::backend::{BackendError, Dimensions, ImageBackend};
use image::ImageReader;
use std::path::Path;

pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let unreadable = |reason: String| BackendError::Unreadable {
            path: path.to_path_buf(),
            reason,
        };
        let reader = ImageReader::open(path)
            .map_err(|e| unreadable(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| unreadable(e.to_string()))?;
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| unreadable(e.to_string()))?;
        Ok(Dimensions { width, height })
    }
}
