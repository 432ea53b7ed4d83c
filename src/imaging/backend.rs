//! Image backend trait and shared types.
//!
//! The builder only ever needs one thing from an image file: its pixel
//! dimensions. The [`ImageBackend`] trait keeps that behind a seam so the
//! builder can be tested without encoding real images.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Cannot read image {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

pub trait ImageBackend {
    /// Read pixel dimensions. A missing, truncated, or undecodable file is an error.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;
}
