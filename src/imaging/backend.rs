//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations the renderer needs:
//! probing an image's pixel dimensions and writing a narrower thumbnail.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the
//! `MockBackend` below, which records operations without touching pixels.

use super::params::{ThumbnailFormat, ThumbnailParams};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A thumbnail written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub path: PathBuf,
    pub format: ThumbnailFormat,
    /// Measured dimensions of the written file.
    pub dimensions: Dimensions,
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Get image dimensions without decoding pixel data where possible.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Resize `params.source` to `params.width` x `params.height` and write it
    /// next to `params.output_base`, choosing JPEG for opaque images and PNG
    /// for images with transparency.
    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Thumbnail, BackendError>;
}
