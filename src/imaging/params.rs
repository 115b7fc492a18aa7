//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between [`operations`](super::operations), which decides whether a
//! thumbnail is needed and how large it is, and the
//! [`backend`](super::backend), which does the pixel work.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Encoding picked for a generated thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailFormat {
    /// Opaque images.
    Jpeg,
    /// Images with at least one non-opaque pixel.
    Png,
}

impl ThumbnailFormat {
    pub const ALL: [ThumbnailFormat; 2] = [ThumbnailFormat::Jpeg, ThumbnailFormat::Png];

    /// Suffix appended to the original file name.
    pub fn suffix(self) -> &'static str {
        match self {
            ThumbnailFormat::Jpeg => ".thumb.jpg",
            ThumbnailFormat::Png => ".thumb.png",
        }
    }
}

/// Parameters for a thumbnail operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailParams {
    pub source: PathBuf,
    /// Output path without the format suffix; the backend appends
    /// [`ThumbnailFormat::suffix`].
    pub output_base: PathBuf,
    pub width: u32,
    pub height: u32,
    pub quality: Quality,
}
