//! High-level image operations.
//!
//! These functions combine calculations with backend execution. Thumbnails
//! are cached on disk: a thumbnail newer than its source and already at the
//! planned width is reused instead of re-encoded, so rebuilding an unchanged
//! site produces the same files. Callers keep thumbnails of different
//! qualities apart by choosing distinct output bases.

use super::backend::{BackendError, Dimensions, ImageBackend, Thumbnail};
use super::calculations::{scale_to_width, thumbnail_path};
use super::params::{Quality, ThumbnailFormat, ThumbnailParams};
use log::debug;
use std::fs;
use std::path::Path;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &dyn ImageBackend, path: &Path) -> Result<Dimensions> {
    backend.identify(path)
}

/// Configuration for thumbnail generation.
#[derive(Debug, Clone, Copy)]
pub struct ThumbnailConfig {
    pub max_width: u32,
    pub quality: Quality,
}

/// Plan a thumbnail operation without executing it.
pub fn plan_thumbnail(
    source: &Path,
    output_base: &Path,
    original: Dimensions,
    config: &ThumbnailConfig,
) -> ThumbnailParams {
    let target = scale_to_width(original, config.max_width);
    ThumbnailParams {
        source: source.to_path_buf(),
        output_base: output_base.to_path_buf(),
        width: target.width,
        height: target.height,
        quality: config.quality,
    }
}

/// Return a thumbnail of `source` no wider than `config.max_width`.
///
/// An existing thumbnail at `output_base` + suffix is reused when it is at
/// least as new as the source and its measured width matches the planned
/// one. Anything else is regenerated.
pub fn ensure_thumbnail(
    backend: &dyn ImageBackend,
    source: &Path,
    output_base: &Path,
    original: Dimensions,
    config: &ThumbnailConfig,
) -> Result<Thumbnail> {
    let params = plan_thumbnail(source, output_base, original, config);
    if let Some(existing) = find_fresh_thumbnail(backend, &params)? {
        debug!("reusing thumbnail {}", existing.path.display());
        return Ok(existing);
    }

    if let Some(parent) = output_base.parent() {
        fs::create_dir_all(parent)?;
    }
    debug!(
        "generating {}x{} thumbnail for {}",
        params.width,
        params.height,
        source.display()
    );
    backend.thumbnail(&params)
}

fn find_fresh_thumbnail(
    backend: &dyn ImageBackend,
    params: &ThumbnailParams,
) -> Result<Option<Thumbnail>> {
    let source_modified = fs::metadata(&params.source)?.modified()?;
    for format in ThumbnailFormat::ALL {
        let path = thumbnail_path(&params.output_base, format);
        let Ok(meta) = fs::metadata(&path) else {
            continue;
        };
        if meta.modified()? < source_modified {
            continue;
        }
        // Unreadable leftovers are regenerated.
        let Ok(dimensions) = backend.identify(&path) else {
            continue;
        };
        if dimensions.width == params.width {
            return Ok(Some(Thumbnail {
                path,
                format,
                dimensions,
            }));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use tempfile::TempDir;

    fn config() -> ThumbnailConfig {
        ThumbnailConfig {
            max_width: 700,
            quality: Quality::new(80),
        }
    }

    #[test]
    fn get_dimensions_calls_backend() {
        let backend = MockBackend::with_dimensions(&[("test.jpg", 1920, 1080)]);
        let dims = get_dimensions(&backend, Path::new("/test.jpg")).unwrap();
        assert_eq!(
            dims,
            Dimensions {
                width: 1920,
                height: 1080
            }
        );
    }

    #[test]
    fn plan_thumbnail_scales_to_max_width() {
        let params = plan_thumbnail(
            Path::new("/src/a.png"),
            Path::new("/cache/a.png"),
            Dimensions {
                width: 1400,
                height: 700,
            },
            &config(),
        );
        assert_eq!((params.width, params.height), (700, 350));
        assert_eq!(params.quality.value(), 80);
    }

    #[test]
    fn ensure_thumbnail_generates_when_missing() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.png");
        fs::write(&source, "pixels").unwrap();
        let base = tmp.path().join("cache/thumbs/1/a.png");

        let backend = MockBackend::new();
        let thumb = ensure_thumbnail(
            &backend,
            &source,
            &base,
            Dimensions {
                width: 1400,
                height: 1000,
            },
            &config(),
        )
        .unwrap();

        assert_eq!(thumb.dimensions.width, 700);
        assert_eq!(thumb.dimensions.height, 500);
        assert!(tmp.path().join("cache/thumbs/1").is_dir());
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Thumbnail { width: 700, .. }
        ));
    }

    #[test]
    fn ensure_thumbnail_reuses_fresh_file() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.png");
        fs::write(&source, "pixels").unwrap();
        let base = tmp.path().join("a.png");
        // Written after the source, so it counts as fresh
        fs::write(tmp.path().join("a.png.thumb.jpg"), "thumb").unwrap();

        let backend = MockBackend::with_dimensions(&[("a.png.thumb.jpg", 700, 300)]);
        let thumb = ensure_thumbnail(
            &backend,
            &source,
            &base,
            Dimensions {
                width: 1400,
                height: 600,
            },
            &config(),
        )
        .unwrap();

        assert_eq!(thumb.format, ThumbnailFormat::Jpeg);
        assert_eq!(thumb.dimensions.height, 300);
        let ops = backend.get_operations();
        assert!(
            ops.iter().all(|op| matches!(op, RecordedOp::Identify(_))),
            "expected no thumbnail generation, got {ops:?}"
        );
    }

    #[test]
    fn ensure_thumbnail_regenerates_when_width_changed() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.png");
        fs::write(&source, "pixels").unwrap();
        let base = tmp.path().join("a.png");
        // Fresh, but left over from a build with max_width = 700
        fs::write(tmp.path().join("a.png.thumb.jpg"), "thumb").unwrap();

        let backend = MockBackend::with_dimensions(&[("a.png.thumb.jpg", 700, 300)]);
        let narrow = ThumbnailConfig {
            max_width: 400,
            ..config()
        };
        let thumb = ensure_thumbnail(
            &backend,
            &source,
            &base,
            Dimensions {
                width: 1400,
                height: 600,
            },
            &narrow,
        )
        .unwrap();

        assert_eq!(thumb.dimensions.width, 400);
        assert!(
            backend
                .get_operations()
                .iter()
                .any(|op| matches!(op, RecordedOp::Thumbnail { width: 400, .. })),
            "expected a 400px thumbnail to be generated"
        );
    }
}
