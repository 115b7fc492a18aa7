//! Pure Rust image processing backend on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::image_dimensions` (header only, no pixel decode) |
//! | Decode (JPEG, PNG, GIF, TIFF, WebP) | `image::ImageReader` |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` filter |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` with configured quality |
//! | Encode → PNG | `DynamicImage::save_with_format` |

use super::backend::{BackendError, Dimensions, ImageBackend, Thumbnail};
use super::calculations::thumbnail_path;
use super::params::{ThumbnailFormat, ThumbnailParams};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::path::Path;

/// Pure Rust backend using the `image` crate ecosystem.
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

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
        })
}

/// Whether any pixel is not fully opaque.
fn has_transparency(img: &DynamicImage) -> bool {
    img.color().has_alpha() && img.to_rgba8().pixels().any(|p| p.0[3] < u8::MAX)
}

fn save_jpeg(img: &DynamicImage, path: &Path, quality: u32) -> Result<(), BackendError> {
    let file = std::fs::File::create(path).map_err(BackendError::Io)?;
    let writer = std::io::BufWriter::new(file);
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(writer, quality as u8);
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::ProcessingFailed(format!("JPEG encode failed: {}", e)))
}

fn save_png(img: &DynamicImage, path: &Path) -> Result<(), BackendError> {
    img.save_with_format(path, ImageFormat::Png)
        .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {}", e)))
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| {
            BackendError::ProcessingFailed(format!(
                "Failed to read dimensions of {}: {}",
                path.display(),
                e
            ))
        })?;
        Ok(Dimensions { width, height })
    }

    fn thumbnail(&self, params: &ThumbnailParams) -> Result<Thumbnail, BackendError> {
        let img = load_image(&params.source)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);

        let format = if has_transparency(&resized) {
            ThumbnailFormat::Png
        } else {
            ThumbnailFormat::Jpeg
        };
        let path = thumbnail_path(&params.output_base, format);
        match format {
            ThumbnailFormat::Jpeg => save_jpeg(&resized, &path, params.quality.value())?,
            ThumbnailFormat::Png => save_png(&resized, &path)?,
        }

        Ok(Thumbnail {
            path,
            format,
            dimensions: Dimensions {
                width: resized.width(),
                height: resized.height(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::Quality;
    use crate::test_helpers::{create_test_jpeg, create_test_png};

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let result = RustBackend::new().identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn identify_garbage_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("fake.png");
        std::fs::write(&path, "not an image").unwrap();
        assert!(RustBackend::new().identify(&path).is_err());
    }

    #[test]
    fn opaque_thumbnail_is_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("wide.jpg");
        create_test_jpeg(&source, 1400, 700);

        let thumb = RustBackend::new()
            .thumbnail(&ThumbnailParams {
                source,
                output_base: tmp.path().join("wide.jpg"),
                width: 700,
                height: 350,
                quality: Quality::new(85),
            })
            .unwrap();

        assert_eq!(thumb.format, ThumbnailFormat::Jpeg);
        assert_eq!(thumb.path, tmp.path().join("wide.jpg.thumb.jpg"));
        assert_eq!(
            thumb.dimensions,
            Dimensions {
                width: 700,
                height: 350
            }
        );
        assert_eq!(image::image_dimensions(&thumb.path).unwrap(), (700, 350));
    }

    #[test]
    fn transparent_thumbnail_is_png() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("logo.png");
        create_test_png(&source, 800, 400, true);

        let thumb = RustBackend::new()
            .thumbnail(&ThumbnailParams {
                source,
                output_base: tmp.path().join("logo.png"),
                width: 400,
                height: 200,
                quality: Quality::default(),
            })
            .unwrap();

        assert_eq!(thumb.format, ThumbnailFormat::Png);
        assert!(thumb.path.ends_with("logo.png.thumb.png"));
        assert_eq!(image::image_dimensions(&thumb.path).unwrap(), (400, 200));
    }

    #[test]
    fn opaque_png_becomes_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("photo.png");
        create_test_png(&source, 800, 400, false);

        let thumb = RustBackend::new()
            .thumbnail(&ThumbnailParams {
                source,
                output_base: tmp.path().join("photo.png"),
                width: 400,
                height: 200,
                quality: Quality::default(),
            })
            .unwrap();

        assert_eq!(thumb.format, ThumbnailFormat::Jpeg);
    }
}
