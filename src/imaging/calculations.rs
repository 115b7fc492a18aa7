//! Pure calculation functions for image dimensions and thumbnail paths.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::Dimensions;
use super::params::ThumbnailFormat;
use std::path::{Path, PathBuf};

/// Scale `source` down to `max_width`, preserving the aspect ratio.
///
/// Images already within the limit are returned unchanged. The height is
/// rounded to the nearest pixel and never drops below 1.
///
/// ```text
/// 1400x1050, max 700 → 700x525
/// 1000x333,  max 700 → 700x233
/// ```
pub fn scale_to_width(source: Dimensions, max_width: u32) -> Dimensions {
    if source.width <= max_width || source.width == 0 {
        return source;
    }
    let ratio = max_width as f64 / source.width as f64;
    let height = ((source.height as f64 * ratio).round() as u32).max(1);
    Dimensions {
        width: max_width,
        height,
    }
}

/// Path of the thumbnail for `base` in the given format: the format suffix is
/// appended to the full file name (`chart.png` → `chart.png.thumb.jpg`).
pub fn thumbnail_path(base: &Path, format: ThumbnailFormat) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format.suffix());
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims(width: u32, height: u32) -> Dimensions {
        Dimensions { width, height }
    }

    #[test]
    fn scale_landscape() {
        assert_eq!(scale_to_width(dims(1400, 1050), 700), dims(700, 525));
    }

    #[test]
    fn scale_rounds_height() {
        // 333 * 0.7 = 233.1
        assert_eq!(scale_to_width(dims(1000, 333), 700), dims(700, 233));
        // 334 * 0.7 = 233.8
        assert_eq!(scale_to_width(dims(1000, 334), 700), dims(700, 234));
    }

    #[test]
    fn scale_portrait_limits_width_only() {
        assert_eq!(scale_to_width(dims(1000, 2000), 500), dims(500, 1000));
    }

    #[test]
    fn within_limit_unchanged() {
        assert_eq!(scale_to_width(dims(700, 400), 700), dims(700, 400));
        assert_eq!(scale_to_width(dims(10, 10), 700), dims(10, 10));
    }

    #[test]
    fn extreme_panorama_keeps_one_pixel() {
        assert_eq!(scale_to_width(dims(100_000, 1), 700), dims(700, 1));
    }

    #[test]
    fn thumbnail_path_appends_suffix() {
        assert_eq!(
            thumbnail_path(Path::new("cache/thumbs/12/chart.png"), ThumbnailFormat::Jpeg),
            PathBuf::from("cache/thumbs/12/chart.png.thumb.jpg")
        );
        assert_eq!(
            thumbnail_path(Path::new("a.gif"), ThumbnailFormat::Png),
            PathBuf::from("a.gif.thumb.png")
        );
    }
}
