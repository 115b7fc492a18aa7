//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::image_dimensions` |
//! | **Thumbnail** | Lanczos3 `resize_exact` + JPEG/PNG encode |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, Thumbnail};
pub use calculations::{scale_to_width, thumbnail_path};
pub use operations::{ThumbnailConfig, ensure_thumbnail, get_dimensions};
pub use params::{Quality, ThumbnailFormat, ThumbnailParams};
pub use rust_backend::RustBackend;
