//! Shared test utilities for the quire test suite.
//!
//! Provides document constructors, lookup helpers, a one-call render of a
//! document set, and synthetic image writers.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let graph = render_graph(vec![
//!     doc("1", "-time=2020-01-01\n# First\n"),
//!     doc("2", "-time=2020-02-01\n-parent=1\n# Second\n[%](*1)"),
//! ]);
//! assert!(graph.get(&"2".into()).unwrap().content.contains("p1.html"));
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::assets::AssetRegistry;
use crate::config::ImagesConfig;
use crate::document::Document;
use crate::frontmatter;
use crate::graph::DocumentGraph;
use crate::imaging::backend::tests::MockBackend;
use crate::markup::RenderContext;

// =========================================================================
// Construction
// =========================================================================

/// Parse `src` as the document stored under file stem `stem`. Panics on
/// front-matter errors.
pub fn doc(stem: &str, src: &str) -> Document {
    frontmatter::parse(stem, src.as_bytes())
        .unwrap_or_else(|e| panic!("fixture document '{stem}' does not parse: {e}"))
}

/// Write `contents` to `path`, creating parent directories.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Build the graph, synthesize collections and render every document against
/// an empty content root with a mock image backend.
pub fn render_graph(documents: Vec<Document>) -> DocumentGraph {
    let mut graph = DocumentGraph::build(documents).unwrap();
    graph.generate_collections();

    let tmp = TempDir::new().unwrap();
    let images = ImagesConfig::default();
    let backend = MockBackend::new();
    let ctx = RenderContext {
        content_root: tmp.path(),
        cache_dir: &tmp.path().join(".cache"),
        images: &images,
        backend: &backend,
    };
    graph.render_all(&mut AssetRegistry::new(), &ctx).unwrap();
    graph
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a document by id. Panics if not found.
pub fn find_doc<'a>(documents: &'a [Document], id: &str) -> &'a Document {
    documents
        .iter()
        .find(|d| d.id.as_str() == id)
        .unwrap_or_else(|| {
            let ids: Vec<&str> = documents.iter().map(|d| d.id.as_str()).collect();
            panic!("document '{id}' not found. Available: {ids:?}")
        })
}

// =========================================================================
// Synthetic images
// =========================================================================

/// Write a gradient JPEG of the given size.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(path).unwrap();
}

/// Write a PNG of the given size, fully opaque unless `transparent`.
pub fn create_test_png(path: &Path, width: u32, height: u32, transparent: bool) {
    let alpha = if transparent { 0 } else { 255 };
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 64, alpha])
    });
    img.save(path).unwrap();
}
