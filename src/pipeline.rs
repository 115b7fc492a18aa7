//! The build pipeline: scan → graph → render → generate.
//!
//! [`prepare`] runs everything up to and including the render pass and
//! returns the in-memory [`Site`]; [`build`] additionally writes it out.
//! Render errors are collected per document so a single run reports every
//! broken link and missing image; by default any of them stops the build
//! before anything is written.

use crate::assets::{AssetError, AssetRegistry};
use crate::config::SiteConfig;
use crate::generate::{self, GenerateError, GenerateReport};
use crate::graph::{DocumentGraph, GraphError, RenderFailure};
use crate::imaging::ImageBackend;
use crate::markup::RenderContext;
use crate::scan::{self, ScanError};
use log::{info, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("{} document(s) failed to render", .failures.len())]
    RenderFailed { failures: Vec<RenderFailure> },
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Content root.
    pub source: PathBuf,
    /// Site output directory.
    pub output: PathBuf,
    /// Intermediate files (thumbnails).
    pub cache_dir: PathBuf,
    /// Write the site even when documents failed to render.
    pub keep_going: bool,
}

/// A fully rendered site, ready to be written.
#[derive(Debug)]
pub struct Site {
    pub source: PathBuf,
    pub graph: DocumentGraph,
    pub assets: AssetRegistry,
    pub config: SiteConfig,
    /// Documents whose render recorded an error.
    pub failures: Vec<RenderFailure>,
}

/// Scan `source`, assemble the graph, synthesize the archive and collections,
/// and render every document. Thumbnails are written below `cache_dir`.
pub fn prepare(
    source: &Path,
    cache_dir: &Path,
    backend: &dyn ImageBackend,
) -> Result<Site, BuildError> {
    let content = scan::scan(source)?;
    info!(
        "scanned {} documents and {} static files",
        content.documents.len(),
        content.assets.len()
    );

    let mut graph = DocumentGraph::build(content.documents)?;
    if content.config.site.archive && graph.generate_archive()? {
        info!("generated archive page");
    }
    graph.generate_collections();

    let mut assets = content.assets;
    let ctx = RenderContext {
        content_root: &content.root,
        cache_dir,
        images: &content.config.images,
        backend,
    };
    let failures = graph.render_all(&mut assets, &ctx)?;

    Ok(Site {
        source: content.root,
        graph,
        assets,
        config: content.config,
        failures,
    })
}

/// Run the whole pipeline and write the site to `options.output`.
///
/// Returns the rendered site alongside what was written so callers can
/// report on both.
pub fn build(
    options: &BuildOptions,
    backend: &dyn ImageBackend,
) -> Result<(Site, GenerateReport), BuildError> {
    let site = prepare(&options.source, &options.cache_dir, backend)?;

    if !site.failures.is_empty() {
        if !options.keep_going {
            return Err(BuildError::RenderFailed {
                failures: site.failures,
            });
        }
        warn!(
            "{} document(s) failed to render, writing partial output",
            site.failures.len()
        );
    }

    let report = generate::generate(&site.graph, &site.assets, &site.config, &options.output)?;
    Ok((site, report))
}
