//! # Quire
//!
//! A static blog generator. A directory of Markdown files with a small
//! `-key=value` header becomes a linked set of HTML pages: dated posts,
//! standalone pages, series of posts with an aggregate collection page, and a
//! generated archive.
//!
//! # Architecture: Two-Pass Rendering
//!
//! ```text
//! 1. Scan       content/          →  Vec<Document> + static assets
//! 2. Parse      front matter      →  Document (analysis pass: title, flags)
//! 3. Graph      Vec<Document>     →  DocumentGraph (ids, series, partitions)
//! 4. Render     DocumentGraph     →  HTML per document, images registered
//! 5. Generate   rendered graph    →  dist/ (pages, assets, feed, manifest)
//! ```
//!
//! The analysis pass runs per document while parsing; it never needs other
//! documents. The render pass resolves `[text](*id)` links and image
//! references against the whole graph, so the graph is complete before the
//! first document renders. Render errors are recorded per document, so one
//! build reports every broken link at once.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Reads the content root and the `static/` tree |
//! | [`frontmatter`] | `-key=value` header parser and document validation |
//! | [`document`] | `Document`, `DocumentId` and feature flags |
//! | [`graph`] | Id index, series linking, archive and collection synthesis |
//! | [`markup`] | pulldown-cmark hooks: analysis and render passes, image embedding |
//! | [`assets`] | Output path → source file registry with conflict detection |
//! | [`imaging`] | Image probing and thumbnail generation behind a backend trait |
//! | [`generate`] | Page layout with Maud, asset copy, `index.html`, manifest |
//! | [`feed`] | Atom feed of the newest posts |
//! | [`pipeline`] | Glue: scan → graph → render → generate |
//! | [`config`] | `config.toml` loading, defaults and validation |
//! | [`naming`] | `NNN-name` file name convention |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Hooks Over a Custom Markdown Parser
//!
//! Markdown parsing is left to `pulldown-cmark`. Quire only rewrites the event
//! stream: headings, links, images, math and `{:tag}` paragraphs are handed
//! to a [`markup::MarkupHooks`] implementation, everything else passes
//! through unchanged.
//!
//! ## Identifiers, Not Pointers
//!
//! The graph owns all documents. Parents and children refer to each other by
//! [`document::DocumentId`], and the render pass reads an immutable
//! [`graph::DocumentIndex`] snapshot.

pub mod assets;
pub mod config;
pub mod document;
pub mod feed;
pub mod frontmatter;
pub mod generate;
pub mod graph;
pub mod imaging;
pub mod markup;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
