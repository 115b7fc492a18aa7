//! HTML site generation.
//!
//! Final stage of the build. Takes the rendered document graph and the asset
//! registry and writes the static site.
//!
//! ## Generated Pages
//!
//! - **Document pages** (`/p{id}.html`): every page, post and collection
//! - **Index page** (`/index.html`): a copy of the most recent post
//! - **Atom feed** (`/feed.atom.xml`): the newest posts, see [`crate::feed`]
//! - **Manifest** (`/manifest.json`): ordered document collections for tools
//!   that post-process the site (feeds, search indexes)
//!
//! Posts link to their older and newer neighbours. Collections show every
//! member of the series, oldest first. All pages carry a "recent posts"
//! sidebar and load the math and code scripts only when a document on the
//! page uses them.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html                 # Copy of the newest post
//! ├── p1.html                    # Documents
//! ├── p1-series.html             # Collection of series 1
//! ├── parchive.html              # Archive page
//! ├── feed.atom.xml
//! ├── manifest.json
//! ├── 1/chart.png                # Registered assets
//! ├── 1/chart.png.thumb.jpg
//! └── static/style.css
//! ```
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Document bodies are already HTML and are inserted pre-escaped; everything
//! else is escaped by maud.

use crate::assets::AssetRegistry;
use crate::config::SiteConfig;
use crate::document::{Document, DocumentId, DocumentKind, Features};
use crate::feed::{self, FEED_FILE};
use crate::graph::DocumentGraph;
use chrono::NaiveDateTime;
use maud::{DOCTYPE, Markup, PreEscaped, html};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot copy {source_path} to {dest}: {error}")]
    Copy {
        source_path: PathBuf,
        dest: PathBuf,
        error: std::io::Error,
    },
}

const CSS: &str = include_str!("../static/style.css");
const MATHJAX_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/mathjax/2.7.9/MathJax.js?config=TeX-AMS_CHTML";
const HIGHLIGHT_JS_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/highlight.min.js";
const HIGHLIGHT_CSS_URL: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.9.0/styles/default.min.css";

/// Name of the written manifest.
pub const MANIFEST_FILE: &str = "manifest.json";

/// What was written, for CLI output.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GenerateReport {
    /// `(title, file name)` in write order.
    pub pages: Vec<(String, String)>,
    pub assets_copied: usize,
    /// Document copied to `index.html`.
    pub index: Option<DocumentId>,
    /// Entries written to the Atom feed.
    pub feed_entries: usize,
}

/// One document page: the document it is named after plus the documents
/// shown on it.
struct PageView<'a> {
    root: &'a Document,
    docs: Vec<&'a Document>,
    newer: Option<&'a Document>,
    older: Option<&'a Document>,
}

pub fn generate(
    graph: &DocumentGraph,
    assets: &AssetRegistry,
    config: &SiteConfig,
    output_dir: &Path,
) -> Result<GenerateReport, GenerateError> {
    fs::create_dir_all(output_dir)?;
    let mut report = GenerateReport {
        assets_copied: copy_assets(assets, output_dir)?,
        ..GenerateReport::default()
    };

    let recent: Vec<&Document> = graph.posts().take(config.site.recent_posts).collect();
    let nav: Vec<&Document> = graph.pages().collect();
    let mut writer = PageWriter {
        nav: &nav,
        recent: &recent,
        config,
        output_dir,
        report: &mut report,
    };

    for page in graph.pages() {
        writer.write(PageView {
            root: page,
            docs: vec![page],
            newer: None,
            older: None,
        })?;
    }

    let posts: Vec<&Document> = graph.posts().collect();
    let mut index_source = None;
    for (idx, &post) in posts.iter().enumerate() {
        let path = writer.write(PageView {
            root: post,
            docs: vec![post],
            newer: idx.checked_sub(1).map(|i| posts[i]),
            older: posts.get(idx + 1).copied(),
        })?;
        if idx == 0 {
            index_source = Some((post.id.clone(), path));
        }
    }

    for collection in graph.collections() {
        let mut members: Vec<&Document> = graph.children(collection).collect();
        members.sort_by(|a, b| a.published.cmp(&b.published));
        writer.write(PageView {
            root: collection,
            docs: members,
            newer: None,
            older: None,
        })?;
    }

    if let Some((id, path)) = index_source {
        fs::copy(&path, output_dir.join("index.html"))?;
        report.index = Some(id);
    }

    let atom = feed::render_atom(graph, config)?;
    fs::write(output_dir.join(FEED_FILE), &atom.xml)?;
    report.feed_entries = atom.entries;

    let manifest = build_manifest(graph, assets, config);
    fs::write(
        output_dir.join(MANIFEST_FILE),
        serde_json::to_string_pretty(&manifest)?,
    )?;

    Ok(report)
}

struct PageWriter<'w> {
    nav: &'w [&'w Document],
    recent: &'w [&'w Document],
    config: &'w SiteConfig,
    output_dir: &'w Path,
    report: &'w mut GenerateReport,
}

impl PageWriter<'_> {
    fn write(&mut self, view: PageView<'_>) -> Result<PathBuf, GenerateError> {
        let html = render_page(&view, self.nav, self.recent, self.config);
        let path = self.output_dir.join(&view.root.permalink);
        fs::write(&path, html.into_string())?;
        self.report
            .pages
            .push((view.root.title.clone(), view.root.permalink.clone()));
        Ok(path)
    }
}

/// Copy every registered asset to `output_dir/<output path>`.
fn copy_assets(assets: &AssetRegistry, output_dir: &Path) -> Result<usize, GenerateError> {
    for (web_path, source) in assets.iter() {
        let dest = web_path
            .split('/')
            .fold(output_dir.to_path_buf(), |path, part| path.join(part));
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(source, &dest).map_err(|error| GenerateError::Copy {
            source_path: source.to_path_buf(),
            dest: dest.clone(),
            error,
        })?;
    }
    Ok(assets.len())
}

// ============================================================================
// Manifest
// ============================================================================

#[derive(Debug, Serialize)]
pub struct Manifest<'a> {
    pub site: SiteInfo<'a>,
    pub documents: Vec<DocumentEntry<'a>>,
    pub pages: Vec<&'a DocumentId>,
    pub posts: Vec<&'a DocumentId>,
    pub series: Vec<&'a DocumentId>,
    pub collections: Vec<&'a DocumentId>,
    pub assets: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct SiteInfo<'a> {
    pub title: &'a str,
    pub url: &'a str,
    pub author: &'a str,
}

#[derive(Debug, Serialize)]
pub struct DocumentEntry<'a> {
    pub id: &'a DocumentId,
    pub kind: DocumentKind,
    pub title: &'a str,
    pub permalink: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<&'a DocumentId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<&'a DocumentId>,
    pub features: Features,
}

fn timestamp(t: Option<NaiveDateTime>) -> Option<String> {
    t.map(|t| t.format("%Y-%m-%dT%H:%M:%S").to_string())
}

pub fn build_manifest<'a>(
    graph: &'a DocumentGraph,
    assets: &'a AssetRegistry,
    config: &'a SiteConfig,
) -> Manifest<'a> {
    let ids = |docs: Vec<&'a Document>| docs.into_iter().map(|d| &d.id).collect::<Vec<_>>();
    Manifest {
        site: SiteInfo {
            title: &config.site.title,
            url: &config.site.url,
            author: &config.site.author,
        },
        documents: graph
            .documents()
            .iter()
            .map(|doc| DocumentEntry {
                id: &doc.id,
                kind: doc.kind,
                title: &doc.title,
                permalink: &doc.permalink,
                published: timestamp(doc.published),
                updated: timestamp(doc.updated),
                parent: doc.parent.as_ref(),
                children: doc.children.iter().collect(),
                features: doc.features,
            })
            .collect(),
        pages: ids(graph.pages().collect()),
        posts: ids(graph.posts().collect()),
        series: ids(graph.series().collect()),
        collections: ids(graph.collections().collect()),
        assets: assets.iter().map(|(dst, _)| dst).collect(),
    }
}

// ============================================================================
// HTML Components
// ============================================================================

fn format_date(t: NaiveDateTime) -> String {
    t.format("%B %-d, %Y").to_string()
}

/// Renders the base HTML document structure
fn base_document(title: &str, features: Features, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (PreEscaped(CSS)) }
                @if features.uses_code {
                    link rel="stylesheet" href=(HIGHLIGHT_CSS_URL);
                }
            }
            body {
                (content)
                @if features.uses_math {
                    script src=(MATHJAX_URL) {}
                }
                @if features.uses_code {
                    script src=(HIGHLIGHT_JS_URL) {}
                    script { "hljs.highlightAll();" }
                }
            }
        }
    }
}

/// Renders the site header with page navigation
fn site_header(site_title: &str, nav: &[&Document]) -> Markup {
    html! {
        header.site-header {
            a.site-title href="index.html" { (site_title) }
            nav {
                @for page in nav {
                    a href=(page.permalink) { (page.title) }
                }
            }
        }
    }
}

fn render_article(doc: &Document, link_title: bool) -> Markup {
    html! {
        article id=(doc.id.as_str()) {
            h1 {
                @if link_title {
                    a href=(doc.permalink) { (doc.title) }
                } @else {
                    (doc.title)
                }
            }
            @if let Some(published) = doc.published {
                p.date {
                    time datetime=(published.format("%Y-%m-%d").to_string()) {
                        (format_date(published))
                    }
                }
            }
            (PreEscaped(&doc.content))
        }
    }
}

fn render_recent(recent: &[&Document]) -> Markup {
    html! {
        aside.recent {
            h2 { "Recent posts" }
            ul {
                @for post in recent {
                    li { a href=(post.permalink) { (post.title) } }
                }
            }
        }
    }
}

fn render_page(
    view: &PageView<'_>,
    nav: &[&Document],
    recent: &[&Document],
    config: &SiteConfig,
) -> Markup {
    let features = view
        .docs
        .iter()
        .fold(view.root.features, |acc, doc| acc.union(doc.features));
    let title = format!("{} - {}", view.root.title, config.site.title);
    let is_collection = view.root.kind == DocumentKind::Collection;

    let content = html! {
        (site_header(&config.site.title, nav))
        main {
            @if is_collection {
                h1.collection-title { (view.root.title) }
            }
            @for doc in &view.docs {
                (render_article(doc, is_collection))
            }
            @if view.newer.is_some() || view.older.is_some() {
                nav.post-nav {
                    @if let Some(older) = view.older {
                        a.older href=(older.permalink) { "« " (older.title) }
                    } @else {
                        span {}
                    }
                    @if let Some(newer) = view.newer {
                        a.newer href=(newer.permalink) { (newer.title) " »" }
                    }
                }
            }
        }
        (render_recent(recent))
        @if !config.site.author.is_empty() {
            footer.site-footer { "© " (config.site.author) }
        }
    };

    base_document(&title, features, content)
}
