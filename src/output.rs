//! CLI output formatting for all pipeline stages.
//!
//! # Information-First Display
//!
//! Output is **information-centric, not file-centric**. The primary display
//! for every document is its semantic identity (positional index and title)
//! with filesystem paths shown as secondary context via indented `Source:`
//! lines. This makes the output readable as a content inventory while still
//! letting users trace data back to specific files.
//!
//! # Output Format
//!
//! ## Content
//!
//! ```text
//! Posts
//! 001 Rendering, part 2 (2020-03-01)
//!     Source: 003-rendering-2.md
//!     Part of: Rendering
//! 002 Rendering (2020-01-01)
//!     Source: 001-rendering.md
//!     Series: 1 part
//!
//! Pages
//! 001 About
//!     Source: about.md
//!
//! Static files
//!     static/style.css
//!
//! Config
//!     config.toml
//! ```
//!
//! ## Generate
//!
//! ```text
//! Home → index.html (Rendering, part 2)
//! 001 About → pabout.html
//! 002 Rendering, part 2 → p3.html
//! Feed → feed.atom.xml (2 entries)
//!
//! Generated 2 pages, 1 asset
//! ```
//!
//! # Architecture
//!
//! Each stage has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::assets::AssetRegistry;
use crate::config::CONFIG_FILE;
use crate::document::Document;
use crate::feed::FEED_FILE;
use crate::generate::GenerateReport;
use crate::graph::{DocumentGraph, RenderFailure};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format an entity header: positional index + title, with optional detail.
///
/// ```text
/// 001 Rendering (2020-01-01)
/// 001 About
/// ```
fn entity_header(index: usize, title: &str, detail: Option<&str>) -> String {
    match detail {
        Some(d) => format!("{} {} ({})", format_index(index), title, d),
        None => format!("{} {}", format_index(index), title),
    }
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Context lines shared by every document entry.
fn document_context(doc: &Document, graph: &DocumentGraph, source_root: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(source) = &doc.source {
        let shown = source.strip_prefix(source_root).unwrap_or(source);
        lines.push(format!("{}Source: {}", indent(1), shown.display()));
    }
    if let Some(parent) = doc.parent.as_ref().and_then(|id| graph.get(id)) {
        lines.push(format!("{}Part of: {}", indent(1), parent.title));
    }
    if !doc.children.is_empty() {
        lines.push(format!(
            "{}Series: {}",
            indent(1),
            plural(doc.children.len(), "part")
        ));
    }
    lines
}

/// Format the content inventory after the graph was built.
pub fn format_content_output(
    graph: &DocumentGraph,
    assets: &AssetRegistry,
    source_root: &Path,
) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push("Posts".to_string());
    for (i, post) in graph.posts().enumerate() {
        let date = post
            .published
            .map(|t| t.format("%Y-%m-%d").to_string());
        lines.push(entity_header(i + 1, &post.title, date.as_deref()));
        lines.extend(document_context(post, graph, source_root));
    }

    let pages: Vec<&Document> = graph.pages().collect();
    if !pages.is_empty() {
        lines.push(String::new());
        lines.push("Pages".to_string());
        for (i, page) in pages.iter().enumerate() {
            lines.push(entity_header(i + 1, &page.title, None));
            lines.extend(document_context(page, graph, source_root));
        }
    }

    if !assets.is_empty() {
        lines.push(String::new());
        lines.push("Static files".to_string());
        for (web_path, _) in assets.iter() {
            lines.push(format!("{}{}", indent(1), web_path));
        }
    }

    if source_root.join(CONFIG_FILE).exists() {
        lines.push(String::new());
        lines.push("Config".to_string());
        lines.push(format!("{}{CONFIG_FILE}", indent(1)));
    }

    lines
}

/// Print the content inventory to stdout.
pub fn print_content_output(graph: &DocumentGraph, assets: &AssetRegistry, source_root: &Path) {
    for line in format_content_output(graph, assets, source_root) {
        println!("{}", line);
    }
}

/// Format per-document render errors.
pub fn format_render_failures(failures: &[RenderFailure]) -> Vec<String> {
    let mut lines = Vec::new();
    if failures.is_empty() {
        return lines;
    }
    lines.push(format!("Render errors ({})", failures.len()));
    for failure in failures {
        lines.push(format!("{}{}", indent(1), failure.error));
    }
    lines
}

/// Print render errors to stderr.
pub fn print_render_failures(failures: &[RenderFailure]) {
    for line in format_render_failures(failures) {
        eprintln!("{}", line);
    }
}

/// Format generate stage output: every written page and the totals.
pub fn format_generate_output(report: &GenerateReport, graph: &DocumentGraph) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(home) = report.index.as_ref().and_then(|id| graph.get(id)) {
        lines.push(format!("Home → index.html ({})", home.title));
    }
    for (i, (title, file)) in report.pages.iter().enumerate() {
        lines.push(format!("{} → {}", entity_header(i + 1, title, None), file));
    }
    let entries = report.feed_entries;
    let noun = if entries == 1 { "entry" } else { "entries" };
    lines.push(format!("Feed → {FEED_FILE} ({entries} {noun})"));

    lines.push(String::new());
    lines.push(format!(
        "Generated {}, {}",
        plural(report.pages.len(), "page"),
        plural(report.assets_copied, "asset")
    ));
    lines
}

/// Print generate output to stdout.
pub fn print_generate_output(report: &GenerateReport, graph: &DocumentGraph) {
    for line in format_generate_output(report, graph) {
        println!("{}", line);
    }
}
