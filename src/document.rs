//! The document model.
//!
//! A [`Document`] is created once per source file by
//! [`frontmatter::parse`](crate::frontmatter::parse) (or synthesized by the
//! graph for collections and the archive page), gets its title and feature
//! flags from the analysis pass, is linked into the series forest by
//! [`DocumentGraph`](crate::graph::DocumentGraph), and finally receives its
//! rendered HTML from the render pass. After rendering it is only read.
//!
//! Parent/child references are identifiers, not pointers: the graph owns every
//! document, `children` is the forward list, `parent` a lookup key into the
//! same graph.

use crate::markup::RenderError;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;

/// Stable document identifier.
///
/// Numeric identifiers (`"12"`) compare numerically and sort before
/// non-numeric ones (`"about"`), which compare lexically. Construct through
/// [`DocumentId::new`] so numeric ids are normalized (`"012"` == `"12"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(raw: &str) -> Self {
        Self(crate::naming::normalize_id(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_numeric(&self) -> bool {
        !self.0.is_empty() && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

impl Ord for DocumentId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_numeric(), other.is_numeric()) {
            // Normalized digit strings: longer means larger.
            (true, true) => self
                .0
                .len()
                .cmp(&other.0.len())
                .then_with(|| self.0.cmp(&other.0)),
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for DocumentId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// The kinds of renderable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Dated, indexed content.
    Post,
    /// Standalone, undated content.
    Page,
    /// Aggregate over a series; never parsed from a file.
    Collection,
}

/// Flags the layout uses to decide which client-side scripts to include.
///
/// Set only by the analysis and render passes, never by front matter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Features {
    pub uses_math: bool,
    pub uses_code: bool,
}

impl Features {
    pub fn union(self, other: Features) -> Features {
        Features {
            uses_math: self.uses_math || other.uses_math,
            uses_code: self.uses_code || other.uses_code,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub published: Option<NaiveDateTime>,
    pub updated: Option<NaiveDateTime>,
    pub title: String,
    /// Rendered HTML body; empty until the render pass ran.
    pub content: String,
    /// Output filename, assigned by the graph builder.
    pub permalink: String,
    /// Parent identifier as declared in front matter, not yet resolved.
    pub parent_id: Option<DocumentId>,
    /// Resolved parent, set by the graph builder.
    pub parent: Option<DocumentId>,
    /// Documents whose `parent_id` names this one, in document order.
    pub children: Vec<DocumentId>,
    pub features: Features,
    /// Markdown after front-matter stripping.
    pub raw_body: String,
    /// First error raised while rendering this document.
    pub render_error: Option<RenderError>,
    /// File the document was read from, if any.
    pub source: Option<PathBuf>,
}

impl Document {
    pub fn new(id: DocumentId, kind: DocumentKind) -> Self {
        Self {
            id,
            kind,
            published: None,
            updated: None,
            title: String::new(),
            content: String::new(),
            permalink: String::new(),
            parent_id: None,
            parent: None,
            children: Vec::new(),
            features: Features::default(),
            raw_body: String::new(),
            render_error: None,
            source: None,
        }
    }

    /// Deterministic output filename for an identifier.
    pub fn permalink_for(id: &DocumentId) -> String {
        format!("p{id}.html")
    }

    /// Directory holding this document's images, relative to the content root.
    pub fn asset_path(&self) -> &str {
        self.id.as_str()
    }

    /// Human-readable name for error messages: the source file when known.
    pub fn display_name(&self) -> String {
        match &self.source {
            Some(path) => path.display().to_string(),
            None => self.id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_sort_numerically() {
        let mut ids: Vec<DocumentId> = ["10", "9", "about", "100", "archive", "2"]
            .iter()
            .map(|s| DocumentId::new(s))
            .collect();
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(DocumentId::as_str).collect();
        assert_eq!(sorted, vec!["2", "9", "10", "100", "about", "archive"]);
    }

    #[test]
    fn leading_zeros_normalized() {
        assert_eq!(DocumentId::new("012"), DocumentId::new("12"));
        assert_eq!(DocumentId::new("012").as_str(), "12");
    }

    #[test]
    fn permalink_derived_from_id() {
        assert_eq!(Document::permalink_for(&DocumentId::new("2")), "p2.html");
        assert_eq!(
            Document::permalink_for(&DocumentId::new("about")),
            "pabout.html"
        );
    }

    #[test]
    fn features_union() {
        let a = Features {
            uses_math: true,
            uses_code: false,
        };
        let b = Features {
            uses_math: false,
            uses_code: true,
        };
        assert_eq!(
            a.union(b),
            Features {
                uses_math: true,
                uses_code: true
            }
        );
    }

    #[test]
    fn display_name_prefers_source() {
        let mut doc = Document::new(DocumentId::new("3"), DocumentKind::Post);
        assert_eq!(doc.display_name(), "3");
        doc.source = Some(PathBuf::from("content/003-hello.md"));
        assert_eq!(doc.display_name(), "content/003-hello.md");
    }
}
