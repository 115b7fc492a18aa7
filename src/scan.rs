//! Content directory scanning.
//!
//! Stage 1 of the build. Reads every Markdown document in the content root
//! and registers the static files that are copied verbatim.
//!
//! ## Directory Structure
//!
//! ```text
//! content/                     # Content root
//! ├── config.toml              # Site configuration (optional)
//! ├── 001-first-post.md        # Post 1 (numbered = post, dated)
//! ├── 002-rendering.md         # Post 2
//! ├── about.md                 # Page "about" (unnumbered = page)
//! ├── 1/                       # Asset directory of document 1
//! │   └── chart.png
//! ├── 2/
//! │   └── diagram.png
//! └── static/                  # Copied as-is to dist/static/
//!     └── style.css
//! ```
//!
//! ## Naming Conventions
//!
//! - **Numbered files** (`NNN-name.md`, `NNN.md`): id `NNN` without leading
//!   zeros, a post unless front matter says `-type=page`
//! - **Unnumbered files** (`name.md`): id `name`, a page by default
//! - **Asset directories** are named after the document id; images are found
//!   there first, then in the directories of the document's ancestors
//!
//! Only the content root is searched for documents. Files are read in sorted
//! order so equal publish dates keep a stable order.

use crate::assets::{AssetError, AssetRegistry};
use crate::config::{self, SiteConfig};
use crate::document::Document;
use crate::frontmatter::{self, DocumentError};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Directory whose contents are published unchanged.
pub const STATIC_DIR: &str = "static";

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("{0}")]
    Document(#[from] DocumentError),
    #[error("Cannot walk static files: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("{0}")]
    Asset(#[from] AssetError),
    #[error("Content directory not found: {0}")]
    MissingRoot(PathBuf),
}

/// Output of the scan stage.
#[derive(Debug)]
pub struct Content {
    pub root: PathBuf,
    pub documents: Vec<Document>,
    pub assets: AssetRegistry,
    pub config: SiteConfig,
}

pub fn scan(root: &Path) -> Result<Content, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::MissingRoot(root.to_path_buf()));
    }

    let config = config::load_config(root)?;
    let documents = read_documents(root)?;
    let mut assets = AssetRegistry::new();
    register_static_files(root, &mut assets)?;

    Ok(Content {
        root: root.to_path_buf(),
        documents,
        assets,
        config,
    })
}

/// Parse every `*.md` file directly inside `root`, in file name order.
fn read_documents(root: &Path) -> Result<Vec<Document>, ScanError> {
    let mut md_files = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        let is_markdown = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("md"));
        if is_markdown && path.is_file() {
            md_files.push(path);
        }
    }

    md_files.sort();

    let mut documents = Vec::with_capacity(md_files.len());
    for md_path in &md_files {
        debug!("reading {}", md_path.display());
        let contents = fs::read(md_path)?;
        documents.push(frontmatter::parse_file(md_path, &contents)?);
    }
    Ok(documents)
}

/// Register every file below `<root>/static/` under `static/<relative path>`.
fn register_static_files(root: &Path, assets: &mut AssetRegistry) -> Result<(), ScanError> {
    let static_root = root.join(STATIC_DIR);
    if !static_root.is_dir() {
        return Ok(());
    }

    for entry in WalkDir::new(&static_root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let web_path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        assets.register(&web_path, entry.path())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentId, DocumentKind};
    use crate::test_helpers::{find_doc, write_file};
    use tempfile::TempDir;

    fn content() -> TempDir {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path();
        write_file(&root.join("010-tenth.md"), "-time=2020-02-01\n# Tenth\n");
        write_file(&root.join("002-second.md"), "-time=2020-01-01\n# Second\n");
        write_file(&root.join("about.md"), "# About me\n");
        write_file(&root.join("notes.txt"), "not a document");
        write_file(&root.join("2/chart.png"), "png");
        write_file(&root.join("static/style.css"), "body {}");
        write_file(&root.join("static/fonts/a.woff2"), "font");
        tmp
    }

    #[test]
    fn reads_markdown_in_name_order() {
        let tmp = content();
        let content = scan(tmp.path()).unwrap();
        let ids: Vec<&str> = content.documents.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "10", "about"]);
    }

    #[test]
    fn kinds_from_file_names() {
        let tmp = content();
        let content = scan(tmp.path()).unwrap();
        assert_eq!(find_doc(&content.documents, "10").kind, DocumentKind::Post);
        let about = find_doc(&content.documents, "about");
        assert_eq!(about.kind, DocumentKind::Page);
        assert_eq!(about.title, "About me");
        assert_eq!(about.source.as_deref(), Some(tmp.path().join("about.md").as_path()));
    }

    #[test]
    fn static_tree_registered() {
        let tmp = content();
        let content = scan(tmp.path()).unwrap();
        let paths: Vec<&str> = content.assets.iter().map(|(dst, _)| dst).collect();
        assert_eq!(paths, vec!["static/fonts/a.woff2", "static/style.css"]);
        assert_eq!(
            content.assets.source_of("static/style.css"),
            Some(tmp.path().join("static/style.css").as_path())
        );
    }

    #[test]
    fn asset_directories_not_registered_up_front() {
        let tmp = content();
        let content = scan(tmp.path()).unwrap();
        assert!(content.assets.source_of("2/chart.png").is_none());
    }

    #[test]
    fn document_errors_name_the_file() {
        let tmp = content();
        write_file(&tmp.path().join("003-broken.md"), "-colour=blue\n# Broken\n");
        let err = scan(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("003-broken.md"), "{err}");
        assert!(matches!(
            err,
            ScanError::Document(DocumentError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn config_loaded() {
        let tmp = content();
        write_file(&tmp.path().join("config.toml"), "[site]\ntitle = \"Notebook\"\n");
        let content = scan(tmp.path()).unwrap();
        assert_eq!(content.config.site.title, "Notebook");
    }

    #[test]
    fn missing_root_is_error() {
        let err = scan(Path::new("/nonexistent/content")).unwrap_err();
        assert!(matches!(err, ScanError::MissingRoot(_)));
    }

    #[test]
    fn directory_listing_errors_propagate() {
        let tmp = content();
        let not_a_dir = tmp.path().join("about.md");
        assert!(matches!(
            read_documents(&not_a_dir),
            Err(ScanError::Io(_))
        ));
    }

    #[test]
    fn markdown_named_directories_skipped() {
        let tmp = content();
        write_file(&tmp.path().join("drafts.md/notes.txt"), "x");
        let content = scan(tmp.path()).unwrap();
        assert_eq!(content.documents.len(), 3);
    }

    #[test]
    fn explicit_id_overrides_file_name() {
        let tmp = TempDir::new().unwrap();
        write_file(&tmp.path().join("draft.md"), "-id=42\n-type=post\n-time=2020-01-01\n# Draft\n");
        let content = scan(tmp.path()).unwrap();
        assert_eq!(content.documents[0].id, DocumentId::new("42"));
    }
}
