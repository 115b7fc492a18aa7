//! The static asset registry.
//!
//! Maps output-relative paths (`12/chart.png`, `static/style.css`) to the files
//! they are copied from. Populated by the scanner (the `static/` tree) and by
//! the render pass (embedded images and generated thumbnails), consumed by the
//! output writer.
//!
//! Registering the same mapping twice is a no-op, which keeps repeated renders
//! idempotent. Claiming an output path for a *different* source is a fatal
//! build error: two files would overwrite each other.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AssetError {
    #[error("Double definition for path {path:?} - assigned to both {existing:?} and {new:?}")]
    Conflict {
        path: String,
        existing: PathBuf,
        new: PathBuf,
    },
}

#[derive(Debug, Clone, Default)]
pub struct AssetRegistry {
    files: BTreeMap<String, PathBuf>,
}

impl AssetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `output_path` for `source`.
    pub fn register(&mut self, output_path: &str, source: &Path) -> Result<(), AssetError> {
        match self.files.get(output_path) {
            Some(existing) if existing != source => Err(AssetError::Conflict {
                path: output_path.to_string(),
                existing: existing.clone(),
                new: source.to_path_buf(),
            }),
            Some(_) => Ok(()),
            None => {
                self.files
                    .insert(output_path.to_string(), source.to_path_buf());
                Ok(())
            }
        }
    }

    /// Source file registered for an output path.
    pub fn source_of(&self, output_path: &str) -> Option<&Path> {
        self.files.get(output_path).map(PathBuf::as_path)
    }

    /// All mappings, ordered by output path.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.files
            .iter()
            .map(|(dst, src)| (dst.as_str(), src.as_path()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
