//! Site configuration module.
//!
//! Handles loading and validating the optional `config.toml` at the root of the
//! content directory. Every key has a default, so a config file only needs the
//! keys it wants to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [site]
//! title = "Untitled"        # Site title, shown in the page header
//! url = ""                  # Public base URL, used for feed links and ids
//! author = ""
//! recent_posts = 5          # Number of posts in the "Recent" sidebar
//! feed_posts = 10           # Number of newest posts in feed.atom.xml
//! archive = true            # Generate the "Archives" page
//!
//! [images]
//! max_width = 700           # Images wider than this get a click-through link
//! resize = "thumbnail"      # "thumbnail" (generate a smaller file) or "scale"
//! quality = 90              # JPEG quality for generated thumbnails (1-100)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site-wide metadata and index settings.
    pub site: SiteSettings,
    /// Embedded image handling.
    pub images: ImagesConfig,
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.images.max_width == 0 {
            return Err(ConfigError::Validation(
                "images.max_width must be non-zero".into(),
            ));
        }
        if self.images.quality == 0 || self.images.quality > 100 {
            return Err(ConfigError::Validation(
                "images.quality must be 1-100".into(),
            ));
        }
        if self.site.title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site.title must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Site-wide metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSettings {
    pub title: String,
    pub url: String,
    pub author: String,
    /// How many of the newest posts the layout lists as "Recent".
    pub recent_posts: usize,
    /// How many of the newest posts the Atom feed carries.
    pub feed_posts: usize,
    /// Whether to synthesize the "Archives" page.
    pub archive: bool,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            url: String::new(),
            author: String::new(),
            recent_posts: 5,
            feed_posts: 10,
            archive: true,
        }
    }
}

/// What to do with images wider than [`ImagesConfig::max_width`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizePolicy {
    /// Keep the original file, shrink the `width`/`height` attributes.
    Scale,
    /// Generate a separate, narrower thumbnail file and embed that.
    #[default]
    Thumbnail,
}

/// Embedded image settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Maximum display width in pixels.
    pub max_width: u32,
    /// Policy applied to images wider than `max_width`.
    pub resize: ResizePolicy,
    /// JPEG encoding quality for generated thumbnails (1 = worst, 100 = best).
    pub quality: u32,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            max_width: 700,
            resize: ResizePolicy::default(),
            quality: 90,
        }
    }
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Name of the config file looked up in the content root.
pub const CONFIG_FILE: &str = "config.toml";

/// Load config from `config.toml` in the content root.
///
/// A missing file yields the defaults. Keys the file leaves out keep their
/// defaults, unknown keys are rejected and the result is validated.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    let config = if config_path.exists() {
        toml::from_str(&fs::read_to_string(&config_path)?)?
    } else {
        SiteConfig::default()
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Quire Configuration
# ===================
# All settings are optional. Values shown below are the defaults.
# Place this file at the root of the content directory.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
# Site title, shown in the page header.
title = "Untitled"

# Public base URL of the site. Feed links and entry ids are built from it.
url = ""

# Author name.
author = ""

# Number of newest posts listed in the "Recent" sidebar.
recent_posts = 5

# Number of newest posts included in feed.atom.xml.
feed_posts = 10

# Generate an "Archives" page listing every post by month.
archive = true

# ---------------------------------------------------------------------------
# Embedded images
# ---------------------------------------------------------------------------
[images]
# Images wider than this (in pixels) are shown at reduced size and link
# to the full-size file.
max_width = 700

# How to reduce oversized images:
#   "thumbnail" - write a separate, narrower copy and embed that
#   "scale"     - embed the original with scaled width/height attributes
resize = "thumbnail"

# JPEG quality for generated thumbnails (1 = worst, 100 = best).
quality = 90
"##
}
