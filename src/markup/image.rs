//! Image references: lookup, asset registration and resizing.
//!
//! A reference is resolved in this order:
//!
//! 1. an absolute URL (`https://…`, `//cdn…`) is used as is, with no size;
//! 2. absolute paths and references containing `..` are rejected;
//! 3. a reference containing `/` is relative to the content root;
//! 4. a bare file name is looked up in the document's asset directory, then
//!    in each ancestor's, nearest first.
//!
//! The found file is registered under its content-relative path and measured.
//! Images wider than `images.max_width` are wrapped in a link to the original
//! and shown either scaled down or as a generated thumbnail, depending on the
//! configured [`ResizePolicy`].

use super::RenderError;
use super::render::RenderContext;
use crate::assets::{AssetError, AssetRegistry};
use crate::config::ResizePolicy;
use crate::document::Document;
use crate::graph::DocumentIndex;
use crate::imaging::{
    Dimensions, Quality, ThumbnailConfig, ensure_thumbnail, get_dimensions, scale_to_width,
};
use log::{debug, warn};
use std::path::{Component, Path, PathBuf};

/// Title given to oversized images that have none.
pub const FULL_SIZE_TITLE: &str = "Click for full-size version.";

/// Where a reference points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    External,
    Local { uri: String, path: PathBuf },
}

/// What ends up in the `<img>` tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embedded {
    pub src: String,
    pub dimensions: Option<Dimensions>,
    /// Link target for click-through, set when the image was shrunk.
    pub full_size: Option<String>,
}

#[derive(Debug)]
pub enum EmbedError {
    /// Document-level failure.
    Render(RenderError),
    /// Build-level failure.
    Asset(AssetError),
}

impl From<RenderError> for EmbedError {
    fn from(e: RenderError) -> Self {
        EmbedError::Render(e)
    }
}

impl From<AssetError> for EmbedError {
    fn from(e: AssetError) -> Self {
        EmbedError::Asset(e)
    }
}

fn is_absolute_url(reference: &str) -> bool {
    if reference.starts_with("//") {
        return true;
    }
    match reference.split_once("://") {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => reference.starts_with("data:"),
    }
}

fn invalid(doc: &Document, reference: &str, reason: impl Into<String>) -> RenderError {
    RenderError::InvalidImage {
        document: doc.display_name(),
        reference: reference.to_string(),
        reason: reason.into(),
    }
}

/// Find the file an image reference names.
pub fn resolve(
    reference: &str,
    doc: &Document,
    index: &DocumentIndex<'_>,
    content_root: &Path,
) -> Result<Resolved, RenderError> {
    if is_absolute_url(reference) {
        return Ok(Resolved::External);
    }

    let relative = Path::new(reference);
    if reference.is_empty() {
        return Err(invalid(doc, reference, "empty reference"));
    }
    if relative.is_absolute() || reference.starts_with('/') {
        return Err(invalid(doc, reference, "absolute paths are not allowed"));
    }
    if relative.components().any(|c| c == Component::ParentDir) {
        return Err(invalid(doc, reference, "must not leave the content directory"));
    }

    let not_found = || RenderError::ImageNotFound {
        document: doc.display_name(),
        reference: reference.to_string(),
    };

    if reference.contains('/') {
        let path = content_root.join(relative);
        debug!("{}: looking for {}", doc.id, path.display());
        return if path.is_file() {
            Ok(Resolved::Local {
                uri: reference.to_string(),
                path,
            })
        } else {
            Err(not_found())
        };
    }

    for owner in std::iter::once(doc).chain(index.ancestors(doc)) {
        let path = content_root.join(owner.asset_path()).join(reference);
        debug!("{}: looking for {}", doc.id, path.display());
        if path.is_file() {
            return Ok(Resolved::Local {
                uri: format!("{}/{}", owner.asset_path(), reference),
                path,
            });
        }
    }
    Err(not_found())
}

/// Resolve, register and measure an image, shrinking it when too wide.
pub fn embed(
    reference: &str,
    doc: &Document,
    index: &DocumentIndex<'_>,
    assets: &mut AssetRegistry,
    ctx: &RenderContext<'_>,
) -> Result<Embedded, EmbedError> {
    let (uri, path) = match resolve(reference, doc, index, ctx.content_root)? {
        Resolved::External => {
            return Ok(Embedded {
                src: reference.to_string(),
                dimensions: None,
                full_size: None,
            });
        }
        Resolved::Local { uri, path } => (uri, path),
    };

    assets.register(&uri, &path)?;
    let original =
        get_dimensions(ctx.backend, &path).map_err(|e| invalid(doc, reference, e.to_string()))?;

    let max_width = ctx.images.max_width;
    if original.width <= max_width {
        return Ok(Embedded {
            src: uri,
            dimensions: Some(original),
            full_size: None,
        });
    }

    warn!(
        "{}: image {} is {}px wide, shrinking to {}px",
        doc.display_name(),
        uri,
        original.width,
        max_width
    );

    match ctx.images.resize {
        ResizePolicy::Scale => Ok(Embedded {
            src: uri.clone(),
            dimensions: Some(scale_to_width(original, max_width)),
            full_size: Some(uri),
        }),
        ResizePolicy::Thumbnail => {
            let config = ThumbnailConfig {
                max_width,
                quality: Quality::new(ctx.images.quality),
            };
            // One cache tree per quality, the width is checked on reuse.
            let output_base = ctx
                .cache_dir
                .join("thumbs")
                .join(format!("q{}", config.quality.value()))
                .join(&uri);
            let thumb = ensure_thumbnail(ctx.backend, &path, &output_base, original, &config)
                .map_err(|e| invalid(doc, reference, e.to_string()))?;
            let thumb_uri = format!("{uri}{}", thumb.format.suffix());
            assets.register(&thumb_uri, &thumb.path)?;
            Ok(Embedded {
                src: thumb_uri,
                dimensions: Some(thumb.dimensions),
                full_size: Some(uri),
            })
        }
    }
}

/// Split a leading `{classes}` annotation off alt text.
pub fn split_class(alt: &str) -> (Option<String>, String) {
    if let Some(rest) = alt.strip_prefix('{') {
        if let Some((class, text)) = rest.split_once('}') {
            let class = class.trim();
            let class = (!class.is_empty()).then(|| class.to_string());
            return (class, text.trim_start().to_string());
        }
    }
    (None, alt.to_string())
}

/// The `<img>` markup for an embedded image, linked to the original when it
/// was shrunk.
pub fn img_html(embedded: &Embedded, alt: &str, class: Option<&str>, title: &str) -> String {
    use html_escape::encode_double_quoted_attribute as attr;

    let title = if title.is_empty() && embedded.full_size.is_some() {
        FULL_SIZE_TITLE
    } else {
        title
    };

    let mut img = format!(
        r#"<img src="{}" alt="{}""#,
        attr(&embedded.src),
        attr(alt)
    );
    if !title.is_empty() {
        img.push_str(&format!(r#" title="{}""#, attr(title)));
    }
    if let Some(class) = class {
        img.push_str(&format!(r#" class="{}""#, attr(class)));
    }
    if let Some(dims) = embedded.dimensions {
        img.push_str(&format!(
            r#" width="{}" height="{}""#,
            dims.width, dims.height
        ));
    }
    img.push('>');

    match &embedded.full_size {
        Some(href) => format!(r#"<a href="{}">{img}</a>"#, attr(href)),
        None => img,
    }
}
