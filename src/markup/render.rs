//! The render pass: Markdown body to HTML fragment.
//!
//! | Construct | Output |
//! |---|---|
//! | `# Title` | dropped (it is the document title) |
//! | `[%](*12#part)` | `<a href="p12.html#part" title="…">Title of 12</a>` |
//! | `![{wide} Alt](chart.png)` | `<img … class="wide" width height>`, linked if shrunk |
//! | `$x$` / `$$x$$` | `<script type="math/tex">` with a `<noscript>` fallback |
//! | `{:figure}` … `{:/figure}` | `<figure>` … `</figure>` |
//!
//! A failing construct records a [`RenderError`] (the first one is kept) and
//! the rest of the document still renders. An asset path conflict aborts the
//! render with [`AssetError`].

use super::image::{self, EmbedError};
use super::{CustomTag, MarkupHooks, RenderError, plain_text, to_html, traverse, wrap};
use crate::assets::{AssetError, AssetRegistry};
use crate::config::ImagesConfig;
use crate::document::{Document, DocumentId};
use crate::graph::DocumentIndex;
use crate::imaging::ImageBackend;
use html_escape::encode_text;
use pulldown_cmark::{CowStr, Event, HeadingLevel, Tag, TagEnd};
use std::path::Path;

/// Marks a link target as a document identifier.
const LINK_SENTINEL: char = '*';
/// Link text replaced by the target's title.
const TITLE_MARKER: &str = "%";

/// Everything outside the document graph that rendering reads.
pub struct RenderContext<'r> {
    pub content_root: &'r Path,
    /// Generated thumbnails go to `<cache_dir>/thumbs/`.
    pub cache_dir: &'r Path,
    pub images: &'r ImagesConfig,
    pub backend: &'r dyn ImageBackend,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub html: String,
    pub error: Option<RenderError>,
    pub uses_math: bool,
}

struct Renderer<'r> {
    doc: &'r Document,
    index: &'r DocumentIndex<'r>,
    assets: &'r mut AssetRegistry,
    ctx: &'r RenderContext<'r>,
    error: Option<RenderError>,
    fatal: Option<AssetError>,
    uses_math: bool,
}

impl Renderer<'_> {
    fn record(&mut self, error: RenderError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn internal_link<'a>(
        &mut self,
        tag: Tag<'a>,
        reference: &str,
        inner: Vec<Event<'a>>,
        out: &mut Vec<Event<'a>>,
    ) {
        let Tag::Link {
            link_type,
            title,
            id,
            ..
        } = tag
        else {
            return;
        };
        let (raw_id, fragment) = match reference.split_once('#') {
            Some((raw_id, fragment)) => (raw_id, Some(fragment)),
            None => (reference, None),
        };

        let Some(target) = self.index.get(&DocumentId::new(raw_id)) else {
            self.record(RenderError::UnresolvedLink {
                document: self.doc.display_name(),
                target: raw_id.to_string(),
            });
            out.extend(inner);
            return;
        };

        let href = match fragment {
            Some(fragment) => format!("{}#{}", target.permalink, fragment),
            None => target.permalink.clone(),
        };
        let title = if title.is_empty() {
            CowStr::from(target.title.clone())
        } else {
            title
        };
        let is_marker =
            matches!(inner.as_slice(), [Event::Text(text)] if text.as_ref() == TITLE_MARKER);
        let inner = if is_marker {
            vec![Event::Text(target.title.clone().into())]
        } else {
            inner
        };

        out.push(Event::Start(Tag::Link {
            link_type,
            dest_url: href.into(),
            title,
            id,
        }));
        out.extend(inner);
        out.push(Event::End(TagEnd::Link));
    }
}

fn math_html(source: &str, display: bool) -> String {
    let escaped = encode_text(source);
    let (script_type, open, close) = if display {
        ("math/tex; mode=display", r"\[", r"\]")
    } else {
        ("math/tex", r"\(", r"\)")
    };
    format!(r#"<script type="{script_type}">{source}</script>"#)
        + &format!("<noscript>{open}{escaped}{close}</noscript>")
}

/// Opening and closing markup of the known custom tags.
fn custom_tag_markup(name: &str) -> Option<(&'static str, &'static str)> {
    match name {
        "figure" => Some(("<figure>", "</figure>")),
        "caption" => Some(("<figcaption>", "</figcaption>")),
        "aside" => Some(("<aside>", "</aside>")),
        "note" => Some((r#"<div class="note">"#, "</div>")),
        _ => None,
    }
}

impl<'a> MarkupHooks<'a> for Renderer<'_> {
    /// Title headings are dropped before their links or images are resolved.
    fn skip(&mut self, tag: &Tag<'a>) -> bool {
        matches!(
            tag,
            Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }
        )
    }

    fn link(&mut self, tag: Tag<'a>, inner: Vec<Event<'a>>, out: &mut Vec<Event<'a>>) {
        let reference = match &tag {
            Tag::Link { dest_url, .. } => dest_url
                .strip_prefix(LINK_SENTINEL)
                .map(str::to_string),
            _ => None,
        };
        match reference {
            Some(reference) => self.internal_link(tag, &reference, inner, out),
            None => wrap(tag, inner, out),
        }
    }

    fn image(&mut self, tag: Tag<'a>, inner: Vec<Event<'a>>, out: &mut Vec<Event<'a>>) {
        let Tag::Image {
            dest_url, title, ..
        } = tag
        else {
            return;
        };
        if self.fatal.is_some() {
            return;
        }

        let (class, alt) = image::split_class(&plain_text(&inner));
        match image::embed(&dest_url, self.doc, self.index, self.assets, self.ctx) {
            Ok(embedded) => out.push(Event::InlineHtml(
                image::img_html(&embedded, &alt, class.as_deref(), &title).into(),
            )),
            Err(EmbedError::Render(e)) => self.record(e),
            Err(EmbedError::Asset(e)) => self.fatal = Some(e),
        }
    }

    fn inline_math(&mut self, source: CowStr<'a>, out: &mut Vec<Event<'a>>) {
        self.uses_math = true;
        out.push(Event::InlineHtml(math_html(&source, false).into()));
    }

    fn display_math(&mut self, source: CowStr<'a>, out: &mut Vec<Event<'a>>) {
        self.uses_math = true;
        out.push(Event::InlineHtml(math_html(&source, true).into()));
    }

    fn custom_tag(&mut self, tag: CustomTag, _inner: Vec<Event<'a>>, out: &mut Vec<Event<'a>>) {
        match custom_tag_markup(&tag.name) {
            Some((open, close)) => {
                let markup = if tag.closing { close } else { open };
                out.push(Event::Html(format!("{markup}\n").into()));
            }
            None => self.record(RenderError::UnknownTag {
                document: self.doc.display_name(),
                tag: tag.name,
            }),
        }
    }
}

/// Render one document against the resolved graph.
///
/// Resolved images (and generated thumbnails) are registered in `assets`.
/// Rendering the same document again with unchanged inputs yields the same
/// HTML and leaves the registry as it was.
pub fn render(
    doc: &Document,
    index: &DocumentIndex<'_>,
    assets: &mut AssetRegistry,
    ctx: &RenderContext<'_>,
) -> Result<Rendered, AssetError> {
    let mut renderer = Renderer {
        doc,
        index,
        assets,
        ctx,
        error: None,
        fatal: None,
        uses_math: false,
    };
    let events = traverse(&doc.raw_body, &mut renderer);
    if let Some(fatal) = renderer.fatal {
        return Err(fatal);
    }
    Ok(Rendered {
        html: to_html(events),
        error: renderer.error,
        uses_math: renderer.uses_math,
    })
}
