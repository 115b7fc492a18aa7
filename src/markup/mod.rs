//! Markdown traversal with named extension points.
//!
//! Both passes over a document body run the same driver, [`traverse`], which
//! feeds a `pulldown-cmark` event stream through a [`MarkupHooks`]
//! implementation. The driver groups the events of each construct a hook
//! cares about (heading, link, image, code block, custom-tag paragraph) and
//! hands the hook the opening tag plus the already-processed inner events.
//! Every hook defaults to passing the construct through unchanged, so an
//! implementation only overrides what it needs:
//!
//! - [`analyze`] reads titles and feature flags, output is discarded;
//! - [`render`] rewrites links, images, math and custom tags into HTML.
//!
//! Custom tags are paragraphs that consist solely of `{:name}` (open) or
//! `{:/name}` (close):
//!
//! ```text
//! {:figure}
//! ![{wide} Chart](chart.png)
//! {:caption}
//! Weekly totals
//! {:/caption}
//! {:/figure}
//! ```

mod analyze;
pub mod image;
mod render;

pub use analyze::analyze;
pub use render::{RenderContext, Rendered, render};

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};
use thiserror::Error;

/// Per-document failures raised by the render pass. Only the first one is
/// kept for a document; rendering of the remaining content continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("{document}: link to unknown document {target:?}")]
    UnresolvedLink { document: String, target: String },
    #[error("{document}: cannot find image {reference:?}")]
    ImageNotFound { document: String, reference: String },
    #[error("{document}: invalid image {reference:?}: {reason}")]
    InvalidImage {
        document: String,
        reference: String,
        reason: String,
    },
    #[error("{document}: unknown tag {{:{tag}}}")]
    UnknownTag { document: String, tag: String },
}

/// A `{:name}` / `{:/name}` paragraph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomTag {
    pub name: String,
    pub closing: bool,
}

/// Markdown extensions enabled for every document.
pub fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_MATH);
    options
}

/// Extension points of a traversal. Each hook receives the construct and
/// pushes whatever should replace it onto `out`.
pub trait MarkupHooks<'a> {
    /// Constructs for which this returns true are dropped whole. Their
    /// content reaches no hook and nothing is emitted for them.
    fn skip(&mut self, _tag: &Tag<'a>) -> bool {
        false
    }

    fn heading(&mut self, tag: Tag<'a>, inner: Vec<Event<'a>>, out: &mut Vec<Event<'a>>) {
        wrap(tag, inner, out);
    }

    fn link(&mut self, tag: Tag<'a>, inner: Vec<Event<'a>>, out: &mut Vec<Event<'a>>) {
        wrap(tag, inner, out);
    }

    /// `inner` holds the alt text events.
    fn image(&mut self, tag: Tag<'a>, inner: Vec<Event<'a>>, out: &mut Vec<Event<'a>>) {
        wrap(tag, inner, out);
    }

    fn inline_math(&mut self, source: CowStr<'a>, out: &mut Vec<Event<'a>>) {
        out.push(Event::InlineMath(source));
    }

    fn display_math(&mut self, source: CowStr<'a>, out: &mut Vec<Event<'a>>) {
        out.push(Event::DisplayMath(source));
    }

    /// `inner` holds the paragraph content the tag was parsed from.
    fn custom_tag(&mut self, _tag: CustomTag, inner: Vec<Event<'a>>, out: &mut Vec<Event<'a>>) {
        wrap(Tag::Paragraph, inner, out);
    }

    fn code_block(
        &mut self,
        kind: CodeBlockKind<'a>,
        inner: Vec<Event<'a>>,
        out: &mut Vec<Event<'a>>,
    ) {
        wrap(Tag::CodeBlock(kind), inner, out);
    }
}

/// Run `source` through `hooks` and return the resulting event stream.
pub fn traverse<'a, H>(source: &'a str, hooks: &mut H) -> Vec<Event<'a>>
where
    H: MarkupHooks<'a> + ?Sized,
{
    let mut events = Parser::new_ext(source, options());
    let mut out = Vec::new();
    drive(&mut events, hooks, None, &mut out);
    out
}

/// Consume events up to (and including) `until`, dispatching hooked
/// constructs recursively so that nested ones are already processed when the
/// enclosing hook sees them.
fn drive<'a, I, H>(
    events: &mut I,
    hooks: &mut H,
    until: Option<TagEnd>,
    out: &mut Vec<Event<'a>>,
) where
    I: Iterator<Item = Event<'a>>,
    H: MarkupHooks<'a> + ?Sized,
{
    while let Some(event) = events.next() {
        match event {
            Event::End(end) if Some(end) == until => return,
            Event::Start(
                tag @ (Tag::Heading { .. }
                | Tag::Link { .. }
                | Tag::Image { .. }
                | Tag::Paragraph
                | Tag::CodeBlock(_)),
            ) => {
                if hooks.skip(&tag) {
                    skip_construct(events);
                    continue;
                }
                let mut inner = Vec::new();
                drive(events, hooks, Some(tag.to_end()), &mut inner);
                dispatch(tag, inner, hooks, out);
            }
            Event::InlineMath(source) => hooks.inline_math(source, out),
            Event::DisplayMath(source) => hooks.display_math(source, out),
            other => out.push(other),
        }
    }
}

/// Consume the rest of a construct whose start event was already taken.
fn skip_construct<'a, I>(events: &mut I)
where
    I: Iterator<Item = Event<'a>>,
{
    let mut depth = 0usize;
    for event in events.by_ref() {
        match event {
            Event::Start(_) => depth += 1,
            Event::End(_) if depth == 0 => return,
            Event::End(_) => depth -= 1,
            _ => {}
        }
    }
}

fn dispatch<'a, H>(tag: Tag<'a>, inner: Vec<Event<'a>>, hooks: &mut H, out: &mut Vec<Event<'a>>)
where
    H: MarkupHooks<'a> + ?Sized,
{
    match tag {
        Tag::Heading { .. } => hooks.heading(tag, inner, out),
        Tag::Link { .. } => hooks.link(tag, inner, out),
        Tag::Image { .. } => hooks.image(tag, inner, out),
        Tag::CodeBlock(kind) => hooks.code_block(kind, inner, out),
        Tag::Paragraph => match parse_custom_tag(&inner) {
            Some(custom) => hooks.custom_tag(custom, inner, out),
            None => wrap(Tag::Paragraph, inner, out),
        },
        other => wrap(other, inner, out),
    }
}

/// Emit `tag` around `inner` unchanged.
pub fn wrap<'a>(tag: Tag<'a>, inner: Vec<Event<'a>>, out: &mut Vec<Event<'a>>) {
    let end = tag.to_end();
    out.push(Event::Start(tag));
    out.extend(inner);
    out.push(Event::End(end));
}

/// Visible text of a run of inline events.
pub fn plain_text(events: &[Event<'_>]) -> String {
    let mut text = String::new();
    for event in events {
        match event {
            Event::Text(t) | Event::Code(t) | Event::InlineMath(t) => text.push_str(t),
            Event::SoftBreak | Event::HardBreak => text.push(' '),
            _ => {}
        }
    }
    text
}

fn parse_custom_tag(inner: &[Event<'_>]) -> Option<CustomTag> {
    let mut text = String::new();
    for event in inner {
        match event {
            Event::Text(t) => text.push_str(t),
            _ => return None,
        }
    }
    let body = text.trim().strip_prefix("{:")?.strip_suffix('}')?;
    let (closing, name) = match body.strip_prefix('/') {
        Some(name) => (true, name),
        None => (false, body),
    };
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    valid.then(|| CustomTag {
        name: name.to_string(),
        closing,
    })
}

/// Render an event stream to HTML.
pub fn to_html<'a>(events: impl IntoIterator<Item = Event<'a>>) -> String {
    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    struct PassThrough;
    impl MarkupHooks<'_> for PassThrough {}

    /// Records which hooks fired, in order.
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl<'a> MarkupHooks<'a> for Recorder {
        fn link(&mut self, tag: Tag<'a>, inner: Vec<Event<'a>>, out: &mut Vec<Event<'a>>) {
            self.calls.push(format!("link:{}", plain_text(&inner)));
            wrap(tag, inner, out);
        }

        fn image(&mut self, tag: Tag<'a>, inner: Vec<Event<'a>>, out: &mut Vec<Event<'a>>) {
            self.calls.push(format!("image:{}", plain_text(&inner)));
            wrap(tag, inner, out);
        }

        fn inline_math(&mut self, source: CowStr<'a>, out: &mut Vec<Event<'a>>) {
            self.calls.push(format!("math:{source}"));
            out.push(Event::InlineMath(source));
        }

        fn custom_tag(
            &mut self,
            tag: CustomTag,
            _inner: Vec<Event<'a>>,
            _out: &mut Vec<Event<'a>>,
        ) {
            let slash = if tag.closing { "/" } else { "" };
            self.calls.push(format!("tag:{slash}{}", tag.name));
        }
    }

    fn pass_through_html(source: &str) -> String {
        to_html(traverse(source, &mut PassThrough))
    }

    #[test]
    fn pass_through_matches_plain_rendering() {
        let source = concat!(
            "# Title\n\nSome *text* with [a link](http://x.org).\n\n",
            "```rust\nfn main() {}\n```\n\n",
            "| a | b |\n|---|---|\n| 1 | 2 |\n",
        );
        let mut expected = String::new();
        pulldown_cmark::html::push_html(&mut expected, Parser::new_ext(source, options()));
        assert_eq!(pass_through_html(source), expected);
    }

    #[test]
    fn nested_constructs_reach_hooks_inner_first() {
        let mut recorder = Recorder::default();
        traverse("[![alt](a.png)](http://x.org)", &mut recorder);
        assert_eq!(recorder.calls, vec!["image:alt", "link:alt"]);
    }

    /// Drops level-2 headings, recording everything else like [`Recorder`].
    struct SkipH2(Recorder);

    impl<'a> MarkupHooks<'a> for SkipH2 {
        fn skip(&mut self, tag: &Tag<'a>) -> bool {
            matches!(
                tag,
                Tag::Heading {
                    level: pulldown_cmark::HeadingLevel::H2,
                    ..
                }
            )
        }

        fn link(&mut self, tag: Tag<'a>, inner: Vec<Event<'a>>, out: &mut Vec<Event<'a>>) {
            self.0.link(tag, inner, out);
        }

        fn image(&mut self, tag: Tag<'a>, inner: Vec<Event<'a>>, out: &mut Vec<Event<'a>>) {
            self.0.image(tag, inner, out);
        }
    }

    #[test]
    fn skipped_constructs_reach_no_hook() {
        let mut hooks = SkipH2(Recorder::default());
        let html = to_html(traverse(
            "## See [x](*1) and ![i](a.png)\n\n[after](http://x.org)\n",
            &mut hooks,
        ));
        assert_eq!(hooks.0.calls, vec!["link:after"]);
        assert_eq!(html, "<p><a href=\"http://x.org\">after</a></p>\n");
    }

    #[test]
    fn custom_tag_paragraphs_detected() {
        let mut recorder = Recorder::default();
        let html = to_html(traverse("{:figure}\n\nbody\n\n{:/figure}\n", &mut recorder));
        assert_eq!(recorder.calls, vec!["tag:figure", "tag:/figure"]);
        assert_eq!(html, "<p>body</p>\n");
    }

    #[test]
    fn braces_inside_text_are_not_tags() {
        assert_eq!(parse_custom_tag(&[Event::Text("see {:figure} here".into())]), None);
        assert_eq!(parse_custom_tag(&[Event::Text("{:}".into())]), None);
        assert_eq!(parse_custom_tag(&[Event::Text("{:two words}".into())]), None);
        assert_eq!(
            parse_custom_tag(&[Event::Text("{:/aside}".into())]),
            Some(CustomTag {
                name: "aside".to_string(),
                closing: true
            })
        );
    }

    #[test]
    fn math_events_dispatched() {
        let mut recorder = Recorder::default();
        traverse("Energy $E=mc^2$ here.", &mut recorder);
        assert_eq!(recorder.calls, vec!["math:E=mc^2"]);
    }

    #[test]
    fn backslash_escapes() {
        assert_eq!(pass_through_html("\\{"), "<p>{</p>\n");
        assert_eq!(pass_through_html("\\q"), "<p>\\q</p>\n");
    }

    #[test]
    fn plain_text_joins_inline_content() {
        let events: Vec<Event> = Parser::new("Hello `code` *world*").collect();
        assert_eq!(plain_text(&events), "Hello code world");
    }
}
