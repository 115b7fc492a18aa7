//! The analysis pass: title and feature flags, no output.

use super::{MarkupHooks, plain_text, traverse, wrap};
use crate::document::Document;
use log::warn;
use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Tag};

struct Analyzer<'d> {
    doc: &'d mut Document,
    seen_title: bool,
}

impl<'a> MarkupHooks<'a> for Analyzer<'_> {
    fn heading(&mut self, tag: Tag<'a>, inner: Vec<Event<'a>>, out: &mut Vec<Event<'a>>) {
        if !matches!(
            tag,
            Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }
        ) {
            return wrap(tag, inner, out);
        }

        let text = plain_text(&inner);
        let text = text.trim();
        if self.seen_title {
            warn!(
                "{}: duplicate title {:?} ignored",
                self.doc.display_name(),
                text
            );
            return;
        }
        self.seen_title = true;
        if self.doc.title.is_empty() {
            self.doc.title = text.to_string();
        }
    }

    fn inline_math(&mut self, source: CowStr<'a>, out: &mut Vec<Event<'a>>) {
        self.doc.features.uses_math = true;
        out.push(Event::InlineMath(source));
    }

    fn display_math(&mut self, source: CowStr<'a>, out: &mut Vec<Event<'a>>) {
        self.doc.features.uses_math = true;
        out.push(Event::DisplayMath(source));
    }

    fn code_block(
        &mut self,
        kind: CodeBlockKind<'a>,
        inner: Vec<Event<'a>>,
        out: &mut Vec<Event<'a>>,
    ) {
        if let CodeBlockKind::Fenced(lang) = &kind {
            if !lang.trim().is_empty() {
                self.doc.features.uses_code = true;
            }
        }
        wrap(Tag::CodeBlock(kind), inner, out);
    }
}

/// Record the first level-1 heading as the title (unless front matter set
/// one) and flag math and annotated code blocks. Further level-1 headings are
/// logged and dropped. Never fails.
pub fn analyze(doc: &mut Document) {
    let body = std::mem::take(&mut doc.raw_body);
    {
        let mut analyzer = Analyzer {
            doc: &mut *doc,
            seen_title: false,
        };
        traverse(&body, &mut analyzer);
    }
    doc.raw_body = body;
}
