//! Atom feed of the newest posts.
//!
//! Written next to the pages as `feed.atom.xml`. The feed carries the first
//! `site.feed_posts` posts in newest-first order, each with its rendered HTML
//! as escaped `type="html"` content. Links and ids are built from `site.url`:
//!
//! ```text
//! feed id      {url}/
//! self link    {url}/feed.atom.xml
//! entry id     {url}/{asset path}
//! entry link   {url}/{permalink}
//! ```
//!
//! The feed's `updated` is the latest `updated` among its entries and is left
//! out when there are no posts.

use crate::config::SiteConfig;
use crate::document::Document;
use crate::graph::DocumentGraph;
use chrono::NaiveDateTime;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::{self, Write};

/// Name of the written feed.
pub const FEED_FILE: &str = "feed.atom.xml";

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// A rendered feed document and the number of entries in it.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomFeed {
    pub xml: Vec<u8>,
    pub entries: usize,
}

/// RFC 3339 in UTC; document timestamps carry no zone and are taken as UTC.
fn atom_time(t: NaiveDateTime) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Build the feed for the newest posts of a rendered graph.
pub fn render_atom(graph: &DocumentGraph, config: &SiteConfig) -> io::Result<AtomFeed> {
    let site = &config.site;
    let base = site.url.trim_end_matches('/');
    let feed_id = format!("{base}/");
    let posts: Vec<&Document> = graph.posts().take(site.feed_posts).collect();

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(
        BytesStart::new("feed").with_attributes([("xmlns", ATOM_NS)]),
    ))?;

    text_element(&mut writer, "title", &site.title)?;
    text_element(&mut writer, "id", &feed_id)?;
    link(&mut writer, "self", &format!("{base}/{}", FEED_FILE))?;
    link(&mut writer, "alternate", &feed_id)?;
    if let Some(updated) = posts.iter().filter_map(|p| p.updated).max() {
        text_element(&mut writer, "updated", &atom_time(updated))?;
    }
    writer.write_event(Event::Start(BytesStart::new("author")))?;
    text_element(&mut writer, "name", &site.author)?;
    writer.write_event(Event::End(BytesEnd::new("author")))?;

    for post in &posts {
        write_entry(&mut writer, post, base, &feed_id)?;
    }

    writer.write_event(Event::End(BytesEnd::new("feed")))?;
    Ok(AtomFeed {
        xml: writer.into_inner(),
        entries: posts.len(),
    })
}

fn write_entry<W: Write>(
    writer: &mut Writer<W>,
    post: &Document,
    base: &str,
    feed_id: &str,
) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new("entry")))?;
    text_element(writer, "title", &post.title)?;
    text_element(writer, "id", &format!("{feed_id}{}", post.asset_path()))?;
    link(writer, "alternate", &format!("{base}/{}", post.permalink))?;
    if let Some(published) = post.published {
        text_element(writer, "published", &atom_time(published))?;
    }
    if let Some(updated) = post.updated.or(post.published) {
        text_element(writer, "updated", &atom_time(updated))?;
    }
    writer.write_event(Event::Start(
        BytesStart::new("content").with_attributes([("type", "html")]),
    ))?;
    writer.write_event(Event::Text(BytesText::new(&post.content)))?;
    writer.write_event(Event::End(BytesEnd::new("content")))?;
    writer.write_event(Event::End(BytesEnd::new("entry")))
}

fn text_element<W: Write>(writer: &mut Writer<W>, name: &str, text: &str) -> io::Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))
}

fn link<W: Write>(writer: &mut Writer<W>, rel: &str, href: &str) -> io::Result<()> {
    writer.write_event(Event::Empty(
        BytesStart::new("link").with_attributes([("rel", rel), ("href", href)]),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{doc, render_graph};

    fn config(feed_posts: usize) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.site.title = "Notes & Essays".to_string();
        config.site.url = "https://example.org/".to_string();
        config.site.author = "Ada".to_string();
        config.site.feed_posts = feed_posts;
        config
    }

    fn blog() -> DocumentGraph {
        render_graph(vec![
            doc("1", "-time=2020-01-01\n# First\nHello *one*."),
            doc("2", "-time=2020-02-01\n-updated=2020-02-09 10:30\n# Second\nTwo."),
            doc("3", "-time=2020-03-01\n# Third\nA <b> tag & more."),
            doc("about", "# About\nMe."),
        ])
    }

    fn feed_xml(graph: &DocumentGraph, config: &SiteConfig) -> (String, usize) {
        let feed = render_atom(graph, config).unwrap();
        (String::from_utf8(feed.xml).unwrap(), feed.entries)
    }

    #[test]
    fn feed_header() {
        let (xml, _) = feed_xml(&blog(), &config(10));
        assert!(xml.starts_with(r#"<?xml version="1.0" encoding="utf-8"?>"#));
        assert!(xml.contains(r#"<feed xmlns="http://www.w3.org/2005/Atom">"#));
        assert!(xml.contains("<title>Notes &amp; Essays</title>"));
        assert!(xml.contains("<id>https://example.org/</id>"));
        assert!(xml.contains(r#"<link rel="self" href="https://example.org/feed.atom.xml"/>"#));
        assert!(xml.contains(r#"<link rel="alternate" href="https://example.org/"/>"#));
        assert!(xml.contains("<name>Ada</name>"));
        assert!(xml.trim_end().ends_with("</feed>"));
    }

    #[test]
    fn entries_newest_first_without_pages() {
        let (xml, entries) = feed_xml(&blog(), &config(10));
        assert_eq!(entries, 3);
        assert_eq!(xml.matches("<entry>").count(), 3);
        let third = xml.find("<title>Third</title>").unwrap();
        let first = xml.find("<title>First</title>").unwrap();
        assert!(third < first);
        assert!(!xml.contains("About"));
    }

    #[test]
    fn entry_links_and_dates() {
        let (xml, _) = feed_xml(&blog(), &config(10));
        assert!(xml.contains("<id>https://example.org/2</id>"));
        assert!(xml.contains(r#"<link rel="alternate" href="https://example.org/p2.html"/>"#));
        assert!(xml.contains("<published>2020-02-01T00:00:00Z</published>"));
        assert!(xml.contains("<updated>2020-02-09T10:30:00Z</updated>"));
    }

    #[test]
    fn feed_updated_is_latest_entry_update() {
        let (xml, _) = feed_xml(&blog(), &config(10));
        let header = &xml[..xml.find("<entry>").unwrap()];
        assert!(header.contains("<updated>2020-03-01T00:00:00Z</updated>"), "{header}");
    }

    #[test]
    fn content_is_escaped_html() {
        let (xml, _) = feed_xml(&blog(), &config(10));
        assert!(xml.contains(r#"<content type="html">"#));
        assert!(xml.contains("&lt;p&gt;Hello &lt;em&gt;one&lt;/em&gt;.&lt;/p&gt;"));
        assert!(!xml.contains("<p>"));
    }

    #[test]
    fn limited_to_feed_posts() {
        let (xml, entries) = feed_xml(&blog(), &config(2));
        assert_eq!(entries, 2);
        assert!(xml.contains("<title>Third</title>"));
        assert!(xml.contains("<title>Second</title>"));
        assert!(!xml.contains("<title>First</title>"));
    }

    #[test]
    fn no_posts_no_updated() {
        let graph = render_graph(vec![doc("about", "# About\nMe.")]);
        let (xml, entries) = feed_xml(&graph, &config(10));
        assert_eq!(entries, 0);
        assert!(!xml.contains("<updated>"));
        assert!(!xml.contains("<entry>"));
    }
}
