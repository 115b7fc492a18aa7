//! Front-matter parsing.
//!
//! Lines at the very start of a document that begin with `-` are property
//! assignments of the form `-key=value`:
//!
//! ```text
//! -title=Rendering series
//! -time=2020-01-02
//! -parent=12
//! # Rendering series
//!
//! Body text...
//! ```
//!
//! Parsing stops at the first line that does not start with `-`; everything
//! from there on is the Markdown body, kept verbatim (leading blank lines
//! included). Header lines may end in CRLF or LF.
//!
//! After the header is consumed, `updated` falls back to `published`, the
//! analysis pass runs (the title may come from the first `#` heading), and the
//! document is validated: it needs a title, and posts need a publish time.

use crate::document::{Document, DocumentId, DocumentKind};
use crate::markup;
use crate::naming;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("{document}: configuration line {line:?} ill-formed")]
    MalformedLine { document: String, line: String },
    #[error("{document}: unknown property {key:?}")]
    UnknownProperty { document: String, key: String },
    #[error("{document}: cannot parse time {value:?}")]
    InvalidTime { document: String, value: String },
    #[error("{document}: unknown document type {value:?}")]
    UnknownType { document: String, value: String },
    #[error("{document}: empty value for {key:?}")]
    EmptyValue { document: String, key: String },
    #[error("{document}: content is not valid UTF-8")]
    InvalidUtf8 { document: String },
    #[error("{document}: document has no title")]
    MissingTitle { document: String },
    #[error("{document}: post doesn't have a time set")]
    MissingPublished { document: String },
}

/// Timestamp layouts accepted for `time`, `published` and `updated`, tried in
/// order after the plain `YYYY-MM-DD` date.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a document read from `path`.
///
/// The identifier and default kind come from the file stem (see
/// [`naming::parse_entry_name`]); error messages name the path.
pub fn parse_file(path: &Path, contents: &[u8]) -> Result<Document, DocumentError> {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let mut doc = parse_named(&path.display().to_string(), &stem, contents)?;
    doc.source = Some(path.to_path_buf());
    Ok(doc)
}

/// Parse a document whose identifier derives from `stem`.
pub fn parse(stem: &str, contents: &[u8]) -> Result<Document, DocumentError> {
    parse_named(stem, stem, contents)
}

fn parse_named(display: &str, stem: &str, contents: &[u8]) -> Result<Document, DocumentError> {
    let parsed = naming::parse_entry_name(stem);
    let kind = if parsed.numbered {
        DocumentKind::Post
    } else {
        DocumentKind::Page
    };
    let mut doc = Document::new(DocumentId::new(&parsed.id), kind);

    let body = parse_header(display, &mut doc, contents)?;
    doc.raw_body = String::from_utf8(body.to_vec()).map_err(|_| DocumentError::InvalidUtf8 {
        document: display.to_string(),
    })?;

    if doc.updated.is_none() {
        doc.updated = doc.published;
    }

    markup::analyze(&mut doc);
    validate(display, &doc)?;
    Ok(doc)
}

/// Consume the `-key=value` lines at the head of `contents` and return the
/// remaining body bytes.
fn parse_header<'c>(
    display: &str,
    doc: &mut Document,
    contents: &'c [u8],
) -> Result<&'c [u8], DocumentError> {
    let mut rest = contents;

    while rest.first() == Some(&b'-') {
        let (raw_line, next) = match rest.iter().position(|&b| b == b'\n') {
            Some(eol) => (&rest[1..eol], &rest[eol + 1..]),
            None => (&rest[1..], &rest[rest.len()..]),
        };
        rest = next;

        let line = std::str::from_utf8(raw_line).map_err(|_| DocumentError::InvalidUtf8 {
            document: display.to_string(),
        })?;
        let line = line.strip_suffix('\r').unwrap_or(line);

        let (key, value) = parse_key_value_line(line).ok_or_else(|| {
            DocumentError::MalformedLine {
                document: display.to_string(),
                line: line.to_string(),
            }
        })?;

        apply_property(display, doc, key, value)?;
    }

    Ok(rest)
}

/// Split on the first `=`. Key and value are taken exactly as written.
fn parse_key_value_line(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    if key.is_empty() {
        return None;
    }
    Some((key, value))
}

fn apply_property(
    display: &str,
    doc: &mut Document,
    key: &str,
    value: &str,
) -> Result<(), DocumentError> {
    match key {
        "title" => doc.title = value.to_string(),
        "time" | "published" => doc.published = Some(parse_time(display, value)?),
        "updated" => doc.updated = Some(parse_time(display, value)?),
        "type" => {
            doc.kind = match value {
                "post" => DocumentKind::Post,
                "page" => DocumentKind::Page,
                _ => {
                    return Err(DocumentError::UnknownType {
                        document: display.to_string(),
                        value: value.to_string(),
                    });
                }
            }
        }
        "parent" | "id" => {
            if value.is_empty() {
                return Err(DocumentError::EmptyValue {
                    document: display.to_string(),
                    key: key.to_string(),
                });
            }
            let id = DocumentId::new(value);
            if key == "parent" {
                doc.parent_id = Some(id);
            } else {
                doc.id = id;
            }
        }
        _ => {
            return Err(DocumentError::UnknownProperty {
                document: display.to_string(),
                key: key.to_string(),
            });
        }
    }
    Ok(())
}

fn parse_time(display: &str, value: &str) -> Result<NaiveDateTime, DocumentError> {
    parse_timestamp(value).ok_or_else(|| DocumentError::InvalidTime {
        document: display.to_string(),
        value: value.to_string(),
    })
}

/// Parse a timestamp in any accepted layout. The first layout that parses wins;
/// RFC 3339 values with an offset are converted to UTC.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(value)
                .ok()
                .map(|dt| dt.naive_utc())
        })
}

fn validate(display: &str, doc: &Document) -> Result<(), DocumentError> {
    if doc.title.trim().is_empty() {
        return Err(DocumentError::MissingTitle {
            document: display.to_string(),
        });
    }
    if doc.kind == DocumentKind::Post && doc.published.is_none() {
        return Err(DocumentError::MissingPublished {
            document: display.to_string(),
        });
    }
    Ok(())
}
