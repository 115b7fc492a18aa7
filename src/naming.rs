//! Filename parsing for the `NNN-name` convention.
//!
//! Every document file is named either with a numeric prefix (`012-my-post.md`)
//! or without one (`about.md`). The numeric prefix *is* the document's
//! identifier; unnumbered files use their whole stem.
//!
//! - `012-my-post` → id `12`, numbered (a post by default)
//! - `12` → id `12`, numbered
//! - `about` → id `about`, unnumbered (a page by default)
//! - `wip-drafts` → id `wip-drafts`, unnumbered

/// Result of parsing a document file stem.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedName {
    /// Identifier derived from the stem.
    pub id: String,
    /// Whether the identifier came from a numeric prefix.
    pub numbered: bool,
}

/// Parse a file stem following the `NNN-name` convention.
pub fn parse_entry_name(stem: &str) -> ParsedName {
    let prefix = stem.split_once('-').map_or(stem, |(prefix, _)| prefix);
    match normalize_numeric(prefix) {
        Some(id) => ParsedName { id, numbered: true },
        None => ParsedName {
            id: stem.to_string(),
            numbered: false,
        },
    }
}

/// Normalize an identifier: all-digit strings lose their leading zeros
/// (`"007"` → `"7"`, `"000"` → `"0"`); anything else is returned trimmed.
pub fn normalize_id(raw: &str) -> String {
    let trimmed = raw.trim();
    normalize_numeric(trimmed).unwrap_or_else(|| trimmed.to_string())
}

fn normalize_numeric(s: &str) -> Option<String> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let stripped = s.trim_start_matches('0');
    Some(if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_with_name() {
        let p = parse_entry_name("012-my-first-post");
        assert_eq!(p.id, "12");
        assert!(p.numbered);
    }

    #[test]
    fn number_only() {
        let p = parse_entry_name("007");
        assert_eq!(p.id, "7");
        assert!(p.numbered);
    }

    #[test]
    fn number_with_trailing_dash() {
        let p = parse_entry_name("3-");
        assert_eq!(p.id, "3");
        assert!(p.numbered);
    }

    #[test]
    fn unnumbered_single_word() {
        let p = parse_entry_name("about");
        assert_eq!(p.id, "about");
        assert!(!p.numbered);
    }

    #[test]
    fn unnumbered_with_dashes_keeps_whole_stem() {
        let p = parse_entry_name("wip-drafts");
        assert_eq!(p.id, "wip-drafts");
        assert!(!p.numbered);
    }

    #[test]
    fn zero_prefix() {
        assert_eq!(parse_entry_name("000-first").id, "0");
    }

    #[test]
    fn normalize_id_strips_zeros_and_whitespace() {
        assert_eq!(normalize_id(" 0042 "), "42");
        assert_eq!(normalize_id("about"), "about");
        assert_eq!(normalize_id("1a"), "1a");
    }
}
