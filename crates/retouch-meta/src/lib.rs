//! Front-matter metadata extraction.
//!
//! Metadata is a leading run of `Key: value` lines at the top of a document:
//!
//! ```text
//! Title: A Metadata Demo
//! Author: Someone
//! ```
//!
//! A continuation line is any line indented by two or more spaces; it folds
//! into the previous value with the indentation collapsed to a newline.
//! Extraction stops at the first line that does not match.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static META: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+):\s*(.*(?:\n\s{2,}.*)*)\n").unwrap());

static INDENTATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s{2,}").unwrap());

/// Parse leading metadata out of `text`, returning the key/value mapping and
/// the remaining body.
#[must_use]
pub fn parse(text: &str) -> (BTreeMap<String, String>, &str) {
    let mut meta = BTreeMap::new();
    let mut rest = text;
    while let Some(caps) = META.captures(rest) {
        let value = INDENTATION.replace_all(caps[2].trim(), "\n").into_owned();
        meta.insert(caps[1].to_owned(), value);
        rest = &rest[caps.get(0).map_or(0, |m| m.end())..];
    }
    (meta, rest)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_basic_keys() {
        let (meta, body) = parse("Title: A Demo\nAuthor: Someone\n\n# Content\n");
        assert_eq!(meta.get("Title").unwrap(), "A Demo");
        assert_eq!(meta.get("Author").unwrap(), "Someone");
        assert_eq!(body, "\n# Content\n");
    }

    #[test]
    fn test_continuation_lines_fold() {
        let (meta, body) = parse("Summary: first part\n  second part\nNext: x\nbody\n");
        assert_eq!(meta.get("Summary").unwrap(), "first part\nsecond part");
        assert_eq!(meta.get("Next").unwrap(), "x");
        assert_eq!(body, "body\n");
    }

    #[test]
    fn test_stops_at_first_non_matching_line() {
        let (meta, body) = parse("Title: x\nNot a key line\nAuthor: y\n");
        assert_eq!(meta.len(), 1);
        assert_eq!(body, "Not a key line\nAuthor: y\n");
    }

    #[test]
    fn test_no_metadata() {
        let (meta, body) = parse("# Just a document\n");
        assert!(meta.is_empty());
        assert_eq!(body, "# Just a document\n");
    }

    #[test]
    fn test_key_with_colon_in_value() {
        let (meta, _) = parse("Link: http://example.com\n\nbody");
        assert_eq!(meta.get("Link").unwrap(), "http://example.com");
    }
}
