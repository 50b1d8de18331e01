//! Block-level patterns and scanners.
//!
//! Rules a regular expression can express without look-around live here as
//! `LazyLock` statics. The rest (fenced code, lists, HTML blocks, paragraphs)
//! are hand-written line scanners, since their original grammar needs
//! back-references or look-ahead.

use std::sync::LazyLock;

use regex::Regex;

pub(crate) static NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\n+").unwrap());

pub(crate) static CODE_INDENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?: {4}[^\n]+\n*)+").unwrap());

static CODE_OUTDENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^ {4}").unwrap());

pub(crate) static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *(#{1,6}) *([^\n]+?) *#* *(?:\n+|$)").unwrap());

pub(crate) static LHEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\n]+)\n {0,3}(=+|-+) *(?:\n+|$)").unwrap());

pub(crate) static HRULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}[-*_](?: *[-*_]){2,} *(?:\n+|$)").unwrap());

pub(crate) static QUOTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?: *>[^\n]*(?:\n|$))+").unwrap());

static QUOTE_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^ *> ?").unwrap());

pub(crate) static DEF_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^ *\[([^\^\n\]][^\n\]]*)\]: *<?([^\s>]+)>?(?: +["(]([^\n]+)[")])? *(?:\n+|$)"#)
        .unwrap()
});

pub(crate) static DEF_FOOTNOTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[\^([^\n\]]+)\]: *([^\n]*(?:\n+|$)(?: +[^\n]*(?:\n+|$))*)").unwrap()
});

pub(crate) static TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ *\|(.+)\n *\|( *[-:]+[-|: ]*)\n((?: *\|[^\n]*(?:\n|$))*)\n*").unwrap()
});

/// Bullet or ordered-list marker, with its indentation captured.
pub(crate) static LIST_BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^( *)([*+-]|\d+\.) +").unwrap());

static ITEM_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ *(?:[*+-]|\d+\.) +").unwrap());

static INNER_BLANK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

static TRAILING_BLANK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n[ \t\n]*$").unwrap());

static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^ *<([A-Za-z][A-Za-z0-9-]*)((?:"[^"]*"|'[^']*'|[^'">])*?)>"#).unwrap()
});

/// Tags that stay inline: a block starting with one of these lexes as a
/// paragraph carrying inline HTML, not as an HTML block.
const INLINE_TAGS: &[&str] = &[
    "a", "em", "strong", "small", "s", "cite", "q", "dfn", "abbr", "data", "time", "code", "var",
    "samp", "kbd", "sub", "sup", "i", "b", "u", "mark", "ruby", "rt", "rp", "bdi", "bdo", "span",
    "br", "wbr", "ins", "del", "img", "font",
];

fn block_open_tag(rest: &str) -> Option<(String, usize)> {
    let caps = OPEN_TAG.captures(rest)?;
    let tag = caps[1].to_ascii_lowercase();
    if INLINE_TAGS.contains(&tag.as_str()) {
        return None;
    }
    Some((tag, caps.get(0).map_or(0, |m| m.end())))
}

/// Byte spans of each line in `src`, terminator included.
fn line_spans(src: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut start = 0;
    std::iter::from_fn(move || {
        if start >= src.len() {
            return None;
        }
        let end = src[start..].find('\n').map_or(src.len(), |i| start + i + 1);
        let span = (start, end);
        start = end;
        Some(span)
    })
}

/// Extend `end` over any directly following blank lines.
fn consume_blank_lines(src: &str, end: usize) -> usize {
    let mut stop = end;
    for (s, e) in line_spans(&src[end..]) {
        if src[end + s..end + e].trim().is_empty() {
            stop = end + e;
        } else {
            break;
        }
    }
    stop
}

/// Strip the standard four-space indent from an indented code block.
pub(crate) fn outdent_code(raw: &str) -> String {
    CODE_OUTDENT.replace_all(raw, "").into_owned()
}

/// Strip quote markers from a block quote's raw text.
pub(crate) fn strip_quote_markers(raw: &str) -> String {
    QUOTE_MARKER.replace_all(raw, "").into_owned()
}

/// Dedent footnote continuation lines by their common indentation.
pub(crate) fn dedent_footnote(body: &str) -> String {
    if !body.contains('\n') {
        return body.to_owned();
    }
    let mut width: Option<usize> = None;
    for line in body.lines().skip(1) {
        let space = line.len() - line.trim_start_matches(' ').len();
        if space > 0 {
            width = Some(width.map_or(space, |w| w.min(space)));
        }
    }
    let Some(width) = width else {
        return body.to_owned();
    };
    let mut out = String::with_capacity(body.len());
    for (i, (s, e)) in line_spans(body).enumerate() {
        let line = &body[s..e];
        if i == 0 {
            out.push_str(line);
        } else {
            let space = line.len() - line.trim_start_matches(' ').len();
            out.push_str(&line[space.min(width)..]);
        }
    }
    out
}

/// Split a table header or row line into trimmed cell values.
pub(crate) fn split_cells(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = line.strip_suffix('|').unwrap_or(line);
    line.split('|').map(|c| c.trim().to_owned()).collect()
}

pub(crate) struct FenceMatch {
    pub len: usize,
    pub lang: Option<String>,
    pub text: String,
}

/// Match a fenced code block. Declines when the closing fence is missing,
/// like the original grammar.
pub(crate) fn fences(src: &str) -> Option<FenceMatch> {
    let first_end = src.find('\n').map_or(src.len(), |i| i + 1);
    let opening = src[..first_end].trim_end_matches('\n').trim_start_matches(' ');
    let ch = opening.chars().next()?;
    if ch != '`' && ch != '~' {
        return None;
    }
    let run = opening.chars().take_while(|&c| c == ch).count();
    if run < 3 {
        return None;
    }
    let info = opening[run..].trim();
    if info.contains(char::is_whitespace) || info.contains('`') {
        return None;
    }
    let lang = (!info.is_empty()).then(|| info.to_owned());

    let mut pos = first_end;
    while pos < src.len() {
        let end = src[pos..].find('\n').map_or(src.len(), |i| pos + i + 1);
        let line = src[pos..end].trim_end_matches('\n').trim_start_matches(' ');
        let close = line.chars().take_while(|&c| c == ch).count();
        if close >= run && line[close..].trim().is_empty() {
            let text = src[first_end..pos].to_owned();
            return Some(FenceMatch {
                len: consume_blank_lines(src, end),
                lang,
                text,
            });
        }
        pos = end;
    }
    None
}

pub(crate) struct ItemMatch {
    pub raw: String,
    pub body: String,
    pub loose: bool,
}

pub(crate) struct ListMatch {
    pub len: usize,
    pub ordered: bool,
    pub items: Vec<ItemMatch>,
}

/// Match a list: a run of bullet lines with their continuations, ending at a
/// blank line followed by unindented non-bullet text, a thematic break, a
/// link definition, or end of input.
pub(crate) fn list(src: &str) -> Option<ListMatch> {
    let first = LIST_BULLET.captures(src)?;
    let indent = first.get(1).map_or(0, |m| m.as_str().len());
    let ordered = first[2].starts_with(|c: char| c.is_ascii_digit());

    let mut end = 0;
    let mut in_gap = false;
    for (s, e) in line_spans(src) {
        let line = &src[s..e];
        if s == 0 {
            end = e;
            continue;
        }
        if line.trim().is_empty() {
            in_gap = true;
            continue;
        }
        let rest = &src[s..];
        if HRULE.is_match(rest) || DEF_LINK.is_match(rest) {
            break;
        }
        if in_gap && !line.starts_with(' ') && !LIST_BULLET.is_match(line) {
            break;
        }
        in_gap = false;
        end = e;
    }
    let len = consume_blank_lines(src, end);
    let raw = &src[..len];

    let mut starts = Vec::new();
    for (s, e) in line_spans(raw) {
        if let Some(c) = LIST_BULLET.captures(&raw[s..e])
            && c.get(1).map_or(0, |m| m.as_str().len()) == indent
        {
            starts.push(s);
        }
    }

    let mut items = Vec::new();
    let mut prev_gap = false;
    for (i, &s) in starts.iter().enumerate() {
        let e = starts.get(i + 1).copied().unwrap_or(raw.len());
        let item_raw = &raw[s..e];
        let width = ITEM_PREFIX.find(item_raw).map_or(0, |m| m.end());
        let mut body = String::with_capacity(item_raw.len());
        for (j, (ls, le)) in line_spans(item_raw).enumerate() {
            let line = &item_raw[ls..le];
            if j == 0 {
                body.push_str(&line[width.min(line.len())..]);
            } else {
                let space = line.len() - line.trim_start_matches(' ').len();
                body.push_str(&line[space.min(width)..]);
            }
        }
        let loose = prev_gap || INNER_BLANK.is_match(item_raw.trim_end());
        prev_gap = TRAILING_BLANK.is_match(item_raw);
        items.push(ItemMatch {
            raw: item_raw.to_owned(),
            body,
            loose,
        });
    }

    Some(ListMatch { len, ordered, items })
}

pub(crate) struct HtmlMatch {
    pub len: usize,
    pub tag: Option<String>,
    pub inner: Option<String>,
}

/// Match an HTML block: a comment, a tag closed within the block, or an
/// opening tag whose content runs to the next blank line (the "open" case
/// that carries an inner fragment for embedded inline parsing).
pub(crate) fn html(src: &str) -> Option<HtmlMatch> {
    let lead = src.len() - src.trim_start_matches(' ').len();
    let trimmed = &src[lead..];
    if let Some(after) = trimmed.strip_prefix("<!--") {
        let close = after.find("-->")?;
        let end = lead + 4 + close + 3;
        let line_end = src[end..].find('\n').map_or(src.len(), |i| end + i);
        if !src[end..line_end].trim().is_empty() {
            return None;
        }
        return Some(HtmlMatch {
            len: consume_blank_lines(src, line_end),
            tag: None,
            inner: None,
        });
    }

    let (tag, after_open) = block_open_tag(src)?;

    let close_pat = format!("</{tag}>");
    if let Some(p) = src[after_open..].to_ascii_lowercase().find(&close_pat) {
        let mut end = after_open + p + close_pat.len();
        end += src[end..].bytes().take_while(|&b| b == b' ').count();
        // Only a closed block when nothing else follows on the line;
        // otherwise fall through to the open case, as the original does.
        if end >= src.len() || src.as_bytes()[end] == b'\n' {
            return Some(HtmlMatch {
                len: consume_blank_lines(src, end),
                tag: None,
                inner: None,
            });
        }
    }

    // Unclosed opening tag: the block runs to the first blank line.
    let (inner_end, end) = match src[after_open..].find("\n\n").map(|i| after_open + i) {
        Some(i) => (i, consume_blank_lines(src, i + 1)),
        None => (src.trim_end().len(), src.len()),
    };
    Some(HtmlMatch {
        len: end,
        tag: Some(tag),
        inner: Some(src[after_open..inner_end].to_owned()),
    })
}

/// Whether the remaining input starts with a construct that interrupts a
/// paragraph.
fn interrupts_paragraph(rest: &str) -> bool {
    let line = rest.trim_start_matches(' ');
    line.starts_with("```")
        || line.starts_with("~~~")
        || HRULE.is_match(rest)
        || HEADING.is_match(rest)
        || LHEADING.is_match(rest)
        || line.starts_with('>')
        || LIST_BULLET.is_match(rest)
        || DEF_LINK.is_match(rest)
        || DEF_FOOTNOTE.is_match(rest)
        || block_open_tag(rest).is_some()
        || line.starts_with("<!--")
}

/// Match a paragraph: lines up to a blank line or an interrupting construct,
/// plus any trailing blank lines.
pub(crate) fn paragraph(src: &str) -> Option<usize> {
    let mut end = 0;
    for (s, e) in line_spans(src) {
        if s > 0 {
            let line = &src[s..e];
            if line.trim().is_empty() || interrupts_paragraph(&src[s..]) {
                break;
            }
        }
        end = e;
    }
    if end == 0 {
        return None;
    }
    Some(consume_blank_lines(src, end))
}

/// Catch-all: one line, terminator included so that adjacent text tokens
/// coalesce by plain concatenation.
pub(crate) fn text_line(src: &str) -> Option<usize> {
    if src.is_empty() || src.starts_with('\n') {
        return None;
    }
    Some(src.find('\n').map_or(src.len(), |i| i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fences_requires_closing() {
        assert!(fences("```rust\nfn main() {}\n```\n").is_some());
        assert!(fences("```rust\nfn main() {}\n").is_none());
    }

    #[test]
    fn test_fences_captures_lang_and_text() {
        let m = fences("```rust\nlet x = 1;\n```\n\nafter").unwrap();
        assert_eq!(m.lang.as_deref(), Some("rust"));
        assert_eq!(m.text, "let x = 1;\n");
        assert_eq!(m.len, "```rust\nlet x = 1;\n```\n\n".len());
    }

    #[test]
    fn test_fence_closing_must_be_at_least_as_long() {
        let m = fences("````\ncode with ``` inside\n````\n").unwrap();
        assert!(m.text.contains("```"));
    }

    #[test]
    fn test_list_extent_and_items() {
        let m = list("* one\n* two\n\nafter").unwrap();
        assert_eq!(&"* one\n* two\n\nafter"[..m.len], "* one\n* two\n\n");
        assert_eq!(m.items.len(), 2);
        assert!(!m.ordered);
        assert_eq!(m.items[0].raw, "* one\n");
        assert_eq!(m.items[0].body, "one\n");
    }

    #[test]
    fn test_ordered_list() {
        let m = list("1. first\n2. second\n").unwrap();
        assert!(m.ordered);
        assert_eq!(m.items.len(), 2);
    }

    #[test]
    fn test_nested_list_stays_in_parent_item() {
        let m = list("* top\n  * nested\n").unwrap();
        assert_eq!(m.items.len(), 1);
        assert_eq!(m.items[0].body, "top\n* nested\n");
    }

    #[test]
    fn test_loose_items() {
        let m = list("* one\n\n* two\n").unwrap();
        assert_eq!(m.items.len(), 2);
        assert!(!m.items[0].loose);
        assert!(m.items[1].loose);
    }

    #[test]
    fn test_paragraph_stops_at_blank_line() {
        let src = "line one\nline two\n\nnext";
        assert_eq!(paragraph(src), Some("line one\nline two\n\n".len()));
    }

    #[test]
    fn test_paragraph_interrupted_by_heading() {
        let src = "text\n# heading\n";
        assert_eq!(paragraph(src), Some("text\n".len()));
    }

    #[test]
    fn test_html_open_block() {
        let m = html("<div class=\"x\">content\nmore\n\nafter").unwrap();
        assert_eq!(m.tag.as_deref(), Some("div"));
        assert_eq!(m.inner.as_deref(), Some("content\nmore"));
    }

    #[test]
    fn test_html_closed_block() {
        let m = html("<div>content</div>\n\nafter").unwrap();
        assert!(m.tag.is_none());
        assert_eq!(m.len, "<div>content</div>\n\n".len());
    }

    #[test]
    fn test_dedent_footnote() {
        assert_eq!(dedent_footnote("one\n    two\n    three\n"), "one\ntwo\nthree\n");
    }

    #[test]
    fn test_split_cells() {
        assert_eq!(split_cells("| A | B |"), vec!["A", "B"]);
        assert_eq!(split_cells(" C | D "), vec!["C", "D"]);
    }
}
