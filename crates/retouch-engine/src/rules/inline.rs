//! Inline-level patterns and scanners.

use std::sync::LazyLock;

use regex::Regex;

pub(crate) static ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\\([\\`*{}\[\]()#+\-.!_>~|])").unwrap());

pub(crate) static INLINE_HTML: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:<!--[\s\S]*?-->|</[A-Za-z][A-Za-z0-9-]* *>|<[A-Za-z][A-Za-z0-9-]*(?:"[^"]*"|'[^']*'|[^'">])*/?>)"#,
    )
    .unwrap()
});

pub(crate) static AUTOLINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<([^ <>]+[@:][^ <>]+)>").unwrap());

pub(crate) static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^(https?://[^\s<]+[^<.,:;"')\]\s])"#).unwrap());

pub(crate) static FOOTNOTE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[\^([^\n\]]+)\]").unwrap());

pub(crate) static LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(!?)\[((?:\[[^\]]*\]|[^\[\]])*)\]\(\s*<?([^\s)>]*)>?(?: +["']([^\n]*?)["'])? *\)"#)
        .unwrap()
});

pub(crate) static REFLINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(!?)\[((?:\[[^\]]*\]|[^\[\]])*)\] *\[([^\]]*)\]").unwrap());

pub(crate) static NOLINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(!?)\[((?:\[[^\]]*\]|[^\[\]])*)\]").unwrap());

pub(crate) static STRONG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^__([\s\S]+?)__|^\*\*([\s\S]+?)\*\*").unwrap());

pub(crate) static EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\b_((?:__|[^_])+?)_\b|^\*((?:\*\*|[^*])+?)\*").unwrap());

pub(crate) static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {2,}\n").unwrap());

pub(crate) static STRIKETHROUGH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^~~(\S[\s\S]*?\S|\S)~~").unwrap());

/// Match a code span: a backtick run closed by a run of exactly the same
/// length. Returns the consumed length and the trimmed span text.
pub(crate) fn code_span(src: &str) -> Option<(usize, String)> {
    let bytes = src.as_bytes();
    let ticks = bytes.iter().take_while(|&&b| b == b'`').count();
    if ticks == 0 {
        return None;
    }
    let mut i = ticks;
    while i < bytes.len() {
        if bytes[i] == b'`' {
            let start = i;
            while i < bytes.len() && bytes[i] == b'`' {
                i += 1;
            }
            if i - start == ticks {
                let inner = &src[ticks..start];
                if inner.is_empty() {
                    return None;
                }
                return Some((i, inner.trim().to_owned()));
            }
        } else {
            i += 1;
        }
    }
    None
}

/// Length of the plain-text run at the start of `src`: everything up to the
/// next character that could begin another inline construct. Always consumes
/// at least one character of non-empty input.
pub(crate) fn text_end(src: &str) -> usize {
    for (i, b) in src.bytes().enumerate() {
        if i == 0 {
            continue;
        }
        match b {
            b'\\' | b'<' | b'!' | b'[' | b'_' | b'*' | b'`' | b'~' => return i,
            b'h' if src[i..].starts_with("http://") || src[i..].starts_with("https://") => {
                return i;
            }
            b' ' if hard_break_ahead(&src[i..]) => return i,
            _ => {}
        }
    }
    src.len()
}

/// Whether `s` begins with a hard line break: two or more spaces then a
/// newline.
fn hard_break_ahead(s: &str) -> bool {
    let spaces = s.bytes().take_while(|&b| b == b' ').count();
    spaces >= 2 && s.as_bytes().get(spaces) == Some(&b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_span_exact_run() {
        let (len, text) = code_span("`code` rest").unwrap();
        assert_eq!(len, "`code`".len());
        assert_eq!(text, "code");
    }

    #[test]
    fn test_code_span_double_ticks_contain_single() {
        let (len, text) = code_span("``a ` b`` rest").unwrap();
        assert_eq!(len, "``a ` b``".len());
        assert_eq!(text, "a ` b");
    }

    #[test]
    fn test_code_span_unclosed() {
        assert!(code_span("`never closed").is_none());
    }

    #[test]
    fn test_text_end_stops_before_specials() {
        assert_eq!(text_end("plain [link]"), "plain ".len());
        assert_eq!(text_end("*starts special"), 1);
        assert_eq!(text_end("no specials at all"), "no specials at all".len());
    }

    #[test]
    fn test_text_end_stops_before_url() {
        assert_eq!(text_end("see https://example.com"), "see ".len());
    }

    #[test]
    fn test_text_end_stops_before_hard_break() {
        assert_eq!(text_end("line  \nnext"), "line".len());
    }

    #[test]
    fn test_link_pattern() {
        let c = LINK.captures("[text](http://x.test) tail").unwrap();
        assert_eq!(&c[2], "text");
        assert_eq!(&c[3], "http://x.test");
    }

    #[test]
    fn test_link_with_title() {
        let c = LINK.captures(r#"[t](http://x.test "title")"#).unwrap();
        assert_eq!(&c[4], "title");
    }

    #[test]
    fn test_emphasis_and_strong() {
        assert_eq!(&STRONG.captures("**bold** x").unwrap()[2], "bold");
        assert_eq!(&EMPHASIS.captures("*em* x").unwrap()[2], "em");
        assert_eq!(&EMPHASIS.captures("_em_ x").unwrap()[1], "em");
    }
}
