//! CJK/Latin spacing post-processor.
//!
//! Inserts a neutral marker at every boundary between a CJK-range character
//! and a non-CJK, non-newline character (in either direction), so a
//! stylesheet can control the gap instead of a hardcoded space. Horizontal
//! whitespace sitting on such a boundary is replaced by the marker; a
//! boundary against a newline is never marked. Pure text to text, no
//! tokenizing.

/// Whether `c` falls in one of the CJK ranges the boundary test uses.
#[must_use]
pub fn is_cjk(c: char) -> bool {
    matches!(c,
        '\u{2e80}'..='\u{2eff}'
        | '\u{2f00}'..='\u{2fdf}'
        | '\u{3040}'..='\u{309f}'
        | '\u{30a0}'..='\u{30ff}'
        | '\u{3100}'..='\u{312f}'
        | '\u{3200}'..='\u{32ff}'
        | '\u{3400}'..='\u{4dbf}'
        | '\u{4e00}'..='\u{9fff}'
        | '\u{f900}'..='\u{faff}')
}

fn is_boundary(prev: char, next: char) -> bool {
    prev != '\n' && next != '\n' && (is_cjk(prev) != is_cjk(next))
}

/// Insert `marker` at every CJK/non-CJK boundary in `text`.
#[must_use]
pub fn insert_markers(text: &str, marker: &str) -> String {
    let mut out = String::with_capacity(text.len() + marker.len() * 8);
    let mut chars = text.chars().peekable();
    let mut prev: Option<char> = None;
    while let Some(c) = chars.next() {
        if c == ' ' || c == '\t' {
            // buffer the whitespace run and decide at its far edge
            let mut run = String::new();
            run.push(c);
            while let Some(&n) = chars.peek() {
                if n == ' ' || n == '\t' {
                    run.push(n);
                    chars.next();
                } else {
                    break;
                }
            }
            let next = chars.peek().copied();
            match (prev, next) {
                (Some(p), Some(n)) if is_boundary(p, n) => out.push_str(marker),
                _ => out.push_str(&run),
            }
            // the run separates its neighbors, so no zero-width boundary
            // fires on the following character
            prev = None;
            continue;
        }
        if let Some(p) = prev
            && is_boundary(p, c)
        {
            out.push_str(marker);
        }
        out.push(c);
        prev = Some(c);
    }
    out
}

/// The original marker: an empty classed span for stylesheets to widen.
pub const PANGU_SPAN: &str = "<span class=\"pangu\"></span>";

/// Insert the classed-span marker at every CJK/non-CJK boundary.
#[must_use]
pub fn pangu(text: &str) -> String {
    insert_markers(text, PANGU_SPAN)
}
