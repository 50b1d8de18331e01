//! Table-of-contents recording and rendering.
//!
//! [`TocRecorder`] observes headings during a render without changing them;
//! [`render_toc`] turns the recorded sequence into a nested HTML list.
//! Entries at increasing depth open a nested list, entries returning to a
//! shallower depth close the corresponding number of lists, and entries
//! beyond the depth cap are dropped without disturbing the indices of the
//! entries that remain.

use retouch_engine::Rewriter;

/// One recorded heading.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TocEntry {
    /// Document-order index, assigned at record time. Indices of entries
    /// later dropped by the depth cap are not reused.
    pub index: usize,
    /// Heading text as it appeared in the source.
    pub text: String,
    /// Heading level (1-6).
    pub level: u8,
}

/// A [`Rewriter`] that records headings identity-style: every hook declines
/// to override, so the rendered document is untouched.
#[derive(Debug, Default)]
pub struct TocRecorder {
    entries: Vec<TocEntry>,
}

impl TocRecorder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Headings recorded so far, in document order.
    #[must_use]
    pub fn entries(&self) -> &[TocEntry] {
        &self.entries
    }

    /// Consume the recorder, returning its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<TocEntry> {
        self.entries
    }
}

impl Rewriter for TocRecorder {
    fn heading(&mut self, depth: u8, text: &str, _raw: &str) -> Option<String> {
        self.entries.push(TocEntry {
            index: self.entries.len(),
            text: text.to_owned(),
            level: depth,
        });
        None
    }
}

/// Render recorded headings as a nested `<ul>` list, keeping entries at or
/// above `max_level`.
#[must_use]
pub fn render_toc(entries: &[TocEntry], max_level: u8) -> String {
    let shown: Vec<&TocEntry> = entries.iter().filter(|e| e.level <= max_level).collect();
    let mut out = String::from("<ul id=\"table-of-content\">");
    // one stack slot per open list, root included
    let mut stack: Vec<u8> = Vec::new();
    for entry in &shown {
        match stack.last().copied() {
            None => stack.push(entry.level),
            Some(current) if entry.level > current => {
                // previous item stays open to host the nested list
                out.push_str("<ul>");
                stack.push(entry.level);
            }
            Some(current) if entry.level == current => out.push_str("</li>"),
            Some(_) => {
                out.push_str("</li>");
                loop {
                    let top = *stack.last().unwrap();
                    if top <= entry.level {
                        break;
                    }
                    if stack.len() >= 2 && stack[stack.len() - 2] >= entry.level {
                        stack.pop();
                        out.push_str("</ul></li>");
                    } else {
                        // no list at this depth to return to: continue as a
                        // sibling in the current one
                        *stack.last_mut().unwrap() = entry.level;
                        break;
                    }
                }
            }
        }
        out.push_str(&format!(
            "<li><a href=\"#toc-{}\">{}</a>",
            entry.index, entry.text
        ));
    }
    if !shown.is_empty() {
        out.push_str("</li>");
        for _ in 1..stack.len() {
            out.push_str("</ul></li>");
        }
    }
    out.push_str("</ul>");
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use retouch_engine::Transformer;

    use super::*;

    fn entry(index: usize, text: &str, level: u8) -> TocEntry {
        TocEntry {
            index,
            text: text.to_owned(),
            level,
        }
    }

    #[test]
    fn test_recorder_leaves_document_unchanged() {
        let src = "# One\n\nbody\n\n## Two\n\nmore\n";
        let mut transformer = Transformer::new(TocRecorder::new());
        let out = transformer.render(src).unwrap();
        assert_eq!(out, src);
        let entries = transformer.rewriter().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], entry(0, "One", 1));
        assert_eq!(entries[1], entry(1, "Two", 2));
    }

    #[test]
    fn test_flat_siblings() {
        let entries = vec![entry(0, "a", 1), entry(1, "b", 1), entry(2, "c", 1)];
        assert_eq!(
            render_toc(&entries, 3),
            "<ul id=\"table-of-content\">\
             <li><a href=\"#toc-0\">a</a></li>\
             <li><a href=\"#toc-1\">b</a></li>\
             <li><a href=\"#toc-2\">c</a></li></ul>"
        );
    }

    #[test]
    fn test_nested_levels() {
        let entries = vec![entry(0, "a", 1), entry(1, "b", 2), entry(2, "c", 1)];
        assert_eq!(
            render_toc(&entries, 3),
            "<ul id=\"table-of-content\">\
             <li><a href=\"#toc-0\">a</a>\
             <ul><li><a href=\"#toc-1\">b</a></li></ul></li>\
             <li><a href=\"#toc-2\">c</a></li></ul>"
        );
    }

    #[test]
    fn test_depth_scenario() {
        // levels 1,2,2,3,3,4,1,3,2 with a depth cap of 3: nests exactly
        // three deep, the level-4 entry is dropped, its index is not reused,
        // and same-level entries stay flat siblings
        let levels = [1u8, 2, 2, 3, 3, 4, 1, 3, 2];
        let entries: Vec<TocEntry> = levels
            .iter()
            .enumerate()
            .map(|(i, &l)| entry(i, &format!("h{i}"), l))
            .collect();
        let out = render_toc(&entries, 3);
        assert_eq!(
            out,
            "<ul id=\"table-of-content\">\
             <li><a href=\"#toc-0\">h0</a>\
             <ul><li><a href=\"#toc-1\">h1</a></li>\
             <li><a href=\"#toc-2\">h2</a>\
             <ul><li><a href=\"#toc-3\">h3</a></li>\
             <li><a href=\"#toc-4\">h4</a></li></ul></li></ul></li>\
             <li><a href=\"#toc-6\">h6</a>\
             <ul><li><a href=\"#toc-7\">h7</a></li>\
             <li><a href=\"#toc-8\">h8</a></li></ul></li></ul>"
        );
        assert!(!out.contains("toc-5"));
    }

    #[test]
    fn test_empty_entries() {
        assert_eq!(render_toc(&[], 3), "<ul id=\"table-of-content\"></ul>");
    }

    #[test]
    fn test_all_entries_dropped() {
        let entries = vec![entry(0, "deep", 5)];
        assert_eq!(render_toc(&entries, 3), "<ul id=\"table-of-content\"></ul>");
    }
}
