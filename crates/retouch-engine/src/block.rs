//! Block-level lexer.
//!
//! Consumes raw text left to right, trying the active rule table against the
//! current prefix; the first rule that matches consumes its prefix and emits
//! tokens. Container rules emit a start marker carrying the container's full
//! source text, recursively lexed children, then the matching end marker.
//!
//! As a side effect, link reference definitions and footnote definition keys
//! accumulate on the lexer; they must be handed to the inline lexer before
//! any inline fragment is resolved, since definitions are visible to every
//! fragment regardless of where it sits in the document.

use std::collections::{HashMap, HashSet};

use crate::error::Error;
use crate::rules::{
    BLOCK_RULES, BlockRule, FOOTNOTE_BLOCK_RULES, LIST_BLOCK_RULES, block,
};
use crate::token::Token;

/// A link reference definition gathered during block lexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkDef {
    pub href: String,
    pub title: Option<String>,
}

/// Normalize a reference key: lowercased, whitespace collapsed.
pub(crate) fn keyify(key: &str) -> String {
    key.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Block lexer. One instance per document; gathers definitions as it goes.
#[derive(Debug, Default)]
pub struct BlockLexer {
    links: HashMap<String, LinkDef>,
    footnotes: HashSet<String>,
}

impl BlockLexer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Link reference definitions gathered so far.
    #[must_use]
    pub fn link_defs(&self) -> &HashMap<String, LinkDef> {
        &self.links
    }

    /// Footnote definition keys gathered so far.
    #[must_use]
    pub fn footnote_defs(&self) -> &HashSet<String> {
        &self.footnotes
    }

    /// Tokenize `text` with the given rule table.
    ///
    /// The input is consumed exactly as given (no tab expansion, newline
    /// normalization, or trailing-newline stripping), so concatenating the
    /// top-level tokens' raw text reproduces it byte for byte.
    pub fn lex(&mut self, text: &str, rules: &[BlockRule]) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        self.lex_into(text, rules, &mut tokens)?;
        Ok(tokens)
    }

    fn lex_into(
        &mut self,
        text: &str,
        rules: &[BlockRule],
        out: &mut Vec<Token>,
    ) -> Result<(), Error> {
        let mut rest = text;
        while !rest.is_empty() {
            let consumed = self.step(rest, rules, out)?;
            debug_assert!(consumed > 0, "lexer must make progress");
            rest = &rest[consumed..];
        }
        Ok(())
    }

    fn step(
        &mut self,
        src: &str,
        rules: &[BlockRule],
        out: &mut Vec<Token>,
    ) -> Result<usize, Error> {
        for rule in rules {
            if let Some(consumed) = self.try_rule(*rule, src, rules, out)? {
                return Ok(consumed);
            }
        }
        Err(Error::no_rule(src))
    }

    #[allow(clippy::too_many_lines)]
    fn try_rule(
        &mut self,
        rule: BlockRule,
        src: &str,
        rules: &[BlockRule],
        out: &mut Vec<Token>,
    ) -> Result<Option<usize>, Error> {
        match rule {
            BlockRule::Newline => Ok(block::NEWLINE.find(src).map(|m| {
                out.push(Token::Newline {
                    raw: m.as_str().to_owned(),
                });
                m.end()
            })),
            BlockRule::Hrule => Ok(block::HRULE.find(src).map(|m| {
                out.push(Token::Hrule {
                    raw: m.as_str().to_owned(),
                });
                m.end()
            })),
            BlockRule::Code => Ok(block::CODE_INDENT.find(src).map(|m| {
                let raw = m.as_str();
                out.push(Token::CodeBlock {
                    raw: raw.to_owned(),
                    lang: None,
                    text: block::outdent_code(raw),
                });
                m.end()
            })),
            BlockRule::Fences => Ok(block::fences(src).map(|m| {
                out.push(Token::CodeBlock {
                    raw: src[..m.len].to_owned(),
                    lang: m.lang,
                    text: m.text,
                });
                m.len
            })),
            BlockRule::Heading => Ok(block::HEADING.captures(src).map(|c| {
                let m = c.get(0).map_or(0, |m| m.end());
                out.push(Token::Heading {
                    raw: src[..m].to_owned(),
                    depth: u8::try_from(c[1].len()).unwrap_or(6),
                    text: c[2].to_owned(),
                });
                m
            })),
            BlockRule::LHeading => Ok(block::LHEADING.captures(src).map(|c| {
                let m = c.get(0).map_or(0, |m| m.end());
                out.push(Token::Heading {
                    raw: src[..m].to_owned(),
                    depth: if c[2].starts_with('=') { 1 } else { 2 },
                    text: c[1].to_owned(),
                });
                m
            })),
            BlockRule::Quote => {
                let Some(m) = block::QUOTE.find(src) else {
                    return Ok(None);
                };
                let raw = m.as_str();
                let inner = block::strip_quote_markers(raw);
                out.push(Token::QuoteStart {
                    raw: raw.to_owned(),
                });
                self.lex_into(&inner, quote_rules(rules), out)?;
                out.push(Token::QuoteEnd);
                Ok(Some(m.end()))
            }
            BlockRule::List => {
                let Some(m) = block::list(src) else {
                    return Ok(None);
                };
                out.push(Token::ListStart {
                    raw: src[..m.len].to_owned(),
                    ordered: m.ordered,
                });
                for item in m.items {
                    out.push(Token::ItemStart {
                        raw: item.raw,
                        loose: item.loose,
                    });
                    self.lex_into(&item.body, LIST_BLOCK_RULES, out)?;
                    out.push(Token::ItemEnd);
                }
                out.push(Token::ListEnd);
                Ok(Some(m.len))
            }
            BlockRule::Html => Ok(block::html(src).map(|m| {
                out.push(Token::Html {
                    raw: src[..m.len].to_owned(),
                    tag: m.tag,
                    inner: m.inner,
                });
                m.len
            })),
            BlockRule::DefLink => Ok(block::DEF_LINK.captures(src).map(|c| {
                let m = c.get(0).map_or(0, |m| m.end());
                self.links.insert(
                    keyify(&c[1]),
                    LinkDef {
                        href: c[2].to_owned(),
                        title: c.get(3).map(|t| t.as_str().to_owned()),
                    },
                );
                out.push(Token::LinkDef {
                    raw: src[..m].to_owned(),
                });
                m
            })),
            BlockRule::DefFootnote => {
                let Some(c) = block::DEF_FOOTNOTE.captures(src) else {
                    return Ok(None);
                };
                let m = c.get(0).map_or(0, |m| m.end());
                let key = keyify(&c[1]);
                let body = block::dedent_footnote(&c[2]);
                self.footnotes.insert(key.clone());
                out.push(Token::FootnoteStart {
                    raw: src[..m].to_owned(),
                    key,
                });
                self.lex_into(&body, FOOTNOTE_BLOCK_RULES, out)?;
                out.push(Token::FootnoteEnd);
                Ok(Some(m))
            }
            BlockRule::Table => Ok(block::TABLE.captures(src).map(|c| {
                let m = c.get(0).map_or(0, |m| m.end());
                let header = block::split_cells(&c[1]);
                let cells = c[3]
                    .lines()
                    .filter(|l| !l.trim().is_empty())
                    .map(block::split_cells)
                    .collect();
                out.push(Token::Table {
                    raw: src[..m].to_owned(),
                    header,
                    cells,
                });
                m
            })),
            BlockRule::Paragraph => Ok(block::paragraph(src).map(|len| {
                out.push(Token::Paragraph {
                    raw: src[..len].to_owned(),
                });
                len
            })),
            BlockRule::Text => Ok(block::text_line(src).map(|len| {
                out.push(Token::Text {
                    raw: src[..len].to_owned(),
                });
                len
            })),
        }
    }
}

/// Rule table for a block quote's interior: the full table, except that the
/// footnote definition rule stays excluded when the surrounding table
/// excludes it.
fn quote_rules(rules: &[BlockRule]) -> &'static [BlockRule] {
    if rules.contains(&BlockRule::DefFootnote) {
        BLOCK_RULES
    } else {
        FOOTNOTE_BLOCK_RULES
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn lex(text: &str) -> Vec<Token> {
        BlockLexer::new().lex(text, BLOCK_RULES).unwrap()
    }

    fn top_level_raw(tokens: &[Token]) -> String {
        // children between a start marker and its end marker are not
        // top-level; skip them when reassembling
        let mut out = String::new();
        let mut depth = 0usize;
        for t in tokens {
            let opens = matches!(
                t,
                Token::QuoteStart { .. }
                    | Token::ListStart { .. }
                    | Token::ItemStart { .. }
                    | Token::FootnoteStart { .. }
            );
            if t.is_end_marker() {
                depth -= 1;
                continue;
            }
            if depth == 0 {
                out.push_str(t.raw());
            }
            if opens {
                depth += 1;
            }
        }
        out
    }

    #[test]
    fn test_raw_reassembly_simple() {
        let src = "# Title\n\nA paragraph with *emphasis*.\n\n* one\n* two\n";
        assert_eq!(top_level_raw(&lex(src)), src);
    }

    #[test]
    fn test_raw_reassembly_kitchen_sink() {
        let src = "Intro line.\n\n> quoted text\n> second line\n\n```rust\nlet x = 1;\n```\n\n| A | B |\n|---|---|\n| C | D |\n\n[ref]: http://example.com\n\nthe end\n";
        assert_eq!(top_level_raw(&lex(src)), src);
    }

    #[test]
    fn test_heading_token() {
        let tokens = lex("## Two\n");
        assert_eq!(
            tokens,
            vec![Token::Heading {
                raw: "## Two\n".to_owned(),
                depth: 2,
                text: "Two".to_owned(),
            }]
        );
    }

    #[test]
    fn test_setext_heading() {
        let tokens = lex("Title\n=====\n");
        assert!(matches!(&tokens[0], Token::Heading { depth: 1, text, .. } if text == "Title"));
    }

    #[test]
    fn test_quote_children_are_stripped() {
        let tokens = lex("> hello\n");
        assert_eq!(tokens[0], Token::QuoteStart { raw: "> hello\n".to_owned() });
        assert!(matches!(&tokens[1], Token::Paragraph { raw } if raw == "hello\n"));
        assert_eq!(*tokens.last().unwrap(), Token::QuoteEnd);
    }

    #[test]
    fn test_list_structure() {
        let tokens = lex("* one\n* two\n");
        assert_eq!(tokens.len(), 8);
        assert_eq!(tokens[0], Token::ListStart { raw: "* one\n* two\n".to_owned(), ordered: false });
        assert!(matches!(&tokens[1], Token::ItemStart { loose: false, .. }));
        assert!(matches!(&tokens[2], Token::Text { raw } if raw == "one\n"));
    }

    #[test]
    fn test_container_markers_balance() {
        let src = "> quote\n\n* a\n  * b\n* c\n\n[^x]: note body\n";
        let tokens = lex(src);
        let mut depth = 0i32;
        for t in &tokens {
            if matches!(
                t,
                Token::QuoteStart { .. }
                    | Token::ListStart { .. }
                    | Token::ItemStart { .. }
                    | Token::FootnoteStart { .. }
            ) {
                depth += 1;
            } else if t.is_end_marker() {
                depth -= 1;
                assert!(depth >= 0);
            }
        }
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_def_link_recorded() {
        let mut lexer = BlockLexer::new();
        lexer
            .lex("[Key Name]: http://example.com \"Title\"\n", BLOCK_RULES)
            .unwrap();
        let def = lexer.link_defs().get("key name").unwrap();
        assert_eq!(def.href, "http://example.com");
        assert_eq!(def.title.as_deref(), Some("Title"));
    }

    #[test]
    fn test_footnote_definition() {
        let mut lexer = BlockLexer::new();
        let tokens = lexer.lex("[^note]: the body\n", BLOCK_RULES).unwrap();
        assert!(lexer.footnote_defs().contains("note"));
        assert!(
            matches!(&tokens[0], Token::FootnoteStart { key, .. } if key == "note")
        );
        assert_eq!(*tokens.last().unwrap(), Token::FootnoteEnd);
    }

    #[test]
    fn test_table_cells() {
        let tokens = lex("| A | B |\n|---|---|\n| C | D |\n");
        let Token::Table { header, cells, .. } = &tokens[0] else {
            panic!("expected table, got {tokens:?}");
        };
        assert_eq!(header, &["A", "B"]);
        assert_eq!(cells, &[vec!["C".to_owned(), "D".to_owned()]]);
    }

    #[test]
    fn test_indented_code() {
        let tokens = lex("    let x = 1;\n");
        assert!(
            matches!(&tokens[0], Token::CodeBlock { lang: None, text, .. } if text == "let x = 1;\n")
        );
    }

    #[test]
    fn test_no_preprocessing_of_crlf() {
        // carriage returns pass through untouched
        let src = "line one\r\nline two\r\n";
        assert_eq!(top_level_raw(&lex(src)), src);
    }
}
