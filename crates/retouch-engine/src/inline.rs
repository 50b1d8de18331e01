//! Inline-level lexer.
//!
//! Consumes a text fragment left to right, trying the active rule table
//! against the current prefix. Reference-style constructs resolve against the
//! definitions supplied via [`InlineLexer::configure`]; a rule whose key is
//! undefined declines so the source falls through to the text catch-all.

use std::collections::{HashMap, HashSet};

use crate::block::{LinkDef, keyify};
use crate::error::Error;
use crate::rules::{InlineRule, inline};
use crate::token::InlineToken;

/// Context threaded through inline lexing.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineContext {
    /// Set while lexing a footnote body; suppresses the footnote-reference
    /// rule so footnotes cannot recurse into themselves.
    pub in_footnote: bool,
}

/// Inline lexer. Configure once per render, then lex any number of fragments.
#[derive(Debug, Default)]
pub struct InlineLexer {
    links: HashMap<String, LinkDef>,
    footnotes: HashSet<String>,
}

impl InlineLexer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply the definitions gathered during block lexing. Must be called
    /// before lexing any fragment that can contain references.
    pub fn configure(&mut self, links: HashMap<String, LinkDef>, footnotes: HashSet<String>) {
        self.links = links;
        self.footnotes = footnotes;
    }

    /// Tokenize a text fragment with the given rule table.
    pub fn lex(
        &self,
        fragment: &str,
        rules: &[InlineRule],
        ctx: InlineContext,
    ) -> Result<Vec<InlineToken>, Error> {
        let mut tokens = Vec::new();
        let mut rest = fragment;
        while !rest.is_empty() {
            let consumed = self.step(rest, rules, ctx, &mut tokens)?;
            debug_assert!(consumed > 0, "lexer must make progress");
            rest = &rest[consumed..];
        }
        Ok(tokens)
    }

    fn step(
        &self,
        src: &str,
        rules: &[InlineRule],
        ctx: InlineContext,
        out: &mut Vec<InlineToken>,
    ) -> Result<usize, Error> {
        for rule in rules {
            if let Some(consumed) = self.try_rule(*rule, src, ctx, out) {
                return Ok(consumed);
            }
        }
        Err(Error::no_rule(src))
    }

    #[allow(clippy::too_many_lines)]
    fn try_rule(
        &self,
        rule: InlineRule,
        src: &str,
        ctx: InlineContext,
        out: &mut Vec<InlineToken>,
    ) -> Option<usize> {
        match rule {
            InlineRule::Escape => inline::ESCAPE.find(src).map(|m| {
                out.push(InlineToken::Escape {
                    raw: m.as_str().to_owned(),
                });
                m.end()
            }),
            InlineRule::Html => {
                // autolinks (`<http://…>`, `<user@host>`) win over tags
                if inline::AUTOLINK.is_match(src) {
                    return None;
                }
                inline::INLINE_HTML.find(src).map(|m| {
                    out.push(InlineToken::Html {
                        raw: m.as_str().to_owned(),
                    });
                    m.end()
                })
            }
            InlineRule::Autolink => inline::AUTOLINK.captures(src).map(|c| {
                let m = c.get(0).map_or(0, |m| m.end());
                out.push(InlineToken::Autolink {
                    raw: src[..m].to_owned(),
                    href: c[1].to_owned(),
                });
                m
            }),
            InlineRule::Url => inline::URL.find(src).map(|m| {
                out.push(InlineToken::Url {
                    raw: m.as_str().to_owned(),
                });
                m.end()
            }),
            InlineRule::FootnoteRef => {
                if ctx.in_footnote {
                    return None;
                }
                let c = inline::FOOTNOTE_REF.captures(src)?;
                let key = keyify(&c[1]);
                if !self.footnotes.contains(&key) {
                    return None;
                }
                let m = c.get(0).map_or(0, |m| m.end());
                out.push(InlineToken::FootnoteRef {
                    raw: src[..m].to_owned(),
                    key,
                });
                Some(m)
            }
            InlineRule::Link => inline::LINK.captures(src).map(|c| {
                let m = c.get(0).map_or(0, |m| m.end());
                let raw = src[..m].to_owned();
                let title = c.get(4).map(|t| t.as_str().to_owned());
                if c[1].is_empty() {
                    out.push(InlineToken::Link {
                        raw,
                        text: c[2].to_owned(),
                        href: c[3].to_owned(),
                        title,
                    });
                } else {
                    out.push(InlineToken::Image {
                        raw,
                        alt: c[2].to_owned(),
                        src: c[3].to_owned(),
                        title,
                    });
                }
                m
            }),
            InlineRule::RefLink => {
                let c = inline::REFLINK.captures(src)?;
                let key_src = if c[3].is_empty() { &c[2] } else { &c[3] };
                let def = self.links.get(&keyify(key_src))?;
                let m = c.get(0).map_or(0, |m| m.end());
                out.push(self.reference_token(&c[1], &c[2], def, &src[..m]));
                Some(m)
            }
            InlineRule::NoLink => {
                let c = inline::NOLINK.captures(src)?;
                let def = self.links.get(&keyify(&c[2]))?;
                let m = c.get(0).map_or(0, |m| m.end());
                out.push(self.reference_token(&c[1], &c[2], def, &src[..m]));
                Some(m)
            }
            InlineRule::Strong => inline::STRONG.captures(src).map(|c| {
                let m = c.get(0).map_or(0, |m| m.end());
                let text = c.get(1).or_else(|| c.get(2)).map_or("", |t| t.as_str());
                out.push(InlineToken::Strong {
                    raw: src[..m].to_owned(),
                    text: text.to_owned(),
                });
                m
            }),
            InlineRule::Emphasis => inline::EMPHASIS.captures(src).map(|c| {
                let m = c.get(0).map_or(0, |m| m.end());
                let text = c.get(1).or_else(|| c.get(2)).map_or("", |t| t.as_str());
                out.push(InlineToken::Emphasis {
                    raw: src[..m].to_owned(),
                    text: text.to_owned(),
                });
                m
            }),
            InlineRule::CodeSpan => inline::code_span(src).map(|(len, text)| {
                out.push(InlineToken::CodeSpan {
                    raw: src[..len].to_owned(),
                    text,
                });
                len
            }),
            InlineRule::LineBreak => inline::LINE_BREAK.find(src).map(|m| {
                out.push(InlineToken::LineBreak {
                    raw: m.as_str().to_owned(),
                });
                m.end()
            }),
            InlineRule::Strikethrough => inline::STRIKETHROUGH.captures(src).map(|c| {
                let m = c.get(0).map_or(0, |m| m.end());
                out.push(InlineToken::Strikethrough {
                    raw: src[..m].to_owned(),
                    text: c[1].to_owned(),
                });
                m
            }),
            InlineRule::Text => {
                if src.is_empty() {
                    return None;
                }
                let end = inline::text_end(src);
                out.push(InlineToken::Text {
                    raw: src[..end].to_owned(),
                });
                Some(end)
            }
        }
    }

    fn reference_token(&self, bang: &str, text: &str, def: &LinkDef, raw: &str) -> InlineToken {
        if bang.is_empty() {
            InlineToken::Link {
                raw: raw.to_owned(),
                text: text.to_owned(),
                href: def.href.clone(),
                title: def.title.clone(),
            }
        } else {
            InlineToken::Image {
                raw: raw.to_owned(),
                alt: text.to_owned(),
                src: def.href.clone(),
                title: def.title.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::rules::{HTML_INLINE_RULES, INLINE_RULES};

    use super::*;

    fn lex(fragment: &str) -> Vec<InlineToken> {
        InlineLexer::new()
            .lex(fragment, INLINE_RULES, InlineContext::default())
            .unwrap()
    }

    fn reassemble(tokens: &[InlineToken]) -> String {
        tokens.iter().map(InlineToken::raw).collect()
    }

    #[test]
    fn test_raw_reassembly() {
        let src = "Some text, with a [link](http://example.com) and *emphasis*.";
        assert_eq!(reassemble(&lex(src)), src);
    }

    #[test]
    fn test_link_token() {
        let tokens = lex("[link](http://example.com)");
        assert_eq!(
            tokens,
            vec![InlineToken::Link {
                raw: "[link](http://example.com)".to_owned(),
                text: "link".to_owned(),
                href: "http://example.com".to_owned(),
                title: None,
            }]
        );
    }

    #[test]
    fn test_image_token() {
        let tokens = lex("![alt](img.png)");
        assert!(matches!(
            &tokens[0],
            InlineToken::Image { alt, src, .. } if alt == "alt" && src == "img.png"
        ));
    }

    #[test]
    fn test_reflink_resolves_against_defs() {
        let mut lexer = InlineLexer::new();
        lexer.configure(
            [(
                "ref".to_owned(),
                LinkDef {
                    href: "http://x.test".to_owned(),
                    title: None,
                },
            )]
            .into(),
            HashSet::new(),
        );
        let tokens = lexer
            .lex("[text][ref]", INLINE_RULES, InlineContext::default())
            .unwrap();
        assert!(matches!(
            &tokens[0],
            InlineToken::Link { href, raw, .. } if href == "http://x.test" && raw == "[text][ref]"
        ));
    }

    #[test]
    fn test_unknown_reflink_falls_through_to_text() {
        let tokens = lex("[text][missing]");
        assert!(tokens.iter().all(|t| matches!(t, InlineToken::Text { .. })));
    }

    #[test]
    fn test_footnote_ref_requires_definition() {
        let mut lexer = InlineLexer::new();
        lexer.configure(HashMap::new(), ["n".to_owned()].into());
        let tokens = lexer
            .lex("see [^n]", INLINE_RULES, InlineContext::default())
            .unwrap();
        assert!(matches!(
            &tokens[1],
            InlineToken::FootnoteRef { key, .. } if key == "n"
        ));
    }

    #[test]
    fn test_footnote_ref_suppressed_in_footnote_context() {
        let mut lexer = InlineLexer::new();
        lexer.configure(HashMap::new(), ["n".to_owned()].into());
        let ctx = InlineContext { in_footnote: true };
        let tokens = lexer.lex("see [^n]", INLINE_RULES, ctx).unwrap();
        assert!(
            tokens
                .iter()
                .all(|t| !matches!(t, InlineToken::FootnoteRef { .. }))
        );
        assert_eq!(reassemble(&tokens), "see [^n]");
    }

    #[test]
    fn test_escape() {
        let tokens = lex(r"\*not emphasis\*");
        assert_eq!(
            tokens[0],
            InlineToken::Escape {
                raw: r"\*".to_owned()
            }
        );
    }

    #[test]
    fn test_autolink() {
        let tokens = lex("<http://example.com>");
        assert!(matches!(
            &tokens[0],
            InlineToken::Autolink { href, .. } if href == "http://example.com"
        ));
    }

    #[test]
    fn test_hard_break() {
        let tokens = lex("line  \nnext");
        assert!(
            tokens
                .iter()
                .any(|t| matches!(t, InlineToken::LineBreak { .. }))
        );
    }

    #[test]
    fn test_strikethrough() {
        let tokens = lex("~~gone~~");
        assert!(matches!(
            &tokens[0],
            InlineToken::Strikethrough { text, .. } if text == "gone"
        ));
    }

    #[test]
    fn test_html_rule_set_skips_emphasis() {
        let lexer = InlineLexer::new();
        let tokens = lexer
            .lex("*text*", HTML_INLINE_RULES, InlineContext::default())
            .unwrap();
        assert!(
            tokens
                .iter()
                .all(|t| matches!(t, InlineToken::Text { .. }))
        );
        assert_eq!(reassemble(&tokens), "*text*");
    }

    #[test]
    fn test_lone_special_characters_stay_literal() {
        let src = "odd * and [ and ` endings";
        assert_eq!(reassemble(&lex(src)), src);
    }
}
