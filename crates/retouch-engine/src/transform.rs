//! The transformer: drives the token stream through the override surface and
//! reconstructs output text.
//!
//! The central contract is identity preservation: any token whose kind the
//! embedder does not override renders back to its exact source substring.
//! Overridden constructs are stitched into the surrounding verbatim text by
//! literal fragment substitution, so everything untouched stays untouched.

use crate::block::BlockLexer;
use crate::error::Error;
use crate::inline::{InlineContext, InlineLexer};
use crate::rules::{BLOCK_RULES, HTML_INLINE_RULES, INLINE_RULES, InlineRule};
use crate::token::{InlineToken, Token};

/// Tags whose content is preformatted; embedded inline parsing never recurses
/// into them.
const PRE_TAGS: &[&str] = &["pre", "script", "style"];

/// Options for a [`Transformer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions {
    /// Run the inline pipeline over the content of open HTML blocks.
    pub parse_block_html: bool,
}

/// A footnote collected during a render: its key and rendered body. Whether
/// and where collected footnotes are re-surfaced (a trailing reference
/// section, say) is the embedder's call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footnote {
    pub key: String,
    pub body: String,
}

/// The override-dispatch surface: one hook per token kind.
///
/// Every hook returns `Option<String>`; `None` means no override, and the
/// engine's default applies: for most kinds, the token's source text
/// unchanged. Implementations override only the hooks they care about.
///
/// Container hooks (`block_quote`, `list`, `list_item`, `footnote`) receive
/// the default rendering of their already-consumed children alongside the
/// container's raw source.
#[allow(unused_variables)]
pub trait Rewriter {
    fn heading(&mut self, depth: u8, text: &str, raw: &str) -> Option<String> {
        None
    }
    fn paragraph(&mut self, raw: &str) -> Option<String> {
        None
    }
    fn code_block(&mut self, lang: Option<&str>, code: &str, raw: &str) -> Option<String> {
        None
    }
    fn table(&mut self, raw: &str) -> Option<String> {
        None
    }
    fn html_block(&mut self, raw: &str) -> Option<String> {
        None
    }
    fn block_quote(&mut self, raw: &str, rendered: &str) -> Option<String> {
        None
    }
    fn list(&mut self, ordered: bool, raw: &str, rendered: &str) -> Option<String> {
        None
    }
    fn list_item(&mut self, loose: bool, raw: &str, rendered: &str) -> Option<String> {
        None
    }
    fn footnote(&mut self, key: &str, raw: &str, rendered: &str) -> Option<String> {
        None
    }

    fn escape(&mut self, raw: &str) -> Option<String> {
        None
    }
    fn inline_html(&mut self, raw: &str) -> Option<String> {
        None
    }
    fn autolink(&mut self, href: &str, raw: &str) -> Option<String> {
        None
    }
    fn url(&mut self, raw: &str) -> Option<String> {
        None
    }
    fn footnote_ref(&mut self, key: &str, raw: &str) -> Option<String> {
        None
    }
    fn link(&mut self, text: &str, href: &str, title: Option<&str>, raw: &str) -> Option<String> {
        None
    }
    fn image(&mut self, alt: &str, src: &str, title: Option<&str>, raw: &str) -> Option<String> {
        None
    }
    fn strong(&mut self, text: &str, raw: &str) -> Option<String> {
        None
    }
    fn emphasis(&mut self, text: &str, raw: &str) -> Option<String> {
        None
    }
    fn code_span(&mut self, code: &str, raw: &str) -> Option<String> {
        None
    }
    fn line_break(&mut self, raw: &str) -> Option<String> {
        None
    }
    fn strikethrough(&mut self, text: &str, raw: &str) -> Option<String> {
        None
    }
    fn text(&mut self, raw: &str) -> Option<String> {
        None
    }
}

/// The no-override rewriter: renders every document back unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Rewriter for Identity {}

/// Forward cursor over the token stream.
struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }
}

/// Which end marker terminates the container being consumed.
#[derive(Clone, Copy)]
enum End {
    Quote,
    List,
    Item,
    Footnote,
}

impl End {
    fn matches(self, token: &Token) -> bool {
        matches!(
            (self, token),
            (End::Quote, Token::QuoteEnd)
                | (End::List, Token::ListEnd)
                | (End::Item, Token::ItemEnd)
                | (End::Footnote, Token::FootnoteEnd)
        )
    }
}

/// The transformation driver.
///
/// Owns a lexer pair per render and the state scoped to one `render` call
/// (the collected footnotes). Not safe for concurrent re-entrant use; use
/// one instance per in-flight render, construction is cheap.
#[derive(Debug, Default)]
pub struct Transformer<R> {
    rewriter: R,
    options: TransformOptions,
    footnotes: Vec<Footnote>,
}

impl<R: Rewriter> Transformer<R> {
    pub fn new(rewriter: R) -> Self {
        Self {
            rewriter,
            options: TransformOptions::default(),
            footnotes: Vec::new(),
        }
    }

    /// Enable inline parsing inside open HTML blocks.
    #[must_use]
    pub fn with_parse_block_html(mut self, enabled: bool) -> Self {
        self.options.parse_block_html = enabled;
        self
    }

    /// The embedder's rewriter, e.g. to read state it accumulated.
    pub fn rewriter(&self) -> &R {
        &self.rewriter
    }

    /// Consume the transformer, returning its rewriter.
    pub fn into_rewriter(self) -> R {
        self.rewriter
    }

    /// Footnotes collected by the most recent render, in document order.
    pub fn footnotes(&self) -> &[Footnote] {
        &self.footnotes
    }

    /// Transform `text`. Everything not overridden comes back byte-identical.
    pub fn render(&mut self, text: &str) -> Result<String, Error> {
        self.footnotes.clear();

        let mut block = BlockLexer::new();
        let tokens = block.lex(text, BLOCK_RULES)?;
        tracing::debug!(tokens = tokens.len(), bytes = text.len(), "block lexing complete");

        let mut inline = InlineLexer::new();
        inline.configure(block.link_defs().clone(), block.footnote_defs().clone());

        let mut cursor = Cursor { tokens: &tokens, pos: 0 };
        let ctx = InlineContext::default();
        let mut out = String::with_capacity(text.len());
        while let Some(token) = cursor.next() {
            out.push_str(&self.dispatch(token, &mut cursor, &inline, ctx)?);
        }
        Ok(out)
    }

    fn dispatch(
        &mut self,
        token: &Token,
        cursor: &mut Cursor<'_>,
        inline: &InlineLexer,
        ctx: InlineContext,
    ) -> Result<String, Error> {
        match token {
            Token::Newline { raw } | Token::Hrule { raw } | Token::LinkDef { raw } => {
                Ok(raw.clone())
            }
            Token::CodeBlock { raw, lang, text } => Ok(self
                .rewriter
                .code_block(lang.as_deref(), text, raw)
                .unwrap_or_else(|| raw.clone())),
            Token::Heading { raw, depth, text } => {
                if let Some(replaced) = self.rewriter.heading(*depth, text, raw) {
                    return Ok(replaced);
                }
                self.replace_fragment(raw, text, INLINE_RULES, inline, ctx)
            }
            Token::Table { raw, header, cells } => {
                if let Some(replaced) = self.rewriter.table(raw) {
                    return Ok(replaced);
                }
                let mut merged = raw.clone();
                for cell in header.iter().chain(cells.iter().flatten()) {
                    merged = self.replace_fragment(&merged, cell, INLINE_RULES, inline, ctx)?;
                }
                Ok(merged)
            }
            Token::Html { raw, tag, inner } => {
                if let Some(replaced) = self.rewriter.html_block(raw) {
                    return Ok(replaced);
                }
                match (tag, inner) {
                    (Some(tag), Some(inner))
                        if self.options.parse_block_html
                            && !PRE_TAGS.contains(&tag.as_str()) =>
                    {
                        self.replace_fragment(raw, inner, HTML_INLINE_RULES, inline, ctx)
                    }
                    _ => Ok(raw.clone()),
                }
            }
            Token::Paragraph { raw } => {
                if let Some(replaced) = self.rewriter.paragraph(raw) {
                    return Ok(replaced);
                }
                self.inline_pass(raw, INLINE_RULES, inline, ctx)
            }
            Token::Text { .. } => {
                let (_, rendered) = self.eval(token, cursor, inline, ctx)?;
                Ok(rendered)
            }
            Token::QuoteStart { raw } => {
                let (merged, _) = self.consume(raw, End::Quote, cursor, inline, ctx)?;
                Ok(self
                    .rewriter
                    .block_quote(raw, &merged)
                    .unwrap_or(merged))
            }
            Token::ListStart { raw, ordered } => {
                let (merged, _) = self.consume(raw, End::List, cursor, inline, ctx)?;
                Ok(self
                    .rewriter
                    .list(*ordered, raw, &merged)
                    .unwrap_or(merged))
            }
            Token::ItemStart { raw, loose } => {
                let (merged, _) = self.consume(raw, End::Item, cursor, inline, ctx)?;
                Ok(self
                    .rewriter
                    .list_item(*loose, raw, &merged)
                    .unwrap_or(merged))
            }
            Token::FootnoteStart { raw, key } => {
                let body_ctx = InlineContext { in_footnote: true };
                let (merged, body) = self.consume(raw, End::Footnote, cursor, inline, body_ctx)?;
                tracing::trace!(key = %key, "collected footnote");
                self.footnotes.push(Footnote {
                    key: key.clone(),
                    body,
                });
                Ok(self.rewriter.footnote(key, raw, &merged).unwrap_or(merged))
            }
            Token::QuoteEnd | Token::ListEnd | Token::ItemEnd | Token::FootnoteEnd => {
                unreachable!("container end marker without a matching opener")
            }
        }
    }

    /// Dispatch one child token, returning its input fragment alongside its
    /// output. Adjacent text tokens coalesce into a single fragment here,
    /// since inline constructs may span what the block lexer split into
    /// lines.
    fn eval(
        &mut self,
        token: &Token,
        cursor: &mut Cursor<'_>,
        inline: &InlineLexer,
        ctx: InlineContext,
    ) -> Result<(String, String), Error> {
        if let Token::Text { raw } = token {
            let mut fragment = raw.clone();
            while let Some(Token::Text { raw: next }) = cursor.peek() {
                fragment.push_str(next);
                cursor.next();
            }
            let rendered = self.inline_pass(&fragment, INLINE_RULES, inline, ctx)?;
            return Ok((fragment, rendered));
        }
        let rendered = self.dispatch(token, cursor, inline, ctx)?;
        Ok((token.raw().to_owned(), rendered))
    }

    /// Container consumption: pop and dispatch children until the matching
    /// end marker, then rebuild the container from its raw source with every
    /// changed child fragment substituted. An unchanged container comes back
    /// verbatim. Also returns the concatenated child output (the rendered
    /// body, used for collected footnotes).
    fn consume(
        &mut self,
        raw: &str,
        end: End,
        cursor: &mut Cursor<'_>,
        inline: &InlineLexer,
        ctx: InlineContext,
    ) -> Result<(String, String), Error> {
        let mut parts: Vec<(String, String)> = Vec::new();
        loop {
            let Some(token) = cursor.next() else {
                unreachable!("token stream ended inside an open container")
            };
            if token.is_end_marker() {
                debug_assert!(end.matches(token), "mis-nested container markers");
                break;
            }
            parts.push(self.eval(token, cursor, inline, ctx)?);
        }

        let body: String = parts.iter().map(|(_, rendered)| rendered.as_str()).collect();
        let mut merged = raw.to_owned();
        for (fragment, rendered) in &parts {
            if !fragment.is_empty() && fragment != rendered {
                merged = merged.replace(fragment.as_str(), rendered);
            }
        }
        Ok((merged, body))
    }

    /// The raw-substitution step: run `fragment` (drawn verbatim from within
    /// `raw`) through the inline pipeline; if it changed, replace every
    /// occurrence of it inside `raw`.
    fn replace_fragment(
        &mut self,
        raw: &str,
        fragment: &str,
        rules: &[InlineRule],
        inline: &InlineLexer,
        ctx: InlineContext,
    ) -> Result<String, Error> {
        if fragment.is_empty() {
            return Ok(raw.to_owned());
        }
        let processed = self.inline_pass(fragment, rules, inline, ctx)?;
        if processed == fragment {
            Ok(raw.to_owned())
        } else {
            Ok(raw.replace(fragment, &processed))
        }
    }

    fn inline_pass(
        &mut self,
        fragment: &str,
        rules: &[InlineRule],
        inline: &InlineLexer,
        ctx: InlineContext,
    ) -> Result<String, Error> {
        let tokens = inline.lex(fragment, rules, ctx)?;
        let mut out = String::with_capacity(fragment.len());
        for token in &tokens {
            out.push_str(&self.inline_out(token));
        }
        Ok(out)
    }

    fn inline_out(&mut self, token: &InlineToken) -> String {
        let replaced = match token {
            InlineToken::Escape { raw } => self.rewriter.escape(raw),
            InlineToken::Html { raw } => self.rewriter.inline_html(raw),
            InlineToken::Autolink { raw, href } => self.rewriter.autolink(href, raw),
            InlineToken::Url { raw } => self.rewriter.url(raw),
            InlineToken::FootnoteRef { raw, key } => self.rewriter.footnote_ref(key, raw),
            InlineToken::Link {
                raw,
                text,
                href,
                title,
            } => self.rewriter.link(text, href, title.as_deref(), raw),
            InlineToken::Image {
                raw,
                alt,
                src,
                title,
            } => self.rewriter.image(alt, src, title.as_deref(), raw),
            InlineToken::Strong { raw, text } => self.rewriter.strong(text, raw),
            InlineToken::Emphasis { raw, text } => self.rewriter.emphasis(text, raw),
            InlineToken::CodeSpan { raw, text } => self.rewriter.code_span(text, raw),
            InlineToken::LineBreak { raw } => self.rewriter.line_break(raw),
            InlineToken::Strikethrough { raw, text } => self.rewriter.strikethrough(text, raw),
            InlineToken::Text { raw } => self.rewriter.text(raw),
        };
        replaced.unwrap_or_else(|| token.raw().to_owned())
    }
}
