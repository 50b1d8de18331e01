//! Token types produced by the block and inline lexers.
//!
//! Every token carries the exact source substring consumed by the rule that
//! produced it. Concatenating the raw text of all top-level block tokens in
//! stream order reproduces the input byte for byte; tokens nested between a
//! container start marker and its end marker are not top-level. The
//! transformer leans on this to leave everything it does not rewrite
//! untouched.

/// A block-level token.
///
/// Container kinds (`QuoteStart`, `ListStart`, `ItemStart`, `FootnoteStart`)
/// open an extent that runs until the matching end marker; the tokens in
/// between are their children, lexed from the container's inner text. End
/// markers are synthetic and consume no input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Run of blank lines.
    Newline { raw: String },
    /// Fenced or indented code block. `lang` is the fence info word, if any.
    CodeBlock {
        raw: String,
        lang: Option<String>,
        text: String,
    },
    /// ATX (`#`) or setext (underline) heading. `text` is the heading body
    /// exactly as it appears inside `raw`.
    Heading { raw: String, depth: u8, text: String },
    /// Thematic break.
    Hrule { raw: String },
    /// Opens a block quote; closed by [`Token::QuoteEnd`].
    QuoteStart { raw: String },
    QuoteEnd,
    /// Opens a list; closed by [`Token::ListEnd`].
    ListStart { raw: String, ordered: bool },
    ListEnd,
    /// Opens a list item; closed by [`Token::ItemEnd`]. A loose item is one
    /// separated from its siblings by blank lines.
    ItemStart { raw: String, loose: bool },
    ItemEnd,
    /// Opens a footnote definition; closed by [`Token::FootnoteEnd`].
    FootnoteStart { raw: String, key: String },
    FootnoteEnd,
    /// Pipe table. Header and body cells hold the trimmed cell text exactly
    /// as it appears inside `raw`, body cells in row-major order.
    Table {
        raw: String,
        header: Vec<String>,
        cells: Vec<Vec<String>>,
    },
    /// Raw HTML block. `tag` and `inner` are present only for an opening tag
    /// with no matching close before the block ends, the one case eligible
    /// for embedded inline parsing.
    Html {
        raw: String,
        tag: Option<String>,
        inner: Option<String>,
    },
    /// Link reference definition. The definition itself is recorded on the
    /// lexer; the token only preserves the source text.
    LinkDef { raw: String },
    Paragraph { raw: String },
    /// Single line of block-level text, produced by the catch-all rule.
    Text { raw: String },
}

impl Token {
    /// Exact source substring consumed by the rule that produced this token.
    /// End markers consume nothing.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Token::Newline { raw }
            | Token::CodeBlock { raw, .. }
            | Token::Heading { raw, .. }
            | Token::Hrule { raw }
            | Token::QuoteStart { raw }
            | Token::ListStart { raw, .. }
            | Token::ItemStart { raw, .. }
            | Token::FootnoteStart { raw, .. }
            | Token::Table { raw, .. }
            | Token::Html { raw, .. }
            | Token::LinkDef { raw }
            | Token::Paragraph { raw }
            | Token::Text { raw } => raw,
            Token::QuoteEnd | Token::ListEnd | Token::ItemEnd | Token::FootnoteEnd => "",
        }
    }

    /// Whether this token closes a container extent.
    #[must_use]
    pub fn is_end_marker(&self) -> bool {
        matches!(
            self,
            Token::QuoteEnd | Token::ListEnd | Token::ItemEnd | Token::FootnoteEnd
        )
    }
}

/// An inline-level token.
///
/// Reference-style links and images resolve against the gathered definitions
/// at lex time; `raw` still holds the reference-style source, so an
/// un-overridden reference renders back unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InlineToken {
    /// Backslash escape.
    Escape { raw: String },
    /// Inline HTML tag or comment.
    Html { raw: String },
    /// `<http://…>` or `<user@host>` autolink.
    Autolink { raw: String, href: String },
    /// Bare URL.
    Url { raw: String },
    /// Footnote reference. Never produced while lexing a footnote body.
    FootnoteRef { raw: String, key: String },
    Link {
        raw: String,
        text: String,
        href: String,
        title: Option<String>,
    },
    Image {
        raw: String,
        alt: String,
        src: String,
        title: Option<String>,
    },
    Strong { raw: String, text: String },
    Emphasis { raw: String, text: String },
    CodeSpan { raw: String, text: String },
    /// Hard line break (two or more trailing spaces).
    LineBreak { raw: String },
    Strikethrough { raw: String, text: String },
    /// Plain text, produced by the catch-all rule.
    Text { raw: String },
}

impl InlineToken {
    /// Exact source substring consumed by the rule that produced this token.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            InlineToken::Escape { raw }
            | InlineToken::Html { raw }
            | InlineToken::Autolink { raw, .. }
            | InlineToken::Url { raw }
            | InlineToken::FootnoteRef { raw, .. }
            | InlineToken::Link { raw, .. }
            | InlineToken::Image { raw, .. }
            | InlineToken::Strong { raw, .. }
            | InlineToken::Emphasis { raw, .. }
            | InlineToken::CodeSpan { raw, .. }
            | InlineToken::LineBreak { raw }
            | InlineToken::Strikethrough { raw, .. }
            | InlineToken::Text { raw } => raw,
        }
    }
}
