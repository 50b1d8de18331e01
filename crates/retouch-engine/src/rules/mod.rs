//! Ordered rule tables for the block and inline lexers.
//!
//! A rule is a named pattern matcher over the current input prefix. Rules are
//! tried in table order and the first match wins; every table ends in a text
//! catch-all that consumes at least one byte of non-empty input, so a
//! conforming table always makes progress.

pub(crate) mod block;
pub(crate) mod inline;

/// Block-level lexing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRule {
    /// Run of blank lines.
    Newline,
    /// Thematic break.
    Hrule,
    /// Indented code block.
    Code,
    /// Fenced code block.
    Fences,
    /// ATX heading.
    Heading,
    /// Setext heading.
    LHeading,
    /// Block quote container.
    Quote,
    /// List container.
    List,
    /// HTML block.
    Html,
    /// Link reference definition.
    DefLink,
    /// Footnote definition container.
    DefFootnote,
    /// Pipe table.
    Table,
    Paragraph,
    /// Single-line catch-all.
    Text,
}

/// The full block rule set.
pub const BLOCK_RULES: &[BlockRule] = &[
    BlockRule::Newline,
    BlockRule::Hrule,
    BlockRule::Code,
    BlockRule::Fences,
    BlockRule::Heading,
    BlockRule::LHeading,
    BlockRule::Quote,
    BlockRule::List,
    BlockRule::Html,
    BlockRule::DefLink,
    BlockRule::DefFootnote,
    BlockRule::Table,
    BlockRule::Paragraph,
    BlockRule::Text,
];

/// Block rules active inside a footnote body: everything except the footnote
/// definition rule, so footnote definitions cannot nest.
pub const FOOTNOTE_BLOCK_RULES: &[BlockRule] = &[
    BlockRule::Newline,
    BlockRule::Hrule,
    BlockRule::Code,
    BlockRule::Fences,
    BlockRule::Heading,
    BlockRule::LHeading,
    BlockRule::Quote,
    BlockRule::List,
    BlockRule::Html,
    BlockRule::DefLink,
    BlockRule::Table,
    BlockRule::Paragraph,
    BlockRule::Text,
];

/// Block rules active inside a list item body.
pub const LIST_BLOCK_RULES: &[BlockRule] = &[
    BlockRule::Newline,
    BlockRule::Code,
    BlockRule::Fences,
    BlockRule::LHeading,
    BlockRule::Hrule,
    BlockRule::Quote,
    BlockRule::List,
    BlockRule::Text,
];

/// Inline-level lexing rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineRule {
    /// Backslash escape.
    Escape,
    /// Inline HTML tag or comment.
    Html,
    /// `<…>` autolink.
    Autolink,
    /// Bare URL.
    Url,
    /// Footnote reference. Suppressed inside footnote bodies.
    FootnoteRef,
    /// Inline link or image.
    Link,
    /// Reference-style link or image.
    RefLink,
    /// Shortcut reference link or image.
    NoLink,
    Strong,
    Emphasis,
    CodeSpan,
    /// Hard line break.
    LineBreak,
    Strikethrough,
    /// Catch-all.
    Text,
}

/// The full inline rule set.
pub const INLINE_RULES: &[InlineRule] = &[
    InlineRule::Escape,
    InlineRule::Html,
    InlineRule::Autolink,
    InlineRule::Url,
    InlineRule::FootnoteRef,
    InlineRule::Link,
    InlineRule::RefLink,
    InlineRule::NoLink,
    InlineRule::Strong,
    InlineRule::Emphasis,
    InlineRule::CodeSpan,
    InlineRule::LineBreak,
    InlineRule::Strikethrough,
    InlineRule::Text,
];

/// Inline rules active inside embedded HTML: no emphasis-family rules and no
/// footnote references.
pub const HTML_INLINE_RULES: &[InlineRule] = &[
    InlineRule::Escape,
    InlineRule::Html,
    InlineRule::Autolink,
    InlineRule::Url,
    InlineRule::Link,
    InlineRule::RefLink,
    InlineRule::NoLink,
    InlineRule::CodeSpan,
    InlineRule::LineBreak,
    InlineRule::Text,
];
