//! Code block formatting with a pluggable highlighter backend.
//!
//! The engine leaves fenced code blocks verbatim; [`CodeRewriter`] plugs a
//! [`Highlighter`] into the code-block hook. A block without a language tag
//! renders as an escaped `<pre><code>` block; an unrecognized language or a
//! backend failure degrades to an escaped block classed with the raw language
//! tag. Neither failure crosses this boundary.

use retouch_engine::Rewriter;

/// Escape HTML special characters, quotes included.
#[must_use]
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Formatting options passed through to the highlighter backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightOptions {
    /// Emit style attributes instead of classes.
    pub inline_styles: bool,
    /// Emit line numbers; successful output is wrapped in a
    /// `highlight-wrapper` div.
    pub line_numbers: bool,
}

/// Error from a highlighter backend.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum HighlightError {
    /// The language tag is not recognized by the backend.
    #[error("unknown language {0:?}")]
    UnknownLanguage(String),
    /// The backend failed while formatting.
    #[error("formatter error: {0}")]
    Formatter(String),
}

/// A syntax-highlighting backend.
pub trait Highlighter {
    /// Format `code` as HTML for the given language tag.
    fn format(
        &self,
        code: &str,
        lang: &str,
        options: HighlightOptions,
    ) -> Result<String, HighlightError>;
}

/// Render a code block through an optional highlighter, degrading to escaped
/// `<pre><code>` output on any failure.
#[must_use]
pub fn render_code_block(
    highlighter: Option<&dyn Highlighter>,
    code: &str,
    lang: Option<&str>,
    options: HighlightOptions,
) -> String {
    let Some(lang) = lang else {
        return format!("<pre><code>{}</code></pre>\n", escape(code.trim()));
    };
    match highlighter.map(|h| h.format(code, lang, options)) {
        Some(Ok(html)) => {
            if options.line_numbers {
                format!("<div class=\"highlight-wrapper\">{html}</div>\n")
            } else {
                html
            }
        }
        Some(Err(_)) | None => {
            format!("<pre class=\"{lang}\"><code>{}</code></pre>\n", escape(code))
        }
    }
}

/// Adapts a [`Highlighter`] into a [`Rewriter`] that formats every code
/// block it sees.
#[derive(Debug)]
pub struct CodeRewriter<H> {
    highlighter: H,
    options: HighlightOptions,
}

impl<H: Highlighter> CodeRewriter<H> {
    pub fn new(highlighter: H) -> Self {
        Self {
            highlighter,
            options: HighlightOptions::default(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: HighlightOptions) -> Self {
        self.options = options;
        self
    }
}

impl<H: Highlighter> Rewriter for CodeRewriter<H> {
    fn code_block(&mut self, lang: Option<&str>, code: &str, _raw: &str) -> Option<String> {
        Some(render_code_block(
            Some(&self.highlighter),
            code,
            lang,
            self.options,
        ))
    }
}
