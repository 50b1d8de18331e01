//! Error types for the transformation engine.

/// Error from lexing or transforming a document.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No rule in the active rule set matched non-empty remaining input.
    ///
    /// Signals a malformed rule set (missing text catch-all). The built-in
    /// rule sets always end in a catch-all, so a render using them cannot
    /// produce this.
    #[error("no lexer rule matched near {snippet:?}")]
    NoMatchingRule {
        /// Start of the unmatched remainder, truncated for display.
        snippet: String,
    },
}

impl Error {
    pub(crate) fn no_rule(rest: &str) -> Self {
        let snippet: String = rest.chars().take(32).collect();
        Error::NoMatchingRule { snippet }
    }
}
