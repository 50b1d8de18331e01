//! Identity-preserving Markdown transformation engine.
//!
//! Tokenizes a document with block- and inline-level lexing rules, lets an
//! embedder override the rendering of specific token kinds, and reconstructs
//! output text such that any token without an override reproduces its source
//! substring exactly. Only the overridden constructs change.
//!
//! # Architecture
//!
//! - [`rules`]: ordered rule tables for both lexing levels
//! - [`BlockLexer`]: emits the flat token stream, gathering link and footnote
//!   definitions on the way
//! - [`InlineLexer`]: resolves a text fragment into inline tokens against the
//!   gathered definitions
//! - [`Transformer`]: drives the stream through a [`Rewriter`] (the
//!   override-dispatch surface) and stitches changed fragments back into the
//!   surrounding verbatim text
//!
//! # Example
//!
//! ```
//! use retouch_engine::{Identity, Rewriter, Transformer};
//!
//! // no overrides: any document renders back unchanged
//! let doc = "# Title\n\nBody text.";
//! assert_eq!(Transformer::new(Identity).render(doc).unwrap(), doc);
//!
//! // one override: only that construct changes
//! struct LinkUpper;
//!
//! impl Rewriter for LinkUpper {
//!     fn link(
//!         &mut self,
//!         text: &str,
//!         href: &str,
//!         _title: Option<&str>,
//!         _raw: &str,
//!     ) -> Option<String> {
//!         Some(format!("[{}]({href})", text.to_uppercase()))
//!     }
//! }
//!
//! let mut transformer = Transformer::new(LinkUpper);
//! let out = transformer.render("See [docs](http://example.com).").unwrap();
//! assert_eq!(out, "See [DOCS](http://example.com).");
//! ```

mod block;
mod error;
mod inline;
pub mod rules;
mod token;
mod transform;

pub use block::{BlockLexer, LinkDef};
pub use error::Error;
pub use inline::{InlineContext, InlineLexer};
pub use token::{InlineToken, Token};
pub use transform::{Footnote, Identity, Rewriter, TransformOptions, Transformer};
