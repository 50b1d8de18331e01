//! Selective, identity-preserving Markdown transformation.
//!
//! The engine tokenizes a document, lets an embedder override the rendering
//! of specific token kinds, and reproduces everything else byte for byte.
//! This crate re-exports the engine surface and composes the collaborator
//! crates (front matter, code highlighting, CJK spacing, table of contents)
//! around it explicitly.
//!
//! # Example
//!
//! ```
//! use retouch::{Pipeline, toc::TocRecorder};
//!
//! let doc = "Title: Demo\n\n# One\n\nbody 中文mix\n\n## Two\n";
//! let mut pipeline = Pipeline::new(TocRecorder::new())
//!     .with_front_matter(true)
//!     .with_spacing_marker("|");
//! let processed = pipeline.run(doc).unwrap();
//!
//! assert_eq!(processed.meta.get("Title").unwrap(), "Demo");
//! assert_eq!(processed.body, "\n# One\n\nbody|中文|mix\n\n## Two\n");
//! assert_eq!(pipeline.rewriter().entries().len(), 2);
//! ```

use std::collections::BTreeMap;

pub use retouch_engine::{
    BlockLexer, Error, Footnote, Identity, InlineContext, InlineLexer, InlineToken, LinkDef,
    Rewriter, Token, TransformOptions, Transformer, rules,
};
pub use retouch_highlight as highlight;
pub use retouch_meta as meta;
pub use retouch_spacing as spacing;
pub use retouch_toc as toc;

/// Output of one [`Pipeline`] run.
#[derive(Debug, Clone)]
pub struct Processed {
    /// Front-matter mapping; empty when extraction is off or absent.
    pub meta: BTreeMap<String, String>,
    /// The transformed document body.
    pub body: String,
    /// Footnotes collected during the render, in document order.
    pub footnotes: Vec<Footnote>,
}

/// Explicit composition of the engine with its collaborators.
///
/// Front matter is split off first (when enabled), the body is rendered
/// through the transformer, and the spacing pass post-processes the rendered
/// output (when a marker is configured).
#[derive(Debug)]
pub struct Pipeline<R> {
    transformer: Transformer<R>,
    extract_front_matter: bool,
    spacing_marker: Option<String>,
}

impl<R: Rewriter> Pipeline<R> {
    pub fn new(rewriter: R) -> Self {
        Self {
            transformer: Transformer::new(rewriter),
            extract_front_matter: false,
            spacing_marker: None,
        }
    }

    /// Split leading `Key: value` front matter off the document body.
    #[must_use]
    pub fn with_front_matter(mut self, enabled: bool) -> Self {
        self.extract_front_matter = enabled;
        self
    }

    /// Post-process rendered output with the CJK spacing pass.
    #[must_use]
    pub fn with_spacing_marker(mut self, marker: impl Into<String>) -> Self {
        self.spacing_marker = Some(marker.into());
        self
    }

    /// Enable inline parsing inside open HTML blocks.
    #[must_use]
    pub fn with_parse_block_html(mut self, enabled: bool) -> Self {
        self.transformer = self.transformer.with_parse_block_html(enabled);
        self
    }

    /// The embedder's rewriter, e.g. to read state it accumulated.
    pub fn rewriter(&self) -> &R {
        self.transformer.rewriter()
    }

    /// Run the pipeline over one document.
    pub fn run(&mut self, text: &str) -> Result<Processed, Error> {
        let (meta, body) = if self.extract_front_matter {
            meta::parse(text)
        } else {
            (BTreeMap::new(), text)
        };
        if !meta.is_empty() {
            tracing::debug!(keys = meta.len(), "extracted front matter");
        }
        let rendered = self.transformer.render(body)?;
        let rendered = match &self.spacing_marker {
            Some(marker) => spacing::insert_markers(&rendered, marker),
            None => rendered,
        };
        Ok(Processed {
            meta,
            body: rendered,
            footnotes: self.transformer.footnotes().to_vec(),
        })
    }
}
