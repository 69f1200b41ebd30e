//! Document conversion: markdown in, HTML fragment and metadata out.
//!
//! ## Per-document flow
//!
//! ```text
//! source.md ──► render_markdown ──► HTML ──► first <img> made eager
//!                     │
//!                     └─► front matter block ──► merge with defaults
//!                                               ──► url / image / thumbnailUrl
//! ```
//!
//! A [`Pipeline`] is built once per site from its config and holds only
//! immutable state. Each call creates its own [`RenderContext`], so documents
//! can be converted concurrently; [`Pipeline::convert_all`] does so with rayon.
//!
//! ## Failure modes
//!
//! | Problem | Result |
//! |---|---|
//! | Malformed front matter | Warning, empty embedded metadata |
//! | Unreadable image | Warning and plain `<img>` (or error under `strict`) |
//! | Document or asset outside the content root | [`PipelineError::Path`] |
//! | Document cannot be read | [`PipelineError::Read`] |

use crate::config::{MarkdownConfig, SiteConfig};
use crate::front_matter::FrontMatterProcessor;
use crate::html::remove_first_lazy_loading;
use crate::imaging::{ImageBackend, RustBackend};
use crate::paths::{PathError, SitePaths};
use crate::render::{NodeRenderer, RenderContext, RenderError, ResponsiveRenderer, render_markdown};
use crate::types::RenderedDocument;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Converts documents of one site.
#[derive(Debug, Clone)]
pub struct Pipeline<R> {
    renderer: R,
    front_matter: FrontMatterProcessor,
    paths: SitePaths,
    markdown: MarkdownConfig,
}

impl Pipeline<ResponsiveRenderer<RustBackend>> {
    /// Pipeline for the site rooted at `site_root`, probing images from disk.
    pub fn from_config(config: &SiteConfig, site_root: &Path) -> Self {
        Self::with_backend(config, config.paths(site_root), RustBackend::new())
    }
}

impl<B: ImageBackend> Pipeline<ResponsiveRenderer<B>> {
    pub fn with_backend(config: &SiteConfig, paths: SitePaths, backend: B) -> Self {
        Self::new(
            ResponsiveRenderer::from_config(config, paths.clone(), backend),
            FrontMatterProcessor::from_config(config, paths.clone()),
            paths,
            config.markdown.clone(),
        )
    }
}

impl<R: NodeRenderer> Pipeline<R> {
    pub fn new(
        renderer: R,
        front_matter: FrontMatterProcessor,
        paths: SitePaths,
        markdown: MarkdownConfig,
    ) -> Self {
        Self {
            renderer,
            front_matter,
            paths,
            markdown,
        }
    }

    pub fn paths(&self) -> &SitePaths {
        &self.paths
    }

    /// Read and convert one document.
    ///
    /// `document` may be absolute (under the content root) or relative to
    /// the content root.
    pub fn convert_file(&self, document: &Path) -> Result<RenderedDocument, PipelineError> {
        let full_path = self.paths.content_path(document)?;
        let source = std::fs::read_to_string(&full_path).map_err(|source| PipelineError::Read {
            path: full_path.clone(),
            source,
        })?;
        self.convert(document, &source)
    }

    /// Convert markdown text that belongs to `document`.
    ///
    /// `document` places the text in the site: it fixes the page URL and the
    /// base for relative images.
    pub fn convert(&self, document: &Path, source: &str) -> Result<RenderedDocument, PipelineError> {
        let mut cx = RenderContext::new(document);
        let rendered = render_markdown(&self.renderer, &mut cx, source, &self.markdown)?;
        let html = remove_first_lazy_loading(&rendered.html).into_owned();

        let mut warnings = cx.into_warnings();
        let embedded =
            self.front_matter
                .read_embedded(document, rendered.metadata.as_ref(), &mut warnings);
        let front_matter = self.front_matter.process(document, embedded)?;

        tracing::debug!(
            document = %document.display(),
            warnings = warnings.len(),
            "Converted document"
        );
        Ok(RenderedDocument {
            source: document.to_path_buf(),
            html,
            front_matter,
            warnings,
        })
    }
}

impl<R: NodeRenderer + Sync> Pipeline<R> {
    /// Convert many documents in parallel; results keep the input order.
    pub fn convert_all(
        &self,
        documents: &[PathBuf],
    ) -> Vec<Result<RenderedDocument, PipelineError>> {
        documents
            .par_iter()
            .map(|document| self.convert_file(document))
            .collect()
    }
}
