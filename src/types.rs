//! Shared types returned by the pipeline.
//!
//! These are what the CLI prints and what `render --json` serializes, so they
//! carry only owned, serializable data.

use crate::front_matter::FrontMatter;
use serde::Serialize;
use std::path::PathBuf;

/// One document after rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    /// The document as it was requested (content-relative or absolute).
    pub source: PathBuf,
    /// HTML body fragment, without the front matter block.
    pub html: String,
    /// Effective metadata: defaults, embedded block, computed fields.
    pub front_matter: FrontMatter,
    /// Non-fatal problems: malformed front matter, unreadable images.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl RenderedDocument {
    /// Public URL of the page, as computed into the front matter.
    pub fn url(&self) -> Option<&str> {
        self.front_matter.get("url").and_then(|v| v.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.front_matter.get("title").and_then(|v| v.as_str())
    }
}
