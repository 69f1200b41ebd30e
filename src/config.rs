//! Site configuration module.
//!
//! Handles loading, validating, and merging `pagefold.toml`. Stock defaults are
//! serialized to a TOML value, the user's file is merged on top, and the
//! result is deserialized and validated.
//!
//! ## Config File Location
//!
//! ```text
//! my-site/
//! ├── pagefold.toml     # Site config (optional)
//! ├── content/          # Markdown documents and their images
//! └── build/            # Output of the site build
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_dir = "content"   # Relative to the site root
//! build_dir = "build"
//!
//! [images]
//! breakpoints = [360, 640, 768, 1024, 1366, 1600, 1920]
//! thumbnail_width = 250
//! passthrough_formats = ["webp", "gif"]
//! on_error = "degrade"      # or "strict"
//!
//! [markdown]
//! tables = true
//! footnotes = true
//! strikethrough = true
//! tasklists = true
//! definition_lists = true
//! smart_punctuation = false
//! autolink = true           # Bare https:// URLs become links
//!
//! [schema_data]             # Global front matter defaults (any keys)
//! ```
//!
//! Unknown keys are rejected to catch typos early, except under
//! `[schema_data]`, which is free-form.

use crate::front_matter::{FrontMatter, toml_table_to_json};
use crate::imaging::DEFAULT_BREAKPOINTS;
use crate::paths::SitePaths;
use pulldown_cmark::Options;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the site root.
pub const CONFIG_FILE: &str = "pagefold.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `pagefold.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Content directory, relative to the site root.
    pub content_dir: PathBuf,
    /// Build output directory, relative to the site root.
    pub build_dir: PathBuf,
    /// Responsive image settings.
    pub images: ImagesConfig,
    /// Markdown syntax extensions.
    pub markdown: MarkdownConfig,
    /// Global front matter defaults merged beneath every document's own.
    pub schema_data: toml::Table,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            build_dir: PathBuf::from("build"),
            images: ImagesConfig::default(),
            markdown: MarkdownConfig::default(),
            schema_data: toml::Table::new(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let breakpoints = &self.images.breakpoints;
        if breakpoints.is_empty() {
            return Err(ConfigError::Validation(
                "images.breakpoints must not be empty".into(),
            ));
        }
        if breakpoints.contains(&0) {
            return Err(ConfigError::Validation(
                "images.breakpoints values must be non-zero".into(),
            ));
        }
        if !breakpoints.windows(2).all(|w| w[0] < w[1]) {
            return Err(ConfigError::Validation(
                "images.breakpoints must be strictly ascending".into(),
            ));
        }
        if self.images.thumbnail_width == 0 {
            return Err(ConfigError::Validation(
                "images.thumbnail_width must be non-zero".into(),
            ));
        }
        if self.content_dir == self.build_dir {
            return Err(ConfigError::Validation(
                "content_dir and build_dir must differ".into(),
            ));
        }
        Ok(())
    }

    /// Content and build roots resolved against the site root.
    pub fn paths(&self, site_root: &Path) -> SitePaths {
        SitePaths::new(
            site_root.join(&self.content_dir),
            site_root.join(&self.build_dir),
        )
    }

    /// `[schema_data]` as front matter, ready to seed every document.
    pub fn schema_defaults(&self) -> FrontMatter {
        toml_table_to_json(&self.schema_data)
    }
}

/// What to do when a local image cannot be probed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImagePolicy {
    /// Render a plain `<img>` without dimensions or variants, and warn.
    #[default]
    Degrade,
    /// Fail the document.
    Strict,
}

/// Responsive image settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Standard widths variants are generated at, strictly ascending.
    pub breakpoints: Vec<u32>,
    /// Width of the thumbnail variant referenced by `thumbnailUrl`.
    pub thumbnail_width: u32,
    /// Extensions delivered as-is, without `srcset` or AVIF variants.
    pub passthrough_formats: Vec<String>,
    /// Behaviour when an image cannot be probed.
    pub on_error: ImagePolicy,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            breakpoints: DEFAULT_BREAKPOINTS.to_vec(),
            thumbnail_width: 250,
            passthrough_formats: vec!["webp".to_string(), "gif".to_string()],
            on_error: ImagePolicy::Degrade,
        }
    }
}

/// Markdown syntax extensions passed to the parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkdownConfig {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub definition_lists: bool,
    /// Curly quotes and dashes.
    pub smart_punctuation: bool,
    /// Turn bare `http(s)://` URLs in text into links.
    pub autolink: bool,
}

impl Default for MarkdownConfig {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            tasklists: true,
            definition_lists: true,
            smart_punctuation: false,
            autolink: true,
        }
    }
}

impl MarkdownConfig {
    /// Parser options; front matter blocks (`+++` and `---`) are always on.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        let mut options =
            Options::ENABLE_PLUSES_DELIMITED_METADATA_BLOCKS | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
        options.set(Options::ENABLE_TABLES, self.tables);
        options.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        options.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        options.set(Options::ENABLE_TASKLISTS, self.tasklists);
        options.set(Options::ENABLE_DEFINITION_LIST, self.definition_lists);
        options.set(Options::ENABLE_SMART_PUNCTUATION, self.smart_punctuation);
        options
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `pagefold.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no config file exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `pagefold.toml` in the given site root.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    let config = resolve_config(base, overlay)?;
    tracing::debug!(root = %root.display(), "Loaded site config");
    Ok(config)
}

/// Returns a fully-commented stock `pagefold.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# pagefold configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error (except inside [schema_data]).

# Directory holding markdown documents and their images, relative to this file.
content_dir = "content"

# Directory the site build writes to. Pages and image variants are looked up
# here when computing thumbnail URLs.
build_dir = "build"

# ---------------------------------------------------------------------------
# Responsive images
# ---------------------------------------------------------------------------
[images]
# Standard widths variants are generated at (strictly ascending).
# An image is referenced at every breakpoint below its own width, plus its
# own width. Variants are named <stem>-<width>w<ext>, e.g. photo-640w.jpg.
breakpoints = [360, 640, 768, 1024, 1366, 1600, 1920]

# Width of the thumbnail variant used for the thumbnailUrl front matter key.
thumbnail_width = 250

# Formats delivered as-is, without srcset or AVIF variants.
passthrough_formats = ["webp", "gif"]

# What to do when an image cannot be read:
#   "degrade" - plain <img> without dimensions, plus a warning
#   "strict"  - fail the document
on_error = "degrade"

# ---------------------------------------------------------------------------
# Markdown extensions
# ---------------------------------------------------------------------------
[markdown]
tables = true
footnotes = true
strikethrough = true
tasklists = true
definition_lists = true
# Curly quotes and typographic dashes.
smart_punctuation = false
# Bare http(s):// URLs in text become links (opening in a new tab).
autolink = true

# ---------------------------------------------------------------------------
# Global front matter defaults
# ---------------------------------------------------------------------------
# Every key here seeds each document's metadata. Document values replace
# these, except lists, which are concatenated (global entries first).
[schema_data]
# "@context" = "https://schema.org"
"##
}
