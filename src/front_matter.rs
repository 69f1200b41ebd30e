//! Front matter extraction and merge.
//!
//! A document's effective metadata is built from three layers, applied in
//! order:
//!
//! 1. **Global defaults**: `[schema_data]` from the site config.
//! 2. **Embedded**: the document's own front matter block.
//! 3. **Computed**: `url`, `image`, `thumbnailUrl`; always win.
//!
//! ## Merge policy
//!
//! For each key of a later layer:
//!
//! - list on both sides → later list appended to the earlier one;
//! - anything else → later value replaces the earlier one wholesale
//!   (objects are *not* deep-merged).
//!
//! Lists concatenate because structured-data graphs (`@graph`) are extended
//! per page: the site-wide graph and the page's own nodes must both survive.
//!
//! ## Embedded formats
//!
//! ```text
//! +++                      ---
//! title = "Hello"          title: Hello
//! +++                      ---
//! ```
//!
//! TOML (`+++`) and YAML (`---`) blocks at the very top of a document are
//! recognized. A block that fails to parse, or is not a table, yields an empty
//! map and a warning; the document still renders.

use crate::config::SiteConfig;
use crate::naming::variant_path;
use crate::paths::{Existence, PathError, SitePaths};
use pulldown_cmark::MetadataBlockKind;
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Ordered metadata map; insertion order is preserved through the merge.
pub type FrontMatter = serde_json::Map<String, Value>;

/// Syntax of an embedded front matter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataFormat {
    Toml,
    Yaml,
}

impl From<MetadataBlockKind> for MetadataFormat {
    fn from(kind: MetadataBlockKind) -> Self {
        match kind {
            MetadataBlockKind::PlusesStyle => Self::Toml,
            MetadataBlockKind::YamlStyle => Self::Yaml,
        }
    }
}

/// Raw front matter text lifted out of a document by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedBlock {
    pub format: MetadataFormat,
    pub raw: String,
}

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("invalid TOML front matter: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid YAML front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("front matter must be a table of keys, found {0}")]
    NotATable(&'static str),
}

/// Parse an embedded block into a map.
///
/// An empty block is an empty map.
pub fn parse_embedded(block: &EmbeddedBlock) -> Result<FrontMatter, MetadataError> {
    if block.raw.trim().is_empty() {
        return Ok(FrontMatter::new());
    }
    match block.format {
        MetadataFormat::Toml => {
            let table: toml::Table = toml::from_str(&block.raw)?;
            Ok(toml_table_to_json(&table))
        }
        MetadataFormat::Yaml => match serde_yaml::from_str::<Value>(&block.raw)? {
            Value::Object(map) => Ok(map),
            Value::Null => Ok(FrontMatter::new()),
            other => Err(MetadataError::NotATable(json_kind(&other))),
        },
    }
}

/// Convert a TOML value to JSON. Datetimes become RFC 3339 strings.
pub fn toml_to_json(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s.clone()),
        toml::Value::Integer(i) => Value::from(*i),
        toml::Value::Float(f) => serde_json::Number::from_f64(*f).map_or(Value::Null, Value::Number),
        toml::Value::Boolean(b) => Value::Bool(*b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(toml_table_to_json(table)),
    }
}

/// Convert a TOML table to a front matter map, keeping key order.
pub fn toml_table_to_json(table: &toml::Table) -> FrontMatter {
    table
        .iter()
        .map(|(key, value)| (key.clone(), toml_to_json(value)))
        .collect()
}

/// Merge `layer` on top of `base` following the list-concatenation policy.
pub fn merge_into(base: &mut FrontMatter, layer: FrontMatter) {
    for (key, value) in layer {
        match (base.get_mut(&key), value) {
            (Some(Value::Array(existing)), Value::Array(more)) => existing.extend(more),
            (Some(slot), value) => *slot = value,
            (None, value) => {
                base.insert(key, value);
            }
        }
    }
}

/// Merge layers left to right.
pub fn merge(layers: impl IntoIterator<Item = FrontMatter>) -> FrontMatter {
    let mut merged = FrontMatter::new();
    for layer in layers {
        merge_into(&mut merged, layer);
    }
    merged
}

/// Builds the effective front matter of documents.
///
/// Holds only read-only site data, so one processor serves every document,
/// including from multiple threads.
#[derive(Debug, Clone)]
pub struct FrontMatterProcessor {
    defaults: FrontMatter,
    paths: SitePaths,
    thumbnail_width: u32,
}

impl FrontMatterProcessor {
    pub fn new(defaults: FrontMatter, paths: SitePaths, thumbnail_width: u32) -> Self {
        Self {
            defaults,
            paths,
            thumbnail_width,
        }
    }

    pub fn from_config(config: &SiteConfig, paths: SitePaths) -> Self {
        Self::new(
            config.schema_defaults(),
            paths,
            config.images.thumbnail_width,
        )
    }

    /// Parse a document's embedded block, falling back to an empty map.
    ///
    /// Parse failures are logged and appended to `warnings`; they never abort
    /// the document.
    pub fn read_embedded(
        &self,
        document: &Path,
        block: Option<&EmbeddedBlock>,
        warnings: &mut Vec<String>,
    ) -> FrontMatter {
        let Some(block) = block else {
            tracing::debug!(document = %document.display(), "No front matter");
            return FrontMatter::new();
        };
        match parse_embedded(block) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(document = %document.display(), error = %e, "Ignoring front matter");
                warnings.push(format!("{}: {e}", document.display()));
                FrontMatter::new()
            }
        }
    }

    /// Effective metadata: defaults, then `embedded`, then computed fields.
    ///
    /// Fails only when the document or its `image` lies outside the content
    /// root.
    pub fn process(&self, document: &Path, embedded: FrontMatter) -> Result<FrontMatter, PathError> {
        let mut front_matter = merge([self.defaults.clone(), embedded]);

        let url = self.paths.content_to_url(document)?;
        front_matter.insert("url".to_string(), Value::String(url));

        if let Some(Value::String(image)) = front_matter.get("image").cloned() {
            let (image_url, thumbnail_url) = self.image_urls(document, &image)?;
            front_matter.insert("image".to_string(), Value::String(image_url));
            front_matter.insert("thumbnailUrl".to_string(), Value::String(thumbnail_url));
        }

        Ok(front_matter)
    }

    /// Public URL of `image` and of its thumbnail, if the build produced one.
    fn image_urls(&self, document: &Path, image: &str) -> Result<(String, String), PathError> {
        if has_scheme(image) {
            return Ok((image.to_string(), image.to_string()));
        }

        let (image_url, build_path) = match image.strip_prefix('/') {
            Some(root_relative) => (
                image.to_string(),
                self.paths.build_dir().join(root_relative),
            ),
            None => {
                let source = self
                    .paths
                    .resolve_relative(image, document, Existence::Optional)?;
                (
                    self.paths.path_to_url_pathname(&source)?,
                    self.paths.content_to_build_path(&source)?,
                )
            }
        };

        let thumbnail = variant_path(&build_path, self.thumbnail_width);
        let thumbnail_url = if thumbnail.exists() {
            self.paths.build_path_to_url(&thumbnail)?
        } else {
            tracing::debug!(thumbnail = %thumbnail.display(), "No thumbnail, using full image");
            image_url.clone()
        };
        Ok((image_url, thumbnail_url))
    }
}

fn has_scheme(url: &str) -> bool {
    url.split_once(':').is_some_and(|(scheme, _)| {
        !scheme.is_empty()
            && !scheme.contains('/')
            && scheme
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    }) || url.starts_with("//")
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a table",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::TestSite;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn map(value: Value) -> FrontMatter {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn toml_block(raw: &str) -> EmbeddedBlock {
        EmbeddedBlock {
            format: MetadataFormat::Toml,
            raw: raw.to_string(),
        }
    }

    // =========================================================================
    // merge
    // =========================================================================

    #[test]
    fn merge_concatenates_graphs() {
        let global = map(json!({
            "@graph": [{ "@type": "DefinedTermSet", "name": "Glossary" }],
        }));
        let local = map(json!({
            "@graph": [{ "@type": "DefinedTerm", "name": "Knowledge Graph Optimization" }],
        }));

        let merged = merge([global, local]);
        assert_eq!(
            merged["@graph"],
            json!([
                { "@type": "DefinedTermSet", "name": "Glossary" },
                { "@type": "DefinedTerm", "name": "Knowledge Graph Optimization" },
            ])
        );
    }

    #[test]
    fn merge_document_scalars_override_global() {
        let global = map(json!({ "@type": "WebSite", "inLanguage": "en" }));
        let local = map(json!({ "@type": "WebPage" }));

        let merged = merge([global, local]);
        assert_eq!(merged["@type"], "WebPage");
        assert_eq!(merged["inLanguage"], "en");
    }

    #[test]
    fn merge_objects_replace_wholesale() {
        let global = map(json!({
            "author": { "@type": "Person", "name": "John Doe", "sameAs": ["https://example.com"] },
        }));
        let local = map(json!({
            "author": { "@type": "Person", "name": "Kaj Kandler" },
        }));

        let merged = merge([global, local]);
        assert_eq!(merged["author"], json!({ "@type": "Person", "name": "Kaj Kandler" }));
    }

    #[test]
    fn merge_list_over_scalar_replaces() {
        let merged = merge([map(json!({ "tags": "one" })), map(json!({ "tags": ["two"] }))]);
        assert_eq!(merged["tags"], json!(["two"]));
    }

    #[test]
    fn merge_keeps_global_key_order() {
        let merged = merge([
            map(json!({ "a": 1, "b": 2 })),
            map(json!({ "c": 3, "a": 4 })),
        ]);
        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(merged["a"], 4);
    }

    // =========================================================================
    // parse_embedded
    // =========================================================================

    #[test]
    fn parse_toml_block() {
        let parsed = parse_embedded(&toml_block(
            "title = \"Hello\"\ndatePublished = 2024-03-08T07:52:13+02:00\ntags = [\"a\", \"b\"]\n",
        ))
        .unwrap();
        assert_eq!(parsed["title"], "Hello");
        assert_eq!(parsed["datePublished"], "2024-03-08T07:52:13+02:00");
        assert_eq!(parsed["tags"], json!(["a", "b"]));
    }

    #[test]
    fn parse_yaml_block() {
        let parsed = parse_embedded(&EmbeddedBlock {
            format: MetadataFormat::Yaml,
            raw: "title: Hello\nauthor:\n  name: Jane\n".to_string(),
        })
        .unwrap();
        assert_eq!(parsed["title"], "Hello");
        assert_eq!(parsed["author"]["name"], "Jane");
    }

    #[test]
    fn parse_empty_block_is_empty_map() {
        assert!(parse_embedded(&toml_block("  \n")).unwrap().is_empty());
    }

    #[test]
    fn parse_yaml_scalar_is_not_a_table() {
        let result = parse_embedded(&EmbeddedBlock {
            format: MetadataFormat::Yaml,
            raw: "just a sentence".to_string(),
        });
        assert!(matches!(result, Err(MetadataError::NotATable("a string"))));
    }

    #[test]
    fn parse_malformed_toml_is_error() {
        let result = parse_embedded(&toml_block("title = \n"));
        assert!(matches!(result, Err(MetadataError::Toml(_))));
    }

    // =========================================================================
    // FrontMatterProcessor
    // =========================================================================

    #[test]
    fn read_embedded_malformed_is_soft() {
        let site = TestSite::new();
        let processor = site.front_matter_processor(FrontMatter::new());
        let mut warnings = Vec::new();

        let embedded = processor.read_embedded(
            Path::new("post/index.md"),
            Some(&toml_block("title = = broken")),
            &mut warnings,
        );
        assert!(embedded.is_empty());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("post/index.md"));
    }

    #[test]
    fn read_embedded_absent_is_empty_without_warning() {
        let site = TestSite::new();
        let processor = site.front_matter_processor(FrontMatter::new());
        let mut warnings = Vec::new();

        let embedded = processor.read_embedded(Path::new("a.md"), None, &mut warnings);
        assert!(embedded.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn process_adds_url_and_keeps_defaults() {
        let site = TestSite::new();
        let processor =
            site.front_matter_processor(map(json!({ "@context": "https://schema.org" })));

        let fm = processor
            .process(Path::new("blog/hello.md"), map(json!({ "title": "Hello" })))
            .unwrap();
        assert_eq!(fm["@context"], "https://schema.org");
        assert_eq!(fm["title"], "Hello");
        assert_eq!(fm["url"], "/blog/hello/");
        assert!(!fm.contains_key("thumbnailUrl"));
    }

    #[test]
    fn computed_url_overrides_document_value() {
        let site = TestSite::new();
        let processor = site.front_matter_processor(FrontMatter::new());

        let fm = processor
            .process(Path::new("post/index.md"), map(json!({ "url": "https://elsewhere/" })))
            .unwrap();
        assert_eq!(fm["url"], "/post/");
    }

    #[test]
    fn thumbnail_falls_back_to_image_url() {
        let site = TestSite::new();
        let processor = site.front_matter_processor(FrontMatter::new());

        let fm = processor
            .process(
                Path::new("post/index.md"),
                map(json!({ "image": "./img/cover.jpg" })),
            )
            .unwrap();
        assert_eq!(fm["image"], "/post/img/cover.jpg");
        assert_eq!(fm["thumbnailUrl"], "/post/img/cover.jpg");
    }

    #[test]
    fn thumbnail_used_when_variant_exists() {
        let site = TestSite::new();
        site.write_build_file("post/img/cover-250w.jpg");
        let processor = site.front_matter_processor(FrontMatter::new());

        let fm = processor
            .process(
                Path::new("post/index.md"),
                map(json!({ "image": "./img/cover.jpg" })),
            )
            .unwrap();
        assert_eq!(fm["image"], "/post/img/cover.jpg");
        assert_eq!(fm["thumbnailUrl"], "/post/img/cover-250w.jpg");
    }

    #[test]
    fn image_from_global_defaults_is_resolved_per_document() {
        let site = TestSite::new();
        let processor = site.front_matter_processor(map(json!({ "image": "../shared/logo.png" })));

        let fm = processor.process(Path::new("blog/post.md"), FrontMatter::new()).unwrap();
        assert_eq!(fm["image"], "/shared/logo.png");
    }

    #[test]
    fn absolute_image_urls_are_untouched() {
        let site = TestSite::new();
        let processor = site.front_matter_processor(FrontMatter::new());

        let fm = processor
            .process(
                Path::new("a.md"),
                map(json!({ "image": "https://cdn.example.com/a.jpg" })),
            )
            .unwrap();
        assert_eq!(fm["image"], "https://cdn.example.com/a.jpg");
        assert_eq!(fm["thumbnailUrl"], "https://cdn.example.com/a.jpg");
    }

    #[test]
    fn root_relative_image_finds_thumbnail_in_build() {
        let site = TestSite::new();
        site.write_build_file("media/hero-250w.png");
        let processor = site.front_matter_processor(FrontMatter::new());

        let fm = processor
            .process(Path::new("a.md"), map(json!({ "image": "/media/hero.png" })))
            .unwrap();
        assert_eq!(fm["image"], "/media/hero.png");
        assert_eq!(fm["thumbnailUrl"], "/media/hero-250w.png");
    }

    #[test]
    fn image_escaping_content_root_is_path_error() {
        let site = TestSite::new();
        let processor = site.front_matter_processor(FrontMatter::new());

        let result = processor.process(
            Path::new("a.md"),
            map(json!({ "image": "../../outside.jpg" })),
        );
        assert!(matches!(result, Err(PathError::OutsideContentRoot { .. })));
    }

    #[test]
    fn non_string_image_is_left_alone() {
        let site = TestSite::new();
        let processor = site.front_matter_processor(FrontMatter::new());

        let image = json!({ "@type": "ImageObject", "url": "https://x/y.png" });
        let fm = processor
            .process(Path::new("a.md"), map(json!({ "image": image.clone() })))
            .unwrap();
        assert_eq!(fm["image"], image);
        assert!(!fm.contains_key("thumbnailUrl"));
    }

    #[test]
    fn scheme_detection() {
        assert!(has_scheme("https://a/b"));
        assert!(has_scheme("data:image/png;base64,AA"));
        assert!(has_scheme("//cdn/x.png"));
        assert!(!has_scheme("./img/a.png"));
        assert!(!has_scheme("img/a:b.png"));
        assert!(!has_scheme("/abs/x.png"));
    }
}
