//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Each document is listed by its semantic identity first: positional index,
//! title, and the URL it will be served at. The source path, metadata keys,
//! and warnings follow as indented context lines.
//!
//! ## Render
//!
//! ```text
//! 001 Hello → /blog/hello/
//!     Source: content/blog/hello.md
//!     Image: /blog/img/cover.jpg
//!     Thumbnail: /blog/img/cover-250w.jpg
//!     Metadata: title, image, url, thumbnailUrl
//! 002 (about.md) → /about/
//!     Source: content/about.md
//!     Warning: cannot read image …
//! 003 (broken.md) failed
//!     Source: content/broken.md
//!     Error: … is outside the content root …
//!
//! Rendered 2 documents, 1 failed, 1 warning
//! ```
//!
//! ## Check
//!
//! Only documents with problems are listed, followed by the same summary.
//!
//! # Architecture
//!
//! `format_*` functions return lines and are pure; `print_*` wrappers write
//! them to stdout.

use crate::pipeline::PipelineError;
use crate::types::RenderedDocument;
use std::path::{Path, PathBuf};

type Outcome = Result<RenderedDocument, PipelineError>;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `title` when the document has one, else its filename in parens.
fn document_label(title: Option<&str>, source: &Path) -> String {
    match title {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            let name = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| source.display().to_string());
            format!("({name})")
        }
    }
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Lines for one successfully rendered document.
pub fn format_document(index: usize, doc: &RenderedDocument) -> Vec<String> {
    let pad = indent(1);
    let label = document_label(doc.title(), &doc.source);
    let mut lines = vec![match doc.url() {
        Some(url) => format!("{} {label} → {url}", format_index(index)),
        None => format!("{} {label}", format_index(index)),
    }];
    lines.push(format!("{pad}Source: {}", doc.source.display()));

    let text = |key: &str| doc.front_matter.get(key).and_then(|v| v.as_str());
    if let Some(image) = text("image") {
        lines.push(format!("{pad}Image: {image}"));
    }
    if let Some(thumb) = text("thumbnailUrl").filter(|t| Some(*t) != text("image")) {
        lines.push(format!("{pad}Thumbnail: {thumb}"));
    }

    let keys: Vec<&str> = doc.front_matter.keys().map(String::as_str).collect();
    lines.push(format!("{pad}Metadata: {}", keys.join(", ")));

    for warning in &doc.warnings {
        lines.push(format!("{pad}Warning: {warning}"));
    }
    lines
}

/// Lines for a document that could not be rendered.
pub fn format_failure(index: usize, source: &Path, error: &PipelineError) -> Vec<String> {
    let pad = indent(1);
    vec![
        format!("{} {} failed", format_index(index), document_label(None, source)),
        format!("{pad}Source: {}", source.display()),
        format!("{pad}Error: {error}"),
    ]
}

/// `Rendered 3 documents, 1 failed, 2 warnings`.
pub fn format_summary(verb: &str, results: &[Outcome]) -> String {
    let failed = results.iter().filter(|r| r.is_err()).count();
    let warnings: usize = results
        .iter()
        .filter_map(|r| r.as_ref().ok())
        .map(|doc| doc.warnings.len())
        .sum();
    let rendered = results.len() - failed;

    let mut parts = vec![format!("{verb} {}", plural(rendered, "document"))];
    if failed > 0 {
        parts.push(format!("{failed} failed"));
    }
    if warnings > 0 {
        parts.push(plural(warnings, "warning"));
    }
    parts.join(", ")
}

/// Inventory of every document plus the summary line.
pub fn format_render_output(documents: &[PathBuf], results: &[Outcome]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, (source, result)) in documents.iter().zip(results).enumerate() {
        match result {
            Ok(doc) => lines.extend(format_document(i + 1, doc)),
            Err(e) => lines.extend(format_failure(i + 1, source, e)),
        }
    }
    lines.push(String::new());
    lines.push(format_summary("Rendered", results));
    lines
}

/// Only the documents with warnings or errors, plus the summary line.
pub fn format_check_output(documents: &[PathBuf], results: &[Outcome]) -> Vec<String> {
    let mut lines = Vec::new();
    for (i, (source, result)) in documents.iter().zip(results).enumerate() {
        match result {
            Ok(doc) if doc.warnings.is_empty() => {}
            Ok(doc) => lines.extend(format_document(i + 1, doc)),
            Err(e) => lines.extend(format_failure(i + 1, source, e)),
        }
    }
    if !lines.is_empty() {
        lines.push(String::new());
    }
    lines.push(format_summary("Checked", results));
    lines
}

pub fn print_render_output(documents: &[PathBuf], results: &[Outcome]) {
    for line in format_render_output(documents, results) {
        println!("{line}");
    }
}

pub fn print_check_output(documents: &[PathBuf], results: &[Outcome]) {
    for line in format_check_output(documents, results) {
        println!("{line}");
    }
}
