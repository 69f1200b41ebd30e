//! Expand CLI arguments into the list of documents to convert.
//!
//! Files are taken as given. Directories are walked recursively for `*.md`
//! files, skipping hidden entries (`.drafts/`, `.DS_Store`). The result is
//! sorted and free of duplicates so output order is stable across runs.

use crate::paths::MARKDOWN_EXTENSION;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("{} does not exist", .0.display())]
    Missing(PathBuf),
    #[error("failed to walk {}: {source}", root.display())]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Markdown documents named by `inputs`, directories expanded.
pub fn find_documents(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, DiscoverError> {
    let mut documents = Vec::new();
    for input in inputs {
        if input.is_dir() {
            walk_markdown(input, &mut documents)?;
        } else if input.is_file() {
            documents.push(input.clone());
        } else {
            return Err(DiscoverError::Missing(input.clone()));
        }
    }
    documents.sort();
    documents.dedup();
    Ok(documents)
}

fn walk_markdown(root: &Path, documents: &mut Vec<PathBuf>) -> Result<(), DiscoverError> {
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = entry.map_err(|source| DiscoverError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            documents.push(entry.into_path());
        }
    }
    Ok(())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(MARKDOWN_EXTENSION))
}
