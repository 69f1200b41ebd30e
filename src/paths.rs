//! Mapping between content paths, build paths, and public URLs.
//!
//! Three coordinate systems describe the same page:
//!
//! ```text
//! content/blog/hello.md     ContentPath  (source document)
//! build/blog/hello/         BuildPath    (directory holding index.html)
//! /blog/hello/              PublicURL    (what links point at)
//! ```
//!
//! ## Pretty URLs
//!
//! A document named `index.md` renders into its parent directory; every other
//! document gets a directory of its own named after the file stem. Public URLs
//! therefore never carry a filename or extension and always end in `/`:
//!
//! | Content | Build dir | URL |
//! |---|---|---|
//! | `foo/bar.md` | `build/foo/bar/` | `/foo/bar/` |
//! | `foo/index.md` | `build/foo/` | `/foo/` |
//! | `index.md` | `build/` | `/` |
//!
//! All resolution here is lexical: `.` and `..` segments are folded without
//! touching the filesystem, except where the caller asks for the target to
//! exist ([`Existence::Required`]).
//!
//! URL segments are percent-encoded, so a file named `my photo.jpg` is served
//! as `/post/my%20photo.jpg` and stays a single `srcset` candidate.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Filename that renders into its parent directory instead of its own.
pub const INDEX_MARKER: &str = "index.md";

/// Extension of markdown content documents.
pub const MARKDOWN_EXTENSION: &str = "md";

#[derive(Error, Debug)]
pub enum PathError {
    #[error("{} is outside the content root {}", path.display(), root.display())]
    OutsideContentRoot { path: PathBuf, root: PathBuf },
    #[error("{} is outside the build root {}", path.display(), root.display())]
    OutsideBuildRoot { path: PathBuf, root: PathBuf },
    #[error("{} does not exist", path.display())]
    NotFound { path: PathBuf },
    #[error("{} does not name a document", path.display())]
    NotADocument { path: PathBuf },
}

/// Whether [`SitePaths::resolve_relative`] must see the target on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Existence {
    Required,
    Optional,
}

/// Content and build roots of a site, plus every mapping between them.
///
/// Immutable after construction and cheap to share between threads.
///
/// Document paths may be given either under `content_dir` or relative to it:
/// `content/blog/hello.md` and `blog/hello.md` name the same document when
/// `content_dir` is `content`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    content_dir: PathBuf,
    build_dir: PathBuf,
}

impl SitePaths {
    pub fn new(content_dir: impl Into<PathBuf>, build_dir: impl Into<PathBuf>) -> Self {
        Self {
            content_dir: normalize(&content_dir.into()),
            build_dir: normalize(&build_dir.into()),
        }
    }

    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }

    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Path of a document or asset relative to the content root.
    ///
    /// Fails if the path leaves the root after `..` segments are folded.
    pub fn content_relative(&self, path: &Path) -> Result<PathBuf, PathError> {
        let normalized = normalize(path);
        let relative = match normalized.strip_prefix(&self.content_dir) {
            Ok(stripped) => stripped.to_path_buf(),
            Err(_) if normalized.is_relative() => normalized.clone(),
            Err(_) => return Err(self.outside_content(normalized)),
        };
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(self.outside_content(normalized));
        }
        Ok(relative)
    }

    /// Full path of a content document or asset (content root joined in).
    pub fn content_path(&self, path: &Path) -> Result<PathBuf, PathError> {
        Ok(join_relative(&self.content_dir, &self.content_relative(path)?))
    }

    /// Directory a document renders into.
    ///
    /// `foo/index.md` → `build/foo`, `foo/bar.md` → `build/foo/bar`.
    pub fn content_to_build_dir(&self, path: &Path) -> Result<PathBuf, PathError> {
        let relative = self.content_relative(path)?;
        let Some(file_name) = relative.file_name() else {
            return Err(PathError::NotADocument {
                path: path.to_path_buf(),
            });
        };
        let dir = if file_name == OsStr::new(INDEX_MARKER) {
            relative.parent().map(Path::to_path_buf).unwrap_or_default()
        } else {
            relative.with_extension("")
        };
        Ok(join_relative(&self.build_dir, &dir))
    }

    /// Build-tree location of a content asset (images are mirrored as-is).
    pub fn content_to_build_path(&self, path: &Path) -> Result<PathBuf, PathError> {
        Ok(join_relative(&self.build_dir, &self.content_relative(path)?))
    }

    /// Public URL of a build directory: `"/" + relative + "/"`.
    ///
    /// The build root itself maps to `/`.
    pub fn build_dir_to_url(&self, dir: &Path) -> Result<String, PathError> {
        let relative = self.build_relative(dir)?;
        let joined = url_segments(&relative);
        if joined.is_empty() {
            Ok("/".to_string())
        } else {
            Ok(format!("/{joined}/"))
        }
    }

    /// Public URL of the page rendered from a content document.
    pub fn content_to_url(&self, path: &Path) -> Result<String, PathError> {
        self.build_dir_to_url(&self.content_to_build_dir(path)?)
    }

    /// Public pathname of a content asset, extension kept: `/post/img/photo.jpg`.
    pub fn path_to_url_pathname(&self, path: &Path) -> Result<String, PathError> {
        Ok(format!("/{}", url_segments(&self.content_relative(path)?)))
    }

    /// Public pathname of a file in the build tree: `/post/img/photo-250w.jpg`.
    pub fn build_path_to_url(&self, path: &Path) -> Result<String, PathError> {
        Ok(format!("/{}", url_segments(&self.build_relative(path)?)))
    }

    /// Resolve a reference written inside `from_document` to a full path.
    ///
    /// The reference is joined onto the document's directory and folded
    /// lexically. The result must stay under the content root; with
    /// [`Existence::Required`] it must also exist on disk.
    pub fn resolve_relative(
        &self,
        reference: &str,
        from_document: &Path,
        existence: Existence,
    ) -> Result<PathBuf, PathError> {
        let document = self.content_path(from_document)?;
        let base = document.parent().unwrap_or(&self.content_dir);
        let resolved = normalize(&base.join(reference));
        if !resolved.starts_with(&self.content_dir) {
            return Err(self.outside_content(resolved));
        }
        if existence == Existence::Required && !resolved.exists() {
            return Err(PathError::NotFound { path: resolved });
        }
        Ok(resolved)
    }

    fn build_relative(&self, path: &Path) -> Result<PathBuf, PathError> {
        let normalized = normalize(path);
        match normalized.strip_prefix(&self.build_dir) {
            Ok(stripped) => Ok(stripped.to_path_buf()),
            Err(_) => Err(PathError::OutsideBuildRoot {
                path: normalized,
                root: self.build_dir.clone(),
            }),
        }
    }

    fn outside_content(&self, path: PathBuf) -> PathError {
        PathError::OutsideContentRoot {
            path,
            root: self.content_dir.clone(),
        }
    }
}

/// Rewrite a relative markdown link for use inside the rendered page.
///
/// Every page lives one directory below its siblings under the pretty-URL
/// scheme, hence the `../` prefix:
///
/// - `./a/b.md` → `../a/b/`
/// - `./a/index.md` → `../a/`
/// - `./files/doc.pdf` → `../files/doc.pdf`
///
/// A `#fragment` is carried over after the rewritten path.
pub fn rewrite_relative_link(link: &str) -> String {
    let (path, fragment) = match link.find('#') {
        Some(hash) => link.split_at(hash),
        None => (link, ""),
    };
    let path = path.strip_prefix("./").unwrap_or(path);
    let markdown_suffix = format!(".{MARKDOWN_EXTENSION}");

    let rewritten = if path == INDEX_MARKER {
        String::new()
    } else if let Some(dir) = path.strip_suffix(INDEX_MARKER).filter(|d| d.ends_with('/')) {
        dir.to_string()
    } else if let Some(stem) = path.strip_suffix(&markdown_suffix) {
        format!("{stem}/")
    } else {
        path.to_string()
    };
    format!("../{rewritten}{fragment}")
}

/// Whether a link or image target is document-relative (`./`, `../`).
pub fn is_relative_reference(target: &str) -> bool {
    target.starts_with('.')
}

/// Fold `.` and `..` segments without touching the filesystem.
///
/// `..` never climbs above a root; on relative paths a leading `..` that
/// cannot be folded is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn join_relative(root: &Path, relative: &Path) -> PathBuf {
    if relative.as_os_str().is_empty() {
        root.to_path_buf()
    } else {
        root.join(relative)
    }
}

/// Bytes escaped inside one URL path segment. Whitespace and `,` would split
/// a `srcset` candidate.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b',')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn url_segments(relative: &Path) -> String {
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(segment) => {
                Some(utf8_percent_encode(&segment.to_string_lossy(), SEGMENT).to_string())
            }
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
