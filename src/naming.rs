//! Centralized filename convention for responsive image variants.
//!
//! Every resized copy of a source image lives next to the original and is
//! named by inserting a width marker before the extension:
//!
//! ```text
//! photo.jpg   @ 640  →  photo-640w.jpg
//! photo.jpg   @ 640  →  photo-640w.avif   (format variant)
//! ```
//!
//! The external variant-generation step names its outputs with exactly the
//! same rule, so every URL built here must go through these functions. A
//! mismatch is a 404 on the published site.
//!
//! Format variants substitute the extension first, then insert the marker.

use std::path::{Path, PathBuf};

/// Extension used for the modern-format `<source>` variant.
pub const AVIF_EXTENSION: &str = "avif";

/// Insert the `-<width>w` marker before the extension of a filesystem path.
///
/// - `content/post/photo.jpg` @ 640 → `content/post/photo-640w.jpg`
/// - `content/post/photo` @ 640 → `content/post/photo-640w`
pub fn variant_path(path: &Path, width: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}-{width}w.{}", ext.to_string_lossy()),
        None => format!("{stem}-{width}w"),
    };
    path.with_file_name(name)
}

/// Insert the `-<width>w` marker into the last segment of a URL pathname.
///
/// Only the final segment is touched, so dots in directory names survive:
/// `/v1.2/img/photo.jpg` @ 360 → `/v1.2/img/photo-360w.jpg`.
pub fn variant_url(url: &str, width: u32) -> String {
    let (dir, file) = split_last_segment(url);
    match file.rfind('.') {
        Some(dot) if dot > 0 => format!("{dir}{}-{width}w{}", &file[..dot], &file[dot..]),
        _ => format!("{dir}{file}-{width}w"),
    }
}

/// Replace the extension of the last URL segment (`photo.jpg` → `photo.avif`).
///
/// A segment without an extension gets one appended.
pub fn with_extension(url: &str, extension: &str) -> String {
    let (dir, file) = split_last_segment(url);
    match file.rfind('.') {
        Some(dot) if dot > 0 => format!("{dir}{}.{extension}", &file[..dot]),
        _ => format!("{dir}{file}.{extension}"),
    }
}

/// Lower-cased extension of the last URL or path segment, without the dot.
pub fn extension_of(url: &str) -> Option<String> {
    let (_, file) = split_last_segment(url);
    match file.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < file.len() => Some(file[dot + 1..].to_ascii_lowercase()),
        _ => None,
    }
}

fn split_last_segment(url: &str) -> (&str, &str) {
    match url.rfind('/') {
        Some(slash) => url.split_at(slash + 1),
        None => ("", url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_path_inserts_width_marker() {
        assert_eq!(
            variant_path(Path::new("content/post/photo.jpg"), 640),
            PathBuf::from("content/post/photo-640w.jpg")
        );
    }

    #[test]
    fn variant_path_without_extension() {
        assert_eq!(
            variant_path(Path::new("content/photo"), 360),
            PathBuf::from("content/photo-360w")
        );
    }

    #[test]
    fn variant_path_keeps_inner_dots_in_stem() {
        assert_eq!(
            variant_path(Path::new("img/my.photo.png"), 250),
            PathBuf::from("img/my.photo-250w.png")
        );
    }

    #[test]
    fn variant_url_inserts_width_marker() {
        assert_eq!(variant_url("/post/img/photo.jpg", 640), "/post/img/photo-640w.jpg");
    }

    #[test]
    fn variant_url_ignores_dots_in_directories() {
        assert_eq!(variant_url("/v1.2/img/photo.jpg", 360), "/v1.2/img/photo-360w.jpg");
        assert_eq!(variant_url("/v1.2/img/photo", 360), "/v1.2/img/photo-360w");
    }

    #[test]
    fn avif_variant_substitutes_extension_then_width() {
        let avif = with_extension("/post/img/photo.jpg", AVIF_EXTENSION);
        assert_eq!(avif, "/post/img/photo.avif");
        assert_eq!(variant_url(&avif, 1024), "/post/img/photo-1024w.avif");
    }

    #[test]
    fn with_extension_appends_when_missing() {
        assert_eq!(with_extension("/img/photo", "avif"), "/img/photo.avif");
    }

    #[test]
    fn extension_of_is_lowercase() {
        assert_eq!(extension_of("/img/Photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(extension_of("/img/anim.gif").as_deref(), Some("gif"));
    }

    #[test]
    fn extension_of_dotfile_or_bare_name_is_none() {
        assert_eq!(extension_of("/img/.hidden"), None);
        assert_eq!(extension_of("/img/photo"), None);
        assert_eq!(extension_of("/img/photo."), None);
    }
}
