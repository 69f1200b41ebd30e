//! Responsive image planning.
//!
//! Combines the width calculations with the variant naming convention into
//! the attribute strings a `<picture>` element needs. Nothing here reads the
//! image; the caller supplies the intrinsic width.

use super::calculations::{sizes, widths_for};
use crate::naming::{AVIF_EXTENSION, variant_url, with_extension};

/// Build a `srcset` value: one `"<url> <width>w"` entry per width.
///
/// ```
/// # use pagefold::imaging::srcset;
/// assert_eq!(
///     srcset("/img/a.jpg", &[360, 500]),
///     "/img/a-360w.jpg 360w, /img/a-500w.jpg 500w"
/// );
/// ```
pub fn srcset(base_url: &str, widths: &[u32]) -> String {
    widths
        .iter()
        .map(|&w| format!("{} {w}w", variant_url(base_url, w)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Everything needed to render one responsive image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponsivePlan {
    /// Ascending widths, intrinsic width last.
    pub widths: Vec<u32>,
    /// `sizes` attribute shared by the base `<img>` and the AVIF `<source>`.
    pub sizes: String,
    /// `srcset` in the source image's own format.
    pub srcset: String,
    /// `srcset` of the AVIF variants.
    pub avif_srcset: String,
}

impl ResponsivePlan {
    /// Plan variants for the image published at `src_url`.
    pub fn new(src_url: &str, intrinsic_width: u32, breakpoints: &[u32]) -> Self {
        let widths = widths_for(intrinsic_width, breakpoints);
        let avif_url = with_extension(src_url, AVIF_EXTENSION);
        Self {
            sizes: sizes(&widths),
            srcset: srcset(src_url, &widths),
            avif_srcset: srcset(&avif_url, &widths),
            widths,
        }
    }
}

/// Whether an image format is delivered as-is, without variants.
///
/// Formats like WebP are already web-compressed and animated GIFs lose their
/// animation when resized, so they get plain `<img>` markup.
pub fn is_passthrough(extension: Option<&str>, passthrough_formats: &[String]) -> bool {
    extension.is_some_and(|ext| {
        passthrough_formats
            .iter()
            .any(|f| f.trim_start_matches('.').eq_ignore_ascii_case(ext))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::DEFAULT_BREAKPOINTS;

    #[test]
    fn srcset_has_one_entry_per_width() {
        let widths = [360, 640, 768, 1024];
        let value = srcset("/post/img/photo.jpg", &widths);
        let entries: Vec<&str> = value.split(", ").collect();
        assert_eq!(entries.len(), widths.len());
        assert!(entries.iter().all(|e| e.ends_with('w')));
    }

    #[test]
    fn srcset_single_width() {
        assert_eq!(srcset("/a/b.png", &[120]), "/a/b-120w.png 120w");
    }

    #[test]
    fn plan_for_jpeg_at_1600() {
        let plan = ResponsivePlan::new("/post/img/photo.jpg", 1600, DEFAULT_BREAKPOINTS);
        assert_eq!(plan.widths, vec![360, 640, 768, 1024, 1366, 1600]);
        assert!(plan.srcset.starts_with("/post/img/photo-360w.jpg 360w, "));
        assert!(plan.srcset.ends_with("/post/img/photo-1600w.jpg 1600w"));
        assert!(plan.avif_srcset.starts_with("/post/img/photo-360w.avif 360w, "));
        assert!(plan.avif_srcset.ends_with("/post/img/photo-1600w.avif 1600w"));
        assert!(plan.sizes.ends_with("1600px"));
    }

    #[test]
    fn plan_avif_entries_match_base_entries() {
        let plan = ResponsivePlan::new("/x/y.png", 900, DEFAULT_BREAKPOINTS);
        assert_eq!(
            plan.srcset.split(", ").count(),
            plan.avif_srcset.split(", ").count()
        );
        assert_eq!(plan.avif_srcset.replace(".avif", ".png"), plan.srcset);
    }

    #[test]
    fn passthrough_matching_is_case_insensitive() {
        let formats = vec!["webp".to_string(), ".gif".to_string()];
        assert!(is_passthrough(Some("webp"), &formats));
        assert!(is_passthrough(Some("GIF"), &formats));
        assert!(!is_passthrough(Some("jpg"), &formats));
        assert!(!is_passthrough(None, &formats));
    }
}
