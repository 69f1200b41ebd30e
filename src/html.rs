//! Small HTML string helpers shared by the node renderers and the pipeline.

use std::borrow::Cow;

/// Replacement href for URLs with a script-capable or local-file scheme.
pub const HARMFUL_LINK: &str = "#harmful-link";

const HARMFUL_PROTOCOLS: &[&str] = &["javascript:", "vbscript:", "file:", "data:"];
const ALLOWED_DATA_URLS: &[&str] = &[
    "data:image/gif",
    "data:image/png",
    "data:image/jpeg",
    "data:image/webp",
];

/// Filter a link or image URL for use in an attribute.
///
/// URLs with a harmful scheme become [`HARMFUL_LINK`]; inline raster images
/// (`data:image/png` and friends) are allowed. Escaping is left to the markup
/// writer.
#[must_use]
pub fn safe_url(url: &str) -> &str {
    let lowered = url.trim_start().to_ascii_lowercase();
    let harmful = HARMFUL_PROTOCOLS.iter().any(|p| lowered.starts_with(p))
        && !ALLOWED_DATA_URLS.iter().any(|p| lowered.starts_with(p));
    if harmful { HARMFUL_LINK } else { url }
}

/// Drop `loading="lazy"` from the first `<img>` tag of a document.
///
/// Above-the-fold images should load immediately. Only the first `<img>` is
/// considered; if it carries no lazy attribute the HTML is returned as-is.
pub fn remove_first_lazy_loading(html: &str) -> Cow<'_, str> {
    const LAZY: &str = r#" loading="lazy""#;

    let Some(start) = html.find("<img") else {
        return Cow::Borrowed(html);
    };
    let Some(tag_len) = html[start..].find('>') else {
        return Cow::Borrowed(html);
    };
    let tag = &html[start..start + tag_len];
    let Some(offset) = tag.find(LAZY) else {
        return Cow::Borrowed(html);
    };
    let at = start + offset;
    let mut out = String::with_capacity(html.len() - LAZY.len());
    out.push_str(&html[..at]);
    out.push_str(&html[at + LAZY.len()..]);
    Cow::Owned(out)
}
