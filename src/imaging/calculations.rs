//! Pure calculation functions for responsive widths.
//!
//! All functions here are pure and testable without any I/O or images.
//!
//! ## Breakpoint ladder
//!
//! [`DEFAULT_BREAKPOINTS`] covers common device widths from small phones to
//! full-HD desktops. A site may configure its own ladder; whatever ladder is
//! used, [`widths_for`] and [`sizes`] must be fed the same one.
//!
//! ## `sizes` mapping
//!
//! Every generated width except the largest becomes a viewport condition of
//! the same value, and the largest is the unconditional fallback:
//!
//! ```text
//! [360, 640, 1000] → "(max-width: 360px) 360px, (max-width: 640px) 640px, 1000px"
//! ```
//!
//! The image is never displayed wider than the viewport, so a viewport of at
//! most `W` pixels picks the `W` variant.

/// Standard image widths variants are generated at.
pub const DEFAULT_BREAKPOINTS: &[u32] = &[360, 640, 768, 1024, 1366, 1600, 1920];

/// Calculate which widths to reference for an image of `intrinsic_width`.
///
/// Returns the breakpoints that do not exceed the intrinsic width, in
/// ascending order, followed by the intrinsic width itself when it is not a
/// breakpoint already. Nothing is ever upscaled, and the original resolution
/// is always the last entry.
///
/// # Examples
/// ```
/// # use pagefold::imaging::widths_for;
/// assert_eq!(widths_for(700, &[360, 640, 768]), vec![360, 640, 700]);
/// assert_eq!(widths_for(200, &[360, 640, 768]), vec![200]);
/// ```
pub fn widths_for(intrinsic_width: u32, breakpoints: &[u32]) -> Vec<u32> {
    let mut widths: Vec<u32> = breakpoints
        .iter()
        .copied()
        .filter(|&w| w > 0 && w < intrinsic_width)
        .collect();
    widths.sort_unstable();
    widths.dedup();
    if intrinsic_width > 0 {
        widths.push(intrinsic_width);
    }
    widths
}

/// Build the `sizes` attribute value for a set of ascending widths.
///
/// See the [module docs](self) for the mapping.
pub fn sizes(widths: &[u32]) -> String {
    let Some((largest, rest)) = widths.split_last() else {
        return String::new();
    };
    rest.iter()
        .map(|w| format!("(max-width: {w}px) {w}px"))
        .chain(std::iter::once(format!("{largest}px")))
        .collect::<Vec<_>>()
        .join(", ")
}
