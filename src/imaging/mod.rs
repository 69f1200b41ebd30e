//! Image planning for responsive markup.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions`, `avif-parse` |
//! | **Widths** | [`widths_for`] over a breakpoint ladder |
//! | **Attributes** | [`sizes`], [`srcset`], [`ResponsivePlan`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for width math (unit testable)
//! - **Responsive**: Attribute strings combining calculations + naming
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//!
//! Resizing and format conversion happen in a separate build step; this
//! module only names the files that step produces.

pub mod backend;
mod calculations;
pub mod responsive;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{DEFAULT_BREAKPOINTS, sizes, widths_for};
pub use responsive::{ResponsivePlan, is_passthrough, srcset};
pub use rust_backend::RustBackend;
