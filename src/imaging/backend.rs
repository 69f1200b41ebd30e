//! Image probing backend trait and shared types.
//!
//! The pipeline never touches pixels. It only needs the intrinsic size of a
//! local image to plan its variants, so the [`ImageBackend`] trait has a single
//! operation: identify.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), which reads image
//! headers with the `image` crate (and `avif-parse` for AVIF containers).

use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unreadable image: {0}")]
    Unreadable(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Trait for image probing backends.
///
/// Backends are shared by every document rendered in parallel, hence `Sync`.
pub trait ImageBackend: Sync {
    /// Get intrinsic image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;
}

impl<B: ImageBackend + ?Sized> ImageBackend for &B {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        (**self).identify(path)
    }
}
