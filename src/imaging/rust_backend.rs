//! Header-only image probing on the `image` crate.
//!
//! The format is sniffed from the file's leading bytes, falling back to the
//! extension when the signature is unknown. Only headers are read.
//!
//! | Format | Probe |
//! |---|---|
//! | JPEG, PNG, TIFF, WebP, GIF | `ImageReader::into_dimensions` |
//! | AVIF | `avif-parse`, from the container's `ispe` property |
//!
//! AVIF needs its own path: without the C-backed `avif-native` feature the
//! `image` crate can write AVIF but not read it.

use super::backend::{BackendError, Dimensions, ImageBackend};
use image::{ImageFormat, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Probes local files with the `image` crate and `avif-parse`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        if reader.format() == Some(ImageFormat::Avif) {
            return avif_dimensions(path);
        }
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| BackendError::Unreadable(format!("{}: {e}", path.display())))?;
        Ok(Dimensions { width, height })
    }
}

fn avif_dimensions(path: &Path) -> Result<Dimensions, BackendError> {
    let unreadable = |what: &str, detail: String| {
        BackendError::Unreadable(format!("{}: {what}: {detail}", path.display()))
    };
    let mut file = BufReader::new(File::open(path)?);
    let avif = avif_parse::read_avif(&mut file)
        .map_err(|e| unreadable("invalid AVIF container", format!("{e:?}")))?;
    let meta = avif
        .primary_item_metadata()
        .map_err(|e| unreadable("missing AVIF image metadata", format!("{e:?}")))?;
    Ok(Dimensions {
        width: meta.max_frame_width.get(),
        height: meta.max_frame_height.get(),
    })
}
