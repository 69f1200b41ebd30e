//! Shared test utilities for the pagefold test suite.
//!
//! Provides a throwaway site layout on disk plus synthetic images, so tests
//! exercise real path resolution and real image probing.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let site = TestSite::new();
//! site.write_content("post/index.md", "![alt](./img/photo.jpg)");
//! site.write_content_image("post/img/photo.jpg", 1600, 900);
//!
//! let pipeline = site.pipeline(RustBackend::new());
//! let doc = pipeline.convert_file(Path::new("post/index.md")).unwrap();
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::front_matter::{FrontMatter, FrontMatterProcessor};
use crate::imaging::ImageBackend;
use crate::paths::SitePaths;
use crate::pipeline::Pipeline;
use crate::render::ResponsiveRenderer;

// =========================================================================
// Fixture setup
// =========================================================================

/// A temporary site root with `content/` and `build/` directories.
pub struct TestSite {
    /// Keeps the directory alive for the fixture's lifetime.
    _tmp: TempDir,
    paths: SitePaths,
}

impl TestSite {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let content = tmp.path().join("content");
        let build = tmp.path().join("build");
        std::fs::create_dir_all(&content).unwrap();
        std::fs::create_dir_all(&build).unwrap();
        Self {
            paths: SitePaths::new(content, build),
            _tmp: tmp,
        }
    }

    pub fn paths(&self) -> SitePaths {
        self.paths.clone()
    }

    pub fn content_dir(&self) -> &Path {
        self.paths.content_dir()
    }

    pub fn build_dir(&self) -> &Path {
        self.paths.build_dir()
    }

    /// Write a text file under `content/`, creating parent directories.
    pub fn write_content(&self, relative: &str, text: &str) -> PathBuf {
        let path = self.content_dir().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, text).unwrap();
        path
    }

    /// Write a real image of the given size under `content/`.
    pub fn write_content_image(&self, relative: &str, width: u32, height: u32) -> PathBuf {
        let path = self.content_dir().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        write_image(&path, width, height);
        path
    }

    /// Create an (empty) file under `build/`, e.g. a generated variant.
    pub fn write_build_file(&self, relative: &str) -> PathBuf {
        let path = self.build_dir().join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"").unwrap();
        path
    }

    pub fn front_matter_processor(&self, defaults: FrontMatter) -> FrontMatterProcessor {
        FrontMatterProcessor::new(defaults, self.paths(), 250)
    }

    pub fn renderer<B: ImageBackend>(&self, backend: B) -> ResponsiveRenderer<B> {
        ResponsiveRenderer::new(self.paths(), backend)
    }

    /// Pipeline over this site with stock settings.
    pub fn pipeline<B: ImageBackend>(&self, backend: B) -> Pipeline<ResponsiveRenderer<B>> {
        self.pipeline_with_config(&SiteConfig::default(), backend)
    }

    pub fn pipeline_with_config<B: ImageBackend>(
        &self,
        config: &SiteConfig,
        backend: B,
    ) -> Pipeline<ResponsiveRenderer<B>> {
        Pipeline::with_backend(config, self.paths(), backend)
    }
}

/// Write a synthetic image; the format follows the file extension.
pub fn write_image(path: &Path, width: u32, height: u32) {
    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    img.save(path).unwrap();
}
