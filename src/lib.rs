//! # Pagefold
//!
//! Converts markdown documents of a static site into HTML body fragments plus
//! front matter. Two things make it more than a markdown renderer: links
//! between documents follow the site's pretty-URL scheme, and local images
//! become responsive `<picture>` elements pointing at width variants produced
//! by a separate image build step.
//!
//! # Architecture
//!
//! ```text
//!              ┌────────────── Pipeline ───────────────┐
//! source.md ─► │ render_markdown ─► NodeRenderer       │ ─► RenderedDocument
//!              │       │              ├─ links  (paths) │      html
//!              │       │              └─ images (imaging)│      front_matter
//!              │       └─► FrontMatterProcessor         │      warnings
//!              └────────────────────────────────────────┘
//! ```
//!
//! Every component is configured once per site and then only read, so one
//! [`pipeline::Pipeline`] converts any number of documents in parallel.
//! Per-document state lives in a [`render::RenderContext`] created for each
//! call.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`paths`] | Content path ↔ build path ↔ public URL mapping, relative link rewriting |
//! | [`render`] | Markdown event walker with custom link and image nodes |
//! | [`imaging`] | Breakpoint widths, `srcset`/`sizes`, image probing backends |
//! | [`naming`] | Variant filename convention (`photo-640w.jpg`) |
//! | [`front_matter`] | Embedded TOML/YAML blocks, defaults merge, computed fields |
//! | [`pipeline`] | Per-document orchestration and parallel batch conversion |
//! | [`discover`] | Expands CLI arguments, walking directories for `*.md` |
//! | [`config`] | `pagefold.toml` loading, merging onto stock defaults, validation |
//! | [`html`] | URL filtering and the eager-first-image post-pass |
//! | [`types`] | [`types::RenderedDocument`], the pipeline's output |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Pretty URLs
//!
//! A document renders into a directory of its own (`blog/hello.md` →
//! `/blog/hello/`), so sibling documents are always one level up from each
//! other. That is why relative links get a `../` prefix. See [`paths`].
//!
//! ## Variants Are Named, Not Made
//!
//! The renderer never resizes anything. It reads an image's header for the
//! intrinsic size, then references `name-{width}w.ext` and
//! `name-{width}w.avif` for every breakpoint below that size. Producing those
//! files is the image build step's job; both sides share [`naming`] and
//! [`imaging::widths_for`].
//!
//! ## Maud For Markup
//!
//! Link and figure markup is built with [Maud](https://maud.lambda.xyz/), so
//! alt text, titles, and URLs are escaped by construction. The rest of the
//! document goes through `pulldown-cmark`'s own HTML writer.
//!
//! ## One Bad Image Does Not Sink A Page
//!
//! If an image cannot be probed, the default policy renders a plain `<img>`
//! and records a warning on the document. `on_error = "strict"` turns this
//! into an error for CI builds.

pub mod config;
pub mod discover;
pub mod front_matter;
pub mod html;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod paths;
pub mod pipeline;
pub mod render;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
