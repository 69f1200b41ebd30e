//! Markdown rendering with custom link and image nodes.
//!
//! Documents are parsed with `pulldown-cmark`. Links, images, and the front
//! matter block are lifted out of the event stream and handed to a
//! [`NodeRenderer`]; everything else goes through the stock HTML writer.
//!
//! ## Links
//!
//! | Target | Output |
//! |---|---|
//! | `./other.md` | `<a href="../other/">` (see [`rewrite_relative_link`]) |
//! | `https://…`, `/about/` | `<a href="…" target="_blank" rel="noopener">` |
//! | `#notes` | `<a href="#notes">`, in-page, unchanged |
//! | bare `https://…` in text | autolinked, then as above |
//!
//! ## Images
//!
//! Every image renders as a captioned figure:
//!
//! ```text
//! <figure>
//!   <picture>
//!     <source type="image/avif" srcset="…-360w.avif 360w, …" sizes="…">
//!     <img src="/post/img/photo.jpg" width="1600" height="900" alt="alt"
//!          loading="lazy" srcset="…-360w.jpg 360w, …" sizes="…">
//!   </picture>
//!   <figcaption>alt</figcaption>
//! </figure>
//! ```
//!
//! maud writes void elements in HTML form (`<img …>`, `<source …>`), never
//! the XHTML `<img … />`.
//!
//! Remote images get a bare `<img>`. Pass-through formats (WebP, GIF) get
//! dimensions but no variants. Local images are probed through an
//! [`ImageBackend`]; when probing fails the [`ImagePolicy`] decides between a
//! degraded plain `<img>` and a hard error.

use crate::config::{ImagePolicy, MarkdownConfig, SiteConfig};
use crate::front_matter::{EmbeddedBlock, MetadataFormat};
use crate::html::safe_url;
use crate::imaging::{
    BackendError, DEFAULT_BREAKPOINTS, Dimensions, ImageBackend, ResponsivePlan, is_passthrough,
};
use crate::naming::extension_of;
use crate::paths::{Existence, PathError, SitePaths, is_relative_reference, rewrite_relative_link};
use linkify::{LinkFinder, LinkKind};
use maud::{Markup, PreEscaped, html};
use pulldown_cmark::{CowStr, Event, LinkType, Parser, Tag, TagEnd, TextMergeStream};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
#[error(
    "cannot read image {} referenced from {}: {source}",
    image.display(),
    document.display()
)]
pub struct ImageReadError {
    pub document: PathBuf,
    pub image: PathBuf,
    #[source]
    pub source: BackendError,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    Path(#[from] PathError),
    #[error(transparent)]
    ImageRead(#[from] ImageReadError),
}

/// Per-document state handed to every node callback.
///
/// Created fresh for each render, so renderers themselves stay immutable and
/// can be shared across threads.
#[derive(Debug)]
pub struct RenderContext<'a> {
    document: &'a Path,
    warnings: Vec<String>,
}

impl<'a> RenderContext<'a> {
    pub fn new(document: &'a Path) -> Self {
        Self {
            document,
            warnings: Vec::new(),
        }
    }

    /// The document being rendered, as the caller named it.
    pub fn document(&self) -> &'a Path {
        self.document
    }

    /// Record a non-fatal problem with this document.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn into_warnings(self) -> Vec<String> {
        self.warnings
    }
}

/// A markdown link, with its label already rendered to HTML.
#[derive(Debug, Clone, Copy)]
pub struct LinkNode<'a> {
    pub dest: &'a str,
    pub title: &'a str,
    /// Rendered inner HTML; empty for `[](target)`.
    pub label: &'a str,
}

/// A markdown image.
#[derive(Debug, Clone, Copy)]
pub struct ImageNode<'a> {
    pub src: &'a str,
    pub title: &'a str,
    /// Plain text of the alt description (unescaped).
    pub alt: &'a str,
}

/// Custom HTML for the nodes the site treats specially.
pub trait NodeRenderer {
    fn link(&self, cx: &mut RenderContext<'_>, link: &LinkNode<'_>) -> Result<String, RenderError>;
    fn image(&self, cx: &mut RenderContext<'_>, image: &ImageNode<'_>)
    -> Result<String, RenderError>;
}

impl<R: NodeRenderer + ?Sized> NodeRenderer for &R {
    fn link(&self, cx: &mut RenderContext<'_>, link: &LinkNode<'_>) -> Result<String, RenderError> {
        (**self).link(cx, link)
    }

    fn image(
        &self,
        cx: &mut RenderContext<'_>,
        image: &ImageNode<'_>,
    ) -> Result<String, RenderError> {
        (**self).image(cx, image)
    }
}

// ============================================================================
// Responsive renderer
// ============================================================================

/// The site's node renderer: pretty-URL links and responsive figures.
#[derive(Debug, Clone)]
pub struct ResponsiveRenderer<B> {
    paths: SitePaths,
    backend: B,
    breakpoints: Vec<u32>,
    passthrough_formats: Vec<String>,
    policy: ImagePolicy,
}

impl<B: ImageBackend> ResponsiveRenderer<B> {
    /// Renderer with the stock breakpoints, pass-through formats, and policy.
    pub fn new(paths: SitePaths, backend: B) -> Self {
        Self {
            paths,
            backend,
            breakpoints: DEFAULT_BREAKPOINTS.to_vec(),
            passthrough_formats: vec!["webp".to_string(), "gif".to_string()],
            policy: ImagePolicy::default(),
        }
    }

    pub fn from_config(config: &SiteConfig, paths: SitePaths, backend: B) -> Self {
        Self {
            breakpoints: config.images.breakpoints.clone(),
            passthrough_formats: config.images.passthrough_formats.clone(),
            policy: config.images.on_error,
            ..Self::new(paths, backend)
        }
    }

    pub fn with_policy(mut self, policy: ImagePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_breakpoints(mut self, breakpoints: Vec<u32>) -> Self {
        self.breakpoints = breakpoints;
        self
    }

    fn local_image(
        &self,
        cx: &mut RenderContext<'_>,
        image: &ImageNode<'_>,
    ) -> Result<Markup, RenderError> {
        let title = non_empty(image.title);
        let source = self
            .paths
            .resolve_relative(image.src, cx.document(), Existence::Optional)?;
        let src = self.paths.path_to_url_pathname(&source)?;

        let dimensions = match self.backend.identify(&source) {
            Ok(dimensions) => dimensions,
            Err(source_error) => {
                let error = ImageReadError {
                    document: cx.document().to_path_buf(),
                    image: source,
                    source: source_error,
                };
                return match self.policy {
                    ImagePolicy::Strict => Err(error.into()),
                    ImagePolicy::Degrade => {
                        tracing::warn!(
                            document = %error.document.display(),
                            image = %error.image.display(),
                            error = %error.source,
                            "Rendering image without responsive attributes"
                        );
                        cx.warn(error.to_string());
                        Ok(img(&src, None, image.alt, title, None))
                    }
                };
            }
        };

        let extension = extension_of(&src);
        if is_passthrough(extension.as_deref(), &self.passthrough_formats) {
            return Ok(img(&src, Some(dimensions), image.alt, title, None));
        }

        let plan = ResponsivePlan::new(&src, dimensions.width, &self.breakpoints);
        Ok(html! {
            source type="image/avif" srcset=(plan.avif_srcset) sizes=(plan.sizes);
            (img(&src, Some(dimensions), image.alt, title, Some(&plan)))
        })
    }
}

impl<B: ImageBackend> NodeRenderer for ResponsiveRenderer<B> {
    fn link(&self, _cx: &mut RenderContext<'_>, link: &LinkNode<'_>) -> Result<String, RenderError> {
        let relative = is_relative_reference(link.dest);
        let rewritten = if relative {
            rewrite_relative_link(link.dest)
        } else {
            link.dest.to_string()
        };
        let href = safe_url(&rewritten);
        let label = if link.label.is_empty() {
            html! { (href) }
        } else {
            PreEscaped(link.label.to_string())
        };
        let title = non_empty(link.title);

        let markup = if relative || link.dest.starts_with('#') {
            html! { a href=(href) title=[title] { (label) } }
        } else {
            html! { a href=(href) title=[title] target="_blank" rel="noopener" { (label) } }
        };
        Ok(markup.into_string())
    }

    fn image(
        &self,
        cx: &mut RenderContext<'_>,
        image: &ImageNode<'_>,
    ) -> Result<String, RenderError> {
        let content = if is_relative_reference(image.src) {
            self.local_image(cx, image)?
        } else {
            img(safe_url(image.src), None, image.alt, non_empty(image.title), None)
        };
        Ok(html! {
            figure {
                picture { (content) }
                figcaption { (image.alt) }
            }
        }
        .into_string())
    }
}

fn img(
    src: &str,
    dimensions: Option<Dimensions>,
    alt: &str,
    title: Option<&str>,
    plan: Option<&ResponsivePlan>,
) -> Markup {
    let width = dimensions.map(|d| d.width);
    let height = dimensions.map(|d| d.height);
    let srcset = plan.map(|p| p.srcset.as_str());
    let sizes = plan.map(|p| p.sizes.as_str());
    html! {
        img src=(src) width=[width] height=[height] alt=(alt) title=[title]
            loading="lazy" srcset=[srcset] sizes=[sizes];
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

// ============================================================================
// Event stream rewriting
// ============================================================================

/// HTML body and front matter block of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkdown {
    pub html: String,
    pub metadata: Option<EmbeddedBlock>,
}

/// A node whose events are being collected until its end tag.
enum Frame<'a> {
    Link {
        dest: CowStr<'a>,
        title: CowStr<'a>,
        label: Vec<Event<'a>>,
    },
    Image {
        src: CowStr<'a>,
        title: CowStr<'a>,
        alt: String,
    },
    Metadata {
        format: MetadataFormat,
        raw: String,
    },
}

/// Render a markdown document, routing links and images through `renderer`.
///
/// The front matter block is not rendered; its raw text is returned in
/// [`RenderedMarkdown::metadata`]. With `markdown.autolink`, bare URLs in
/// running text are routed through [`NodeRenderer::link`] as well.
pub fn render_markdown<R: NodeRenderer + ?Sized>(
    renderer: &R,
    cx: &mut RenderContext<'_>,
    source: &str,
    markdown: &MarkdownConfig,
) -> Result<RenderedMarkdown, RenderError> {
    let mut events: Vec<Event<'_>> = Vec::new();
    let mut frames: Vec<Frame<'_>> = Vec::new();
    let mut metadata = None;
    let mut code_blocks = 0usize;
    let finder = url_finder();

    let parser = Parser::new_ext(source, markdown.parser_options());
    for event in TextMergeStream::new(parser) {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                code_blocks += 1;
                emit(&mut frames, &mut events, Event::Start(Tag::CodeBlock(kind)));
            }
            Event::End(TagEnd::CodeBlock) => {
                code_blocks = code_blocks.saturating_sub(1);
                emit(&mut frames, &mut events, Event::End(TagEnd::CodeBlock));
            }
            Event::Text(text) if markdown.autolink && code_blocks == 0 && frames.is_empty() => {
                autolink(renderer, cx, &finder, &text, &mut events)?;
            }
            Event::Start(Tag::MetadataBlock(kind)) => frames.push(Frame::Metadata {
                format: kind.into(),
                raw: String::new(),
            }),
            Event::End(TagEnd::MetadataBlock(_)) => {
                if let Some(Frame::Metadata { format, raw }) = frames.pop() {
                    metadata = Some(EmbeddedBlock { format, raw });
                }
            }
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            }) => {
                let dest = match link_type {
                    LinkType::Email => format!("mailto:{dest_url}").into(),
                    _ => dest_url,
                };
                frames.push(Frame::Link {
                    dest,
                    title,
                    label: Vec::new(),
                });
            }
            Event::End(TagEnd::Link) => {
                if let Some(Frame::Link { dest, title, label }) = frames.pop() {
                    // Inside an image description only the label text counts.
                    if matches!(frames.last(), Some(Frame::Image { .. })) {
                        for event in label {
                            emit(&mut frames, &mut events, event);
                        }
                        continue;
                    }
                    let mut label_html = String::new();
                    pulldown_cmark::html::push_html(&mut label_html, label.into_iter());
                    let node = LinkNode {
                        dest: &dest,
                        title: &title,
                        label: &label_html,
                    };
                    let html = renderer.link(cx, &node)?;
                    emit(&mut frames, &mut events, Event::InlineHtml(html.into()));
                }
            }
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => frames.push(Frame::Image {
                src: dest_url,
                title,
                alt: String::new(),
            }),
            Event::End(TagEnd::Image) => {
                if let Some(Frame::Image { src, title, alt }) = frames.pop() {
                    let node = ImageNode {
                        src: &src,
                        title: &title,
                        alt: &alt,
                    };
                    let html = renderer.image(cx, &node)?;
                    emit(&mut frames, &mut events, Event::InlineHtml(html.into()));
                }
            }
            other => emit(&mut frames, &mut events, other),
        }
    }

    let mut html = String::new();
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    Ok(RenderedMarkdown { html, metadata })
}

/// Route an event to the innermost open node, or to the output.
fn emit<'a>(frames: &mut [Frame<'a>], events: &mut Vec<Event<'a>>, event: Event<'a>) {
    match frames.last_mut() {
        None => events.push(event),
        Some(Frame::Link { label, .. }) => label.push(event),
        Some(Frame::Image { alt, .. }) => match event {
            Event::Text(text)
            | Event::Code(text)
            | Event::InlineHtml(text)
            | Event::Html(text) => alt.push_str(&text),
            Event::SoftBreak | Event::HardBreak => alt.push(' '),
            _ => {}
        },
        Some(Frame::Metadata { raw, .. }) => {
            if let Event::Text(text) = event {
                raw.push_str(&text);
            }
        }
    }
}

/// Finds URLs that carry a scheme; emails and bare hosts stay text.
fn url_finder() -> LinkFinder {
    let mut finder = LinkFinder::new();
    finder.kinds(&[LinkKind::Url]);
    finder
}

/// Emit `text`, turning every URL in it into a rendered link.
fn autolink<'a, R: NodeRenderer + ?Sized>(
    renderer: &R,
    cx: &mut RenderContext<'_>,
    finder: &LinkFinder,
    text: &CowStr<'a>,
    events: &mut Vec<Event<'a>>,
) -> Result<(), RenderError> {
    if finder.links(text).next().is_none() {
        events.push(Event::Text(text.clone()));
        return Ok(());
    }
    for span in finder.spans(text) {
        if span.kind().is_some() {
            let node = LinkNode {
                dest: span.as_str(),
                title: "",
                label: "",
            };
            events.push(Event::InlineHtml(renderer.link(cx, &node)?.into()));
        } else {
            events.push(Event::Text(span.as_str().to_string().into()));
        }
    }
    Ok(())
}
