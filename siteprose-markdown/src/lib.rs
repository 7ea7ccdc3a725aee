//! # siteprose-markdown
//!
//! The markdown rendering pipeline behind siteprose content pages. Markdown
//! goes in, HTML and an optional table of contents come out.
//!
//! ## Quick Start
//!
//! ```rust
//! use siteprose_markdown::{MarkdownOptions, MarkdownRenderer, RenderOptions};
//!
//! let renderer = MarkdownRenderer::new(MarkdownOptions::default());
//! let result = renderer.render("# Title\n\n## Sub", &RenderOptions::default().toc(true));
//!
//! assert_eq!(result.html, r#"<h1 id="title">Title</h1><h2 id="sub">Sub</h2>"#);
//! let toc = result.toc.unwrap_or_default();
//! assert_eq!(toc[0].children[0].id, "sub");
//! ```
//!
//! ## Pipeline
//!
//! The markdown is parsed with `comrak` into a typed [`dom::Document`], a
//! fixed sequence of [`stages`] mutates the tree in place, and
//! [`serialize`] writes it back out:
//!
//! - **Heading slugs**: unique, GitHub-style `id`s on every heading
//! - **Table alignment**: `:---`/`:---:`/`---:` columns become
//!   `text-left`/`text-center`/`text-right` classes
//! - **External links**: `target="_blank"` and `rel="noopener noreferrer"`
//! - **TOC extraction**: nested [`TocEntry`] tree, on request
//! - **ID prefix**: `{prefix}-{id}` on headings and TOC entries, on request
//! - **Images**: sources found in the [`ImageAssetIndex`] are swapped for
//!   optimized renditions, see [`MarkdownRenderer::render_with_images`]
//!
//! ## Images
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use siteprose_markdown::{
//!   AssetOptimizer, AssetOptions, ImageAssetIndex, ImageResolver,
//!   MarkdownRenderer, RenderOptions,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let index = Arc::new(ImageAssetIndex::build(&AssetOptions::default())?);
//! let images = ImageResolver::new(index, AssetOptimizer::default());
//!
//! let result = MarkdownRenderer::default()
//!   .render_with_images("![Logo](/src/assets/logo.png)", &RenderOptions::default(), &images)
//!   .await;
//! # let _ = result;
//! # Ok(())
//! # }
//! ```

pub mod dom;
pub mod images;
pub mod parser;
pub mod renderer;
pub mod serialize;
pub mod stages;
pub mod toc;
mod types;
pub mod utils;

pub use crate::{
  images::{
    AssetError,
    AssetOptimizer,
    AssetOptions,
    ImageAsset,
    ImageAssetIndex,
    ImageError,
    ImageOptimizer,
    ImageReport,
    ImageResolver,
    OptimizedImage,
    OptimizerOptions,
    OutputFormat,
  },
  renderer::{
    MarkdownOptions,
    MarkdownOptionsBuilder,
    MarkdownRenderer,
    render_markdown,
    render_markdown_with_images,
  },
  stages::{AlignmentClasses, ExternalLinkOptions, TransformPipeline, TreeTransform},
  types::{RenderOptions, RenderResult, TocEntry},
};
