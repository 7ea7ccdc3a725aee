//! Core implementation of the rendering pipeline.
//!
//! Stage order is fixed:
//!
//! 1. parse
//! 2. heading slugs
//! 3. table alignment classes
//! 4. external link attributes
//! 5. TOC extraction (when requested)
//! 6. heading ID prefix (when a prefix is set)
//! 7. image resolution (async entry point only)
//! 8. serialize
//! 9. TOC ID prefix (when both a TOC and a prefix were requested)
//!
//! The TOC is extracted from unprefixed IDs and then rewritten with the very
//! prefix applied to the headings, so both end up with identical IDs.
use log::{debug, trace};

use super::types::{MarkdownOptions, MarkdownRenderer};
use crate::{
  dom::Document,
  images::ImageResolver,
  parser,
  serialize,
  stages::{
    ExternalLinks,
    HeadingSlugs,
    IdPrefix,
    TableAlign,
    TocExtract,
    TransformPipeline,
  },
  toc::prefix_toc_ids,
  types::{RenderOptions, RenderResult},
};

impl MarkdownRenderer {
  /// Create a renderer with the given options.
  #[must_use]
  pub const fn new(options: MarkdownOptions) -> Self {
    Self { options }
  }

  /// Access renderer options.
  #[must_use]
  pub const fn options(&self) -> &MarkdownOptions {
    &self.options
  }

  /// Render markdown to HTML without touching images.
  #[must_use]
  pub fn render(&self, markdown: &str, options: &RenderOptions) -> RenderResult {
    let document = self.transform(markdown, options);
    finish(&document, options)
  }

  /// Render markdown to HTML, rewriting images to optimized assets.
  ///
  /// Image lookups run concurrently and are all complete before the HTML is
  /// produced.
  pub async fn render_with_images(
    &self,
    markdown: &str,
    options: &RenderOptions,
    images: &ImageResolver,
  ) -> RenderResult {
    let mut document = self.transform(markdown, options);

    let report = images.resolve_images(&mut document).await;
    if report.total() > 0 {
      debug!(
        "Images: {} resolved, {} missing, {} failed, {} without src",
        report.resolved.len(),
        report.missing.len(),
        report.failed.len(),
        report.missing_src
      );
    }

    finish(&document, options)
  }

  /// The stages run for one render call.
  #[must_use]
  pub fn pipeline(&self, options: &RenderOptions) -> TransformPipeline {
    let mut pipeline = TransformPipeline::new()
      .with(HeadingSlugs)
      .with(TableAlign::new(self.options.table_align.clone()))
      .with(ExternalLinks::new(self.options.external_links.clone()));

    if options.with_toc {
      pipeline = pipeline.with(TocExtract);
    }
    if let Some(prefix) = options.prefix() {
      pipeline = pipeline.with(IdPrefix::new(prefix));
    }
    pipeline
  }

  fn transform(&self, markdown: &str, options: &RenderOptions) -> Document {
    let mut document = parser::parse(markdown, &self.options);
    let pipeline = self.pipeline(options);
    trace!("Pipeline: {:?}", pipeline.transform_names());
    pipeline.run(&mut document);
    document
  }
}

fn finish(document: &Document, options: &RenderOptions) -> RenderResult {
  let html = serialize::serialize(document);

  let toc = if options.with_toc {
    let toc = document.data.toc.clone().unwrap_or_default();
    Some(match options.prefix() {
      Some(prefix) => prefix_toc_ids(&toc, prefix),
      None => toc,
    })
  } else {
    None
  };

  RenderResult { html, toc }
}

/// Render `markdown` with default options.
#[must_use]
pub fn render_markdown(markdown: &str, options: &RenderOptions) -> RenderResult {
  MarkdownRenderer::default().render(markdown, options)
}

/// Render `markdown` with default options and image resolution.
pub async fn render_markdown_with_images(
  markdown: &str,
  options: &RenderOptions,
  images: &ImageResolver,
) -> RenderResult {
  MarkdownRenderer::default()
    .render_with_images(markdown, options, images)
    .await
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_pipeline_depends_on_render_options() {
    let renderer = MarkdownRenderer::default();
    assert_eq!(
      renderer.pipeline(&RenderOptions::default()).transform_names(),
      ["heading-slugs", "table-align", "external-links"]
    );

    let options = RenderOptions::default().toc(true).prefixed(Some("sec1"));
    assert_eq!(renderer.pipeline(&options).transform_names(), [
      "heading-slugs",
      "table-align",
      "external-links",
      "toc-extract",
      "id-prefix"
    ]);
  }

  #[test]
  fn test_empty_prefix_adds_no_stage() {
    let renderer = MarkdownRenderer::default();
    let options = RenderOptions::default().prefixed(Some(""));
    assert!(!renderer
      .pipeline(&options)
      .transform_names()
      .contains(&"id-prefix"));
  }

  #[test]
  fn test_toc_absent_unless_requested() {
    let result = render_markdown("# Title\n", &RenderOptions::default());
    assert!(result.toc.is_none());
    let result =
      render_markdown("no headings\n", &RenderOptions::default().toc(true));
    assert_eq!(result.toc, Some(vec![]));
  }
}
