//! Type definitions for the renderer.
//!
//! # Examples
//!
//! ```
//! use siteprose_markdown::{MarkdownOptions, MarkdownRenderer};
//!
//! let options = MarkdownOptions::builder()
//!   .gfm(true)
//!   .site_host(Some("example.org"))
//!   .build();
//!
//! let renderer = MarkdownRenderer::new(options);
//! ```
use crate::stages::{AlignmentClasses, ExternalLinkOptions};

/// Options shared by every render of a [`MarkdownRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
  /// Enable GitHub Flavored Markdown (tables, strikethrough, autolinks).
  pub gfm:            bool,
  /// Pass raw HTML in the markdown through to the output.
  pub allow_html:     bool,
  /// Attributes for links leaving the site.
  pub external_links: ExternalLinkOptions,
  /// Classes for aligned table cells.
  pub table_align:    AlignmentClasses,
}

impl Default for MarkdownOptions {
  fn default() -> Self {
    Self {
      gfm:            cfg!(feature = "gfm"),
      allow_html:     true,
      external_links: ExternalLinkOptions::default(),
      table_align:    AlignmentClasses::default(),
    }
  }
}

impl MarkdownOptions {
  #[must_use]
  pub fn builder() -> MarkdownOptionsBuilder {
    MarkdownOptionsBuilder::new()
  }
}

/// Builder for [`MarkdownOptions`].
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptionsBuilder {
  options: MarkdownOptions,
}

impl MarkdownOptionsBuilder {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Enable or disable GitHub Flavored Markdown.
  #[must_use]
  pub const fn gfm(mut self, enabled: bool) -> Self {
    self.options.gfm = enabled;
    self
  }

  /// Keep or drop raw HTML.
  #[must_use]
  pub const fn allow_html(mut self, enabled: bool) -> Self {
    self.options.allow_html = enabled;
    self
  }

  /// Set the host whose absolute links count as internal.
  #[must_use]
  pub fn site_host<S: Into<String>>(mut self, host: Option<S>) -> Self {
    self.options.external_links.site_host = host.map(Into::into);
    self
  }

  #[must_use]
  pub fn external_links(mut self, options: ExternalLinkOptions) -> Self {
    self.options.external_links = options;
    self
  }

  #[must_use]
  pub fn table_align(mut self, classes: AlignmentClasses) -> Self {
    self.options.table_align = classes;
    self
  }

  #[must_use]
  pub fn build(self) -> MarkdownOptions {
    self.options
  }
}

/// The markdown rendering pipeline.
///
/// Holds only configuration, so one renderer can serve any number of
/// concurrent renders.
#[derive(Debug, Clone, Default)]
pub struct MarkdownRenderer {
  pub(crate) options: MarkdownOptions,
}
