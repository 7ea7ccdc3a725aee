//! Types for the siteprose-markdown public API.
use serde::{Deserialize, Serialize};

/// An entry of the table of contents.
///
/// Entries nest by heading depth: a depth *n+1* heading becomes a child of
/// the closest preceding heading with a smaller depth.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TocEntry {
  /// Anchor ID, equal to the `id` attribute of the rendered heading.
  pub id:       String,
  /// Plain heading text.
  pub value:    String,
  /// Heading level (1-6).
  pub depth:    u8,
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub children: Vec<TocEntry>,
}

impl TocEntry {
  #[must_use]
  pub fn new(
    id: impl Into<String>,
    value: impl Into<String>,
    depth: u8,
  ) -> Self {
    Self {
      id: id.into(),
      value: value.into(),
      depth,
      children: Vec::new(),
    }
  }
}

/// Result of a render call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderResult {
  /// Rendered HTML.
  pub html: String,

  /// Table of contents, only present when it was requested.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub toc: Option<Vec<TocEntry>>,
}

/// Per-call render parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
  /// Extract a table of contents.
  pub with_toc:  bool,
  /// Prefix applied to every heading ID and to the matching TOC entries.
  /// An empty string counts as no prefix.
  pub id_prefix: Option<String>,
}

impl RenderOptions {
  /// Request a table of contents.
  #[must_use]
  pub const fn toc(mut self, enabled: bool) -> Self {
    self.with_toc = enabled;
    self
  }

  /// Set the heading ID prefix.
  #[must_use]
  pub fn prefixed<S: Into<String>>(mut self, prefix: Option<S>) -> Self {
    self.id_prefix = prefix.map(Into::into);
    self
  }

  /// The effective prefix, `None` when unset or empty.
  #[must_use]
  pub fn prefix(&self) -> Option<&str> {
    self.id_prefix.as_deref().filter(|p| !p.is_empty())
  }
}
