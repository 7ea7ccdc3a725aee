//! Heading ID prefixing.
use super::TreeTransform;
use crate::dom::Document;

/// Rewrites every heading ID to `{prefix}-{id}`.
///
/// Used when several rendered fragments share one page and their anchors
/// must not collide.
#[derive(Debug, Clone)]
pub struct IdPrefix {
  prefix: String,
}

impl IdPrefix {
  #[must_use]
  pub fn new(prefix: impl Into<String>) -> Self {
    Self {
      prefix: prefix.into(),
    }
  }
}

impl TreeTransform for IdPrefix {
  fn name(&self) -> &'static str {
    "id-prefix"
  }

  fn transform(&self, document: &mut Document) {
    if self.prefix.is_empty() {
      return;
    }
    document.visit_elements_mut(|el| {
      if el.heading_level().is_none() {
        return;
      }
      if let Some(id) = &mut el.properties.id {
        *id = format!("{}-{id}", self.prefix);
      }
    });
  }
}
