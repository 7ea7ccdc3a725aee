//! Attributes for links that leave the site.
use serde::{Deserialize, Serialize};

use super::TreeTransform;
use crate::{dom::Document, utils::is_external_url};

/// What to add to external links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalLinkOptions {
  /// Value of the `target` attribute.
  pub target:    String,
  /// Tokens of the `rel` attribute.
  pub rel:       Vec<String>,
  /// Host of the site itself. Absolute links to this host stay internal.
  pub site_host: Option<String>,
}

impl Default for ExternalLinkOptions {
  fn default() -> Self {
    Self {
      target:    "_blank".to_string(),
      rel:       vec!["noopener".to_string(), "noreferrer".to_string()],
      site_host: None,
    }
  }
}

/// Sets `target` and `rel` on every `a` whose `href` is external.
#[derive(Debug, Default, Clone)]
pub struct ExternalLinks {
  options: ExternalLinkOptions,
}

impl ExternalLinks {
  #[must_use]
  pub const fn new(options: ExternalLinkOptions) -> Self {
    Self { options }
  }
}

impl TreeTransform for ExternalLinks {
  fn name(&self) -> &'static str {
    "external-links"
  }

  fn transform(&self, document: &mut Document) {
    let site_host = self.options.site_host.as_deref();
    document.visit_elements_mut(|el| {
      if el.tag_name != "a" {
        return;
      }
      let external = el
        .properties
        .href
        .as_deref()
        .is_some_and(|href| is_external_url(href, site_host));
      if external {
        el.properties.target = Some(self.options.target.clone());
        el.properties.rel.clone_from(&self.options.rel);
      }
    });
  }
}
