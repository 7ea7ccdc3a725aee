//! Heading anchor IDs.
use super::TreeTransform;
use crate::{dom::Document, utils::Slugger};

/// Gives every `h1`-`h6` without an `id` a slug of its text content.
///
/// Slugs are unique within the document: repeats get `-1`, `-2`, ... and IDs
/// already present on headings are never handed out again.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadingSlugs;

impl TreeTransform for HeadingSlugs {
  fn name(&self) -> &'static str {
    "heading-slugs"
  }

  fn transform(&self, document: &mut Document) {
    let mut slugger = Slugger::new();

    document.visit_elements(|el| {
      if el.heading_level().is_some() {
        if let Some(id) = &el.properties.id {
          slugger.reserve(id);
        }
      }
    });

    document.visit_elements_mut(|el| {
      if el.heading_level().is_some() && el.properties.id.is_none() {
        el.properties.id = Some(slugger.slug(&el.text_content()));
      }
    });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dom::{Element, Node};

  fn heading(tag: &str, text: &str) -> Node {
    Element::with_children(tag, vec![Node::text(text)]).into()
  }

  fn ids(doc: &Document) -> Vec<String> {
    let mut ids = Vec::new();
    doc.visit_elements(|el| {
      if let Some(id) = &el.properties.id {
        ids.push(id.clone());
      }
    });
    ids
  }

  #[test]
  fn test_duplicate_headings_get_suffixes() {
    let mut doc = Document::new(vec![
      heading("h2", "Intro"),
      heading("h2", "Intro"),
      heading("h3", "Intro"),
    ]);
    HeadingSlugs.transform(&mut doc);
    assert_eq!(ids(&doc), ["intro", "intro-1", "intro-2"]);
  }

  #[test]
  fn test_existing_ids_are_kept_and_reserved() {
    let mut custom = Element::with_children("h2", vec![Node::text("Custom")]);
    custom.properties.id = Some("setup".into());
    let mut doc = Document::new(vec![heading("h2", "Setup"), custom.into()]);
    HeadingSlugs.transform(&mut doc);
    assert_eq!(ids(&doc), ["setup-1", "setup"]);
  }

  #[test]
  fn test_non_headings_untouched() {
    let mut doc = Document::new(vec![heading("p", "Hello"), heading("h1", "")]);
    HeadingSlugs.transform(&mut doc);
    assert_eq!(ids(&doc), ["heading"]);
  }
}
