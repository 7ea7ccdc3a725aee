//! Table of contents extraction.
use super::TreeTransform;
use crate::{dom::Document, types::TocEntry};

/// Collects headings into a nested [`TocEntry`] tree stored in
/// [`DocumentData::toc`](crate::dom::DocumentData::toc).
///
/// A heading becomes a child of the closest preceding heading with a smaller
/// depth; a heading without one becomes a root entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct TocExtract;

impl TreeTransform for TocExtract {
  fn name(&self) -> &'static str {
    "toc-extract"
  }

  fn transform(&self, document: &mut Document) {
    let mut toc = Vec::new();
    document.visit_elements(|el| {
      if let Some(depth) = el.heading_level() {
        let id = el.properties.id.clone().unwrap_or_default();
        insert(&mut toc, TocEntry::new(id, el.text_content(), depth));
      }
    });
    document.data.toc = Some(toc);
  }
}

fn insert(entries: &mut Vec<TocEntry>, entry: TocEntry) {
  match entries.last_mut() {
    Some(last) if last.depth < entry.depth => insert(&mut last.children, entry),
    _ => entries.push(entry),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::dom::{Element, Node};

  fn heading(level: u8, id: &str) -> Node {
    let mut el =
      Element::with_children(format!("h{level}"), vec![Node::text(id)]);
    el.properties.id = Some(id.to_string());
    el.into()
  }

  fn extract(children: Vec<Node>) -> Vec<TocEntry> {
    let mut doc = Document::new(children);
    TocExtract.transform(&mut doc);
    doc.data.toc.expect("toc")
  }

  #[test]
  fn test_nests_by_depth() {
    let toc = extract(vec![
      heading(1, "a"),
      heading(2, "b"),
      heading(3, "c"),
      heading(2, "d"),
      heading(1, "e"),
    ]);
    assert_eq!(toc.len(), 2);
    assert_eq!(toc[0].id, "a");
    assert_eq!(toc[0].children.len(), 2);
    assert_eq!(toc[0].children[0].children[0].id, "c");
    assert_eq!(toc[0].children[1].id, "d");
    assert_eq!(toc[1].id, "e");
  }

  #[test]
  fn test_skipped_levels_nest_under_nearest_shallower() {
    let toc = extract(vec![heading(2, "a"), heading(4, "b"), heading(3, "c")]);
    assert_eq!(toc.len(), 1);
    let ids: Vec<_> = toc[0].children.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["b", "c"]);
  }

  #[test]
  fn test_leading_deep_heading_is_root() {
    let toc = extract(vec![heading(3, "deep"), heading(1, "top")]);
    let ids: Vec<_> = toc.iter().map(|e| e.id.as_str()).collect();
    assert_eq!(ids, ["deep", "top"]);
  }

  #[test]
  fn test_no_headings_gives_empty_toc() {
    assert!(extract(vec![Node::text("plain")]).is_empty());
  }
}
