//! Operations on extracted tables of contents.
use crate::types::TocEntry;

/// Return a copy of `entries` with every `id` rewritten to `{prefix}-{id}`.
///
/// The tree shape is preserved. Pass the same prefix that was applied to the
/// headings, otherwise TOC links no longer match their anchors.
#[must_use]
pub fn prefix_toc_ids(entries: &[TocEntry], prefix: &str) -> Vec<TocEntry> {
  entries
    .iter()
    .map(|entry| {
      TocEntry {
        id:       format!("{prefix}-{}", entry.id),
        value:    entry.value.clone(),
        depth:    entry.depth,
        children: prefix_toc_ids(&entry.children, prefix),
      }
    })
    .collect()
}

/// Flatten a TOC tree in document order.
///
/// Handy for tracking the active entry of a rendered TOC, which needs every
/// heading ID regardless of nesting.
#[must_use]
pub fn flatten(entries: &[TocEntry]) -> Vec<&TocEntry> {
  let mut out = Vec::new();
  collect(entries, &mut out);
  out
}

fn collect<'a>(entries: &'a [TocEntry], out: &mut Vec<&'a TocEntry>) {
  for entry in entries {
    out.push(entry);
    collect(&entry.children, out);
  }
}
