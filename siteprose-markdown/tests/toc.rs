#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
use regex::Regex;
use siteprose_markdown::{
  RenderOptions,
  TocEntry,
  render_markdown,
  toc::flatten,
};

const DOC: &str = "# Guide\n\n## Install\n\n### Linux\n\n### macOS\n\n## Usage\n\n\
                   #### Deep\n\n# Appendix\n\n## Usage\n";

fn heading_ids(html: &str) -> Vec<String> {
  let re = Regex::new(r#"<h[1-6] id="([^"]+)""#).expect("valid regex");
  re.captures_iter(html).map(|c| c[1].to_string()).collect()
}

fn toc_ids(toc: &[TocEntry]) -> Vec<String> {
  flatten(toc).iter().map(|e| e.id.clone()).collect()
}

#[test]
fn test_title_sub_toc() {
  let result = render_markdown("# Title\n\n## Sub", &RenderOptions::default().toc(true));
  let mut title = TocEntry::new("title", "Title", 1);
  title.children.push(TocEntry::new("sub", "Sub", 2));
  assert_eq!(result.toc, Some(vec![title]));
  assert!(
    result
      .html
      .contains(r#"<h1 id="title">Title</h1><h2 id="sub">Sub</h2>"#)
  );
}

#[test]
fn test_toc_matches_headings() {
  let result = render_markdown(DOC, &RenderOptions::default().toc(true));
  let toc = result.toc.expect("toc requested");

  let ids = heading_ids(&result.html);
  assert_eq!(ids.len(), 8);
  assert_eq!(toc_ids(&toc), ids);

  assert_eq!(toc.len(), 2);
  assert_eq!(toc[0].value, "Guide");
  assert_eq!(toc[0].children.len(), 2);
  assert_eq!(toc[0].children[0].children.len(), 2);
  assert_eq!(toc[0].children[1].children[0].depth, 4);
  assert_eq!(toc[1].children[0].id, "usage-1");
}

#[test]
fn test_prefix_pairs_headings_and_toc() {
  let options = RenderOptions::default().toc(true).prefixed(Some("sec1"));
  let result = render_markdown(DOC, &options);
  let toc = result.toc.expect("toc requested");

  let ids = heading_ids(&result.html);
  assert!(ids.iter().all(|id| id.starts_with("sec1-")));
  assert_eq!(toc_ids(&toc), ids);
  assert_eq!(ids[0], "sec1-guide");
}

#[test]
fn test_prefix_without_toc() {
  let options = RenderOptions::default().prefixed(Some("card"));
  let result = render_markdown("## Pricing\n", &options);
  assert_eq!(result.html, r#"<h2 id="card-pricing">Pricing</h2>"#);
  assert!(result.toc.is_none());
}

#[test]
fn test_empty_prefix_is_ignored() {
  let options = RenderOptions::default().toc(true).prefixed(Some(""));
  let result = render_markdown("## Pricing\n", &options);
  assert_eq!(result.html, r#"<h2 id="pricing">Pricing</h2>"#);
  assert_eq!(result.toc.expect("toc")[0].id, "pricing");
}

#[test]
fn test_toc_value_is_plain_text() {
  let result = render_markdown(
    "## Using `cargo` with **style**\n",
    &RenderOptions::default().toc(true),
  );
  let toc = result.toc.expect("toc");
  assert_eq!(toc[0].value, "Using cargo with style");
  assert_eq!(toc[0].id, "using-cargo-with-style");
}

#[test]
fn test_toc_serializes_without_empty_children() {
  let result = render_markdown("# Title\n\n## Sub", &RenderOptions::default().toc(true));
  let json = serde_json::to_value(&result.toc).expect("serialize");
  assert_eq!(
    json,
    serde_json::json!([
      {
        "id": "title",
        "value": "Title",
        "depth": 1,
        "children": [{ "id": "sub", "value": "Sub", "depth": 2 }]
      }
    ])
  );
}

#[test]
fn test_raw_html_headings_are_opaque() {
  let result = render_markdown(
    "# Title\n\n<h2>Raw</h2>\n\n## Parsed\n",
    &RenderOptions::default().toc(true),
  );
  assert!(result.html.contains("<h2>Raw</h2>"));
  assert_eq!(heading_ids(&result.html), ["title", "parsed"]);
  assert_eq!(toc_ids(&result.toc.expect("toc")), ["title", "parsed"]);
}
