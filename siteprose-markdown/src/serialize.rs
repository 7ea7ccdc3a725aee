//! HTML serialization of the document tree.
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::dom::{Document, Element, Node};

/// Elements written without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

/// Serialize a document to HTML.
///
/// Text and attribute values are escaped, raw nodes are written verbatim and
/// sibling nodes are written back to back.
#[must_use]
pub fn serialize(document: &Document) -> String {
  let mut html = String::new();
  write_nodes(&document.children, &mut html);
  html
}

fn write_nodes(nodes: &[Node], out: &mut String) {
  for node in nodes {
    match node {
      Node::Element(element) => write_element(element, out),
      Node::Text(text) => out.push_str(&encode_text(text)),
      Node::Raw(html) => out.push_str(html),
    }
  }
}

fn write_element(element: &Element, out: &mut String) {
  out.push('<');
  out.push_str(&element.tag_name);

  let props = &element.properties;
  write_attr(out, "id", props.id.as_deref());
  if !props.class_name.is_empty() {
    write_attr(out, "class", Some(&props.class_name.join(" ")));
  }
  write_attr(out, "href", props.href.as_deref());
  write_attr(out, "src", props.src.as_deref());
  write_attr(out, "alt", props.alt.as_deref());
  write_attr(out, "title", props.title.as_deref());
  write_attr(out, "target", props.target.as_deref());
  if !props.rel.is_empty() {
    write_attr(out, "rel", Some(&props.rel.join(" ")));
  }
  write_attr(out, "start", props.start.map(|n| n.to_string()).as_deref());
  write_attr(out, "align", props.align.map(|a| a.as_str()));
  for (name, value) in &props.attributes {
    write_attr(out, name, Some(value));
  }
  if props.checked {
    out.push_str(" checked");
  }
  if props.disabled {
    out.push_str(" disabled");
  }
  out.push('>');

  if VOID_ELEMENTS.contains(&element.tag_name.as_str()) {
    return;
  }

  write_nodes(&element.children, out);
  out.push_str("</");
  out.push_str(&element.tag_name);
  out.push('>');
}

fn write_attr(out: &mut String, name: &str, value: Option<&str>) {
  if let Some(value) = value {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&encode_double_quoted_attribute(value));
    out.push('"');
  }
}
