//! Typed document tree.
//!
//! The parser produces a [`Document`], every transform stage mutates it in
//! place, and the serializer turns it into an HTML string. A tree is owned by
//! exactly one render call and dropped after serialization.
//!
//! Element properties are a typed bag with explicit optional fields rather
//! than an open dictionary, so each stage matches on exactly the fields it
//! cares about. Attributes that have no dedicated field (for example the
//! `width`/`height` pair returned by an image optimizer) live in the ordered
//! [`Properties::attributes`] map.

use indexmap::IndexMap;

use crate::types::TocEntry;

/// Column alignment of a table cell, derived from `:---`, `:---:` and `---:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
  Left,
  Center,
  Right,
}

impl Alignment {
  /// The value of the HTML `align` attribute for this alignment.
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Left => "left",
      Self::Center => "center",
      Self::Right => "right",
    }
  }
}

/// Property bag of an [`Element`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
  pub id:         Option<String>,
  /// Ordered class list, free of duplicates when built through
  /// [`Properties::add_class`].
  pub class_name: Vec<String>,
  pub align:      Option<Alignment>,
  pub href:       Option<String>,
  pub src:        Option<String>,
  pub alt:        Option<String>,
  pub title:      Option<String>,
  pub target:     Option<String>,
  pub rel:        Vec<String>,
  /// Start number of an ordered list, only set when it is not 1.
  pub start:      Option<u64>,
  /// Boolean `checked`, set on task list checkboxes.
  pub checked:    bool,
  /// Boolean `disabled`, set on task list checkboxes.
  pub disabled:   bool,
  /// Any other attribute, serialized after the typed fields in insertion
  /// order.
  pub attributes: IndexMap<String, String>,
}

impl Properties {
  /// Append `class` unless it is already present.
  ///
  /// Returns `true` if the class list changed.
  pub fn add_class(&mut self, class: &str) -> bool {
    if self.has_class(class) {
      return false;
    }
    self.class_name.push(class.to_string());
    true
  }

  #[must_use]
  pub fn has_class(&self, class: &str) -> bool {
    self.class_name.iter().any(|c| c == class)
  }

  /// Set an attribute by its HTML name.
  ///
  /// Names with a typed field are routed there (`class` and `rel` are split
  /// on whitespace, `checked` and `disabled` are set by presence), anything
  /// else goes to [`Properties::attributes`].
  pub fn set_attribute(&mut self, name: &str, value: String) {
    match name {
      "id" => self.id = Some(value),
      "class" => {
        for class in value.split_whitespace() {
          self.add_class(class);
        }
      },
      "href" => self.href = Some(value),
      "src" => self.src = Some(value),
      "alt" => self.alt = Some(value),
      "title" => self.title = Some(value),
      "target" => self.target = Some(value),
      "rel" => {
        self.rel = value.split_whitespace().map(ToString::to_string).collect();
      },
      "checked" => self.checked = true,
      "disabled" => self.disabled = true,
      _ => {
        self.attributes.insert(name.to_string(), value);
      },
    }
  }
}

/// An element node: tag name, properties and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
  pub tag_name:   String,
  pub properties: Properties,
  pub children:   Vec<Node>,
}

impl Element {
  /// Create an element with no properties and no children.
  #[must_use]
  pub fn new(tag_name: impl Into<String>) -> Self {
    Self {
      tag_name:   tag_name.into(),
      properties: Properties::default(),
      children:   Vec::new(),
    }
  }

  /// Create an element with the given children.
  #[must_use]
  pub fn with_children(tag_name: impl Into<String>, children: Vec<Node>) -> Self {
    Self {
      children,
      ..Self::new(tag_name)
    }
  }

  /// Heading depth for `h1`-`h6`, `None` for every other tag.
  #[must_use]
  pub fn heading_level(&self) -> Option<u8> {
    match self.tag_name.as_str() {
      "h1" => Some(1),
      "h2" => Some(2),
      "h3" => Some(3),
      "h4" => Some(4),
      "h5" => Some(5),
      "h6" => Some(6),
      _ => None,
    }
  }

  #[must_use]
  pub fn is_table_cell(&self) -> bool {
    matches!(self.tag_name.as_str(), "th" | "td")
  }

  /// Concatenated text of all descendant text nodes. Raw HTML is skipped.
  #[must_use]
  pub fn text_content(&self) -> String {
    let mut text = String::new();
    collect_text(&self.children, &mut text);
    text
  }
}

/// A node of the document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
  Element(Element),
  /// Literal text, escaped on serialization.
  Text(String),
  /// Trusted raw HTML written out verbatim.
  Raw(String),
}

impl Node {
  #[must_use]
  pub fn text(value: impl Into<String>) -> Self {
    Self::Text(value.into())
  }

  #[must_use]
  pub const fn as_element(&self) -> Option<&Element> {
    match self {
      Self::Element(element) => Some(element),
      _ => None,
    }
  }
}

impl From<Element> for Node {
  fn from(element: Element) -> Self {
    Self::Element(element)
  }
}

fn collect_text(nodes: &[Node], out: &mut String) {
  for node in nodes {
    match node {
      Node::Text(text) => out.push_str(text),
      Node::Element(element) => collect_text(&element.children, out),
      Node::Raw(_) => {},
    }
  }
}

/// Data attached to a document while it travels through the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentData {
  /// Table of contents, present only when extraction ran.
  pub toc: Option<Vec<TocEntry>>,
}

/// Root of the document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
  pub children: Vec<Node>,
  pub data:     DocumentData,
}

impl Document {
  #[must_use]
  pub const fn new(children: Vec<Node>) -> Self {
    Self {
      children,
      data: DocumentData { toc: None },
    }
  }

  /// Visit every element in document order (pre-order).
  pub fn visit_elements<F>(&self, mut visit: F)
  where
    F: FnMut(&Element),
  {
    walk(&self.children, &mut visit);
  }

  /// Visit every element in document order (pre-order), mutably.
  pub fn visit_elements_mut<F>(&mut self, mut visit: F)
  where
    F: FnMut(&mut Element),
  {
    walk_mut(&mut self.children, &mut visit);
  }

  /// Collect mutable references to every element matching `predicate`.
  ///
  /// The children of a matching element are not searched, which keeps the
  /// returned borrows disjoint.
  pub fn select_mut<P>(&mut self, predicate: P) -> Vec<&mut Element>
  where
    P: Fn(&Element) -> bool,
  {
    let mut found = Vec::new();
    select(&mut self.children, &predicate, &mut found);
    found
  }
}

fn walk<F>(nodes: &[Node], visit: &mut F)
where
  F: FnMut(&Element),
{
  for node in nodes {
    if let Node::Element(element) = node {
      visit(element);
      walk(&element.children, visit);
    }
  }
}

fn walk_mut<F>(nodes: &mut [Node], visit: &mut F)
where
  F: FnMut(&mut Element),
{
  for node in nodes {
    if let Node::Element(element) = node {
      visit(element);
      walk_mut(&mut element.children, visit);
    }
  }
}

fn select<'a, P>(nodes: &'a mut [Node], predicate: &P, found: &mut Vec<&'a mut Element>)
where
  P: Fn(&Element) -> bool,
{
  for node in nodes {
    if let Node::Element(element) = node {
      if predicate(element) {
        found.push(element);
      } else {
        select(&mut element.children, predicate, found);
      }
    }
  }
}
