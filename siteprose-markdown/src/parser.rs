//! Markdown parsing and conversion into the document tree.
//!
//! comrak produces the markdown syntax tree; this module lowers it to
//! [`Document`] elements the way mdast-to-hast does (`p`, `h1`-`h6`,
//! `pre > code.language-*`, `table > thead/tbody`, ...). GFM task list items
//! get a disabled checkbox and footnote definitions are gathered into a
//! trailing `section.footnotes`. Constructs without a dedicated mapping are
//! rendered by comrak and embedded as raw HTML.
use comrak::{
  Arena,
  nodes::{AstNode, ListType, NodeFootnoteDefinition, NodeValue, TableAlignment},
  options::Options,
  parse_document,
};
use log::warn;

use crate::{
  dom::{Alignment, Document, Element, Node},
  renderer::MarkdownOptions,
};

/// Parse `markdown` into a document tree. Never fails.
#[must_use]
pub fn parse(markdown: &str, options: &MarkdownOptions) -> Document {
  let arena = Arena::new();
  let comrak_options = comrak_options(options);
  let root = parse_document(&arena, markdown, &comrak_options);

  let converter = Converter {
    options:    &comrak_options,
    allow_html: options.allow_html,
  };

  let mut children = Vec::new();
  let mut footnotes = Vec::new();
  for node in root.children() {
    let definition = match &node.data.borrow().value {
      NodeValue::FootnoteDefinition(definition) => Some(definition.clone()),
      _ => None,
    };
    match definition {
      Some(definition) => {
        let index = footnotes.len() + 1;
        footnotes.push(converter.footnote_definition(node, &definition, index));
      },
      None => converter.convert(node, &mut children),
    }
  }

  if !footnotes.is_empty() {
    let mut section = Element::with_children("section", vec![
      Element::with_children("ol", footnotes).into(),
    ]);
    section.properties.add_class("footnotes");
    section
      .properties
      .set_attribute("data-footnotes", String::new());
    children.push(section.into());
  }

  Document::new(children)
}

/// Build comrak options from `MarkdownOptions`.
fn comrak_options(options: &MarkdownOptions) -> Options<'static> {
  let mut comrak = Options::default();
  if options.gfm {
    comrak.extension.table = true;
    comrak.extension.strikethrough = true;
    comrak.extension.autolink = true;
    comrak.extension.tasklist = true;
    comrak.extension.footnotes = true;
  }
  comrak.render.r#unsafe = options.allow_html;
  comrak
}

struct Converter<'o, 'c> {
  options:    &'o Options<'c>,
  allow_html: bool,
}

impl Converter<'_, '_> {
  fn children<'a>(&self, node: &'a AstNode<'a>) -> Vec<Node> {
    let mut out = Vec::new();
    for child in node.children() {
      self.convert(child, &mut out);
    }
    out
  }

  fn element<'a>(&self, tag: &str, node: &'a AstNode<'a>) -> Node {
    Element::with_children(tag, self.children(node)).into()
  }

  fn convert<'a>(&self, node: &'a AstNode<'a>, out: &mut Vec<Node>) {
    let ast = node.data.borrow();
    match &ast.value {
      NodeValue::Document => out.extend(self.children(node)),
      NodeValue::Paragraph => out.push(self.element("p", node)),
      NodeValue::Heading(heading) => {
        out.push(self.element(&format!("h{}", heading.level), node));
      },
      NodeValue::BlockQuote => out.push(self.element("blockquote", node)),
      NodeValue::List(list) => {
        let ordered = list.list_type == ListType::Ordered;
        let has_tasks = node
          .children()
          .any(|item| matches!(item.data.borrow().value, NodeValue::TaskItem(_)));
        let items = node
          .children()
          .map(|item| self.list_item(item, list.tight))
          .collect();
        let mut element =
          Element::with_children(if ordered { "ol" } else { "ul" }, items);
        if ordered && list.start != 1 {
          element.properties.start = u64::try_from(list.start).ok();
        }
        if has_tasks {
          element.properties.add_class("contains-task-list");
        }
        out.push(element.into());
      },
      NodeValue::Item(_) | NodeValue::TaskItem(_) => {
        out.push(self.list_item(node, false));
      },
      NodeValue::CodeBlock(code_block) => {
        let mut code = Element::with_children("code", vec![Node::text(
          code_block.literal.as_str(),
        )]);
        if let Some(lang) = code_block.info.split_whitespace().next() {
          code.properties.add_class(&format!("language-{lang}"));
        }
        out.push(Element::with_children("pre", vec![code.into()]).into());
      },
      NodeValue::ThematicBreak => out.push(Element::new("hr").into()),
      NodeValue::Table(table) => {
        out.push(self.table(node, &table.alignments).into());
      },
      NodeValue::HtmlBlock(block) => {
        if self.allow_html {
          out.push(Node::Raw(block.literal.clone()));
        }
      },
      NodeValue::HtmlInline(html) => {
        if self.allow_html {
          out.push(Node::Raw(html.clone()));
        }
      },
      NodeValue::Text(text) => out.push(Node::text(text.to_string())),
      NodeValue::SoftBreak => out.push(Node::text("\n")),
      NodeValue::LineBreak => {
        out.push(Element::new("br").into());
        out.push(Node::text("\n"));
      },
      NodeValue::Code(code) => {
        out.push(
          Element::with_children("code", vec![Node::text(
            code.literal.as_str(),
          )])
          .into(),
        );
      },
      NodeValue::Emph => out.push(self.element("em", node)),
      NodeValue::Strong => out.push(self.element("strong", node)),
      NodeValue::Strikethrough => out.push(self.element("del", node)),
      NodeValue::Superscript => out.push(self.element("sup", node)),
      NodeValue::Subscript => out.push(self.element("sub", node)),
      NodeValue::Link(link) => {
        let mut anchor = Element::with_children("a", self.children(node));
        anchor.properties.href = Some(link.url.clone());
        if !link.title.is_empty() {
          anchor.properties.title = Some(link.title.clone());
        }
        out.push(anchor.into());
      },
      NodeValue::Image(link) => {
        let mut image = Element::new("img");
        image.properties.src = Some(link.url.clone());
        image.properties.alt = Some(plain_text(node));
        if !link.title.is_empty() {
          image.properties.title = Some(link.title.clone());
        }
        out.push(image.into());
      },
      NodeValue::FootnoteReference(reference) => {
        let mut id = format!("fnref-{}", reference.name);
        if reference.ref_num > 1 {
          id = format!("{id}-{}", reference.ref_num);
        }
        let mut anchor =
          Element::with_children("a", vec![Node::text(reference.ix.to_string())]);
        anchor.properties.id = Some(id);
        anchor.properties.href = Some(format!("#fn-{}", reference.name));
        anchor
          .properties
          .set_attribute("data-footnote-ref", String::new());
        let mut sup = Element::with_children("sup", vec![anchor.into()]);
        sup.properties.add_class("footnote-ref");
        out.push(sup.into());
      },
      NodeValue::FrontMatter(_) => {},
      _ => {
        let mut html = String::new();
        if let Err(e) = comrak::format_html(node, self.options, &mut html) {
          warn!("Failed to render markdown construct as HTML: {e}");
          return;
        }
        out.push(Node::Raw(html));
      },
    }
  }

  /// Convert a list item; tight lists unwrap their paragraphs.
  ///
  /// Task items start with a disabled checkbox, placed inside the leading
  /// paragraph when the list is loose.
  fn list_item<'a>(&self, node: &'a AstNode<'a>, tight: bool) -> Node {
    let checked = match &node.data.borrow().value {
      NodeValue::TaskItem(task) => Some(task.symbol.is_some()),
      _ => None,
    };
    let children = self.children(node);
    let children = if tight {
      children
        .into_iter()
        .flat_map(|child| {
          match child {
            Node::Element(element) if element.tag_name == "p" => {
              element.children
            },
            other => vec![other],
          }
        })
        .collect()
    } else {
      children
    };
    let mut item = Element::with_children("li", children);

    if let Some(checked) = checked {
      item.properties.add_class("task-list-item");
      let mut checkbox = Element::new("input");
      checkbox.properties.set_attribute("type", "checkbox".to_string());
      checkbox.properties.checked = checked;
      checkbox.properties.disabled = true;

      match item.children.first_mut() {
        Some(Node::Element(first)) if first.tag_name == "p" => {
          prepend_checkbox(&mut first.children, checkbox);
        },
        _ => prepend_checkbox(&mut item.children, checkbox),
      }
    }

    item.into()
  }

  /// Convert a footnote definition into its `li`, ending with one back
  /// reference per use of the footnote.
  fn footnote_definition<'a>(
    &self,
    node: &'a AstNode<'a>,
    definition: &NodeFootnoteDefinition,
    index: usize,
  ) -> Node {
    let mut children = self.children(node);

    let mut backrefs = Vec::new();
    for ref_num in 1..=definition.total_references {
      let suffix = if ref_num > 1 {
        format!("-{ref_num}")
      } else {
        String::new()
      };
      let mut label = vec![Node::text("\u{21a9}")];
      if ref_num > 1 {
        backrefs.push(Node::text(" "));
        let mut sup =
          Element::with_children("sup", vec![Node::text(ref_num.to_string())]);
        sup.properties.add_class("footnote-ref");
        label.push(sup.into());
      }

      let mut anchor = Element::with_children("a", label);
      anchor.properties.href = Some(format!("#fnref-{}{suffix}", definition.name));
      anchor.properties.add_class("footnote-backref");
      let props = &mut anchor.properties;
      props.set_attribute("data-footnote-backref", String::new());
      props.set_attribute("aria-label", format!("Back to reference {index}{suffix}"));
      backrefs.push(anchor.into());
    }

    match children.last_mut() {
      Some(Node::Element(last)) if last.tag_name == "p" => {
        last.children.push(Node::text(" "));
        last.children.extend(backrefs);
      },
      _ => children.extend(backrefs),
    }

    let mut item = Element::with_children("li", children);
    item.properties.id = Some(format!("fn-{}", definition.name));
    item.into()
  }

  fn table<'a>(
    &self,
    node: &'a AstNode<'a>,
    alignments: &[TableAlignment],
  ) -> Element {
    let mut head = Vec::new();
    let mut body = Vec::new();

    for row in node.children() {
      let header = matches!(row.data.borrow().value, NodeValue::TableRow(true));
      let tag = if header { "th" } else { "td" };
      let cells = row
        .children()
        .enumerate()
        .map(|(column, cell)| {
          let mut element = Element::with_children(tag, self.children(cell));
          element.properties.align =
            alignments.get(column).copied().and_then(alignment);
          element.into()
        })
        .collect();

      let tr = Element::with_children("tr", cells).into();
      if header {
        head.push(tr);
      } else {
        body.push(tr);
      }
    }

    let mut sections = Vec::new();
    if !head.is_empty() {
      sections.push(Element::with_children("thead", head).into());
    }
    if !body.is_empty() {
      sections.push(Element::with_children("tbody", body).into());
    }
    Element::with_children("table", sections)
  }
}

fn prepend_checkbox(children: &mut Vec<Node>, checkbox: Element) {
  children.insert(0, Node::text(" "));
  children.insert(0, checkbox.into());
}

const fn alignment(align: TableAlignment) -> Option<Alignment> {
  match align {
    TableAlignment::Left => Some(Alignment::Left),
    TableAlignment::Center => Some(Alignment::Center),
    TableAlignment::Right => Some(Alignment::Right),
    TableAlignment::None => None,
  }
}

/// Plain text of an inline subtree, used for image `alt` values.
fn plain_text<'a>(node: &'a AstNode<'a>) -> String {
  let mut text = String::new();
  for child in node.children() {
    match &child.data.borrow().value {
      NodeValue::Text(t) => text.push_str(t),
      NodeValue::Code(t) => text.push_str(&t.literal),
      NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
      NodeValue::HtmlInline(_) => {},
      _ => text.push_str(&plain_text(child)),
    }
  }
  text
}
