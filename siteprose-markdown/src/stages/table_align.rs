//! Table cell alignment classes.
use serde::{Deserialize, Serialize};

use super::TreeTransform;
use crate::dom::{Alignment, Document};

/// CSS classes used for each column alignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignmentClasses {
  pub left:   String,
  pub center: String,
  pub right:  String,
}

impl Default for AlignmentClasses {
  fn default() -> Self {
    Self {
      left:   "text-left".to_string(),
      center: "text-center".to_string(),
      right:  "text-right".to_string(),
    }
  }
}

impl AlignmentClasses {
  #[must_use]
  pub fn class_for(&self, alignment: Alignment) -> &str {
    match alignment {
      Alignment::Left => &self.left,
      Alignment::Center => &self.center,
      Alignment::Right => &self.right,
    }
  }
}

/// Replaces the alignment marker of `th`/`td` cells with a class.
///
/// The class is appended only once. When the configured class is empty the
/// cell keeps its marker.
#[derive(Debug, Default, Clone)]
pub struct TableAlign {
  classes: AlignmentClasses,
}

impl TableAlign {
  #[must_use]
  pub const fn new(classes: AlignmentClasses) -> Self {
    Self { classes }
  }
}

impl TreeTransform for TableAlign {
  fn name(&self) -> &'static str {
    "table-align"
  }

  fn transform(&self, document: &mut Document) {
    document.visit_elements_mut(|el| {
      if !el.is_table_cell() {
        return;
      }
      let Some(alignment) = el.properties.align else {
        return;
      };
      let class = self.classes.class_for(alignment);
      if class.is_empty() {
        return;
      }
      el.properties.add_class(class);
      el.properties.align = None;
    });
  }
}
