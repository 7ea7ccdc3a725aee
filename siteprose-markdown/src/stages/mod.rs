//! Tree transform stages.
//!
//! Every stage implements [`TreeTransform`] and mutates the [`Document`] in
//! place. A [`TransformPipeline`] runs its stages in insertion order. Stages
//! never fail: problems are logged and the affected node is left as is.
//!
//! The async image stage lives in [`crate::images`] because it needs to await
//! the optimizer; every other stage is synchronous.

pub mod external_links;
pub mod id_prefix;
pub mod slug;
pub mod table_align;
pub mod toc;

pub use external_links::{ExternalLinkOptions, ExternalLinks};
pub use id_prefix::IdPrefix;
pub use slug::HeadingSlugs;
pub use table_align::{AlignmentClasses, TableAlign};
pub use toc::TocExtract;

use log::debug;

use crate::dom::Document;

/// A transformation applied to the document tree.
pub trait TreeTransform: Send + Sync {
  /// Name of the stage, used in log output.
  fn name(&self) -> &'static str;

  /// Apply the transformation.
  fn transform(&self, document: &mut Document);
}

/// Ordered list of transforms.
#[derive(Default)]
pub struct TransformPipeline {
  transforms: Vec<Box<dyn TreeTransform>>,
}

impl TransformPipeline {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a transform; transforms run in the order they are added.
  pub fn push(&mut self, transform: Box<dyn TreeTransform>) {
    self.transforms.push(transform);
  }

  /// Builder form of [`TransformPipeline::push`].
  #[must_use]
  pub fn with(mut self, transform: impl TreeTransform + 'static) -> Self {
    self.push(Box::new(transform));
    self
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.transforms.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.transforms.is_empty()
  }

  /// Names of all transforms in execution order.
  #[must_use]
  pub fn transform_names(&self) -> Vec<&'static str> {
    self.transforms.iter().map(|t| t.name()).collect()
  }

  /// Run every transform over `document`.
  pub fn run(&self, document: &mut Document) {
    for transform in &self.transforms {
      debug!("Running transform: {}", transform.name());
      transform.transform(document);
    }
  }
}
