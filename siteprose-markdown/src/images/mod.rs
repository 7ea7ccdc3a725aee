//! Image resolution.
//!
//! Every `img` whose `src` is found in the [`ImageAssetIndex`] is handed to an
//! [`ImageOptimizer`]; on success its `src` is replaced with the optimized URL
//! and the returned attributes (dimensions, loading hints) are merged in.
//! Images missing from the index, and images the optimizer fails on, keep
//! their original properties. Nothing here aborts a render.

pub mod error;
pub mod index;
pub mod optimizer;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use indexmap::IndexMap;
use log::{debug, error, warn};

pub use self::{
  error::{AssetError, ImageError, ImageResult},
  index::{AssetOptions, ImageAsset, ImageAssetIndex, ImageFormat},
  optimizer::{AssetOptimizer, OptimizerOptions, OutputFormat},
};
use crate::dom::{Document, Element};

/// An optimized rendition of an asset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizedImage {
  /// URL the `img` should point at.
  pub src:        String,
  /// Extra attributes such as `width` and `height`.
  pub attributes: IndexMap<String, String>,
}

/// Produces optimized renditions of indexed assets.
#[async_trait]
pub trait ImageOptimizer: Send + Sync {
  /// Optimize one asset. Called at most once per `img` per render.
  ///
  /// # Errors
  ///
  /// Any error leaves the image untouched and is logged by the caller.
  async fn optimize(&self, asset: &ImageAsset) -> ImageResult<OptimizedImage>;
}

/// Outcome of resolving the images of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageReport {
  /// Sources that were replaced with optimized renditions.
  pub resolved:    Vec<String>,
  /// Sources not present in the asset index.
  pub missing:     Vec<String>,
  /// Sources the optimizer failed on.
  pub failed:      Vec<String>,
  /// Number of `img` elements without a `src` or with an empty one.
  pub missing_src: usize,
}

impl ImageReport {
  /// Total number of images seen.
  #[must_use]
  pub fn total(&self) -> usize {
    self.resolved.len() + self.missing.len() + self.failed.len() + self.missing_src
  }

  /// True when every image was resolved.
  #[must_use]
  pub fn is_clean(&self) -> bool {
    self.missing.is_empty() && self.failed.is_empty() && self.missing_src == 0
  }
}

enum Outcome {
  Resolved(String),
  Missing(String),
  Failed(String),
  NoSource,
}

/// Resolves document images against a shared asset index.
#[derive(Clone)]
pub struct ImageResolver {
  index:     Arc<ImageAssetIndex>,
  optimizer: Arc<dyn ImageOptimizer>,
}

impl std::fmt::Debug for ImageResolver {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ImageResolver")
      .field("assets", &self.index.len())
      .finish_non_exhaustive()
  }
}

impl ImageResolver {
  pub fn new(
    index: Arc<ImageAssetIndex>,
    optimizer: impl ImageOptimizer + 'static,
  ) -> Self {
    Self {
      index,
      optimizer: Arc::new(optimizer),
    }
  }

  /// Build a resolver from an already shared optimizer.
  #[must_use]
  pub fn with_shared(
    index: Arc<ImageAssetIndex>,
    optimizer: Arc<dyn ImageOptimizer>,
  ) -> Self {
    Self { index, optimizer }
  }

  #[must_use]
  pub fn index(&self) -> &ImageAssetIndex {
    &self.index
  }

  /// Resolve every `img` in `document`.
  ///
  /// All lookups run concurrently and are awaited before this returns, so
  /// the document is complete once the future resolves.
  pub async fn resolve_images(&self, document: &mut Document) -> ImageReport {
    let images = document.select_mut(|el| el.tag_name == "img");
    debug!("Resolving {} image(s)", images.len());

    let outcomes =
      join_all(images.into_iter().map(|image| self.resolve_one(image))).await;

    let mut report = ImageReport::default();
    for outcome in outcomes {
      match outcome {
        Outcome::Resolved(src) => report.resolved.push(src),
        Outcome::Missing(src) => report.missing.push(src),
        Outcome::Failed(src) => report.failed.push(src),
        Outcome::NoSource => report.missing_src += 1,
      }
    }
    report
  }

  async fn resolve_one(&self, image: &mut Element) -> Outcome {
    let Some(src) = image.properties.src.clone().filter(|s| !s.is_empty()) else {
      warn!("Image without a src attribute, skipping");
      return Outcome::NoSource;
    };

    let Some(asset) = self.index.get(&src) else {
      warn!("Image not found in asset index: {src}");
      return Outcome::Missing(src);
    };

    match self.optimizer.optimize(asset).await {
      Ok(optimized) => {
        let props = &mut image.properties;
        props.src = Some(optimized.src);
        for (name, value) in optimized.attributes {
          props.set_attribute(&name, value);
        }
        Outcome::Resolved(src)
      },
      Err(e) => {
        error!("Failed to optimize image {src}: {e}");
        Outcome::Failed(src)
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use std::path::PathBuf;

  use super::*;
  use crate::dom::Node;

  struct FakeOptimizer;

  #[async_trait]
  impl ImageOptimizer for FakeOptimizer {
    async fn optimize(&self, asset: &ImageAsset) -> ImageResult<OptimizedImage> {
      if asset.source_path.contains("broken") {
        return Err(ImageError::Optimizer("corrupt file".into()));
      }
      let mut attributes = IndexMap::new();
      attributes.insert("width".to_string(), "10".to_string());
      Ok(OptimizedImage {
        src: format!("/_assets{}", asset.source_path),
        attributes,
      })
    }
  }

  fn indexed(source_path: &str) -> ImageAsset {
    ImageAsset {
      source_path: source_path.to_string(),
      file_path:   PathBuf::from(source_path),
      format:      ImageFormat::Png,
      width:       Some(10),
      height:      Some(10),
    }
  }

  fn img(src: Option<&str>, alt: &str) -> Node {
    let mut el = Element::new("img");
    el.properties.src = src.map(ToString::to_string);
    el.properties.alt = Some(alt.to_string());
    el.into()
  }

  fn resolver() -> ImageResolver {
    let index = ImageAssetIndex::from_assets([
      indexed("/src/assets/a.png"),
      indexed("/src/assets/broken.png"),
    ]);
    ImageResolver::new(Arc::new(index), FakeOptimizer)
  }

  #[tokio::test]
  async fn test_resolves_hits_and_reports_misses() {
    let mut doc = Document::new(vec![
      img(Some("/src/assets/a.png"), "A"),
      img(Some("photo.png"), "missing"),
      img(Some("/src/assets/broken.png"), "broken"),
      img(None, "no src"),
    ]);

    let report = resolver().resolve_images(&mut doc).await;
    assert_eq!(report.resolved, ["/src/assets/a.png"]);
    assert_eq!(report.missing, ["photo.png"]);
    assert_eq!(report.failed, ["/src/assets/broken.png"]);
    assert_eq!(report.missing_src, 1);
    assert_eq!(report.total(), 4);
    assert!(!report.is_clean());

    let hit = doc.children[0].as_element().expect("img");
    assert_eq!(hit.properties.src.as_deref(), Some("/_assets/src/assets/a.png"));
    assert_eq!(hit.properties.alt.as_deref(), Some("A"));
    assert_eq!(hit.properties.attributes["width"], "10");

    let miss = doc.children[1].as_element().expect("img");
    assert_eq!(miss.properties.src.as_deref(), Some("photo.png"));
    assert!(miss.properties.attributes.is_empty());

    let failed = doc.children[2].as_element().expect("img");
    assert_eq!(
      failed.properties.src.as_deref(),
      Some("/src/assets/broken.png")
    );
  }

  #[tokio::test]
  async fn test_empty_src_counts_as_missing_src() {
    let index = ImageAssetIndex::from_assets([indexed("")]);
    let images = ImageResolver::new(Arc::new(index), FakeOptimizer);
    let mut doc = Document::new(vec![img(Some(""), "empty")]);

    let report = images.resolve_images(&mut doc).await;
    assert!(report.resolved.is_empty());
    assert_eq!(report.missing_src, 1);

    let el = doc.children[0].as_element().expect("img");
    assert_eq!(el.properties.src.as_deref(), Some(""));
    assert!(el.properties.attributes.is_empty());
  }

  #[tokio::test]
  async fn test_no_images_is_clean() {
    let mut doc = Document::new(vec![Node::text("text only")]);
    let report = resolver().resolve_images(&mut doc).await;
    assert_eq!(report.total(), 0);
    assert!(report.is_clean());
  }
}
