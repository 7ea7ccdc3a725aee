//! Default image optimizer.
//!
//! Produces content-hashed renditions of indexed assets, optionally resized
//! and re-encoded, and reports their dimensions so the browser can reserve
//! layout space before the image loads.
use std::{io::Cursor, path::PathBuf};

use async_trait::async_trait;
use image::{DynamicImage, imageops::FilterType};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{
  ImageOptimizer,
  OptimizedImage,
  error::{ImageError, ImageResult},
  index::{ImageAsset, ImageFormat},
};

/// Encoding of generated renditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
  /// Keep the source format.
  #[default]
  Original,
  Webp,
  Png,
  Jpeg,
}

/// Settings for [`AssetOptimizer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerOptions {
  /// Public URL the output directory is served from.
  pub base_url:   String,
  /// Where renditions are written. Nothing is written when unset.
  pub output_dir: Option<PathBuf>,
  /// Raster images wider than this are scaled down.
  pub max_width:  Option<u32>,
  pub format:     OutputFormat,
  /// Emit `loading="lazy"` and `decoding="async"`.
  pub lazy:       bool,
}

impl Default for OptimizerOptions {
  fn default() -> Self {
    Self {
      base_url:   "/_assets".to_string(),
      output_dir: None,
      max_width:  None,
      format:     OutputFormat::Original,
      lazy:       true,
    }
  }
}

/// Optimizer backed by the local filesystem.
#[derive(Debug, Clone, Default)]
pub struct AssetOptimizer {
  options: OptimizerOptions,
}

struct Rendition {
  bytes:     Vec<u8>,
  extension: &'static str,
  width:     Option<u32>,
  height:    Option<u32>,
}

impl AssetOptimizer {
  #[must_use]
  pub const fn new(options: OptimizerOptions) -> Self {
    Self { options }
  }

  #[must_use]
  pub const fn options(&self) -> &OptimizerOptions {
    &self.options
  }

  fn target_format(&self, source: ImageFormat) -> Option<image::ImageFormat> {
    match self.options.format {
      OutputFormat::Original => {
        match source {
          ImageFormat::Png => Some(image::ImageFormat::Png),
          ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
          ImageFormat::Webp => Some(image::ImageFormat::WebP),
          ImageFormat::Gif | ImageFormat::Svg => None,
        }
      },
      OutputFormat::Webp => Some(image::ImageFormat::WebP),
      OutputFormat::Png => Some(image::ImageFormat::Png),
      OutputFormat::Jpeg => Some(image::ImageFormat::Jpeg),
    }
  }

  /// Whether the asset has to be decoded at all.
  fn needs_transcode(&self, asset: &ImageAsset) -> bool {
    if !asset.format.is_transcodable() {
      return false;
    }
    let too_wide = match (self.options.max_width, asset.width) {
      (Some(max), Some(width)) => width > max,
      (Some(_), None) => true,
      (None, _) => false,
    };
    let converts = match self.options.format {
      OutputFormat::Original => false,
      OutputFormat::Webp => asset.format != ImageFormat::Webp,
      OutputFormat::Png => asset.format != ImageFormat::Png,
      OutputFormat::Jpeg => asset.format != ImageFormat::Jpeg,
    };
    too_wide || converts
  }
}

#[async_trait]
impl ImageOptimizer for AssetOptimizer {
  async fn optimize(&self, asset: &ImageAsset) -> ImageResult<OptimizedImage> {
    let bytes = tokio::fs::read(&asset.file_path).await.map_err(|source| {
      ImageError::Read {
        path: asset.file_path.clone(),
        source,
      }
    })?;

    let rendition = match self.target_format(asset.format) {
      Some(target) if self.needs_transcode(asset) => {
        let max_width = self.options.max_width;
        tokio::task::spawn_blocking(move || transcode(&bytes, target, max_width))
          .await??
      },
      _ => {
        Rendition {
          bytes,
          extension: asset.format.extension(),
          width: asset.width,
          height: asset.height,
        }
      },
    };

    let stem = asset
      .file_path
      .file_stem()
      .and_then(|s| s.to_str())
      .unwrap_or("image");
    let file_name = format!(
      "{stem}.{}.{}",
      content_hash(&rendition.bytes),
      rendition.extension
    );

    if let Some(dir) = &self.options.output_dir {
      let path = dir.join(&file_name);
      tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ImageError::Write {
          path: dir.clone(),
          source,
        })?;
      tokio::fs::write(&path, &rendition.bytes)
        .await
        .map_err(|source| ImageError::Write { path, source })?;
    }

    let src = format!(
      "{}/{file_name}",
      self.options.base_url.trim_end_matches('/')
    );
    debug!("Optimized {} -> {src}", asset.source_path);

    let mut attributes = IndexMap::new();
    if let Some(width) = rendition.width {
      attributes.insert("width".to_string(), width.to_string());
    }
    if let Some(height) = rendition.height {
      attributes.insert("height".to_string(), height.to_string());
    }
    if self.options.lazy {
      attributes.insert("loading".to_string(), "lazy".to_string());
      attributes.insert("decoding".to_string(), "async".to_string());
    }

    Ok(OptimizedImage { src, attributes })
  }
}

/// First 8 hex digits of the SHA-256 of `bytes`.
fn content_hash(bytes: &[u8]) -> String {
  let digest = Sha256::digest(bytes);
  hex::encode(&digest[..4])
}

fn transcode(
  bytes: &[u8],
  target: image::ImageFormat,
  max_width: Option<u32>,
) -> ImageResult<Rendition> {
  let mut image = image::load_from_memory(bytes)?;

  if let Some(max) = max_width {
    if image.width() > max {
      image = image.resize(max, image.height(), FilterType::Lanczos3);
    }
  }

  // JPEG has no alpha channel and the WebP encoder only takes 8-bit input.
  let image = match target {
    image::ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
    image::ImageFormat::WebP => DynamicImage::ImageRgba8(image.to_rgba8()),
    _ => image,
  };

  let mut out = Cursor::new(Vec::new());
  image.write_to(&mut out, target)?;

  let extension = match target {
    image::ImageFormat::Jpeg => "jpg",
    image::ImageFormat::WebP => "webp",
    _ => "png",
  };

  Ok(Rendition {
    bytes: out.into_inner(),
    extension,
    width: Some(image.width()),
    height: Some(image.height()),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = DynamicImage::new_rgba8(width, height);
    let mut out = Cursor::new(Vec::new());
    image
      .write_to(&mut out, image::ImageFormat::Png)
      .expect("encode png");
    out.into_inner()
  }

  fn asset(dir: &std::path::Path, name: &str, width: u32, height: u32) -> ImageAsset {
    let path = dir.join(name);
    std::fs::write(&path, png_bytes(width, height)).expect("write png");
    ImageAsset {
      source_path: format!("/src/assets/{name}"),
      file_path:   path,
      format:      ImageFormat::Png,
      width:       Some(width),
      height:      Some(height),
    }
  }

  #[test]
  fn test_content_hash_is_eight_hex_digits() {
    let hash = content_hash(b"hello");
    assert_eq!(hash.len(), 8);
    assert_eq!(hash, "2cf24dba");
  }

  #[tokio::test]
  async fn test_passthrough_keeps_dimensions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let asset = asset(dir.path(), "logo.png", 40, 20);
    let optimized = AssetOptimizer::default()
      .optimize(&asset)
      .await
      .expect("optimize");

    assert!(optimized.src.starts_with("/_assets/logo."));
    assert!(optimized.src.ends_with(".png"));
    assert_eq!(optimized.attributes["width"], "40");
    assert_eq!(optimized.attributes["height"], "20");
    assert_eq!(optimized.attributes["loading"], "lazy");
    assert_eq!(optimized.attributes["decoding"], "async");
  }

  #[tokio::test]
  async fn test_resize_and_write_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let out = dir.path().join("public");
    let asset = asset(dir.path(), "hero.png", 200, 100);
    let optimizer = AssetOptimizer::new(OptimizerOptions {
      output_dir: Some(out.clone()),
      max_width: Some(50),
      format: OutputFormat::Jpeg,
      base_url: "/static/".to_string(),
      ..OptimizerOptions::default()
    });

    let optimized = optimizer.optimize(&asset).await.expect("optimize");
    assert!(optimized.src.starts_with("/static/hero."));
    assert!(optimized.src.ends_with(".jpg"));
    assert_eq!(optimized.attributes["width"], "50");
    assert_eq!(optimized.attributes["height"], "25");

    let file_name = optimized.src.trim_start_matches("/static/");
    assert!(out.join(file_name).is_file());
  }

  #[tokio::test]
  async fn test_missing_file_is_read_error() {
    let asset = ImageAsset {
      source_path: "/src/assets/gone.png".into(),
      file_path:   PathBuf::from("/definitely/not/here/gone.png"),
      format:      ImageFormat::Png,
      width:       None,
      height:      None,
    };
    let result = AssetOptimizer::default().optimize(&asset).await;
    assert!(matches!(result, Err(ImageError::Read { .. })));
  }
}
