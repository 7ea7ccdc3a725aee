//! The image asset index.
//!
//! Built once, at startup, by walking the asset directory. Rendering only
//! reads from it, so one index is shared by every render through an `Arc`.
use std::{
  collections::BTreeMap,
  fs,
  path::{Path, PathBuf},
  sync::LazyLock,
};

use log::{debug, warn};
use regex::Regex;
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::error::AssetError;
use crate::utils::never_matching_regex;

/// File format of an indexed image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
  Png,
  Jpeg,
  Gif,
  Webp,
  Svg,
}

impl ImageFormat {
  /// Guess the format from a file extension, case-insensitively.
  #[must_use]
  pub fn from_extension(ext: &str) -> Option<Self> {
    match ext.to_ascii_lowercase().as_str() {
      "png" => Some(Self::Png),
      "jpg" | "jpeg" => Some(Self::Jpeg),
      "gif" => Some(Self::Gif),
      "webp" => Some(Self::Webp),
      "svg" => Some(Self::Svg),
      _ => None,
    }
  }

  /// Canonical file extension.
  #[must_use]
  pub const fn extension(self) -> &'static str {
    match self {
      Self::Png => "png",
      Self::Jpeg => "jpg",
      Self::Gif => "gif",
      Self::Webp => "webp",
      Self::Svg => "svg",
    }
  }

  /// Whether the format can be decoded and re-encoded.
  #[must_use]
  pub const fn is_transcodable(self) -> bool {
    matches!(self, Self::Png | Self::Jpeg | Self::Webp)
  }
}

/// Metadata of one image in the asset directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageAsset {
  /// Path as referenced from markdown, e.g. `/src/assets/team/jane.png`.
  pub source_path: String,
  /// Location on disk.
  pub file_path:   PathBuf,
  pub format:      ImageFormat,
  pub width:       Option<u32>,
  pub height:      Option<u32>,
}

/// Where and how to look for image assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetOptions {
  /// Directory to index.
  pub root:         PathBuf,
  /// Prefix of the source path markdown uses to reference the directory.
  pub url_prefix:   String,
  /// File extensions to index.
  pub extensions:   Vec<String>,
  pub follow_links: bool,
}

impl Default for AssetOptions {
  fn default() -> Self {
    Self {
      root:         PathBuf::from("src/assets"),
      url_prefix:   "/src/assets".to_string(),
      extensions:   ["png", "jpg", "jpeg", "gif", "webp", "svg"]
        .into_iter()
        .map(String::from)
        .collect(),
      follow_links: true,
    }
  }
}

/// Immutable map from source path to [`ImageAsset`].
#[derive(Debug, Clone, Default)]
pub struct ImageAssetIndex {
  assets: BTreeMap<String, ImageAsset>,
}

impl ImageAssetIndex {
  /// Walk `options.root` and index every image with a configured extension.
  ///
  /// Files whose metadata cannot be read are logged and skipped.
  ///
  /// # Errors
  ///
  /// Returns an error if the root directory does not exist or cannot be
  /// read.
  pub fn build(options: &AssetOptions) -> Result<Self, AssetError> {
    let root = options.root.as_path();
    if !root.is_dir() {
      return Err(AssetError::MissingDirectory(root.to_path_buf()));
    }

    let prefix = options.url_prefix.trim_end_matches('/');
    let mut assets = BTreeMap::new();

    for entry in WalkDir::new(root)
      .follow_links(options.follow_links)
      .sort_by_file_name()
    {
      let entry = match entry {
        Ok(entry) => entry,
        Err(e) if e.depth() == 0 => return Err(e.into()),
        Err(e) => {
          warn!("Skipping unreadable asset entry: {e}");
          continue;
        },
      };
      if !entry.file_type().is_file() {
        continue;
      }

      let path = entry.path();
      let Some(format) = path
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
          options
            .extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
        })
        .and_then(ImageFormat::from_extension)
      else {
        continue;
      };

      let Some(source_path) = source_path(prefix, root, path) else {
        continue;
      };

      match read_dimensions(path, format) {
        Ok((width, height)) => {
          debug!("Indexed image asset {source_path}");
          assets.insert(source_path.clone(), ImageAsset {
            source_path,
            file_path: path.to_path_buf(),
            format,
            width,
            height,
          });
        },
        Err(e) => warn!("Skipping image asset: {e}"),
      }
    }

    Ok(Self { assets })
  }

  /// Build an index from explicit entries.
  #[must_use]
  pub fn from_assets(assets: impl IntoIterator<Item = ImageAsset>) -> Self {
    Self {
      assets: assets
        .into_iter()
        .map(|asset| (asset.source_path.clone(), asset))
        .collect(),
    }
  }

  /// Look up an asset by the path markdown references it with.
  #[must_use]
  pub fn get(&self, source_path: &str) -> Option<&ImageAsset> {
    self.assets.get(source_path)
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.assets.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.assets.is_empty()
  }

  /// Iterate over assets ordered by source path.
  pub fn iter(&self) -> impl Iterator<Item = &ImageAsset> {
    self.assets.values()
  }
}

/// `{prefix}/{relative path}` with `/` separators.
fn source_path(prefix: &str, root: &Path, path: &Path) -> Option<String> {
  let relative = path.strip_prefix(root).ok()?;
  let parts = relative
    .components()
    .map(|c| c.as_os_str().to_str())
    .collect::<Option<Vec<_>>>()?;
  Some(format!("{prefix}/{}", parts.join("/")))
}

type Dimensions = (Option<u32>, Option<u32>);

fn read_dimensions(
  path: &Path,
  format: ImageFormat,
) -> Result<Dimensions, AssetError> {
  if format == ImageFormat::Svg {
    let source = fs::read_to_string(path).map_err(|source| {
      AssetError::Read {
        path: path.to_path_buf(),
        source,
      }
    })?;
    return Ok(svg_dimensions(&source));
  }

  image::image_dimensions(path)
    .map(|(width, height)| (Some(width), Some(height)))
    .map_err(|source| {
      AssetError::Dimensions {
        path: path.to_path_buf(),
        source,
      }
    })
}

/// Dimensions of an SVG document from its root `width`/`height` attributes,
/// falling back to the `viewBox`.
pub(crate) fn svg_dimensions(source: &str) -> Dimensions {
  static SVG_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<svg\b[^>]*>").unwrap_or_else(|e| {
      log::error!("Failed to compile SVG_TAG_RE regex: {e}");
      never_matching_regex()
    })
  });
  static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\s(width|height|viewBox)\s*=\s*["']([^"']*)["']"#)
      .unwrap_or_else(|e| {
        log::error!("Failed to compile ATTR_RE regex: {e}");
        never_matching_regex()
      })
  });

  let Some(tag) = SVG_TAG_RE.find(source) else {
    return (None, None);
  };

  let mut width = None;
  let mut height = None;
  let mut view_box = None;
  for caps in ATTR_RE.captures_iter(tag.as_str()) {
    let value = &caps[2];
    match &caps[1] {
      "width" => width = parse_length(value),
      "height" => height = parse_length(value),
      _ => view_box = Some(value.to_string()),
    }
  }

  if width.is_none() || height.is_none() {
    if let Some((vb_width, vb_height)) = view_box.as_deref().and_then(parse_view_box) {
      width = width.or(Some(vb_width));
      height = height.or(Some(vb_height));
    }
  }
  (width, height)
}

/// Parse an absolute SVG length such as `120`, `120px` or `64.5`.
fn parse_length(value: &str) -> Option<u32> {
  let number = value.trim().trim_end_matches("px");
  to_pixels(number.parse().ok()?)
}

fn parse_view_box(value: &str) -> Option<(u32, u32)> {
  let numbers = value
    .split(|c: char| c.is_whitespace() || c == ',')
    .filter(|part| !part.is_empty())
    .map(str::parse::<f64>)
    .collect::<Result<Vec<_>, _>>()
    .ok()?;
  match numbers.as_slice() {
    [_, _, width, height] => Some((to_pixels(*width)?, to_pixels(*height)?)),
    _ => None,
  }
}

#[allow(
  clippy::cast_possible_truncation,
  clippy::cast_sign_loss,
  reason = "value is range-checked before the cast"
)]
fn to_pixels(value: f64) -> Option<u32> {
  (value.is_finite() && value > 0.0 && value <= f64::from(u32::MAX))
    .then(|| value.round() as u32)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_svg_dimensions_from_attributes() {
    let svg = r#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg" width="120px" height="48"><rect/></svg>"#;
    assert_eq!(svg_dimensions(svg), (Some(120), Some(48)));
  }

  #[test]
  fn test_svg_dimensions_from_view_box() {
    let svg = r#"<svg viewBox="0 0 24.4 12" xmlns="http://www.w3.org/2000/svg"></svg>"#;
    assert_eq!(svg_dimensions(svg), (Some(24), Some(12)));
  }

  #[test]
  fn test_svg_relative_lengths_are_unknown() {
    let svg = r#"<svg width="100%" height="100%"></svg>"#;
    assert_eq!(svg_dimensions(svg), (None, None));
  }

  #[test]
  fn test_format_from_extension() {
    assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
    assert_eq!(ImageFormat::from_extension("txt"), None);
    assert!(!ImageFormat::Svg.is_transcodable());
  }

  #[test]
  fn test_source_path_uses_forward_slashes() {
    let root = Path::new("assets");
    let path = root.join("team").join("jane.png");
    assert_eq!(
      source_path("/src/assets", root, &path).as_deref(),
      Some("/src/assets/team/jane.png")
    );
  }

  #[test]
  fn test_unreadable_raster_is_dimensions_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("broken.png");
    fs::write(&path, b"not a png").expect("write file");

    let result = read_dimensions(&path, ImageFormat::Png);
    assert!(matches!(result, Err(AssetError::Dimensions { .. })));

    let options = AssetOptions {
      root: dir.path().to_path_buf(),
      ..AssetOptions::default()
    };
    let index = ImageAssetIndex::build(&options).expect("index");
    assert!(index.is_empty());
  }

  #[test]
  fn test_missing_svg_is_read_error() {
    let result = read_dimensions(Path::new("/definitely/not/here.svg"), ImageFormat::Svg);
    assert!(matches!(result, Err(AssetError::Read { .. })));
  }

  #[test]
  fn test_missing_directory() {
    let options = AssetOptions {
      root: PathBuf::from("/definitely/not/here"),
      ..AssetOptions::default()
    };
    assert!(matches!(
      ImageAssetIndex::build(&options),
      Err(AssetError::MissingDirectory(_))
    ));
  }
}
