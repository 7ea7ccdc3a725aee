use std::{
  fs,
  path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use siteprose_markdown::{
  AlignmentClasses,
  AssetOptions,
  ExternalLinkOptions,
  MarkdownOptions,
  OptimizerOptions,
  utils::site_host,
};

use crate::error::ConfigError;

/// Configuration for siteprose.
///
/// Loaded from TOML or JSON files. Every field has a default, so a config
/// file only needs the keys it changes:
///
/// ```toml
/// [markdown]
/// site_url = "https://example.org"
///
/// [markdown.table_align]
/// center = "has-text-centered"
///
/// [assets]
/// root = "src/assets"
///
/// [images]
/// output_dir = "dist/_assets"
/// max_width = 1600
/// format = "webp"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Markdown rendering.
  pub markdown: MarkdownConfig,

  /// Image asset index.
  pub assets: AssetOptions,

  /// Image optimizer.
  pub images: OptimizerOptions,
}

/// The `[markdown]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownConfig {
  /// Enable GitHub Flavored Markdown.
  pub gfm: bool,

  /// Keep raw HTML embedded in markdown.
  pub allow_html: bool,

  /// Public URL of the site. Its host decides which absolute links are
  /// internal unless `external_links.site_host` is set.
  pub site_url: Option<String>,

  pub external_links: ExternalLinkOptions,

  pub table_align: AlignmentClasses,
}

impl Default for MarkdownConfig {
  fn default() -> Self {
    Self {
      gfm:            true,
      allow_html:     true,
      site_url:       None,
      external_links: ExternalLinkOptions::default(),
      table_align:    AlignmentClasses::default(),
    }
  }
}

impl Config {
  /// Load configuration from a single file.
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let value = read_value(path)?;
    serde_json::from_value(value).map_err(|e| {
      ConfigError::Config(format!(
        "Invalid configuration in {}: {e}",
        path.display()
      ))
    })
  }

  /// Load configuration from files and `KEY=VALUE` overrides.
  ///
  /// Files are layered in order: a later file only replaces the keys it
  /// sets. Without explicit files a config file in a standard location is
  /// used if one exists. Overrides use dotted keys (`images.max_width=800`)
  /// and are applied last.
  ///
  /// # Errors
  ///
  /// Returns an error if a file cannot be loaded, an override is malformed,
  /// or the resulting configuration is invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let files: Vec<PathBuf> = if config_files.is_empty() {
      Self::find_config_file()
        .inspect(|path| {
          log::info!("Using discovered config file: {}", path.display());
        })
        .into_iter()
        .collect()
    } else {
      config_files.to_vec()
    };

    let mut layered = Value::Object(Map::new());
    for path in &files {
      merge_values(&mut layered, read_value(path)?);
    }
    if files.len() > 1 {
      log::info!("Loaded and merged {} config files", files.len());
    }

    for override_str in config_overrides {
      apply_override(&mut layered, override_str)?;
    }

    let config: Self = serde_json::from_value(layered).map_err(|e| {
      ConfigError::Config(format!("Invalid configuration: {e}"))
    })?;
    config.validate()?;
    Ok(config)
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    let config_filenames = [
      "siteprose.toml",
      "siteprose.json",
      ".siteprose.toml",
      ".siteprose.json",
      ".config/siteprose.toml",
      ".config/siteprose.json",
    ];

    if let Ok(current_dir) = std::env::current_dir() {
      for filename in &config_filenames {
        let config_path = current_dir.join(filename);
        if config_path.is_file() {
          return Some(config_path);
        }
      }
    }

    if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
      let xdg_config_dir = PathBuf::from(xdg_config_home).join("siteprose");
      for filename in &["config.toml", "config.json"] {
        let config_path = xdg_config_dir.join(filename);
        if config_path.is_file() {
          return Some(config_path);
        }
      }
    }

    None
  }

  /// Check values serde cannot check on its own.
  ///
  /// # Errors
  ///
  /// Returns an error describing the first invalid value.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if let Some(url) = &self.markdown.site_url {
      if site_host(url).is_none() {
        return Err(ConfigError::Config(format!(
          "markdown.site_url is not an absolute URL: '{url}'"
        )));
      }
    }

    if self.assets.extensions.is_empty() {
      return Err(ConfigError::Config(
        "assets.extensions must list at least one file extension".to_string(),
      ));
    }

    if self.images.max_width == Some(0) {
      return Err(ConfigError::Config(
        "images.max_width must be greater than zero".to_string(),
      ));
    }

    Ok(())
  }

  /// Options for the markdown renderer.
  #[must_use]
  pub fn markdown_options(&self) -> MarkdownOptions {
    let mut external_links = self.markdown.external_links.clone();
    if external_links.site_host.is_none() {
      external_links.site_host =
        self.markdown.site_url.as_deref().and_then(site_host);
    }

    MarkdownOptions {
      gfm: self.markdown.gfm,
      allow_html: self.markdown.allow_html,
      external_links,
      table_align: self.markdown.table_align.clone(),
    }
  }

  /// Options for building the image asset index.
  #[must_use]
  pub fn asset_options(&self) -> AssetOptions {
    self.assets.clone()
  }

  /// Options for the default image optimizer.
  #[must_use]
  pub fn optimizer_options(&self) -> OptimizerOptions {
    self.images.clone()
  }
}

/// Read a TOML or JSON file into a JSON value, picked by extension.
#[allow(
  clippy::option_if_let_else,
  reason = "Clearer with explicit match on extension"
)]
fn read_value(path: &Path) -> Result<Value, ConfigError> {
  let content = fs::read_to_string(path).map_err(|e| {
    ConfigError::Config(format!(
      "Failed to read config file: {}: {}",
      path.display(),
      e
    ))
  })?;

  match path.extension().and_then(|ext| ext.to_str()) {
    Some(ext) => {
      match ext.to_lowercase().as_str() {
        "json" => {
          serde_json::from_str(&content).map_err(|e| {
            ConfigError::Config(format!(
              "Failed to parse JSON config from {}: {}",
              path.display(),
              e
            ))
          })
        },
        "toml" => {
          let table: toml::Table = toml::from_str(&content).map_err(|e| {
            ConfigError::Config(format!(
              "Failed to parse TOML config from {}: {}",
              path.display(),
              e
            ))
          })?;
          Ok(serde_json::to_value(table)?)
        },
        _ => {
          Err(ConfigError::Config(format!(
            "Unsupported config file format: {}",
            path.display()
          )))
        },
      }
    },
    None => {
      Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )))
    },
  }
}

/// Merge `overlay` into `base`. Tables merge key by key, anything else is
/// replaced.
fn merge_values(base: &mut Value, overlay: Value) {
  match (base, overlay) {
    (Value::Object(base), Value::Object(overlay)) => {
      for (key, value) in overlay {
        match base.get_mut(&key) {
          Some(existing) => merge_values(existing, value),
          None => {
            base.insert(key, value);
          },
        }
      }
    },
    (base, overlay) => *base = overlay,
  }
}

/// Apply one `dotted.key=VALUE` override.
///
/// The value is read as a TOML value (`800`, `true`, `["png"]`) and falls
/// back to a plain string.
fn apply_override(
  config: &mut Value,
  override_str: &str,
) -> Result<(), ConfigError> {
  let (key, raw) = override_str.split_once('=').ok_or_else(|| {
    ConfigError::Config(format!(
      "Invalid config override format: '{override_str}'. Expected KEY=VALUE"
    ))
  })?;
  let key = key.trim();
  if key.is_empty() || key.split('.').any(str::is_empty) {
    return Err(ConfigError::Config(format!(
      "Invalid config override key: '{key}'"
    )));
  }

  let value = parse_override_value(raw.trim());
  let mut target = config;
  for segment in key.split('.') {
    if !target.is_object() {
      *target = Value::Object(Map::new());
    }
    target = match target {
      Value::Object(map) => map.entry(segment).or_insert(Value::Null),
      _ => {
        return Err(ConfigError::Config(format!(
          "Cannot apply config override: '{key}'"
        )));
      },
    };
  }
  *target = value;
  Ok(())
}

fn parse_override_value(raw: &str) -> Value {
  toml::from_str::<toml::Table>(&format!("value = {raw}"))
    .ok()
    .and_then(|mut table| table.remove("value"))
    .and_then(|value| serde_json::to_value(value).ok())
    .unwrap_or_else(|| Value::String(raw.to_string()))
}
