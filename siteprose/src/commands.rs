use std::{
  fs,
  io::{self, Read, Write},
  path::{Path, PathBuf},
  sync::Arc,
};

use color_eyre::eyre::{Context, Result};
use log::info;
use siteprose_config::Config;
use siteprose_markdown::{
  AssetOptimizer,
  ImageAssetIndex,
  ImageResolver,
  MarkdownRenderer,
  RenderOptions,
};

/// Arguments of the `render` subcommand.
#[derive(Debug)]
pub struct RenderRequest {
  pub file:       PathBuf,
  pub with_toc:   bool,
  pub id_prefix:  Option<String>,
  pub images:     bool,
  pub output:     Option<PathBuf>,
  pub toc_output: Option<PathBuf>,
  pub json:       bool,
}

/// Render one markdown file.
pub fn render(config: &Config, request: &RenderRequest) -> Result<()> {
  let markdown = read_input(&request.file)?;
  let renderer = MarkdownRenderer::new(config.markdown_options());
  let options = RenderOptions::default()
    .toc(request.with_toc)
    .prefixed(request.id_prefix.clone());

  let result = if request.images {
    let resolver = image_resolver(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
      .build()
      .wrap_err("Failed to start async runtime")?;
    runtime.block_on(renderer.render_with_images(&markdown, &options, &resolver))
  } else {
    renderer.render(&markdown, &options)
  };

  if let Some(path) = &request.toc_output {
    let toc = serde_json::to_string_pretty(&result.toc.clone().unwrap_or_default())?;
    fs::write(path, toc)
      .wrap_err_with(|| format!("Failed to write TOC: {}", path.display()))?;
    info!("Wrote table of contents to {}", path.display());
  }

  let body = if request.json {
    serde_json::to_string_pretty(&result)?
  } else {
    result.html
  };
  write_output(request.output.as_deref(), &body)
}

/// Print the image asset index.
pub fn list_assets(config: &Config, json: bool) -> Result<()> {
  let index = ImageAssetIndex::build(&config.asset_options())?;

  let body = if json {
    let assets: Vec<_> = index.iter().collect();
    serde_json::to_string_pretty(&assets)?
  } else {
    let mut lines = String::new();
    for asset in index.iter() {
      let size = match (asset.width, asset.height) {
        (Some(w), Some(h)) => format!("{w}x{h}"),
        _ => "?".to_string(),
      };
      lines.push_str(&format!(
        "{}\t{}\t{size}\n",
        asset.source_path,
        asset.format.extension()
      ));
    }
    lines
  };

  write_output(None, &body)?;
  info!("{} image asset(s) indexed", index.len());
  Ok(())
}

fn image_resolver(config: &Config) -> Result<ImageResolver> {
  let asset_options = config.asset_options();
  let index = ImageAssetIndex::build(&asset_options).wrap_err_with(|| {
    format!("Failed to index assets in {}", asset_options.root.display())
  })?;
  info!("Indexed {} image asset(s)", index.len());

  Ok(ImageResolver::new(
    Arc::new(index),
    AssetOptimizer::new(config.optimizer_options()),
  ))
}

fn read_input(path: &Path) -> Result<String> {
  if path == Path::new("-") {
    let mut markdown = String::new();
    io::stdin()
      .read_to_string(&mut markdown)
      .wrap_err("Failed to read standard input")?;
    return Ok(markdown);
  }
  fs::read_to_string(path)
    .wrap_err_with(|| format!("Failed to read {}", path.display()))
}

fn write_output(path: Option<&Path>, body: &str) -> Result<()> {
  if let Some(path) = path {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
      fs::create_dir_all(parent).wrap_err_with(|| {
        format!("Failed to create directory: {}", parent.display())
      })?;
    }
    fs::write(path, body)
      .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    return Ok(());
  }

  let mut stdout = io::stdout().lock();
  stdout.write_all(body.as_bytes())?;
  if !body.ends_with('\n') {
    stdout.write_all(b"\n")?;
  }
  stdout.flush()?;
  Ok(())
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use super::*;

  #[test]
  fn test_render_writes_html_and_toc() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page.md");
    fs::write(&input, "# Title\n\n## Sub\n").unwrap();

    let request = RenderRequest {
      file:       input,
      with_toc:   true,
      id_prefix:  Some("sec1".to_string()),
      images:     false,
      output:     Some(dir.path().join("out").join("page.html")),
      toc_output: Some(dir.path().join("toc.json")),
      json:       false,
    };
    render(&Config::default(), &request).unwrap();

    let html = fs::read_to_string(dir.path().join("out").join("page.html")).unwrap();
    assert_eq!(
      html,
      r#"<h1 id="sec1-title">Title</h1><h2 id="sec1-sub">Sub</h2>"#
    );

    let toc: serde_json::Value = serde_json::from_str(
      &fs::read_to_string(dir.path().join("toc.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(toc[0]["id"], "sec1-title");
    assert_eq!(toc[0]["children"][0]["id"], "sec1-sub");
  }

  #[test]
  fn test_render_missing_file_fails() {
    let request = RenderRequest {
      file:       PathBuf::from("/definitely/not/here.md"),
      with_toc:   false,
      id_prefix:  None,
      images:     false,
      output:     None,
      toc_output: None,
      json:       false,
    };
    assert!(render(&Config::default(), &request).is_err());
  }

  #[test]
  fn test_images_need_asset_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("page.md");
    fs::write(&input, "![Logo](/src/assets/logo.png)\n").unwrap();

    let mut config = Config::default();
    config.assets.root = dir.path().join("missing-assets");
    let request = RenderRequest {
      file:       input,
      with_toc:   false,
      id_prefix:  None,
      images:     true,
      output:     Some(dir.path().join("page.html")),
      toc_output: None,
      json:       false,
    };
    assert!(render(&config, &request).is_err());
  }
}
