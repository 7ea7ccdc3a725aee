use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for siteprose
#[derive(Parser, Debug)]
#[command(author, version, about = "siteprose: markdown to HTML for content sites")]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the siteprose CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Render a markdown file to HTML.
  Render {
    /// Markdown file to render, `-` for standard input.
    file: PathBuf,

    /// Extract a table of contents.
    #[arg(long)]
    toc: bool,

    /// Prefix for heading IDs and TOC entries.
    #[arg(short = 'p', long = "id-prefix")]
    id_prefix: Option<String>,

    /// Rewrite images to optimized assets from the asset directory.
    #[arg(short, long)]
    images: bool,

    /// Write the HTML to this file instead of standard output.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the table of contents as JSON to this file. Implies `--toc`.
    #[arg(long = "toc-output")]
    toc_output: Option<PathBuf>,

    /// Print the whole render result (HTML and TOC) as JSON.
    #[arg(long)]
    json: bool,
  },

  /// List the image asset index.
  Assets {
    /// Print the index as JSON.
    #[arg(long)]
    json: bool,
  },
}

impl Cli {
  /// Parse command line arguments.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
