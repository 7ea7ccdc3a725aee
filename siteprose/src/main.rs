use color_eyre::eyre::Result;
use log::LevelFilter;
use siteprose_config::Config;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .parse_default_env()
    .init();

  let config = Config::load(&cli.config_files, &cli.config_overrides)?;

  match cli.command {
    Commands::Render {
      file,
      toc,
      id_prefix,
      images,
      output,
      toc_output,
      json,
    } => {
      let request = commands::RenderRequest {
        file,
        with_toc: toc || toc_output.is_some(),
        id_prefix,
        images,
        output,
        toc_output,
        json,
      };
      commands::render(&config, &request)
    },
    Commands::Assets { json } => commands::list_assets(&config, json),
  }
}
