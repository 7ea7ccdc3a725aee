pub mod config;
pub mod error;

pub use config::{Config, MarkdownConfig};
pub use error::ConfigError;
