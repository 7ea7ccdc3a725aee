use thiserror::Error;

/// Error type for siteprose-config operations
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Configuration error: {0}")]
  Config(String),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),
}
