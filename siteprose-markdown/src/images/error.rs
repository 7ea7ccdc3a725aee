//! Error types for image assets.
use std::{io, path::PathBuf};

/// Result type for image optimization.
pub type ImageResult<T> = Result<T, ImageError>;

/// Errors raised while building the asset index.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
  #[error("Asset directory '{}' does not exist", .0.display())]
  MissingDirectory(PathBuf),
  #[error("Failed to read asset directory: {0}")]
  Walk(#[from] walkdir::Error),
  #[error("Failed to read '{}': {source}", path.display())]
  Read { path: PathBuf, source: io::Error },
  #[error("Failed to read dimensions of '{}': {source}", path.display())]
  Dimensions {
    path:   PathBuf,
    source: image::ImageError,
  },
}

/// Errors raised by an [`ImageOptimizer`](super::ImageOptimizer).
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
  #[error("Failed to read '{}': {source}", path.display())]
  Read { path: PathBuf, source: io::Error },
  #[error("Failed to write '{}': {source}", path.display())]
  Write { path: PathBuf, source: io::Error },
  #[error("Failed to process image: {0}")]
  Decode(#[from] image::ImageError),
  #[error("Image worker failed: {0}")]
  Worker(#[from] tokio::task::JoinError),
  #[error("Image optimization failed: {0}")]
  Optimizer(String),
}
