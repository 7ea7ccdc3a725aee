//! The rendering pipeline.
//!
//! - [`core`]: stage composition and the render entry points
//! - [`types`]: renderer options and the renderer itself
pub mod core;
pub mod types;

pub use self::core::{render_markdown, render_markdown_with_images};

pub use types::{MarkdownOptions, MarkdownOptionsBuilder, MarkdownRenderer};
