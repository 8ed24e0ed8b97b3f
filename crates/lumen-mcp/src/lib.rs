//! MCP tool server for Lumen
//!
//! Exposes `summarize_image` and `compare_images`, normalizing every image
//! reference before forwarding it to the upstream chat-completion model.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod analyzer;
mod error;
mod server;
mod transport;

pub use analyzer::{DEFAULT_COMPARE_PROMPT, DEFAULT_SUMMARIZE_PROMPT, ImageAnalyzer, MIN_COMPARE_IMAGES};
pub use error::ToolError;
pub use server::{CompareImagesParams, LumenServer, SummarizeImageParams};
pub use transport::{MCP_PATH, http_router, serve_http, serve_http_on, serve_stdio};
