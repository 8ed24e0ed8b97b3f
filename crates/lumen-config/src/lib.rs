#![allow(clippy::must_use_candidate)]

mod loader;
pub mod server;
pub mod upstream;

use serde::Deserialize;

pub use server::*;
pub use upstream::*;

/// Fully resolved Lumen configuration
///
/// Built once at process start and passed by reference into the
/// normalizer, upstream client, and tool server constructors.
#[derive(Debug, Clone)]
pub struct Config {
    /// OpenAI-compatible upstream settings
    pub upstream: UpstreamConfig,
    /// MCP transport settings
    pub server: ServerConfig,
}

/// One configuration layer where every setting is optional
///
/// Layers come from the command line (with environment fallbacks applied
/// by the argument parser) and from an optional TOML file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    /// Upstream settings
    #[serde(default)]
    pub upstream: UpstreamLayer,
    /// Server settings
    #[serde(default)]
    pub server: ServerLayer,
}

impl ConfigLayer {
    /// Fill every unset value in `self` from `lower`
    #[must_use]
    pub fn or(self, lower: Self) -> Self {
        Self {
            upstream: self.upstream.or(lower.upstream),
            server: self.server.or(lower.server),
        }
    }
}
