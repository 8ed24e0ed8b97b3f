use std::path::Path;

use crate::{Config, ConfigLayer};

impl ConfigLayer {
    /// Load a layer from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or TOML parsing fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        toml::from_str(&raw).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))
    }
}

impl Config {
    /// Resolve a merged layer into a validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if validation of any section fails
    pub fn resolve(layer: ConfigLayer) -> anyhow::Result<Self> {
        Ok(Self {
            upstream: layer.upstream.resolve()?,
            server: layer.server.resolve(),
        })
    }
}
