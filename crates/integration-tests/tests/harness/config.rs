//! Builder for test configurations

use lumen_config::{Config, ConfigLayer, ServerLayer, Transport, UpstreamLayer};

/// Fluent builder for test configurations
pub struct ConfigBuilder {
    layer: ConfigLayer,
}

impl ConfigBuilder {
    /// Start from an empty layer pointed at `base_url`
    pub fn new(base_url: &str) -> Self {
        Self {
            layer: ConfigLayer {
                upstream: UpstreamLayer {
                    base_url: Some(base_url.parse().unwrap()),
                    api_key: Some("sk-test".to_owned().into()),
                    model: Some("mock-vision".to_owned()),
                    timeout_ms: Some(5_000),
                    ..UpstreamLayer::default()
                },
                server: ServerLayer::default(),
            },
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.layer.upstream.max_retries = Some(max_retries);
        self
    }

    /// Select the HTTP transport, where streaming is allowed
    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.layer.server.transport = Some(Transport::Http);
        self.layer.server.stream = Some(stream);
        self
    }

    pub fn build(self) -> Config {
        Config::resolve(self.layer).unwrap()
    }
}
