use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use lumen_config::{ConfigLayer, ServerLayer, Transport, UpstreamLayer};
use lumen_telemetry::LogFormat;
use secrecy::SecretString;
use url::Url;

/// Lumen image analysis MCP server
#[derive(Debug, Parser)]
#[command(name = "lumen", version, about = "MCP server for summarizing and comparing images")]
pub struct Args {
    /// Path to an optional TOML configuration file
    #[arg(short, long, env = "LUMEN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "LUMEN_BASE_URL")]
    pub base_url: Option<Url>,

    /// Bearer credential for the upstream API
    #[arg(long, env = "LUMEN_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Vision-capable model name
    #[arg(long, env = "LUMEN_MODEL")]
    pub model: Option<String>,

    /// Per-attempt upstream timeout in milliseconds
    #[arg(long, env = "LUMEN_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Retries after the first failed upstream attempt
    #[arg(long, env = "LUMEN_MAX_RETRIES")]
    pub max_retries: Option<u32>,

    /// Stream upstream completions (HTTP transport only)
    #[arg(long, env = "LUMEN_STREAM")]
    pub stream: Option<bool>,

    /// MCP transport: stdio or http
    #[arg(long, env = "LUMEN_TRANSPORT")]
    pub transport: Option<Transport>,

    /// Listen address for the HTTP transport
    #[arg(long, env = "LUMEN_LISTEN")]
    pub listen: Option<SocketAddr>,

    /// Log filter used when `RUST_LOG` is unset
    #[arg(long, default_value = "info", env = "LUMEN_LOG_LEVEL")]
    pub log_level: String,

    /// Log line format: text or json
    #[arg(long, default_value_t = LogFormat::Text, env = "LUMEN_LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl Args {
    /// Highest-precedence configuration layer
    pub fn layer(&self) -> ConfigLayer {
        ConfigLayer {
            upstream: UpstreamLayer {
                base_url: self.base_url.clone(),
                api_key: self.api_key.clone().map(SecretString::from),
                model: self.model.clone(),
                timeout_ms: self.timeout_ms,
                max_retries: self.max_retries,
            },
            server: ServerLayer {
                transport: self.transport,
                listen_address: self.listen,
                stream: self.stream,
            },
        }
    }
}
