use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use serde::Deserialize;

/// Default listen address for the HTTP transport
pub const DEFAULT_LISTEN_ADDRESS: SocketAddr = SocketAddr::new(std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST), 3000);

/// How MCP messages reach the server
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// Streamable HTTP with server-sent events
    #[serde(alias = "sse")]
    Http,
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" | "sse" => Ok(Self::Http),
            other => Err(format!("unknown transport '{other}', expected 'stdio' or 'http'")),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdio => f.write_str("stdio"),
            Self::Http => f.write_str("http"),
        }
    }
}

/// Resolved transport settings
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Selected transport
    pub transport: Transport,
    /// Bind address for the HTTP transport
    pub listen_address: SocketAddr,
    /// Request streamed completions from the upstream
    ///
    /// Always `false` on the stdio transport.
    pub stream: bool,
}

/// Optional server settings from a single layer
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerLayer {
    #[serde(default)]
    pub transport: Option<Transport>,
    #[serde(default)]
    pub listen_address: Option<SocketAddr>,
    #[serde(default)]
    pub stream: Option<bool>,
}

impl ServerLayer {
    /// Fill unset values from a lower-precedence layer
    #[must_use]
    pub fn or(self, lower: Self) -> Self {
        Self {
            transport: self.transport.or(lower.transport),
            listen_address: self.listen_address.or(lower.listen_address),
            stream: self.stream.or(lower.stream),
        }
    }

    /// Apply built-in defaults
    pub fn resolve(self) -> ServerConfig {
        let transport = self.transport.unwrap_or_default();

        let stream = match transport {
            Transport::Stdio => {
                if self.stream == Some(true) {
                    tracing::warn!("streaming is not available on the stdio transport, disabling");
                }
                false
            }
            Transport::Http => self.stream.unwrap_or(true),
        };

        ServerConfig {
            transport,
            listen_address: self.listen_address.unwrap_or(DEFAULT_LISTEN_ADDRESS),
            stream,
        }
    }
}
