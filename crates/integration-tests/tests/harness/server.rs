//! Test harness that runs the Lumen tool server in-process

use std::net::SocketAddr;
use std::time::Duration;

use lumen_config::Config;
use lumen_image::ImageNormalizer;
use lumen_llm::{RetryPolicy, UpstreamClient};
use lumen_mcp::{ImageAnalyzer, LumenServer};
use rmcp::model::{CallToolRequestParam, CallToolResult, RawContent};
use rmcp::service::{RoleClient, RunningService, ServiceExt as _};
use tokio_util::sync::CancellationToken;

/// Build a tool server whose retries back off in milliseconds
pub fn lumen_server(config: &Config) -> LumenServer {
    let retry = RetryPolicy::new(config.upstream.max_retries).with_base_delay(Duration::from_millis(1));
    let client = UpstreamClient::new(&config.upstream).unwrap().with_retry_policy(retry);
    let analyzer = ImageAnalyzer::new(
        ImageNormalizer::new().unwrap(),
        client,
        config.upstream.model.clone(),
        config.server.stream,
    );

    LumenServer::new(analyzer)
}

/// MCP client connected to an in-process server over an in-memory pipe
pub struct TestClient {
    client: RunningService<RoleClient, ()>,
}

impl TestClient {
    pub async fn start(config: &Config) -> anyhow::Result<Self> {
        let server = lumen_server(config);
        let (server_io, client_io) = tokio::io::duplex(1024 * 1024);

        tokio::spawn(async move {
            let running = server.serve(server_io).await?;
            running.waiting().await?;
            anyhow::Ok(())
        });

        let client = ().serve(client_io).await?;

        Ok(Self { client })
    }

    /// Names of all advertised tools
    pub async fn tool_names(&self) -> anyhow::Result<Vec<String>> {
        let tools = self.client.list_all_tools().await?;
        Ok(tools.into_iter().map(|t| t.name.into_owned()).collect())
    }

    /// Call a tool with JSON object arguments
    pub async fn call(&self, name: &str, arguments: serde_json::Value) -> anyhow::Result<CallToolResult> {
        let arguments = match arguments {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        };

        let result = self
            .client
            .call_tool(CallToolRequestParam {
                name: name.to_owned().into(),
                arguments,
            })
            .await?;

        Ok(result)
    }
}

/// First text block of a tool result
pub fn result_text(result: &CallToolResult) -> String {
    result
        .content
        .iter()
        .find_map(|c| match &c.raw {
            RawContent::Text(t) => Some(t.text.clone()),
            _ => None,
        })
        .unwrap_or_default()
}

/// A running streamable HTTP server instance
pub struct TestHttpServer {
    addr: SocketAddr,
    shutdown: CancellationToken,
    client: reqwest::Client,
}

impl TestHttpServer {
    /// Binds to port 0 for automatic port assignment
    pub async fn start(config: &Config) -> anyhow::Result<Self> {
        let server = lumen_server(config);
        let shutdown = CancellationToken::new();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;

        tokio::spawn(lumen_mcp::serve_http_on(listener, server, shutdown.clone()));

        Ok(Self {
            addr,
            shutdown,
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl Drop for TestHttpServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
