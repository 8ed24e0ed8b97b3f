use std::net::SocketAddr;

use axum::{Router, response::IntoResponse, routing::get};
use http::StatusCode;
use rmcp::{
    ServiceExt,
    transport::streamable_http_server::{
        StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
    },
};
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::LumenServer;

/// Path the MCP endpoint is mounted at on the HTTP transport
pub const MCP_PATH: &str = "/mcp";

/// Serve over stdin/stdout until the client disconnects or `shutdown` fires
///
/// # Errors
///
/// Returns an error if the MCP handshake fails
pub async fn serve_stdio(server: LumenServer, shutdown: CancellationToken) -> anyhow::Result<()> {
    tracing::info!("serving MCP over stdio");

    let service = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| anyhow::anyhow!("stdio handshake failed: {e}"))?;

    let cancel = service.cancellation_token();
    tokio::select! {
        reason = service.waiting() => {
            let reason = reason?;
            tracing::info!(?reason, "stdio session ended");
        }
        () = shutdown.cancelled() => {
            cancel.cancel();
            tracing::info!("stdio session cancelled");
        }
    }

    Ok(())
}

/// Build the HTTP router: streamable MCP at `/mcp` plus `/health`
pub fn http_router(server: LumenServer) -> Router {
    let mcp = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health_handler))
        .nest_service(MCP_PATH, mcp)
        .layer(TraceLayer::new_for_http())
}

/// Serve streamable HTTP until `shutdown` is cancelled
///
/// # Errors
///
/// Returns an error if binding the TCP listener or serving fails
pub async fn serve_http(server: LumenServer, listen_address: SocketAddr, shutdown: CancellationToken) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_address).await?;
    serve_http_on(listener, server, shutdown).await
}

/// Serve streamable HTTP on an already bound listener
///
/// # Errors
///
/// Returns an error if serving fails
pub async fn serve_http_on(
    listener: tokio::net::TcpListener,
    server: LumenServer,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let local_addr = listener.local_addr()?;
    tracing::info!(%local_addr, path = MCP_PATH, "serving MCP over streamable HTTP");

    axum::serve(listener, http_router(server))
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            tracing::info!("graceful shutdown initiated");
        })
        .await?;

    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
