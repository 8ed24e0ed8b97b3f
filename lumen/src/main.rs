#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use args::Args;
use clap::Parser;
use lumen_config::{Config, ConfigLayer, Transport};
use lumen_mcp::{ImageAnalyzer, LumenServer};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize telemetry
    lumen_telemetry::init(&args.log_level, args.log_format)?;

    // CLI and environment first, then the config file
    let file_layer = match &args.config {
        Some(path) => ConfigLayer::load(path)?,
        None => ConfigLayer::default(),
    };
    let config = Config::resolve(args.layer().or(file_layer))?;

    tracing::info!(
        base_url = %config.upstream.base_url,
        model = %config.upstream.model,
        transport = %config.server.transport,
        stream = config.server.stream,
        max_retries = config.upstream.max_retries,
        "starting lumen"
    );

    let server = LumenServer::new(ImageAnalyzer::from_config(&config)?);

    // Set up graceful shutdown
    let shutdown = CancellationToken::new();
    let shutdown_clone = shutdown.clone();

    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown_clone.cancel();
    });

    match config.server.transport {
        Transport::Stdio => lumen_mcp::serve_stdio(server, shutdown).await?,
        Transport::Http => lumen_mcp::serve_http(server, config.server.listen_address, shutdown).await?,
    }

    tracing::info!("lumen stopped");
    Ok(())
}

/// Wait for a shutdown signal (`SIGINT` or `SIGTERM`)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("shutdown signal received");
}
