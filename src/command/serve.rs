//! Serve command: run the MCP server.
//!
//! Supports two transports:
//! - Stdio (default): MCP over standard input/output, the way desktop AI clients launch servers.
//! - HTTP (`--http`): rmcp's streamable HTTP transport mounted at `/mcp`.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::Router;
use clap::Parser;
use rmcp::{
    ServiceExt,
    transport::{
        stdio,
        streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager},
    },
};

use crate::internal::{
    aps::ApsClient,
    auth,
    config::ApsConfig,
    mcp::server::ApsMcpServer,
};

#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Serve the streamable HTTP transport instead of stdio
    #[arg(long)]
    pub http: bool,

    /// Host address to bind to (HTTP transport)
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on (HTTP transport)
    #[arg(short, long, default_value_t = 6789)]
    pub port: u16,

    /// APS API root, overrides APS_BASE_URL
    #[arg(long)]
    pub base_url: Option<String>,
}

/// Reads the environment configuration and applies a `--base-url` override.
pub fn load_config(base_url: Option<String>) -> ApsConfig {
    let mut config = ApsConfig::from_env();
    if let Some(base_url) = base_url {
        config.base_url = base_url;
    }
    tracing::debug!(?config, "loaded configuration");
    config
}

/// Wires the production upstream client and token provider into a server.
pub fn build_server(config: &ApsConfig) -> anyhow::Result<ApsMcpServer> {
    let client = ApsClient::new(&config.base_url)
        .with_context(|| format!("invalid APS base URL: {}", config.base_url))?;
    let tokens = auth::provider_from_config(config)?;
    if config.token.is_none() && !config.has_client_credentials() {
        tracing::warn!(
            "neither APS_TOKEN nor APS_CLIENT_ID/APS_CLIENT_SECRET is set; tool calls will fail"
        );
    }
    Ok(ApsMcpServer::new(Arc::new(client), Arc::new(tokens)))
}

pub async fn execute(args: ServeArgs) -> anyhow::Result<()> {
    let config = load_config(args.base_url.clone());
    let server = build_server(&config)?;

    if args.http {
        execute_http(server, &args.host, args.port).await
    } else {
        execute_stdio(server).await
    }
}

async fn execute_stdio(server: ApsMcpServer) -> anyhow::Result<()> {
    tracing::info!("starting APS MCP server on stdio");
    let running = server
        .serve(stdio())
        .await
        .context("failed to start MCP stdio server")?;
    running.waiting().await.context("MCP stdio server error")?;
    Ok(())
}

async fn execute_http(server: ApsMcpServer, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Every HTTP session gets a clone; clones share one mask registry.
    let service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        Default::default(),
    );
    let app = Router::new().nest_service("/mcp", service);

    tracing::info!(%addr, "APS MCP server listening at http://{}/mcp", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    Ok(())
}
