//! Gateway Entry Point
//!
//! Builds one RPC client per configured shard and serves the public HTTP
//! API until a shutdown signal arrives. Configuration comes from the
//! environment: `HTTP_PORT`, `DATA_NODE_0`, `DATA_NODE_1`,
//! `GRPC_TIMEOUT_MS`.

use anyhow::{Context, bail};
use axum::routing::{get, post};
use axum::{Extension, Router};
use std::net::SocketAddr;
use std::sync::Arc;

use geo_cluster::gateway::client::build_clients;
use geo_cluster::gateway::handlers::{handle_find_address, handle_health, handle_index};
use geo_cluster::gateway::types::{GatewayConfig, ShardEndpoint};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = gateway_config_from_env()?;
    tracing::info!(
        "starting gateway: http_port={} data_nodes={} rpc_timeout={}ms",
        config.http_port,
        config.data_nodes.len(),
        config.rpc_timeout_ms
    );
    for node in &config.data_nodes {
        tracing::info!("  data node {} at {}", node.shard_id, node.address);
    }

    let clients = Arc::new(build_clients(&config));
    let app = Router::new()
        .route("/", get(handle_index))
        .route("/health", get(handle_health))
        .route("/api/findAddress", post(handle_find_address))
        .layer(Extension(clients));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    tracing::info!("http server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("gateway stopped");
    Ok(())
}

fn gateway_config_from_env() -> anyhow::Result<GatewayConfig> {
    let http_port = match std::env::var("HTTP_PORT") {
        Ok(raw) => match raw.parse::<u16>() {
            Ok(port) if port > 0 => port,
            _ => bail!("HTTP_PORT must be between 1 and 65535, got {raw:?}"),
        },
        Err(_) => 18080,
    };

    let rpc_timeout_ms = match std::env::var("GRPC_TIMEOUT_MS") {
        Ok(raw) => match raw.parse::<u64>() {
            Ok(timeout) if timeout > 0 => timeout,
            _ => {
                tracing::warn!(
                    "GRPC_TIMEOUT_MS must be a positive integer, got {:?}; using default 5000",
                    raw
                );
                5000
            }
        },
        Err(_) => 5000,
    };

    let mut data_nodes = Vec::new();
    for (shard_id, default) in [(0u32, "localhost:50051"), (1u32, "localhost:50052")] {
        let address = std::env::var(format!("DATA_NODE_{shard_id}"))
            .unwrap_or_else(|_| default.to_string());
        if address.trim().is_empty() {
            continue;
        }
        data_nodes.push(ShardEndpoint { shard_id, address });
    }
    if data_nodes.is_empty() {
        bail!("no data nodes configured; set DATA_NODE_0 and/or DATA_NODE_1");
    }

    Ok(GatewayConfig {
        http_port,
        data_nodes,
        rpc_timeout_ms,
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
