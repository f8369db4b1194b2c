//! Shard Node Entry Point
//!
//! Loads the shard's data file, builds the in-memory indexes, and serves
//! the RPC surface until a shutdown signal arrives. Configuration comes
//! from the environment: `SHARD_ID`, `DATA_FILE_PATH`, `GRPC_PORT`.

use anyhow::Context;
use axum::routing::{get, post};
use axum::{Extension, Router};
use std::net::SocketAddr;
use std::sync::Arc;

use geo_cluster::node::handlers::{handle_health, handle_search, handle_statistics};
use geo_cluster::node::protocol::{ENDPOINT_HEALTH, ENDPOINT_SEARCH, ENDPOINT_STATISTICS};
use geo_cluster::node::shard::ShardNode;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let shard_id = shard_id_from_env()?;
    let data_file_path = data_file_path_from_env(shard_id);
    let port = rpc_port_from_env(shard_id);

    tracing::info!(
        "starting data node: shard_id={} data_file={} port={}",
        shard_id,
        data_file_path,
        port
    );

    let mut node = ShardNode::new(shard_id, &data_file_path);
    node.initialize().context("data node initialization failed")?;

    let stats = node.statistics();
    tracing::info!(
        "shard {} ready: {} record(s), radix {} bytes, forward {} bytes, loaded in {} ms",
        shard_id,
        stats.total_records,
        stats.radix_tree_memory,
        stats.forward_index_size,
        stats.load_time_ms
    );

    let node = Arc::new(node);
    let app = Router::new()
        .route(ENDPOINT_SEARCH, post(handle_search))
        .route(ENDPOINT_STATISTICS, get(handle_statistics))
        .route(ENDPOINT_HEALTH, get(handle_health))
        .layer(Extension(node));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("rpc server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("could not bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("data node stopped");
    Ok(())
}

fn shard_id_from_env() -> anyhow::Result<u32> {
    match std::env::var("SHARD_ID") {
        Ok(raw) => raw
            .parse::<u32>()
            .map_err(|_| anyhow::anyhow!("SHARD_ID must be a non-negative integer, got {raw:?}")),
        Err(_) => Ok(0),
    }
}

fn data_file_path_from_env(shard_id: u32) -> String {
    std::env::var("DATA_FILE_PATH")
        .unwrap_or_else(|_| format!("data/shard_{shard_id}_data_demo.csv"))
}

fn rpc_port_from_env(shard_id: u32) -> u16 {
    let default = 50051 + shard_id as u16;
    match std::env::var("GRPC_PORT") {
        Ok(raw) => match raw.parse::<u16>() {
            Ok(port) if port > 0 => port,
            _ => {
                tracing::warn!("invalid GRPC_PORT {:?}, using default {}", raw, default);
                default
            }
        },
        Err(_) => default,
    }
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
