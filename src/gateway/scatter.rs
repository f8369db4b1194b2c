//! Scatter/Gather Dispatch
//!
//! Broadcasts one query to every shard concurrently and waits until each
//! has produced a `ShardResult`. Slow shards are not cancelled when a
//! fast one returns; every shard contributes when it can, and the
//! per-call deadline inside the client bounds the total wait.

use std::time::Instant;

use super::client::ShardClient;
use super::types::ShardResult;

pub async fn query_all_shards(clients: &[ShardClient], query_terms: &[String]) -> Vec<ShardResult> {
    tracing::info!("querying {} shard(s) in parallel", clients.len());
    let started = Instant::now();

    let calls = clients.iter().map(|client| client.search(query_terms));
    let results = futures::future::join_all(calls).await;

    let successful = results.iter().filter(|result| result.success).count();
    let failed = results.len() - successful;
    tracing::info!(
        "scatter completed in {}ms: {} successful, {} failed",
        started.elapsed().as_millis(),
        successful,
        failed
    );
    if failed > 0 && successful > 0 {
        tracing::warn!(
            "partial failure: {} shard(s) succeeded, {} failed",
            successful,
            failed
        );
    } else if failed > 0 {
        tracing::error!("complete failure: all {} shard(s) failed", failed);
    }

    results
}
