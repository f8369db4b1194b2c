//! Shard RPC Handlers
//!
//! HTTP endpoints that expose the `ShardNode` to the gateway. They
//! translate requests into read-only calls on the shared node; the node
//! itself is immutable after initialization, so no locking is needed.

use axum::{Extension, Json};
use std::sync::Arc;

use super::protocol::{
    SearchRequest, SearchResponse, ShardHealthResponse, StatisticsResponse, WireAddressRecord,
};
use super::shard::ShardNode;

pub async fn handle_search(
    Extension(node): Extension<Arc<ShardNode>>,
    Json(request): Json<SearchRequest>,
) -> Json<SearchResponse> {
    tracing::info!(
        "search request with {} term(s): {:?}",
        request.query_terms.len(),
        request.query_terms
    );

    let records = node.search(&request.query_terms);
    let results: Vec<WireAddressRecord> =
        records.iter().map(WireAddressRecord::from_record).collect();

    tracing::info!("search completed, returning {} record(s)", results.len());

    Json(SearchResponse {
        result_count: results.len(),
        results,
    })
}

pub async fn handle_statistics(
    Extension(node): Extension<Arc<ShardNode>>,
) -> Json<StatisticsResponse> {
    let stats = node.statistics();
    Json(StatisticsResponse {
        total_records: stats.total_records,
        radix_tree_memory: stats.radix_tree_memory,
        forward_index_size: stats.forward_index_size,
        load_time_ms: stats.load_time_ms,
    })
}

pub async fn handle_health(
    Extension(node): Extension<Arc<ShardNode>>,
) -> Json<ShardHealthResponse> {
    Json(ShardHealthResponse {
        status: "healthy".to_string(),
        shard_id: node.shard_id(),
    })
}
