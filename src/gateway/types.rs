//! Gateway Configuration and API Types

use serde::Serialize;

use crate::node::protocol::WireAddressRecord;

/// One configured shard endpoint.
#[derive(Debug, Clone)]
pub struct ShardEndpoint {
    pub shard_id: u32,
    /// "host:port" string; the scheme is added by the client.
    pub address: String,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub http_port: u16,
    pub data_nodes: Vec<ShardEndpoint>,
    /// Per-shard RPC deadline in milliseconds (GRPC_TIMEOUT_MS).
    pub rpc_timeout_ms: u64,
}

/// Outcome of one shard RPC within a single query.
#[derive(Debug, Clone)]
pub struct ShardResult {
    pub shard_id: u32,
    pub success: bool,
    pub error: Option<String>,
    pub records: Vec<WireAddressRecord>,
}

impl ShardResult {
    pub fn ok(shard_id: u32, records: Vec<WireAddressRecord>) -> Self {
        Self {
            shard_id,
            success: true,
            error: None,
            records,
        }
    }

    pub fn failed(shard_id: u32, error: String) -> Self {
        Self {
            shard_id,
            success: false,
            error: Some(error),
            records: Vec::new(),
        }
    }
}

/// A unique record with its originating shard and relevance score, as it
/// appears in the ranked response.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredRecord {
    #[serde(flatten)]
    pub record: WireAddressRecord,
    pub shard_id: u32,
    pub relevance_score: f64,
}

#[derive(Debug, Serialize)]
pub struct FindAddressResponse {
    pub query: String,
    pub query_terms: Vec<String>,
    pub results: Vec<ScoredRecord>,
    pub result_count: usize,
    pub successful_nodes: usize,
    pub failed_nodes: usize,
    /// Present only when no shard succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GatewayHealthResponse {
    pub status: &'static str,
    pub data_nodes: usize,
}
