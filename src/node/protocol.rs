//! Shard RPC Protocol
//!
//! Endpoint constants and Data Transfer Objects for the shard node's
//! HTTP/JSON RPC surface. The gateway is the only intended caller.

use serde::{Deserialize, Serialize};

use super::types::AddressRecord;

// --- API Endpoints ---

/// Search the shard's indexes for a list of query terms.
pub const ENDPOINT_SEARCH: &str = "/rpc/search";
/// Load statistics captured at the end of initialization.
pub const ENDPOINT_STATISTICS: &str = "/rpc/statistics";
/// Liveness probe.
pub const ENDPOINT_HEALTH: &str = "/health";

// --- Data Transfer Objects ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query_terms: Vec<String>,
}

/// An address record as it travels between shard and gateway.
///
/// `hash` is the record id re-encoded as 16 lowercase hex digits; the
/// street/unit/city fields carry the display (pre-normalization) values
/// so the gateway scores what the user typed against what the file
/// contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireAddressRecord {
    pub hash: String,
    pub longitude: f64,
    pub latitude: f64,
    pub number: String,
    pub street: String,
    pub unit: String,
    pub city: String,
    pub postcode: String,
}

impl WireAddressRecord {
    pub fn from_record(record: &AddressRecord) -> Self {
        Self {
            hash: format!("{:016x}", record.hash),
            longitude: record.longitude,
            latitude: record.latitude,
            number: record.number.clone(),
            street: record.original_street.clone(),
            unit: record.original_unit.clone(),
            city: record.original_city.clone(),
            postcode: record.postcode.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<WireAddressRecord>,
    pub result_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatisticsResponse {
    pub total_records: usize,
    pub radix_tree_memory: usize,
    pub forward_index_size: usize,
    pub load_time_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShardHealthResponse {
    pub status: String,
    pub shard_id: u32,
}
