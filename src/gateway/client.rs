//! Shard RPC Client
//!
//! One `ShardClient` per configured shard, built once at startup and
//! multiplexed across request tasks (the underlying `reqwest::Client`
//! pools connections per host). Every call carries the same hard
//! deadline; a call is never retried, because a retry inside the
//! deadline would stretch the fan-out latency bound.

use std::time::{Duration, Instant};

use crate::node::protocol::{ENDPOINT_SEARCH, SearchRequest, SearchResponse};

use super::types::{GatewayConfig, ShardEndpoint, ShardResult};

pub struct ShardClient {
    shard_id: u32,
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
}

impl ShardClient {
    pub fn new(endpoint: &ShardEndpoint, http: reqwest::Client, timeout: Duration) -> Self {
        Self {
            shard_id: endpoint.shard_id,
            base_url: base_url(&endpoint.address),
            http,
            timeout,
        }
    }

    pub fn shard_id(&self) -> u32 {
        self.shard_id
    }

    /// Dispatches one search RPC and classifies the outcome: `ok` with
    /// records, `timeout` when the deadline fired, `error` for any other
    /// transport or server failure. Never panics, never propagates; the
    /// caller folds every outcome into the merged response.
    pub async fn search(&self, query_terms: &[String]) -> ShardResult {
        let started = Instant::now();
        let url = format!("{}{}", self.base_url, ENDPOINT_SEARCH);
        let request = SearchRequest {
            query_terms: query_terms.to_vec(),
        };

        tracing::debug!(
            "dispatching rpc to shard {} at {} (deadline {}ms)",
            self.shard_id,
            self.base_url,
            self.timeout.as_millis()
        );

        let response = self
            .http
            .post(&url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await;

        let elapsed_ms = started.elapsed().as_millis();
        let response = match response {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                tracing::error!("shard {} timed out after {}ms", self.shard_id, elapsed_ms);
                return ShardResult::failed(
                    self.shard_id,
                    format!("rpc timeout after {elapsed_ms}ms"),
                );
            }
            Err(e) => {
                tracing::error!(
                    "shard {} rpc failed after {}ms: {}",
                    self.shard_id,
                    elapsed_ms,
                    e
                );
                return ShardResult::failed(self.shard_id, format!("rpc error: {e}"));
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("shard {} returned status {}", self.shard_id, status);
            return ShardResult::failed(
                self.shard_id,
                format!("rpc error: shard returned {status}"),
            );
        }

        match response.json::<SearchResponse>().await {
            Ok(body) => {
                tracing::info!(
                    "shard {} returned {} record(s) in {}ms",
                    self.shard_id,
                    body.result_count,
                    started.elapsed().as_millis()
                );
                ShardResult::ok(self.shard_id, body.results)
            }
            Err(e) => {
                tracing::error!("shard {} sent an unreadable response: {}", self.shard_id, e);
                ShardResult::failed(self.shard_id, format!("rpc error: invalid response: {e}"))
            }
        }
    }
}

/// Builds the client set from the configuration, sharing one pooled HTTP
/// client across all shards.
pub fn build_clients(config: &GatewayConfig) -> Vec<ShardClient> {
    let http = reqwest::Client::new();
    let timeout = Duration::from_millis(config.rpc_timeout_ms);
    config
        .data_nodes
        .iter()
        .map(|endpoint| ShardClient::new(endpoint, http.clone(), timeout))
        .collect()
}

/// Normalizes a configured "host:port" into a base URL.
fn base_url(address: &str) -> String {
    let trimmed = address.trim();
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    with_scheme.trim_end_matches('/').to_string()
}
