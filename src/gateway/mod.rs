//! Gateway Module
//!
//! The public entry point of the cluster. The gateway holds one
//! persistent RPC client per configured shard; each incoming address
//! query is fanned out to every shard in parallel under a hard deadline,
//! and the per-shard outcomes are classified independently so any subset
//! of shards succeeding still yields useful results.
//!
//! ## Submodules
//! - **`client`**: the per-shard RPC client with deadline and outcome
//!   classification (ok / timeout / error).
//! - **`scatter`**: parallel dispatch across all shards.
//! - **`ranking`**: cross-shard deduplication, relevance scoring, and
//!   bounded top-K ranking.
//! - **`handlers`**: HTTP request handlers for the Axum server.
//! - **`types`**: configuration and API DTOs.

pub mod client;
pub mod handlers;
pub mod ranking;
pub mod scatter;
pub mod types;

#[cfg(test)]
mod tests;
