//! Sharded Geocoding Search Cluster Library
//!
//! This library crate defines the core modules of the cluster.
//! It serves as the foundation for the two binary executables
//! (`data_node` and `gateway`).
//!
//! ## Architecture Modules
//! The system is composed of two tiers:
//!
//! - **`node`**: The shard node (data node). Loads a CSV of address
//!   records at startup, builds a compressed-trie inverted index plus a
//!   forward store, and answers prefix-aware multi-term searches over an
//!   HTTP/JSON RPC surface. Read-only after initialization.
//! - **`gateway`**: The public entry point. Holds a persistent RPC
//!   client per shard, fans each query out to all shards in parallel
//!   under a hard deadline, then merges, deduplicates, scores, and
//!   ranks the results behind the HTTP API.

pub mod gateway;
pub mod node;
