//! Shard Node Module
//!
//! A single shard owns a disjoint partition of the address records. It
//! loads them once from a CSV file during initialization, builds two
//! coupled in-memory indexes, and then serves read-only searches for the
//! lifetime of the process.
//!
//! ## Overview
//! - **Normalization**: every value entering the radix index and every
//!   query term pass through the same deterministic transform, which is
//!   the sole guarantee that queries find what indexing stored.
//! - **Radix index**: a compressed trie mapping normalized terms (and
//!   their prefixes) to record ids.
//! - **Forward store**: the id -> record table from which full results
//!   are materialized after the index produces matching ids.
//!
//! ## Submodules
//! - **`normalizer`**: text normalization and street-suffix expansion.
//! - **`loader`**: CSV parsing and row validation.
//! - **`radix`**: the compressed-trie inverted index.
//! - **`forward`**: the id -> record forward store.
//! - **`shard`**: the composition root tying loader, indexes, and the
//!   query executor together.
//! - **`protocol`**: wire DTOs and endpoint constants for the shard RPC.
//! - **`handlers`**: HTTP request handlers for the Axum RPC server.
//! - **`types`**: the address record and node statistics.

pub mod forward;
pub mod handlers;
pub mod loader;
pub mod normalizer;
pub mod protocol;
pub mod radix;
pub mod shard;
pub mod types;
