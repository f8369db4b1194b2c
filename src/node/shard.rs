//! Shard Composition Root
//!
//! Ties the loader, the radix index, and the forward store together:
//! `initialize` performs the one-time load and index build, `search`
//! executes the multi-term intersection algorithm, and `statistics`
//! exposes the load snapshot. After `initialize` every operation is a
//! pure read, safe to call from many tasks concurrently.

use anyhow::{Result, bail};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use super::forward::ForwardStore;
use super::loader;
use super::normalizer::{normalize, normalize_street_suffix};
use super::radix::RadixIndex;
use super::types::{AddressRecord, Statistics};

/// Separator used when composing multi-field search keys.
const KEY_SEPARATOR: char = '|';

/// Components of a structured ("number street, city, postcode") query.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedAddress {
    pub number: String,
    pub street: String,
    pub city: String,
    pub postcode: String,
}

pub struct ShardNode {
    shard_id: u32,
    data_file_path: PathBuf,
    radix: RadixIndex,
    forward: ForwardStore,
    stats: Statistics,
    /// Ids the radix index produced but the forward store did not know.
    /// The two structures are built in lockstep, so anything but zero
    /// here indicates a defect.
    forward_misses: AtomicU64,
}

impl ShardNode {
    pub fn new(shard_id: u32, data_file_path: impl Into<PathBuf>) -> Self {
        Self {
            shard_id,
            data_file_path: data_file_path.into(),
            radix: RadixIndex::new(),
            forward: ForwardStore::new(),
            stats: Statistics::default(),
            forward_misses: AtomicU64::new(0),
        }
    }

    pub fn shard_id(&self) -> u32 {
        self.shard_id
    }

    /// Loads the data file and builds both indexes. Zero accepted records
    /// is an error: a shard with nothing to serve must not serve.
    pub fn initialize(&mut self) -> Result<()> {
        let started = Instant::now();
        tracing::info!(
            "shard {} loading data from {}",
            self.shard_id,
            self.data_file_path.display()
        );

        let summary = loader::load_records(&self.data_file_path)?;
        if summary.records.is_empty() {
            bail!(
                "no valid records loaded from {}",
                self.data_file_path.display()
            );
        }
        tracing::info!(
            "shard {} parsed {} record(s), {} rejected",
            self.shard_id,
            summary.records.len(),
            summary.rejected
        );

        let total_records = summary.records.len();
        self.build_indexes(summary.records);

        self.stats = Statistics {
            total_records,
            radix_tree_memory: self.radix.memory_usage(),
            forward_index_size: self.forward.storage_size(),
            load_time_ms: started.elapsed().as_millis() as u64,
        };
        tracing::info!(
            "shard {} index build complete: {} records, radix {} bytes, forward {} bytes, {} ms",
            self.shard_id,
            self.stats.total_records,
            self.stats.radix_tree_memory,
            self.stats.forward_index_size,
            self.stats.load_time_ms
        );

        Ok(())
    }

    fn build_indexes(&mut self, records: Vec<AddressRecord>) {
        for record in records {
            let id = record.hash;

            for key in composite_keys(&record) {
                self.radix.insert(&key, id);
            }

            // Individual fields make multi-term queries intersect and
            // prefix queries useful. The street is indexed with its
            // suffix expanded so "PARK AVENUE" finds rows that
            // abbreviate to "Park Ave".
            let street_key = normalize_street_suffix(&record.street);
            if !street_key.is_empty() {
                self.radix.insert(&street_key, id);
            }
            if !record.city.is_empty() {
                self.radix.insert(&record.city, id);
            }
            if !record.postcode.is_empty() {
                self.radix.insert(&record.postcode, id);
            }
            if !record.number.is_empty() {
                self.radix.insert(&record.number, id);
            }

            self.forward.insert(id, record);
        }
    }

    /// Executes a query. Every returned record had, at indexing time, at
    /// least one indexed field that each normalized query term prefixes.
    pub fn search(&self, query_terms: &[String]) -> Vec<AddressRecord> {
        if query_terms.is_empty() {
            return Vec::new();
        }

        let matching = self.find_matching_ids(query_terms);
        tracing::debug!(
            "shard {} matched {} id(s) for {} term(s)",
            self.shard_id,
            matching.len(),
            query_terms.len()
        );

        let mut results = Vec::with_capacity(matching.len());
        for id in matching {
            match self.forward.get(id) {
                Some(record) => results.push(record),
                None => {
                    self.forward_misses.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!(
                        "index inconsistency: id {:016x} in radix index but not in forward store",
                        id
                    );
                }
            }
        }
        results
    }

    fn find_matching_ids(&self, query_terms: &[String]) -> Vec<u64> {
        // A single comma-carrying term is a structured address query.
        if query_terms.len() == 1 && query_terms[0].contains(',') {
            return self.structured_candidates(&query_terms[0]);
        }

        let normalized: Vec<String> = query_terms.iter().map(|t| normalize(t)).collect();

        let mut matched = self.radix.search(&normalized[0]);
        if matched.is_empty() || normalized.len() == 1 {
            return matched;
        }

        for term in &normalized[1..] {
            let term_ids: HashSet<u64> = self.radix.search(term).into_iter().collect();
            matched.retain(|id| term_ids.contains(id));
            if matched.is_empty() {
                break;
            }
        }
        matched
    }

    /// Resolves a structured query against the composite keys, most
    /// specific first; the first key with any hits wins.
    fn structured_candidates(&self, query: &str) -> Vec<u64> {
        let parsed = parse_structured_query(query);
        let number = normalize(&parsed.number);
        let street = normalize_street_suffix(&parsed.street);
        let city = normalize(&parsed.city);
        let postcode = normalize(&parsed.postcode);

        let mut keys = Vec::new();
        if !number.is_empty() && !street.is_empty() {
            if !city.is_empty() {
                if !postcode.is_empty() {
                    keys.push(format!(
                        "{number}{KEY_SEPARATOR}{street}{KEY_SEPARATOR}{city}{KEY_SEPARATOR}{postcode}"
                    ));
                }
                keys.push(format!(
                    "{number}{KEY_SEPARATOR}{street}{KEY_SEPARATOR}{city}"
                ));
            }
            keys.push(format!("{number}{KEY_SEPARATOR}{street}"));
        }

        for key in keys {
            let ids = self.radix.search(&key);
            if !ids.is_empty() {
                tracing::info!(
                    "shard {} structured query matched {} record(s) via key {:?}",
                    self.shard_id,
                    ids.len(),
                    key
                );
                return ids;
            }
        }
        Vec::new()
    }

    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    /// Defect counter for radix ids missing from the forward store.
    pub fn forward_miss_count(&self) -> u64 {
        self.forward_misses.load(Ordering::Relaxed)
    }
}

/// Composite keys indexed for each record so structured queries can hit
/// an exact address in one lookup. The street component carries its
/// suffix expansion, matching `structured_candidates`.
fn composite_keys(record: &AddressRecord) -> Vec<String> {
    let number = &record.number;
    let street = normalize_street_suffix(&record.street);
    let city = &record.city;
    let postcode = &record.postcode;

    let mut keys = Vec::new();
    if !number.is_empty() && !street.is_empty() {
        if !city.is_empty() {
            keys.push(format!(
                "{number}{KEY_SEPARATOR}{street}{KEY_SEPARATOR}{city}"
            ));
            if !postcode.is_empty() {
                keys.push(format!(
                    "{number}{KEY_SEPARATOR}{street}{KEY_SEPARATOR}{city}{KEY_SEPARATOR}{postcode}"
                ));
            }
        }
        keys.push(format!("{number}{KEY_SEPARATOR}{street}"));
    }
    keys
}

/// Splits a structured query on commas: "number street, city, postcode".
/// The first comma-separated part contributes the leading token as the
/// number and the rest as the street.
pub fn parse_structured_query(query: &str) -> ParsedAddress {
    // Raw-empty parts (consecutive commas) are dropped before trimming,
    // so a blank-but-present component keeps its position.
    let parts: Vec<&str> = query
        .split(',')
        .filter(|part| !part.is_empty())
        .map(str::trim)
        .collect();

    let mut parsed = ParsedAddress::default();

    if let Some(first) = parts.first() {
        let mut tokens = first.split_whitespace();
        if let Some(number) = tokens.next() {
            parsed.number = number.to_string();
        }
        parsed.street = tokens.collect::<Vec<_>>().join(" ");
    }
    if parts.len() >= 2 {
        parsed.city = parts[1].to_string();
    }
    if parts.len() >= 3 {
        parsed.postcode = parts[2].to_string();
    }

    parsed
}
