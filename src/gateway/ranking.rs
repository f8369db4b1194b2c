//! Merge, Deduplicate, Score, Rank
//!
//! Reduces the concatenated records of all successful shards to at most
//! `MAX_RESULTS` unique addresses ordered by relevance. Scoring compares
//! the record's wire fields against the original query terms byte-wise,
//! without re-normalization.

use crate::node::protocol::WireAddressRecord;

use super::types::{ScoredRecord, ShardResult};

/// Upper bound on the ranked result list.
pub const MAX_RESULTS: usize = 5;

/// Two records are duplicates when number, street, city, and postcode
/// all match byte-for-byte. The unit is deliberately excluded: the same
/// address often differs only in unit formatting across sources.
pub fn is_duplicate(a: &WireAddressRecord, b: &WireAddressRecord) -> bool {
    a.number == b.number && a.street == b.street && a.city == b.city && a.postcode == b.postcode
}

/// Relevance of one record against the query terms.
///
/// Base score is the percentage of terms found in any searchable field;
/// each term then earns positional bonuses per field (a match at the
/// start of the street or city is worth more), and complete addresses
/// get a small flat bonus.
pub fn relevance_score(record: &WireAddressRecord, query_terms: &[String]) -> f64 {
    let fields = [
        &record.street,
        &record.city,
        &record.postcode,
        &record.number,
    ];

    let matching_terms = query_terms
        .iter()
        .filter(|term| fields.iter().any(|field| field.contains(term.as_str())))
        .count();

    let mut score = 0.0;
    if !query_terms.is_empty() {
        score += matching_terms as f64 / query_terms.len() as f64 * 100.0;
    }

    for term in query_terms {
        let term = term.as_str();
        if record.street.contains(term) {
            score += if record.street.starts_with(term) {
                15.0
            } else {
                10.0
            };
        }
        if record.city.contains(term) {
            score += if record.city.starts_with(term) {
                8.0
            } else {
                5.0
            };
        }
        if record.postcode.contains(term) {
            score += 3.0;
        }
        if record.number.contains(term) {
            score += 5.0;
        }
    }

    let completeness = [
        &record.number,
        &record.street,
        &record.unit,
        &record.city,
        &record.postcode,
    ]
    .iter()
    .filter(|field| !field.is_empty())
    .count();
    score += completeness as f64 * 2.0;

    score
}

/// Merges the successful shards' records, drops cross-shard duplicates
/// (keeping the higher-scored copy; ties keep the incumbent), sorts by
/// score descending, and truncates to `max_results`. The sort is stable,
/// so equal scores keep their insertion order.
pub fn aggregate_and_rank(
    results: &[ShardResult],
    query_terms: &[String],
    max_results: usize,
) -> Vec<ScoredRecord> {
    let mut scored: Vec<ScoredRecord> = Vec::new();

    for result in results {
        if !result.success {
            continue;
        }
        for record in &result.records {
            let score = relevance_score(record, query_terms);

            if let Some(existing) = scored
                .iter_mut()
                .find(|entry| is_duplicate(&entry.record, record))
            {
                if score > existing.relevance_score {
                    tracing::debug!(
                        "duplicate address, replacing with higher scored copy ({} > {})",
                        score,
                        existing.relevance_score
                    );
                    existing.record = record.clone();
                    existing.shard_id = result.shard_id;
                    existing.relevance_score = score;
                }
                continue;
            }

            scored.push(ScoredRecord {
                record: record.clone(),
                shard_id: result.shard_id,
                relevance_score: score,
            });
        }
    }

    tracing::info!("{} unique record(s) after deduplication", scored.len());

    scored.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));
    scored.truncate(max_results);
    scored
}
