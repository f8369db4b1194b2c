/// Tolerance used when comparing record coordinates for equality.
pub const COORD_EPSILON: f64 = 1e-9;

/// A single geocoded address, the unit of storage and of search results.
///
/// The `number`, `street`, `unit`, `city`, and `postcode` fields hold the
/// normalized forms used for indexing; `original_street`, `original_unit`,
/// and `original_city` preserve the raw CSV values for display in
/// responses. The `hash` field doubles as the record id within a shard.
#[derive(Debug, Clone)]
pub struct AddressRecord {
    pub longitude: f64,
    pub latitude: f64,
    pub hash: u64,
    pub number: String,
    pub street: String,
    pub unit: String,
    pub city: String,
    pub postcode: String,
    pub original_street: String,
    pub original_unit: String,
    pub original_city: String,
}

impl PartialEq for AddressRecord {
    fn eq(&self, other: &Self) -> bool {
        (self.longitude - other.longitude).abs() <= COORD_EPSILON
            && (self.latitude - other.latitude).abs() <= COORD_EPSILON
            && self.hash == other.hash
            && self.number == other.number
            && self.street == other.street
            && self.unit == other.unit
            && self.city == other.city
            && self.postcode == other.postcode
            && self.original_street == other.original_street
            && self.original_unit == other.original_unit
            && self.original_city == other.original_city
    }
}

/// Snapshot of a shard's load statistics, captured at the end of
/// `ShardNode::initialize`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub total_records: usize,
    pub radix_tree_memory: usize,
    pub forward_index_size: usize,
    pub load_time_ms: u64,
}
