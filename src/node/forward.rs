//! Forward Store
//!
//! The id -> record side of the shard: once the radix index has produced
//! a set of matching ids, full records are materialized from here. The
//! store is written only during shard initialization and is shared
//! read-only across request tasks afterwards.

use dashmap::DashMap;

use super::types::AddressRecord;

#[derive(Debug, Default)]
pub struct ForwardStore {
    records: DashMap<u64, AddressRecord>,
}

impl ForwardStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a record under its id. A duplicate id silently overwrites
    /// the previous record; the shard assumes ids are unique per input.
    pub fn insert(&self, id: u64, record: AddressRecord) {
        self.records.insert(id, record);
    }

    pub fn get(&self, id: u64) -> Option<AddressRecord> {
        self.records.get(&id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: u64) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Approximate byte footprint: map entries plus the capacity of every
    /// owned string. For observability only.
    pub fn storage_size(&self) -> usize {
        let mut total = std::mem::size_of::<Self>();
        for entry in self.records.iter() {
            let record = entry.value();
            total += std::mem::size_of::<u64>() + std::mem::size_of::<AddressRecord>();
            total += record.number.capacity()
                + record.street.capacity()
                + record.unit.capacity()
                + record.city.capacity()
                + record.postcode.capacity()
                + record.original_street.capacity()
                + record.original_unit.capacity()
                + record.original_city.capacity();
        }
        total
    }
}
