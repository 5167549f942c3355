//! In-memory record store.
//!
//! [`StringStore`] holds every analyzed string keyed by its SHA-256 hash and
//! answers [`RecordQuery`]s through the [`RecordStore`] trait, which is all the
//! filter engine depends on.

use crate::analysis::sha256_hex;
use crate::error::StoreError;
use crate::filter_types::RecordQuery;
use crate::record::StoredRecord;
use crate::search::filter::matches_query;
use crate::storage::wal::WalEntry;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// A queryable collection of records supporting conjunctive predicates.
pub trait RecordStore {
    /// Returns every record matching all predicates of `query`, in insertion order.
    fn find(&self, query: &RecordQuery) -> Vec<Arc<StoredRecord>>;

    /// Number of stored records.
    fn len(&self) -> usize;

    /// Returns `true` if the store holds no records.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Internal data for the store, protected by a `RwLock`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreData {
    /// Records keyed by `id` (the content hash).
    pub records: HashMap<String, Arc<StoredRecord>>,
    /// Sequence number handed to the next inserted record.
    pub next_seq: u64,
}

impl StoreData {
    /// Validate internal invariants after deserialization.
    ///
    /// Checks that every key equals its record's id and content hash and that
    /// no record carries a sequence number at or beyond `next_seq`.
    pub fn validate(&self) -> Result<(), String> {
        for (key, record) in &self.records {
            if *key != record.id {
                return Err(format!("record key {} != record id {}", key, record.id));
            }
            if record.id != record.properties.sha256_hash {
                return Err(format!(
                    "record id {} != sha256_hash {}",
                    record.id, record.properties.sha256_hash
                ));
            }
            if record.seq >= self.next_seq {
                return Err(format!(
                    "record {} has seq {} >= next_seq {}",
                    record.id, record.seq, self.next_seq
                ));
            }
        }
        Ok(())
    }
}

/// A thread-safe store of analyzed strings.
///
/// Cloning a `StringStore` produces a new handle to the same shared data.
#[derive(Debug, Clone, Default)]
pub struct StringStore {
    pub data: Arc<RwLock<StoreData>>,
}

impl StringStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps already loaded data, e.g. from a snapshot.
    pub fn from_data(data: StoreData) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Inserts a record, assigning its sequence number.
    /// Fails if a record with the same id already exists.
    pub fn insert(&self, mut record: StoredRecord) -> Result<Arc<StoredRecord>, StoreError> {
        let mut data = self.data.write();
        if data.records.contains_key(&record.id) {
            return Err(StoreError::AlreadyExists(record.id));
        }
        record.seq = data.next_seq;
        data.next_seq += 1;
        let record = Arc::new(record);
        data.records.insert(record.id.clone(), Arc::clone(&record));
        Ok(record)
    }

    /// Returns `true` if a record with this id is stored.
    pub fn contains(&self, id: &str) -> bool {
        self.data.read().records.contains_key(id)
    }

    /// Retrieves a record by id (content hash).
    pub fn get(&self, id: &str) -> Option<Arc<StoredRecord>> {
        self.data.read().records.get(id).cloned()
    }

    /// Looks `key` up as an id first, then as a raw string value.
    pub fn resolve(&self, key: &str) -> Option<Arc<StoredRecord>> {
        self.get(key).or_else(|| self.get(&sha256_hex(key)))
    }

    /// Removes a record by id, returning it if it existed.
    pub fn delete(&self, id: &str) -> Result<Arc<StoredRecord>, StoreError> {
        self.data
            .write()
            .records
            .remove(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// All records in insertion order.
    pub fn records(&self) -> Vec<Arc<StoredRecord>> {
        self.find(&RecordQuery::default())
    }

    /// Re-applies WAL entries on startup. Returns the number of entries that
    /// changed the store; duplicates and deletes of unknown ids are skipped.
    pub fn apply_wal(&self, entries: &[WalEntry]) -> usize {
        let mut applied = 0;
        for entry in entries {
            let ok = match entry {
                WalEntry::InsertRecord { record } => self.insert(record.clone()).is_ok(),
                WalEntry::DeleteRecord { id } => self.delete(id).is_ok(),
            };
            if ok {
                applied += 1;
            } else {
                tracing::debug!(?entry, "WAL entry had no effect during replay");
            }
        }
        applied
    }
}

impl RecordStore for StringStore {
    fn find(&self, query: &RecordQuery) -> Vec<Arc<StoredRecord>> {
        let data = self.data.read();
        let mut matched: Vec<Arc<StoredRecord>> = data
            .records
            .values()
            .filter(|record| matches_query(record, query))
            .cloned()
            .collect();
        drop(data);
        matched.sort_by_key(|record| record.seq);
        matched
    }

    fn len(&self) -> usize {
        self.data.read().records.len()
    }
}
