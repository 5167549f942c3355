//! Stored record types for stringlens.
//!
//! A [`StoredRecord`] is an analyzed string as held by the store. Callers never
//! see it directly: [`RecordView`] is the projection returned by queries and by
//! the HTTP layer, which leaves out store-internal bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Lexical properties computed once when a string is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringProperties {
    /// Number of characters (Unicode scalar values).
    pub length: usize,
    /// Case-insensitive palindrome check over ASCII letters only.
    pub is_palindrome: bool,
    /// Number of distinct characters (case-sensitive).
    pub unique_characters: usize,
    /// Number of whitespace-separated words.
    pub word_count: usize,
    /// Lowercase hex SHA-256 of the UTF-8 bytes.
    pub sha256_hash: String,
    /// Occurrence count per character.
    pub character_frequency_map: BTreeMap<String, usize>,
}

/// An analyzed string held by the record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRecord {
    /// Identifier, equal to `properties.sha256_hash`.
    pub id: String,
    /// The submitted string, verbatim.
    pub value: String,
    pub properties: StringProperties,
    pub created_at: DateTime<Utc>,
    /// Insertion sequence assigned by the store. Orders query results.
    pub seq: u64,
}

impl StoredRecord {
    /// Creates a record stamped with the current time. The store assigns `seq` on insert.
    pub fn new(value: String, properties: StringProperties) -> Self {
        Self {
            id: properties.sha256_hash.clone(),
            value,
            properties,
            created_at: Utc::now(),
            seq: 0,
        }
    }
}

/// Caller-facing projection of a [`StoredRecord`]: `{id, value, properties, created_at}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    pub id: String,
    pub value: String,
    pub properties: StringProperties,
    pub created_at: DateTime<Utc>,
}

impl From<&StoredRecord> for RecordView {
    fn from(record: &StoredRecord) -> Self {
        Self {
            id: record.id.clone(),
            value: record.value.clone(),
            properties: record.properties.clone(),
            created_at: record.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;

    #[test]
    fn test_record_id_is_content_hash() {
        let record = StoredRecord::new("hello".into(), analyze("hello"));
        assert_eq!(record.id, record.properties.sha256_hash);
        assert_eq!(record.seq, 0);
    }

    #[test]
    fn test_view_drops_internal_fields() {
        let mut record = StoredRecord::new("level".into(), analyze("level"));
        record.seq = 42;
        let view = RecordView::from(&record);
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("seq").is_none());
        assert_eq!(json["value"], "level");
        assert_eq!(json["properties"]["is_palindrome"], true);
        assert!(json["created_at"].is_string());
    }
}
