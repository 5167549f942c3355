//! Request and response data transfer objects for the REST API.

use serde::{Deserialize, Serialize};
use stringlens_core::query::InterpretedQuery;
use stringlens_core::record::RecordView;

pub use stringlens_core::filter_types::RawFilterParams;
pub use stringlens_core::search::QueryResult;

/// Request body for `POST /analyze/strings`.
///
/// `value` is kept as raw JSON so a missing field and a non-string value
/// can be told apart and reported with different statuses.
#[derive(Debug, Default, Deserialize)]
pub struct CreateStringRequest {
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// Query string for `GET /analyze/filter-by-natural-language`.
#[derive(Debug, Deserialize)]
pub struct NaturalLanguageParams {
    pub query: Option<String>,
}

/// Response body for `GET /analyze/filter-by-natural-language`.
#[derive(Debug, Serialize)]
pub struct NaturalLanguageResponse {
    pub data: Vec<RecordView>,
    pub count: usize,
    pub interpreted_query: InterpretedQuery,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub total_records: usize,
    pub wal_size_bytes: u64,
}
