//! Prometheus metrics recording and background collection.

use metrics::{counter, gauge, histogram};
use std::path::Path;
use std::time::Duration;
use stringlens_core::storage::{RecordStore, StringStore};

/// Records HTTP request metrics.
pub fn record_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Records a store mutation (`create` or `delete`).
pub fn record_write_operation(operation: &str) {
    counter!(
        "stringlens_operations_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Records a filter query and how many records it returned.
pub fn record_query(kind: &str, matched: usize) {
    counter!("stringlens_queries_total", "kind" => kind.to_string()).increment(1);
    histogram!("stringlens_query_matches", "kind" => kind.to_string()).record(matched as f64);
}

/// Updates store-level gauges.
pub fn update_store_metrics(store: &StringStore) {
    gauge!("stringlens_records_total").set(store.len() as f64);
}

/// Updates the `stringlens_wal_size_bytes` gauge.
pub fn update_wal_metrics(wal_path: &Path) {
    if let Ok(meta) = std::fs::metadata(wal_path) {
        gauge!("stringlens_wal_size_bytes").set(meta.len() as f64);
    }
}
