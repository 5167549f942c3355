//! HTTP request handlers and shared application state.

use crate::api::errors::{ApiError, MSG_INVALID_FILTERS, MSG_UNPARSEABLE_QUERY};
use crate::api::metrics;
use crate::api::models::*;
use crate::wal_async::WriteAheadLog;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use stringlens_core::analysis::analyze;
use stringlens_core::config;
use stringlens_core::query::interpret;
use stringlens_core::record::{RecordView, StoredRecord};
use stringlens_core::search;
use stringlens_core::storage::{RecordStore, StringStore, WalEntry};

/// Shared application state passed to every handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub store: StringStore,
    pub wal: Arc<WriteAheadLog>,
    pub wal_path: PathBuf,
    pub prometheus_handle: PrometheusHandle,
    pub start_time: Instant,
}

const MSG_MISSING_VALUE: &str = "Missing 'value' field";
const MSG_VALUE_NOT_STRING: &str = "Value must be a string";
const MSG_NOT_FOUND: &str = "String does not exist in the system";

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let wal_size = std::fs::metadata(&state.wal_path)
        .map(|m| m.len())
        .unwrap_or(0);

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        total_records: state.store.len(),
        wal_size_bytes: wal_size,
    })
}

/// Pulls a usable string out of the `value` field.
///
/// Absent, `null` and blank values are 400; any other JSON type is 422.
fn validate_value(value: Option<serde_json::Value>) -> Result<String, ApiError> {
    match value {
        None | Some(serde_json::Value::Null) => Err(ApiError::BadRequest(MSG_MISSING_VALUE.into())),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => {
            Err(ApiError::BadRequest(MSG_MISSING_VALUE.into()))
        }
        Some(serde_json::Value::String(s)) => {
            if s.len() > config::MAX_VALUE_LEN {
                return Err(ApiError::BadRequest(format!(
                    "Value exceeds maximum length of {} bytes",
                    config::MAX_VALUE_LEN
                )));
            }
            Ok(s)
        }
        Some(_) => Err(ApiError::UnprocessableEntity(MSG_VALUE_NOT_STRING.into())),
    }
}

/// `POST /analyze/strings`
pub async fn create_string(
    State(state): State<AppState>,
    body: Result<Json<CreateStringRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordView>), ApiError> {
    // A body that is not a JSON object carries no `value` field at all.
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Rejected create body");
            CreateStringRequest::default()
        }
    };
    let value = validate_value(req.value)?;

    let properties = analyze(&value);

    let _mutations = state.wal.lock_mutations().await;
    if state.store.contains(&properties.sha256_hash) {
        return Err(ApiError::Conflict("String already exists in the system".into()));
    }

    let record = StoredRecord::new(value, properties);
    let wal_entry = WalEntry::InsertRecord {
        record: record.clone(),
    };
    state.wal.append(&wal_entry).await.map_err(|e| {
        tracing::error!(error = %e, "WAL append failed");
        ApiError::Internal("Failed to persist string".into())
    })?;
    let inserted = state.store.insert(record)?;

    metrics::record_write_operation("create");
    tracing::info!(id = %inserted.id, length = inserted.properties.length, "String analyzed");
    Ok((StatusCode::CREATED, Json(RecordView::from(inserted.as_ref()))))
}

/// `GET /analyze/strings`
pub async fn list_strings(
    State(state): State<AppState>,
    params: Result<Query<RawFilterParams>, QueryRejection>,
) -> Result<Json<QueryResult>, ApiError> {
    let Query(raw) = params.map_err(|_| ApiError::BadRequest(MSG_INVALID_FILTERS.into()))?;
    let result = search::apply_raw(&state.store, &raw)?;
    metrics::record_query("structured", result.count);
    Ok(Json(result))
}

/// `GET /analyze/strings/:value`
pub async fn get_string(
    State(state): State<AppState>,
    Path(value): Path<String>,
) -> Result<Json<RecordView>, ApiError> {
    let record = state
        .store
        .resolve(&value)
        .ok_or_else(|| ApiError::NotFound(MSG_NOT_FOUND.into()))?;
    Ok(Json(RecordView::from(record.as_ref())))
}

/// `DELETE /analyze/strings/:value`
pub async fn delete_string(
    State(state): State<AppState>,
    Path(value): Path<String>,
) -> Result<StatusCode, ApiError> {
    let _mutations = state.wal.lock_mutations().await;
    let id = state
        .store
        .resolve(&value)
        .map(|record| record.id.clone())
        .ok_or_else(|| ApiError::NotFound(MSG_NOT_FOUND.into()))?;

    let wal_entry = WalEntry::DeleteRecord { id: id.clone() };
    state.wal.append(&wal_entry).await.map_err(|e| {
        tracing::error!(error = %e, "WAL append failed");
        ApiError::Internal("Failed to persist deletion".into())
    })?;
    state.store.delete(&id)?;

    metrics::record_write_operation("delete");
    tracing::info!(id = %id, "String deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /analyze/filter-by-natural-language`
pub async fn filter_by_natural_language(
    State(state): State<AppState>,
    params: Result<Query<NaturalLanguageParams>, QueryRejection>,
) -> Result<Json<NaturalLanguageResponse>, ApiError> {
    let text = params
        .ok()
        .and_then(|Query(p)| p.query)
        .filter(|q| !q.trim().is_empty() && q.len() <= config::MAX_QUERY_LEN)
        .ok_or_else(|| ApiError::BadRequest(MSG_UNPARSEABLE_QUERY.into()))?;

    let interpreted = interpret(&text).inspect_err(|e| {
        tracing::debug!(query = %text, error = %e, "Natural language query rejected");
    })?;
    let result = search::apply(&state.store, &interpreted.parsed_filters);
    metrics::record_query("natural_language", result.count);

    Ok(Json(NaturalLanguageResponse {
        data: result.data,
        count: result.count,
        interpreted_query: interpreted,
    }))
}

/// `GET /metrics`
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    metrics::update_store_metrics(&state.store);
    state.prometheus_handle.render()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_value_statuses() {
        assert!(matches!(validate_value(None), Err(ApiError::BadRequest(_))));
        assert!(matches!(
            validate_value(Some(serde_json::Value::Null)),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_value(Some(serde_json::json!("   "))),
            Err(ApiError::BadRequest(_))
        ));
        assert!(matches!(
            validate_value(Some(serde_json::json!(42))),
            Err(ApiError::UnprocessableEntity(_))
        ));
        assert!(matches!(
            validate_value(Some(serde_json::json!(["a"]))),
            Err(ApiError::UnprocessableEntity(_))
        ));
        assert_eq!(
            validate_value(Some(serde_json::json!(" padded "))).unwrap(),
            " padded "
        );
    }

    #[test]
    fn test_validate_value_rejects_oversized() {
        let big = "x".repeat(config::MAX_VALUE_LEN + 1);
        assert!(matches!(
            validate_value(Some(serde_json::Value::String(big))),
            Err(ApiError::BadRequest(_))
        ));
    }
}
