//! API error types mapped to HTTP status codes.
//!
//! Each [`ApiError`] variant maps to a specific HTTP status code and produces
//! a JSON response body `{"error": "message"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use stringlens_core::error::{FilterError, QueryError, StoreError};

pub const MSG_INVALID_FILTERS: &str = "Invalid query parameter values or types";
pub const MSG_UNPARSEABLE_QUERY: &str = "Unable to parse natural language query";
pub const MSG_CONFLICTING_FILTERS: &str = "Query parsed but resulted in conflicting filters";

/// Application-level error type that implements `IntoResponse`.
///
/// - `NotFound` → 404
/// - `BadRequest` → 400
/// - `Conflict` → 409
/// - `UnprocessableEntity` → 422
/// - `Internal` → 500
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found (404).
    NotFound(String),
    /// Missing or malformed request input (400).
    BadRequest(String),
    /// Resource already exists (409).
    Conflict(String),
    /// Well-formed input that cannot be acted on (422).
    UnprocessableEntity(String),
    /// Unexpected server error (500).
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::UnprocessableEntity(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Unparseable => ApiError::BadRequest(MSG_UNPARSEABLE_QUERY.into()),
            QueryError::Conflicting { .. } => {
                ApiError::UnprocessableEntity(MSG_CONFLICTING_FILTERS.into())
            }
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(_: FilterError) -> Self {
        ApiError::BadRequest(MSG_INVALID_FILTERS.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyExists(_) => ApiError::Conflict(err.to_string()),
            StoreError::NotFound(_) => ApiError::NotFound(err.to_string()),
        }
    }
}
