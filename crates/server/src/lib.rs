//! stringlens-server: HTTP service for string analysis and filtering.
//!
//! Provides the REST API and the async WAL. Analysis, query interpretation,
//! filtering and storage live in `stringlens-core`.

/// REST API layer: Axum router, HTTP handlers, models, metrics.
pub mod api;
/// Async Write-Ahead Log with group commit (tokio-based).
pub mod wal_async;
