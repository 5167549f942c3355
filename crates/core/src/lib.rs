//! # stringlens-core
//!
//! String analysis, natural-language filter interpretation and record querying.
//!
//! This is the core library crate with zero async dependencies. The HTTP server
//! in `stringlens-server` is a thin layer over the operations exposed here.

/// Lexical property computation: length, palindrome, word count, hash, frequency.
pub mod analysis;
/// Global configuration constants: limits, defaults, and tuning parameters.
pub mod config;
/// Error types for interpretation, filtering, and storage.
pub mod error;
/// Structured filter set, raw query parameters, and store predicates.
pub mod filter_types;
/// Natural-language query interpreter.
pub mod query;
/// Stored record types and the caller-facing projection.
pub mod record;
/// Filter engine: applies a filter set to a record store.
pub mod search;
/// Storage layer: record store, write-ahead log framing, and snapshot persistence.
pub mod storage;
