//! Filter engine: predicate evaluation and query execution against a record store.

/// Filter set application and result projection.
pub mod engine;
/// Predicate evaluation against stored records.
pub mod filter;

pub use engine::{apply, apply_raw, QueryResult};
pub use filter::matches_query;
