//! Filter engine.
//!
//! Two entry paths share one downstream: [`apply`] takes an already typed
//! [`StructuredFilterSet`] (e.g. from the natural-language interpreter), and
//! [`apply_raw`] first coerces text-encoded query parameters. Either way the
//! filter set is lowered to a [`RecordQuery`] and evaluated by the store.
//!
//! An empty filter set is the identity query: every record matches.

use crate::error::FilterError;
use crate::filter_types::{RawFilterParams, RecordQuery, StructuredFilterSet};
use crate::record::RecordView;
use crate::storage::RecordStore;
use serde::Serialize;

/// Matching records plus an echo of the filters that were applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub data: Vec<RecordView>,
    pub count: usize,
    pub filters_applied: StructuredFilterSet,
}

/// Runs `filters` against `store`. Results are in store insertion order.
pub fn apply<S: RecordStore + ?Sized>(store: &S, filters: &StructuredFilterSet) -> QueryResult {
    let query = RecordQuery::from(filters);
    let data: Vec<RecordView> = store
        .find(&query)
        .iter()
        .map(|record| RecordView::from(record.as_ref()))
        .collect();

    tracing::debug!(
        predicates = query.predicates.len(),
        matched = data.len(),
        "filter query executed"
    );

    QueryResult {
        count: data.len(),
        data,
        filters_applied: filters.clone(),
    }
}

/// Coerces raw query parameters, then behaves exactly like [`apply`].
pub fn apply_raw<S: RecordStore + ?Sized>(
    store: &S,
    raw: &RawFilterParams,
) -> Result<QueryResult, FilterError> {
    let filters = StructuredFilterSet::try_from(raw)?;
    Ok(apply(store, &filters))
}
