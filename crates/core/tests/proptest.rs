//! Property-based tests for the interpreter and the filter engine.

use proptest::prelude::*;
use stringlens_core::analysis::analyze;
use stringlens_core::filter_types::{RawFilterParams, StructuredFilterSet};
use stringlens_core::query::interpret;
use stringlens_core::record::StoredRecord;
use stringlens_core::search::{apply, apply_raw};
use stringlens_core::storage::{RecordStore, StringStore};

// ============================================================================
// Test helpers
// ============================================================================

/// Filler text without digits, so no length or numeric word-count rule can fire.
fn filler() -> impl Strategy<Value = String> {
    "[a-z ]{0,20}"
}

fn store_from(values: &[String]) -> StringStore {
    let store = StringStore::new();
    for value in values {
        // Duplicates are rejected by the store; that is fine here.
        let _ = store.insert(StoredRecord::new(value.clone(), analyze(value)));
    }
    store
}

fn filter_strategy() -> impl Strategy<Value = StructuredFilterSet> {
    (
        proptest::option::of(any::<bool>()),
        proptest::option::of(0i64..30),
        proptest::option::of(0i64..30),
        proptest::option::of(0i64..5),
        proptest::option::of(proptest::char::range('a', 'z')),
    )
        .prop_map(
            |(is_palindrome, min_length, max_length, word_count, contains_character)| {
                StructuredFilterSet {
                    is_palindrome,
                    min_length,
                    max_length,
                    word_count,
                    contains_character,
                }
            },
        )
}

fn record_values() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-zA-Z ]{0,24}", 0..40)
}

// ============================================================================
// Interpreter properties
// ============================================================================

proptest! {
    /// Any text mentioning "palindrome" or "palindromic" sets is_palindrome.
    #[test]
    fn palindrome_keyword_always_detected(
        before in filler(),
        after in filler(),
        keyword in prop::sample::select(vec!["palindrome", "palindromic", "PALINDROME"]),
    ) {
        let text = format!("{before} {keyword} {after}");
        let parsed = interpret(&text).unwrap().parsed_filters;
        prop_assert_eq!(parsed.is_palindrome, Some(true));
    }

    /// "longer than N" is stored as the inclusive bound N + 1.
    #[test]
    fn longer_than_is_strict(n in 0i64..1_000_000, before in filler()) {
        let parsed = interpret(&format!("{before} longer than {n}")).unwrap().parsed_filters;
        prop_assert_eq!(parsed.min_length, Some(n + 1));
    }

    /// "shorter than N" is stored as the inclusive bound N - 1.
    #[test]
    fn shorter_than_is_strict(n in 0i64..1_000_000, after in filler()) {
        let parsed = interpret(&format!("shorter than {n} {after}")).unwrap().parsed_filters;
        prop_assert_eq!(parsed.max_length, Some(n - 1));
    }

    /// Bounds conflict exactly when min_length > max_length.
    #[test]
    fn conflict_iff_min_exceeds_max(lo in 0i64..500, hi in 0i64..500) {
        let result = interpret(&format!("longer than {lo} and shorter than {hi}"));
        if lo + 1 > hi - 1 {
            prop_assert!(result.is_err());
        } else {
            let parsed = result.unwrap().parsed_filters;
            prop_assert_eq!(parsed.min_length, Some(lo + 1));
            prop_assert_eq!(parsed.max_length, Some(hi - 1));
        }
    }

    /// A successful interpretation never yields an empty filter set.
    #[test]
    fn successful_parse_is_never_empty(text in ".{0,60}") {
        if let Ok(q) = interpret(&text) {
            prop_assert!(!q.parsed_filters.is_empty());
        }
    }
}

// ============================================================================
// Engine properties
// ============================================================================

proptest! {
    /// Filtering never returns more records than the store holds.
    #[test]
    fn filter_never_grows_store(values in record_values(), filters in filter_strategy()) {
        let store = store_from(&values);
        let result = apply(&store, &filters);
        prop_assert!(result.count <= store.len());
        prop_assert_eq!(result.count, result.data.len());
    }

    /// The empty filter set is the identity query.
    #[test]
    fn empty_filters_return_everything(values in record_values()) {
        let store = store_from(&values);
        let result = apply(&store, &StructuredFilterSet::default());
        prop_assert_eq!(result.count, store.len());
    }

    /// Every returned record satisfies every set constraint.
    #[test]
    fn results_satisfy_filters(values in record_values(), filters in filter_strategy()) {
        let store = store_from(&values);
        for record in apply(&store, &filters).data {
            let props = &record.properties;
            if let Some(p) = filters.is_palindrome {
                prop_assert_eq!(props.is_palindrome, p);
            }
            if let Some(min) = filters.min_length {
                prop_assert!(props.length as i64 >= min);
            }
            if let Some(max) = filters.max_length {
                prop_assert!(props.length as i64 <= max);
            }
            if let Some(n) = filters.word_count {
                prop_assert_eq!(props.word_count as i64, n);
            }
            if let Some(c) = filters.contains_character {
                prop_assert!(record.value.to_lowercase().contains(c));
            }
        }
    }

    /// Applying the same filters twice to an unchanged store gives the same answer.
    #[test]
    fn apply_is_idempotent(values in record_values(), filters in filter_strategy()) {
        let store = store_from(&values);
        prop_assert_eq!(apply(&store, &filters), apply(&store, &filters));
    }

    /// Text-encoded parameters behave exactly like their typed equivalents.
    #[test]
    fn raw_params_equivalent_to_structured(
        values in record_values(),
        filters in filter_strategy(),
    ) {
        let store = store_from(&values);
        let raw = RawFilterParams {
            is_palindrome: filters.is_palindrome.map(|b| b.to_string()),
            min_length: filters.min_length.map(|n| n.to_string()),
            max_length: filters.max_length.map(|n| n.to_string()),
            word_count: filters.word_count.map(|n| n.to_string()),
            contains_character: filters.contains_character.map(|c| c.to_string()),
        };
        prop_assert_eq!(apply_raw(&store, &raw).unwrap(), apply(&store, &filters));
    }
}
