//! Predicate evaluation for record queries.
//!
//! Evaluates a [`RecordQuery`] against a [`StoredRecord`]. All predicates are
//! AND-ed; there is no OR or NOT. An empty query matches every record.

use crate::filter_types::{Predicate, RecordQuery};
use crate::record::StoredRecord;

/// Check if a record satisfies every predicate of the query.
pub fn matches_query(record: &StoredRecord, query: &RecordQuery) -> bool {
    query
        .predicates
        .iter()
        .all(|predicate| evaluate_predicate(record, predicate))
}

fn evaluate_predicate(record: &StoredRecord, predicate: &Predicate) -> bool {
    let props = &record.properties;
    match *predicate {
        Predicate::PalindromeEq(expected) => props.is_palindrome == expected,
        Predicate::LengthRange { min, max } => {
            let length = props.length as i64;
            min.map_or(true, |m| length >= m) && max.map_or(true, |m| length <= m)
        }
        Predicate::WordCountEq(expected) => props.word_count as i64 == expected,
        Predicate::ContainsChar(c) => contains_ignore_case(&record.value, c),
    }
}

/// Case-insensitive containment of a single character.
fn contains_ignore_case(value: &str, c: char) -> bool {
    let needle: String = c.to_lowercase().collect();
    value.to_lowercase().contains(&needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze;

    fn record(value: &str) -> StoredRecord {
        StoredRecord::new(value.to_string(), analyze(value))
    }

    fn query(predicates: Vec<Predicate>) -> RecordQuery {
        RecordQuery { predicates }
    }

    #[test]
    fn test_empty_query_matches_all() {
        assert!(matches_query(&record("anything"), &RecordQuery::default()));
    }

    #[test]
    fn test_palindrome_eq() {
        let q = query(vec![Predicate::PalindromeEq(true)]);
        assert!(matches_query(&record("racecar"), &q));
        assert!(!matches_query(&record("rust"), &q));

        let q = query(vec![Predicate::PalindromeEq(false)]);
        assert!(matches_query(&record("rust"), &q));
    }

    #[test]
    fn test_length_range_inclusive() {
        let q = query(vec![Predicate::LengthRange {
            min: Some(3),
            max: Some(5),
        }]);
        assert!(!matches_query(&record("ab"), &q));
        assert!(matches_query(&record("abc"), &q));
        assert!(matches_query(&record("abcde"), &q));
        assert!(!matches_query(&record("abcdef"), &q));
    }

    #[test]
    fn test_length_range_open_ends() {
        let lower = query(vec![Predicate::LengthRange {
            min: Some(4),
            max: None,
        }]);
        assert!(matches_query(&record("a much longer string"), &lower));
        assert!(!matches_query(&record("abc"), &lower));

        let upper = query(vec![Predicate::LengthRange {
            min: None,
            max: Some(-1),
        }]);
        assert!(!matches_query(&record(""), &upper));
    }

    #[test]
    fn test_inverted_range_matches_nothing() {
        let q = query(vec![Predicate::LengthRange {
            min: Some(10),
            max: Some(2),
        }]);
        assert!(!matches_query(&record("exactly"), &q));
    }

    #[test]
    fn test_word_count_eq() {
        let q = query(vec![Predicate::WordCountEq(2)]);
        assert!(matches_query(&record("hello world"), &q));
        assert!(!matches_query(&record("hello"), &q));
    }

    #[test]
    fn test_contains_char_ignores_case() {
        let q = query(vec![Predicate::ContainsChar('z')]);
        assert!(matches_query(&record("ZEBRA"), &q));
        assert!(matches_query(&record("lazy"), &q));
        assert!(!matches_query(&record("apple"), &q));

        let upper = query(vec![Predicate::ContainsChar('Q')]);
        assert!(matches_query(&record("quiet"), &upper));
    }

    #[test]
    fn test_contains_char_is_literal() {
        // No pattern semantics: '.' only matches a literal dot.
        let q = query(vec![Predicate::ContainsChar('.')]);
        assert!(!matches_query(&record("abc"), &q));
        assert!(matches_query(&record("a.c"), &q));
    }

    #[test]
    fn test_all_predicates_and_ed() {
        let q = query(vec![
            Predicate::PalindromeEq(true),
            Predicate::WordCountEq(1),
            Predicate::ContainsChar('c'),
        ]);
        assert!(matches_query(&record("racecar"), &q));
        assert!(!matches_query(&record("level"), &q));
        assert!(!matches_query(&record("race car"), &q));
    }
}
