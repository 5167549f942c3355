//! Ordered, table-driven interpretation of free-text queries.
//!
//! The input is lowercased and trimmed once, then every rule in [`RULES`] runs
//! in order. Rules are independent: each may set one field of the filter set,
//! and several may fire for the same input. Only after all rules have run is the
//! result checked for emptiness and for contradictory length bounds.
//!
//! An empty result is a hard failure here. The filter engine treats an empty
//! filter set as "match everything"; the two policies are intentionally different.

use crate::error::QueryError;
use crate::filter_types::StructuredFilterSet;
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

static WORD_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*words?").expect("valid regex literal"));
static MIN_LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:longer|greater) than\s+([0-9]+)").expect("valid regex literal"));
static MAX_LENGTH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"shorter than\s+([0-9]+)").expect("valid regex literal"));
static CONTAINS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"contain(?:s|ing)?(?: the letter)?\s+([a-z])").expect("valid regex literal")
});

/// A single interpretation rule: a name for logging and a function that may
/// set one field of the filter set. Returns `true` if the rule fired.
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&str, &mut StructuredFilterSet) -> bool,
}

/// Interpretation rules in evaluation order.
pub static RULES: &[Rule] = &[
    Rule {
        name: "palindrome",
        apply: palindrome_rule,
    },
    Rule {
        name: "word_count",
        apply: word_count_rule,
    },
    Rule {
        name: "min_length",
        apply: min_length_rule,
    },
    Rule {
        name: "max_length",
        apply: max_length_rule,
    },
    Rule {
        name: "contains_character",
        apply: contains_character_rule,
    },
    Rule {
        name: "first_vowel",
        apply: first_vowel_rule,
    },
];

/// Result of a successful interpretation, echoing the caller's original text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterpretedQuery {
    pub original: String,
    pub parsed_filters: StructuredFilterSet,
}

/// Interprets free text into a filter set.
///
/// The caller is expected to reject blank input beforehand; blank text simply
/// matches no rule and fails as [`QueryError::Unparseable`].
pub fn interpret(text: &str) -> Result<InterpretedQuery, QueryError> {
    let normalized = text.trim().to_lowercase();
    let mut filters = StructuredFilterSet::default();

    for rule in RULES {
        if (rule.apply)(&normalized, &mut filters) {
            tracing::debug!(rule = rule.name, "query rule matched");
        }
    }

    if filters.is_empty() {
        return Err(QueryError::Unparseable);
    }
    if let (Some(min_length), Some(max_length)) = (filters.min_length, filters.max_length) {
        if min_length > max_length {
            return Err(QueryError::Conflicting {
                min_length,
                max_length,
            });
        }
    }

    Ok(InterpretedQuery {
        original: text.to_string(),
        parsed_filters: filters,
    })
}

/// First capture group of `re` in `text`, parsed as `i64`.
/// Numbers too large for `i64` count as no match.
fn capture_int(re: &Regex, text: &str) -> Option<i64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

fn palindrome_rule(text: &str, filters: &mut StructuredFilterSet) -> bool {
    if text.contains("palindromic") || text.contains("palindrome") {
        filters.is_palindrome = Some(true);
        return true;
    }
    false
}

/// "single word" / "one word" take precedence over "<N> words".
fn word_count_rule(text: &str, filters: &mut StructuredFilterSet) -> bool {
    let count = if text.contains("single word") || text.contains("one word") {
        Some(1)
    } else {
        capture_int(&WORD_COUNT_RE, text)
    };
    filters.word_count = count;
    count.is_some()
}

/// "longer than N" is strict, stored as the inclusive bound N + 1.
fn min_length_rule(text: &str, filters: &mut StructuredFilterSet) -> bool {
    filters.min_length = capture_int(&MIN_LENGTH_RE, text).and_then(|n| n.checked_add(1));
    filters.min_length.is_some()
}

/// "shorter than N" is strict, stored as the inclusive bound N - 1.
fn max_length_rule(text: &str, filters: &mut StructuredFilterSet) -> bool {
    filters.max_length = capture_int(&MAX_LENGTH_RE, text).and_then(|n| n.checked_sub(1));
    filters.max_length.is_some()
}

fn contains_character_rule(text: &str, filters: &mut StructuredFilterSet) -> bool {
    let letter = CONTAINS_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().chars().next());
    filters.contains_character = letter;
    letter.is_some()
}

/// Low-fidelity stand-in: "first vowel" always means the letter `a`. It does not
/// look at which vowel actually comes first in anything. Only applies when no
/// explicit letter was requested.
fn first_vowel_rule(text: &str, filters: &mut StructuredFilterSet) -> bool {
    if text.contains("first vowel") && filters.contains_character.is_none() {
        filters.contains_character = Some('a');
        return true;
    }
    false
}
