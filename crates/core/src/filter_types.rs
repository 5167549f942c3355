//! Filter types shared by the query interpreter, the filter engine, and the store.
//!
//! [`StructuredFilterSet`] is the canonical intermediate representation. It is
//! produced either by the natural-language interpreter or by coercing
//! [`RawFilterParams`] (text-encoded query parameters), and is then lowered into
//! a [`RecordQuery`] of conjunctive [`Predicate`]s that a store can evaluate.

use crate::error::FilterError;
use serde::{Deserialize, Serialize};

/// Typed filter set. Unset fields mean "no constraint".
///
/// Serializes with unset fields omitted, so a caller can tell an applied
/// constraint from an absent one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructuredFilterSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_palindrome: Option<bool>,
    /// Inclusive lower bound on `properties.length`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<i64>,
    /// Inclusive upper bound on `properties.length`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_count: Option<i64>,
    /// Matched case-insensitively against the raw value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contains_character: Option<char>,
}

impl StructuredFilterSet {
    /// Returns `true` if no field is set.
    pub fn is_empty(&self) -> bool {
        self.is_palindrome.is_none()
            && self.min_length.is_none()
            && self.max_length.is_none()
            && self.word_count.is_none()
            && self.contains_character.is_none()
    }
}

/// Filter parameters exactly as they arrive in a query string: every value is text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFilterParams {
    pub is_palindrome: Option<String>,
    pub min_length: Option<String>,
    pub max_length: Option<String>,
    pub word_count: Option<String>,
    pub contains_character: Option<String>,
}

/// Absent and blank values are both unset.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_int(field: &'static str, value: &Option<String>) -> Result<Option<i64>, FilterError> {
    present(value)
        .map(|v| {
            v.parse::<i64>().map_err(|_| FilterError::InvalidParameter {
                field,
                value: v.to_string(),
            })
        })
        .transpose()
}

impl TryFrom<&RawFilterParams> for StructuredFilterSet {
    type Error = FilterError;

    /// Coerces each present parameter to its semantic type.
    ///
    /// `is_palindrome` is `true` only for the exact text `"true"`; any other
    /// non-blank value means `false`. Integers must parse as `i64`.
    /// `contains_character` must be exactly one character.
    fn try_from(raw: &RawFilterParams) -> Result<Self, Self::Error> {
        let contains_character = match present(&raw.contains_character) {
            None => None,
            Some(v) => {
                let mut chars = v.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => {
                        return Err(FilterError::InvalidParameter {
                            field: "contains_character",
                            value: v.to_string(),
                        })
                    }
                }
            }
        };

        Ok(Self {
            is_palindrome: present(&raw.is_palindrome).map(|v| v == "true"),
            min_length: parse_int("min_length", &raw.min_length)?,
            max_length: parse_int("max_length", &raw.max_length)?,
            word_count: parse_int("word_count", &raw.word_count)?,
            contains_character,
        })
    }
}

/// A single predicate over a stored record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `properties.is_palindrome == value`
    PalindromeEq(bool),
    /// `min <= properties.length <= max`, either side optional.
    LengthRange { min: Option<i64>, max: Option<i64> },
    /// `properties.word_count == value`
    WordCountEq(i64),
    /// `value` contains the character, ignoring case.
    ContainsChar(char),
}

/// Conjunction of predicates. An empty query matches every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    pub predicates: Vec<Predicate>,
}

impl From<&StructuredFilterSet> for RecordQuery {
    fn from(filters: &StructuredFilterSet) -> Self {
        let mut predicates = Vec::new();
        if let Some(p) = filters.is_palindrome {
            predicates.push(Predicate::PalindromeEq(p));
        }
        if filters.min_length.is_some() || filters.max_length.is_some() {
            predicates.push(Predicate::LengthRange {
                min: filters.min_length,
                max: filters.max_length,
            });
        }
        if let Some(n) = filters.word_count {
            predicates.push(Predicate::WordCountEq(n));
        }
        if let Some(c) = filters.contains_character {
            predicates.push(Predicate::ContainsChar(c));
        }
        Self { predicates }
    }
}
