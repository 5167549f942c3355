//! Lexical property computation.
//!
//! [`analyze`] is pure and stateless: the same input always yields the same
//! [`StringProperties`]. The store and the filter engine only ever read the
//! values computed here; nothing recomputes them at query time.

use crate::record::StringProperties;
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};

/// Computes every property of `value`.
pub fn analyze(value: &str) -> StringProperties {
    let mut character_frequency_map: BTreeMap<String, usize> = BTreeMap::new();
    for c in value.chars() {
        *character_frequency_map.entry(c.to_string()).or_insert(0) += 1;
    }

    StringProperties {
        length: value.chars().count(),
        is_palindrome: is_palindrome(value),
        unique_characters: value.chars().collect::<HashSet<char>>().len(),
        word_count: value.split_whitespace().count(),
        sha256_hash: sha256_hex(value),
        character_frequency_map,
    }
}

/// Lowercase hex SHA-256 of the UTF-8 bytes of `value`.
pub fn sha256_hex(value: &str) -> String {
    hex::encode(Sha256::digest(value.as_bytes()))
}

/// Palindrome check over `a-z` after full Unicode lowercasing.
///
/// Lowercasing happens first, so a letter whose lowercase form is ASCII (the
/// Kelvin sign becomes `k`) still counts. Everything outside `a-z` is then
/// dropped, so a string with no such letters at all is a palindrome.
fn is_palindrome(value: &str) -> bool {
    let letters: Vec<char> = value
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_lowercase)
        .collect();
    letters.iter().eq(letters.iter().rev())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_properties() {
        let props = analyze("hello world");
        assert_eq!(props.length, 11);
        assert_eq!(props.word_count, 2);
        assert!(!props.is_palindrome);
        // h e l o ' ' w r d
        assert_eq!(props.unique_characters, 8);
        assert_eq!(props.character_frequency_map["l"], 3);
        assert_eq!(props.character_frequency_map[" "], 1);
    }

    #[test]
    fn test_palindrome_ignores_case_and_punctuation() {
        assert!(analyze("A man, a plan, a canal: Panama").is_palindrome);
        assert!(analyze("Racecar").is_palindrome);
        assert!(!analyze("rust").is_palindrome);
    }

    #[test]
    fn test_palindrome_lowercases_before_filtering() {
        // U+212A KELVIN SIGN lowercases to ASCII 'k'.
        assert!(analyze("\u{212A}ayak").is_palindrome);
        assert!(!analyze("\u{212A}aya").is_palindrome);
        // Non-ASCII letters with non-ASCII lowercase forms are still ignored.
        assert!(analyze("nÖon").is_palindrome);
    }

    #[test]
    fn test_palindrome_without_letters() {
        assert!(analyze("12345").is_palindrome);
        assert!(analyze("").is_palindrome);
    }

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(analyze("abc").sha256_hash, sha256_hex("abc"));
    }

    #[test]
    fn test_word_count_collapses_whitespace() {
        assert_eq!(analyze("  one \t two\n\nthree  ").word_count, 3);
        assert_eq!(analyze("   ").word_count, 0);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let props = analyze("héllo");
        assert_eq!(props.length, 5);
        assert_eq!(props.character_frequency_map["é"], 1);
    }

    #[test]
    fn test_unique_characters_case_sensitive() {
        assert_eq!(analyze("aA").unique_characters, 2);
        assert_eq!(analyze("aaa").unique_characters, 1);
    }
}
