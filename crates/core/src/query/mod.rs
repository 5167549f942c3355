//! Natural-language query interpreter.
//!
//! Maps a handful of English phrasings ("palindromic strings", "longer than 10
//! characters", "containing the letter z", ...) to a [`StructuredFilterSet`]
//! via an ordered table of pattern rules. See [`interpreter`] for the rules.
//!
//! [`StructuredFilterSet`]: crate::filter_types::StructuredFilterSet

/// Rule table and the `interpret` entry point.
pub mod interpreter;

pub use interpreter::{interpret, InterpretedQuery, RULES};
