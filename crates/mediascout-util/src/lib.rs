//! Domain utilities shared across the scraping core.
//!
//! Shared primitives every other crate in the workspace builds on: the
//! eTLD+1 key used for rate limiting / circuit breaking / dedup blocking,
//! URL normalization for dedup, and lightweight text tokenization for
//! keyword matching.

pub mod domain;
pub mod normalize;
pub mod text;

pub use domain::effective_tld_plus_one;
pub use normalize::normalize_url;
pub use text::{clean_keyword, contains_word, count_word_occurrences, tokenize_for_match};
