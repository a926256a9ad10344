//! Optional, fail-open relevance scoring for ambiguous keyword matches.

mod filter;
mod scorer;
mod types;

pub use filter::filter_candidates;
pub use scorer::{HttpScorer, NullScorer, RelevanceScorer};
pub use types::{Decision, RelevanceInput, MAX_INPUT_CHARS, MAX_OUTPUT_TOKENS};
