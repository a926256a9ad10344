//! Content extraction: a strategy chain (recipe selectors, readability,
//! generic selectors) behind a shared quality gate, plus publication-date
//! resolution.

mod date;
mod extractor;
mod quality;
mod strategies;
mod types;

pub use date::{resolve as resolve_date, DateSources};
pub use extractor::Extractor;
pub use quality::{score as quality_score, QUALITY_THRESHOLD};
pub use types::{ExtractionOutput, Strategy, StrategyOutput, MAX_CONTENT_BYTES};
