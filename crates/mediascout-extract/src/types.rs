use chrono::{DateTime, Utc};
use mediascout_types::candidate::DateConfidence;

/// Upper bound on stored raw content.
pub const MAX_CONTENT_BYTES: usize = 50 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    RecipeSelectors,
    Readability,
    GenericSelectors,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::RecipeSelectors => "recipe_selectors",
            Strategy::Readability => "readability",
            Strategy::GenericSelectors => "generic_selectors",
        }
    }
}

/// What one strategy produced before the quality gate and date resolver
/// have run over it.
#[derive(Debug, Clone, Default)]
pub struct StrategyOutput {
    pub title: Option<String>,
    pub content: String,
    pub date_raw: Option<String>,
    pub link_count: usize,
    pub has_boilerplate_markers: bool,
}

/// The extractor's final, quality-gated result.
#[derive(Debug, Clone)]
pub struct ExtractionOutput {
    pub title: String,
    pub content: String,
    pub content_teaser: String,
    pub date_raw: Option<String>,
    pub date_parsed: Option<DateTime<Utc>>,
    pub date_confidence: DateConfidence,
    pub strategy_used: Strategy,
}
