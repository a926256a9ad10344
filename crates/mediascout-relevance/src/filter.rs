//! Applies a [`RelevanceScorer`] across a candidate batch with the
//! fail-open guarantee: any scorer error keeps the candidate rather than
//! dropping it.

use crate::scorer::RelevanceScorer;
use crate::types::{Decision, RelevanceInput};
use mediascout_types::candidate::RawCandidate;
use tracing::warn;

pub async fn filter_candidates(
    scorer: &dyn RelevanceScorer,
    candidates: Vec<RawCandidate>,
    brand_name: &str,
) -> Vec<RawCandidate> {
    let mut kept = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let input = RelevanceInput {
            title: candidate.title.clone(),
            teaser: candidate.teaser.clone(),
            matched_keyword: candidate.matched_keyword.clone().unwrap_or_default(),
            brand_name: brand_name.to_string(),
        };

        match scorer.score(&input).await {
            Ok(Decision::Drop) => continue,
            Ok(Decision::Keep) => kept.push(candidate),
            Err(err) => {
                warn!(url = %candidate.url, error = %err, "relevance scorer failed, keeping candidate (fail-open)");
                kept.push(candidate);
            }
        }
    }

    kept
}
