//! Deterministic 0-100 content quality score: length, link density, and
//! presence of title/date, weighted against this crate's own thresholds.

use crate::types::StrategyOutput;

pub const QUALITY_THRESHOLD: u8 = 40;

const MIN_TEXT_LEN: usize = 80;
const PREFERRED_TEXT_LEN: usize = 500;

pub fn score(output: &StrategyOutput) -> u8 {
    let text_len = output.content.chars().count();
    if text_len < MIN_TEXT_LEN {
        return 0;
    }

    let mut points: f64 = 0.0;

    // Length: up to 40 points, saturating at the preferred length.
    let length_ratio = (text_len as f64 / PREFERRED_TEXT_LEN as f64).min(1.0);
    points += length_ratio * 40.0;

    // Text-to-link ratio: up to 25 points; many links per character of
    // text looks like a nav/listing page, not an article.
    let link_density = output.link_count as f64 / (text_len as f64 / 100.0).max(1.0);
    let link_score = (1.0 - (link_density / 10.0).min(1.0)) * 25.0;
    points += link_score;

    if output.title.as_ref().is_some_and(|t| !t.trim().is_empty()) {
        points += 15.0;
    }
    if output.date_raw.is_some() {
        points += 10.0;
    }
    if !output.has_boilerplate_markers {
        points += 10.0;
    }

    points.clamp(0.0, 100.0).round() as u8
}
