//! Orchestrates the three content strategies behind a single quality gate:
//! try selectors first, fall back to readability-style extraction.

use crate::date::{self, DateSources};
use crate::quality;
use crate::strategies;
use crate::types::{ExtractionOutput, Strategy, StrategyOutput, MAX_CONTENT_BYTES};
use mediascout_types::errors::{ScrapeError, ScrapeResult};
use mediascout_types::mention::Mention;
use mediascout_types::model::SourceRecipe;
use tracing::debug;

pub struct Extractor;

impl Extractor {
    pub fn new() -> Self {
        Extractor
    }

    /// Runs every strategy, keeps only those clearing [`quality::QUALITY_THRESHOLD`],
    /// and picks among survivors by fixed priority: recipe selectors, then
    /// readability, then generic selectors — never the reverse, regardless
    /// of which strategy happened to score highest.
    pub fn extract(
        &self,
        html: &str,
        recipe: Option<&SourceRecipe>,
        url: &str,
    ) -> ScrapeResult<ExtractionOutput> {
        let candidates: Vec<(Strategy, StrategyOutput)> = [
            strategies::recipe_selectors(html, recipe).map(|o| (Strategy::RecipeSelectors, o)),
            strategies::readability_fallback(html, url).map(|o| (Strategy::Readability, o)),
            strategies::generic_selectors(html).map(|o| (Strategy::GenericSelectors, o)),
        ]
        .into_iter()
        .flatten()
        .filter(|(_, output)| quality::score(output) >= quality::QUALITY_THRESHOLD)
        .collect();

        let (strategy_used, chosen) = [
            Strategy::RecipeSelectors,
            Strategy::Readability,
            Strategy::GenericSelectors,
        ]
        .into_iter()
        .find_map(|wanted| {
            candidates
                .iter()
                .find(|(s, _)| *s == wanted)
                .map(|(s, o)| (*s, o.clone()))
        })
        .ok_or_else(|| ScrapeError::EmptyContent { url: url.to_string() })?;

        debug!(url, strategy = strategy_used.as_str(), "extraction strategy selected");

        let content = clamp_bytes(&chosen.content, MAX_CONTENT_BYTES);
        let content_teaser = Mention::clamp_teaser(&content);

        let (date_parsed, date_confidence) = date::resolve(DateSources {
            selector_date_raw: chosen.date_raw.as_deref(),
            free_text: Some(chosen.content.as_str()),
            ..Default::default()
        });

        Ok(ExtractionOutput {
            title: chosen.title.unwrap_or_default(),
            content,
            content_teaser,
            date_raw: chosen.date_raw,
            date_parsed,
            date_confidence,
            strategy_used,
        })
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

fn clamp_bytes(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    text[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediascout_types::model::DiscoveryType;

    fn recipe() -> SourceRecipe {
        SourceRecipe {
            domain: "example.com".into(),
            search_url_pattern: "https://example.com/search?q={keyword}".into(),
            title_selector: "h1.headline".into(),
            content_selector: "div.body".into(),
            date_selector: "time".into(),
            rss_urls: vec![],
            sitemap_url: None,
            discovery_type: DiscoveryType::SiteSearch,
        }
    }

    fn long_paragraph() -> String {
        "Something substantial happened in the city today and reporters covered it at length. "
            .repeat(6)
    }

    #[test]
    fn prefers_recipe_selectors_over_generic_when_both_qualify() {
        let html = format!(
            r#"<html><body>
                <h1 class="headline">Recipe Headline</h1>
                <div class="body">{}</div>
                <article>{}</article>
                <time datetime="2026-01-02T10:00:00Z"></time>
            </body></html>"#,
            long_paragraph(),
            long_paragraph()
        );
        let out = Extractor::new().extract(&html, Some(&recipe()), "https://example.com/a").unwrap();
        assert_eq!(out.strategy_used, Strategy::RecipeSelectors);
        assert_eq!(out.title, "Recipe Headline");
    }

    #[test]
    fn falls_back_to_generic_selectors_without_a_recipe() {
        let html = format!("<html><body><article>{}</article></body></html>", long_paragraph());
        let out = Extractor::new().extract(&html, None, "https://example.com/a").unwrap();
        assert_eq!(out.strategy_used, Strategy::GenericSelectors);
    }

    #[test]
    fn empty_content_error_when_nothing_clears_the_quality_gate() {
        let html = "<html><body><nav>menu</nav></body></html>";
        let err = Extractor::new().extract(html, None, "https://example.com/a").unwrap_err();
        assert!(matches!(err, ScrapeError::EmptyContent { .. }));
    }

    #[test]
    fn content_is_clamped_to_the_max_byte_budget() {
        let huge = "x".repeat(MAX_CONTENT_BYTES * 2);
        let html = format!("<html><body><article>{}</article></body></html>", huge);
        let out = Extractor::new().extract(&html, None, "https://example.com/a").unwrap();
        assert!(out.content.len() <= MAX_CONTENT_BYTES);
        assert!(out.content_teaser.chars().count() <= mediascout_types::mention::TEASER_MAX_CHARS);
    }
}
