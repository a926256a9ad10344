//! The three selector-chain content strategies, built on
//! `scraper::{Html, Selector}` for metadata/content extraction.

use crate::types::StrategyOutput;
use mediascout_types::model::SourceRecipe;
use scraper::{Html, Selector};
use tracing::warn;

const BOILERPLATE_MARKERS: &[&str] = &[
    "subscribe now",
    "all rights reserved",
    "accept cookies",
    "sign up for our newsletter",
    "enable javascript",
];

/// A bundled list of selectors that match common article markup across
/// unconfigured sites, tried in order until one yields non-empty text.
const GENERIC_TITLE_SELECTORS: &[&str] = &["h1", "article h1", "header h1", "title"];
const GENERIC_CONTENT_SELECTORS: &[&str] = &[
    "article",
    "[role=\"main\"]",
    "main",
    ".article-body",
    ".post-content",
    ".entry-content",
    "#content",
];
const GENERIC_DATE_SELECTORS: &[&str] =
    &["time", "[datetime]", ".published", ".post-date", ".article-date"];

fn text_of(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

fn datetime_attr_of(document: &Html, selector_str: &str) -> Option<String> {
    let selector = Selector::parse(selector_str).ok()?;
    document.select(&selector).next().and_then(|el| {
        el.value()
            .attr("datetime")
            .map(|s| s.to_string())
            .or_else(|| Some(el.text().collect::<String>().trim().to_string()))
            .filter(|t| !t.is_empty())
    })
}

fn count_links(document: &Html) -> usize {
    match Selector::parse("a[href]") {
        Ok(selector) => document.select(&selector).count(),
        Err(_) => 0,
    }
}

fn has_boilerplate(content: &str) -> bool {
    let lower = content.to_lowercase();
    BOILERPLATE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Strategy (a): recipe-configured selectors for `title`, `content`, and
/// `date`. Returns `None` if no recipe is supplied.
pub fn recipe_selectors(html: &str, recipe: Option<&SourceRecipe>) -> Option<StrategyOutput> {
    let recipe = recipe?;
    let document = Html::parse_document(html);

    let title = text_of(&document, &recipe.title_selector);
    let content = text_of(&document, &recipe.content_selector).unwrap_or_default();
    let date_raw = datetime_attr_of(&document, &recipe.date_selector);

    if content.is_empty() {
        return None;
    }

    Some(StrategyOutput {
        title,
        link_count: count_links(&document),
        has_boilerplate_markers: has_boilerplate(&content),
        content,
        date_raw,
    })
}

/// Strategy (b): a bundled list of generic article selectors, tried in
/// order.
pub fn generic_selectors(html: &str) -> Option<StrategyOutput> {
    let document = Html::parse_document(html);

    let title = GENERIC_TITLE_SELECTORS
        .iter()
        .find_map(|s| text_of(&document, s));
    let content = GENERIC_CONTENT_SELECTORS
        .iter()
        .find_map(|s| text_of(&document, s))?;
    let date_raw = GENERIC_DATE_SELECTORS
        .iter()
        .find_map(|s| datetime_attr_of(&document, s));

    Some(StrategyOutput {
        title,
        link_count: count_links(&document),
        has_boilerplate_markers: has_boilerplate(&content),
        content,
        date_raw,
    })
}

/// Strategy (c): readability-style main-text extraction, the last-resort
/// fallback when no selector chain produced usable content.
pub fn readability_fallback(html: &str, url: &str) -> Option<StrategyOutput> {
    let parsed_url = url::Url::parse(url).ok()?;
    let mut cursor = std::io::Cursor::new(html.as_bytes());
    match readability::extractor::extract(&mut cursor, &parsed_url) {
        Ok(product) => {
            let content = product.text.trim().to_string();
            if content.is_empty() {
                return None;
            }
            let link_count = Html::parse_fragment(&product.content)
                .select(&Selector::parse("a[href]").unwrap())
                .count();
            Some(StrategyOutput {
                title: Some(product.title).filter(|t| !t.trim().is_empty()),
                has_boilerplate_markers: has_boilerplate(&content),
                content,
                date_raw: None,
                link_count,
            })
        }
        Err(err) => {
            warn!(url, error = %err, "readability extraction failed");
            None
        }
    }
}
