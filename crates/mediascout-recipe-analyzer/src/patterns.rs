//! Derives candidate `search_url_pattern`s from a homepage: either a
//! navigation link that already carries a recognizable query token, or a
//! `<form>` whose action + input name look like a site search.

use scraper::{Html, Selector};
use url::Url;

const SEARCH_QUERY_KEYS: &[&str] = &["q", "query", "s", "search", "keyword", "keywords"];

/// Every plausible `{keyword}`-templated search URL found on the
/// homepage, in document order. Callers verify each live and take the
/// first that produces real results.
pub fn candidate_search_patterns(homepage_html: &str, homepage_url: &str) -> Vec<String> {
    let document = Html::parse_document(homepage_html);
    let mut patterns = Vec::new();

    if let Ok(link_selector) = Selector::parse("a[href]") {
        for el in document.select(&link_selector) {
            if let Some(href) = el.value().attr("href") {
                if let Some(resolved) = resolve_url(homepage_url, href) {
                    if let Some(pattern) = query_token_pattern(&resolved) {
                        patterns.push(pattern);
                    }
                }
            }
        }
    }

    if let Ok(form_selector) = Selector::parse("form") {
        for form in document.select(&form_selector) {
            let Some(action) = form.value().attr("action") else {
                continue;
            };
            let Some(action_url) = resolve_url(homepage_url, action) else {
                continue;
            };
            let Ok(input_selector) = Selector::parse("input[name]") else {
                continue;
            };
            for input in form.select(&input_selector) {
                if let Some(name) = input.value().attr("name") {
                    if SEARCH_QUERY_KEYS.contains(&name.to_lowercase().as_str()) {
                        let separator = if action_url.contains('?') { '&' } else { '?' };
                        patterns.push(format!("{action_url}{separator}{name}={{keyword}}"));
                    }
                }
            }
        }
    }

    patterns
}

fn resolve_url(base: &str, href: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

/// If `url` already has a query param whose key looks like a search
/// token, returns the same URL with that value templated to
/// `{keyword}`.
fn query_token_pattern(url_str: &str) -> Option<String> {
    let parsed = Url::parse(url_str).ok()?;
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let matched_key = pairs
        .iter()
        .find(|(k, _)| SEARCH_QUERY_KEYS.contains(&k.to_lowercase().as_str()))
        .map(|(k, _)| k.clone())?;

    let mut templated = parsed.clone();
    {
        let mut mut_pairs = templated.query_pairs_mut();
        mut_pairs.clear();
        for (k, v) in &pairs {
            if *k == matched_key {
                mut_pairs.append_pair(k, "__KEYWORD_TOKEN__");
            } else {
                mut_pairs.append_pair(k, v);
            }
        }
    }
    Some(templated.to_string().replace("__KEYWORD_TOKEN__", "{keyword}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_a_pattern_from_an_existing_search_link() {
        let html = r#"<html><body><a href="/search?q=demo&page=1">Search</a></body></html>"#;
        let patterns = candidate_search_patterns(html, "https://ex.com/");
        assert!(patterns.iter().any(|p| p.contains("q={keyword}") && p.contains("page=1")));
    }

    #[test]
    fn extracts_a_pattern_from_a_search_form() {
        let html = r#"<html><body><form action="/search"><input type="text" name="s"></form></body></html>"#;
        let patterns = candidate_search_patterns(html, "https://ex.com/");
        assert!(patterns.iter().any(|p| p == "https://ex.com/search?s={keyword}"));
    }

    #[test]
    fn ignores_links_without_a_recognizable_query_key() {
        let html = r#"<html><body><a href="/about?ref=footer">About</a></body></html>"#;
        let patterns = candidate_search_patterns(html, "https://ex.com/");
        assert!(patterns.is_empty());
    }
}
