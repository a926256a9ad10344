//! Bundled generic selector candidates, tried in order against a sample
//! article until one yields meaningful text.

use scraper::{Html, Selector};

const TITLE_CANDIDATES: &[&str] = &["h1", "article h1", "header h1", ".article-title", ".post-title", ".entry-title"];
const CONTENT_CANDIDATES: &[&str] = &["article", "main", ".article-body", ".post-content", ".entry-content", "#content"];
const DATE_CANDIDATES: &[&str] = &["time", ".published-date", ".post-date", ".entry-date", "[datetime]"];

const MIN_TITLE_CHARS: usize = 4;
const MIN_CONTENT_CHARS: usize = 120;

pub fn best_title_selector(html: &str) -> Option<String> {
    best_text_selector(html, TITLE_CANDIDATES, MIN_TITLE_CHARS)
}

pub fn best_content_selector(html: &str) -> Option<String> {
    best_text_selector(html, CONTENT_CANDIDATES, MIN_CONTENT_CHARS)
}

/// Dates are often carried in an attribute (`<time datetime="...">`)
/// rather than the element's text, so an attribute hit counts too.
pub fn best_date_selector(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    for candidate in DATE_CANDIDATES {
        let Ok(selector) = Selector::parse(candidate) else {
            continue;
        };
        if let Some(el) = document.select(&selector).next() {
            let has_text = !element_text(&el).trim().is_empty();
            let has_datetime_attr = el.value().attr("datetime").is_some();
            if has_text || has_datetime_attr {
                return Some((*candidate).to_string());
            }
        }
    }
    None
}

fn best_text_selector(html: &str, candidates: &[&str], min_chars: usize) -> Option<String> {
    let document = Html::parse_document(html);
    for candidate in candidates {
        let Ok(selector) = Selector::parse(candidate) else {
            continue;
        };
        if let Some(el) = document.select(&selector).next() {
            if element_text(&el).trim().chars().count() >= min_chars {
                return Some((*candidate).to_string());
            }
        }
    }
    None
}

fn element_text(el: &scraper::ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_the_first_title_candidate_with_enough_text() {
        let html = r#"<html><body><h1>Netto cuts prices on dairy</h1></body></html>"#;
        assert_eq!(best_title_selector(html), Some("h1".to_string()));
    }

    #[test]
    fn skips_a_title_candidate_that_is_too_short() {
        let html = r#"<html><body><h1>Hi</h1><div class="article-title">A longer real headline here</div></body></html>"#;
        assert_eq!(best_title_selector(html), Some(".article-title".to_string()));
    }

    #[test]
    fn content_selector_requires_the_higher_minimum() {
        let short_article = r#"<html><body><article>too short</article></body></html>"#;
        assert_eq!(best_content_selector(short_article), None);

        let long_body = "word ".repeat(40);
        let long_article = format!("<html><body><article>{long_body}</article></body></html>");
        assert_eq!(best_content_selector(&long_article), Some("article".to_string()));
    }

    #[test]
    fn date_selector_accepts_a_datetime_attribute_with_empty_text() {
        let html = r#"<html><body><time datetime="2024-01-05T10:00:00Z"></time></body></html>"#;
        assert_eq!(best_date_selector(html), Some("time".to_string()));
    }

    #[test]
    fn date_selector_is_none_without_any_candidate() {
        let html = r#"<html><body><p>no date here</p></body></html>"#;
        assert_eq!(best_date_selector(html), None);
    }
}
