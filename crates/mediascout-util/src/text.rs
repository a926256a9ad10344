//! `clean_keyword` and `tokenize_for_match`.

use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Trims, collapses internal whitespace, and returns `None` if the
/// result is empty after trimming.
pub fn clean_keyword(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// English + Danish stop words, the two languages seen in early brand
/// onboarding. Extend this set as more languages are onboarded.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // English
        "a", "an", "the", "and", "or", "of", "in", "on", "at", "to", "for", "is", "are", "was",
        "were", "with", "by", "from", "as", "it", "this", "that", "be",
        // Danish
        "og", "i", "den", "det", "er", "til", "af", "for", "en", "et", "de", "som", "med", "på",
        "at", "har", "om",
    ]
    .into_iter()
    .collect()
});

/// Lowercase, split on non-alphanumeric boundaries, and drop stop-words,
/// producing the token set used for title/teaser keyword matching and
/// for fuzzy-dedup title comparison.
pub fn tokenize_for_match(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|tok| !tok.is_empty())
        .filter(|tok| !STOP_WORDS.contains(tok))
        .map(|tok| tok.to_string())
        .collect()
}

/// Case-insensitive, word-boundary containment check used to verify a
/// keyword actually appears in a title/teaser.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    let haystack_tokens: Vec<String> = haystack
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect();
    let needle_tokens: Vec<String> = needle
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect();
    if needle_tokens.is_empty() {
        return false;
    }
    haystack_tokens
        .windows(needle_tokens.len())
        .any(|window| window == needle_tokens.as_slice())
}

/// Counts non-overlapping word-boundary occurrences of `needle` in
/// `haystack`, used for topic-scoring keyword hit counts.
pub fn count_word_occurrences(haystack: &str, needle: &str) -> usize {
    let haystack_tokens: Vec<String> = haystack
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect();
    let needle_tokens: Vec<String> = needle
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
        .collect();
    if needle_tokens.is_empty() {
        return 0;
    }
    haystack_tokens
        .windows(needle_tokens.len())
        .filter(|window| *window == needle_tokens.as_slice())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_keyword_trims_and_collapses() {
        assert_eq!(
            clean_keyword("  rabat   hos  netto  "),
            Some("rabat hos netto".to_string())
        );
    }

    #[test]
    fn clean_keyword_drops_empty() {
        assert_eq!(clean_keyword("   "), None);
        assert_eq!(clean_keyword(""), None);
    }

    #[test]
    fn tokenize_lowercases_and_splits() {
        let tokens = tokenize_for_match("Store rabat hos Netto!");
        assert!(tokens.contains("store"));
        assert!(tokens.contains("rabat"));
        assert!(tokens.contains("netto"));
        // stop word dropped
        assert!(!tokens.contains("hos"));
    }

    #[test]
    fn contains_word_matches_word_boundary() {
        assert!(contains_word("Store rabat hos Netto", "rabat"));
        assert!(!contains_word("Storerabat hos Netto", "rabat"));
    }

    #[test]
    fn contains_word_is_case_insensitive() {
        assert!(contains_word("LEGO cuts 500 jobs", "lego"));
    }

    #[test]
    fn contains_word_matches_multi_word_needle() {
        assert!(contains_word(
            "500 jobs cut at Lego today",
            "jobs cut at"
        ));
    }
}
