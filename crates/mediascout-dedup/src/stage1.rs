//! Stage 1: exact-URL dedup. Group by `normalize_url`, keep the first
//! occurrence seen, across providers.

use mediascout_types::candidate::RawCandidate;
use mediascout_util::normalize_url;
use std::collections::HashSet;

pub fn exact_dedup(candidates: Vec<RawCandidate>) -> Vec<RawCandidate> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|candidate| seen.insert(normalize_url(&candidate.url)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediascout_types::candidate::ProviderTag;

    fn candidate(url: &str, provider: ProviderTag) -> RawCandidate {
        RawCandidate::new("Title", "Teaser", url, "Source", provider)
    }

    #[test]
    fn keeps_first_occurrence_across_providers() {
        let candidates = vec![
            candidate("https://ex.com/a?utm_source=x", ProviderTag::NewsApi),
            candidate("https://ex.com/a", ProviderTag::Rss),
            candidate("https://ex.com/b", ProviderTag::SearchApi),
        ];
        let out = exact_dedup(candidates);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].provider_tag, ProviderTag::NewsApi);
    }

    #[test]
    fn order_independent_result_size() {
        let a = vec![
            candidate("https://ex.com/a", ProviderTag::Rss),
            candidate("https://ex.com/a?ref=home", ProviderTag::NewsApi),
        ];
        let b = vec![
            candidate("https://ex.com/a?ref=home", ProviderTag::NewsApi),
            candidate("https://ex.com/a", ProviderTag::Rss),
        ];
        assert_eq!(exact_dedup(a).len(), exact_dedup(b).len());
    }
}
