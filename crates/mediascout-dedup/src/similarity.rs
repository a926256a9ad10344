//! Token-set-ratio title similarity (the `fuzzywuzzy`-style algorithm:
//! compare the shared-token core against each side's full token set and
//! take the best of the three pairings), computed with `strsim`'s
//! normalized Levenshtein ratio as the underlying string comparator.

use std::collections::BTreeSet;

/// 0-100 similarity score between two titles, tolerant of word reordering
/// and of one title being a superset of the other's tokens.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    let tokens_a: BTreeSet<String> = mediascout_util::tokenize_for_match(a).into_iter().collect();
    let tokens_b: BTreeSet<String> = mediascout_util::tokenize_for_match(b).into_iter().collect();

    if tokens_a.is_empty() && tokens_b.is_empty() {
        return 100;
    }

    let intersection: Vec<&String> = tokens_a.intersection(&tokens_b).collect();
    let only_a: Vec<&String> = tokens_a.difference(&tokens_b).collect();
    let only_b: Vec<&String> = tokens_b.difference(&tokens_a).collect();

    let core = join(&intersection);
    let combined_a = join_parts(&intersection, &only_a);
    let combined_b = join_parts(&intersection, &only_b);

    let scores = [
        ratio(&core, &combined_a),
        ratio(&core, &combined_b),
        ratio(&combined_a, &combined_b),
    ];
    scores.into_iter().max().unwrap_or(0)
}

fn join(tokens: &[&String]) -> String {
    tokens.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(" ")
}

fn join_parts(core: &[&String], rest: &[&String]) -> String {
    if rest.is_empty() {
        return join(core);
    }
    format!("{} {}", join(core), join(rest)).trim().to_string()
}

fn ratio(a: &str, b: &str) -> u8 {
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_titles_score_one_hundred() {
        assert_eq!(token_set_ratio("Netto cuts prices", "Netto cuts prices"), 100);
    }

    #[test]
    fn reordered_tokens_score_highly() {
        let score = token_set_ratio("Netto cuts prices today", "Today Netto cuts prices");
        assert!(score >= 92);
    }

    #[test]
    fn unrelated_titles_score_low() {
        let score = token_set_ratio("Netto cuts prices", "Lego announces layoffs");
        assert!(score < 50);
    }

    #[test]
    fn superset_title_still_scores_highly() {
        let score = token_set_ratio(
            "Netto cuts prices on dairy",
            "Netto cuts prices on dairy this week in Denmark",
        );
        assert!(score >= 80);
    }
}
