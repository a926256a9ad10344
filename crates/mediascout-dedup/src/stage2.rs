//! Stage 2: fuzzy near-duplicate merge, blocked by `(eTLD+1, published
//! date)` so only candidates that could plausibly be the same article are
//! ever compared.

use crate::similarity::token_set_ratio;
use mediascout_types::candidate::RawCandidate;
use mediascout_util::effective_tld_plus_one;
use std::collections::HashMap;
use tracing::warn;

/// Hard cap on the catch-all block shared by every candidate with no
/// resolved publication date; beyond this, extras are returned unmerged
/// rather than paying for an unbounded pairwise scan.
const CATCH_ALL_BLOCK_CAP: usize = 1000;

pub fn fuzzy_dedup(candidates: Vec<RawCandidate>, threshold: u8, day_window: i64) -> Vec<RawCandidate> {
    let (dated, undated): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| c.published_at.is_some());

    let mut merged = merge_dated(dated, threshold, day_window);
    merged.extend(merge_catch_all(undated, threshold));
    merged
}

fn merge_dated(mut candidates: Vec<RawCandidate>, threshold: u8, day_window: i64) -> Vec<RawCandidate> {
    if candidates.is_empty() {
        return candidates;
    }

    let mut by_domain: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, candidate) in candidates.iter().enumerate() {
        by_domain
            .entry(effective_tld_plus_one(&candidate.url))
            .or_default()
            .push(idx);
    }

    let mut dsu = DisjointSet::new(candidates.len());
    for indices in by_domain.values() {
        let mut sorted = indices.clone();
        sorted.sort_by_key(|&i| candidates[i].published_at.unwrap());

        for (pos, &i) in sorted.iter().enumerate() {
            for &j in &sorted[pos + 1..] {
                let day_gap = (candidates[j].published_at.unwrap() - candidates[i].published_at.unwrap())
                    .num_days()
                    .abs();
                if day_gap > day_window {
                    break;
                }
                if token_set_ratio(&candidates[i].title, &candidates[j].title) >= threshold {
                    dsu.union(i, j);
                }
            }
        }
    }

    collapse(&mut candidates, dsu)
}

fn merge_catch_all(mut candidates: Vec<RawCandidate>, threshold: u8) -> Vec<RawCandidate> {
    if candidates.is_empty() {
        return candidates;
    }

    if candidates.len() > CATCH_ALL_BLOCK_CAP {
        warn!(
            total = candidates.len(),
            cap = CATCH_ALL_BLOCK_CAP,
            "undated catch-all dedup block overflowed; extras pass through unmerged"
        );
    }

    let scanned = candidates.len().min(CATCH_ALL_BLOCK_CAP);
    let mut dsu = DisjointSet::new(candidates.len());
    for i in 0..scanned {
        for j in (i + 1)..scanned {
            if token_set_ratio(&candidates[i].title, &candidates[j].title) >= threshold {
                dsu.union(i, j);
            }
        }
    }

    collapse(&mut candidates, dsu)
}

/// Collapses each union-find cluster into a single candidate: higher date
/// confidence wins, ties broken by the longer teaser.
fn collapse(candidates: &mut Vec<RawCandidate>, mut dsu: DisjointSet) -> Vec<RawCandidate> {
    let mut clusters: HashMap<usize, Vec<usize>> = HashMap::new();
    for idx in 0..candidates.len() {
        clusters.entry(dsu.find(idx)).or_default().push(idx);
    }

    let mut out = Vec::with_capacity(clusters.len());
    for members in clusters.into_values() {
        let winner = members
            .into_iter()
            .max_by(|&a, &b| {
                let ca = &candidates[a];
                let cb = &candidates[b];
                ca.date_confidence
                    .cmp(&cb.date_confidence)
                    .then(ca.teaser.len().cmp(&cb.teaser.len()))
            })
            .expect("cluster is never empty");
        out.push(candidates[winner].clone());
    }
    out
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use mediascout_types::candidate::{DateConfidence, ProviderTag};

    fn candidate(title: &str, url: &str, days_ago: i64, confidence: DateConfidence, teaser: &str) -> RawCandidate {
        let mut c = RawCandidate::new(title, teaser, url, "Source", ProviderTag::NewsApi);
        c.published_at = Some(Utc::now() - Duration::days(days_ago));
        c.date_confidence = confidence;
        c
    }

    #[test]
    fn merges_near_duplicate_titles_within_the_day_window() {
        let candidates = vec![
            candidate("Netto cuts prices on dairy", "https://ex.com/a", 0, DateConfidence::High, "short"),
            candidate("Netto cuts prices on dairy today", "https://ex.com/b", 1, DateConfidence::Medium, "a much longer teaser here"),
        ];
        let out = fuzzy_dedup(candidates, 80, 2);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].date_confidence, DateConfidence::High);
    }

    #[test]
    fn leaves_distinct_stories_unmerged() {
        let candidates = vec![
            candidate("Netto cuts prices", "https://ex.com/a", 0, DateConfidence::High, "t"),
            candidate("Lego announces layoffs", "https://ex.com/b", 0, DateConfidence::High, "t"),
        ];
        assert_eq!(fuzzy_dedup(candidates, 92, 2).len(), 2);
    }

    #[test]
    fn does_not_merge_across_domains() {
        let candidates = vec![
            candidate("Netto cuts prices on dairy", "https://ex.com/a", 0, DateConfidence::High, "t"),
            candidate("Netto cuts prices on dairy", "https://other.com/b", 0, DateConfidence::High, "t"),
        ];
        assert_eq!(fuzzy_dedup(candidates, 92, 2).len(), 2);
    }

    #[test]
    fn does_not_merge_outside_the_day_window() {
        let candidates = vec![
            candidate("Netto cuts prices on dairy", "https://ex.com/a", 0, DateConfidence::High, "t"),
            candidate("Netto cuts prices on dairy", "https://ex.com/b", 5, DateConfidence::High, "t"),
        ];
        assert_eq!(fuzzy_dedup(candidates, 80, 2).len(), 2);
    }

    #[test]
    fn ties_break_on_longer_teaser() {
        let candidates = vec![
            candidate("Netto cuts prices on dairy", "https://ex.com/a", 0, DateConfidence::High, "short"),
            candidate("Netto cuts prices on dairy", "https://ex.com/b", 0, DateConfidence::High, "a much longer teaser body"),
        ];
        let out = fuzzy_dedup(candidates, 92, 2);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].teaser, "a much longer teaser body");
    }
}
