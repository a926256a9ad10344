//! Topic scoring: which of a brand's topics a candidate belongs to, and
//! which of that topic's keywords drove the match.

use mediascout_types::candidate::RawCandidate;
use mediascout_types::mention::MatchedIn;
use mediascout_types::model::{Keyword, Topic};
use mediascout_util::count_word_occurrences;
use uuid::Uuid;

/// Title hits count double a teaser hit.
const TITLE_WEIGHT: i32 = 2;
const TEASER_WEIGHT: i32 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct TopicScore {
    pub topic_id: Uuid,
    pub primary_keyword_id: Uuid,
    pub matched_in: MatchedIn,
    pub score: i32,
}

/// Scores `candidate` against every `(topic, keywords)` pair, picking the
/// highest-scoring topic (ties broken by the most recently updated
/// topic). Returns `None` if every topic scores zero.
pub fn score_candidate(
    candidate: &RawCandidate,
    topics: &[(Topic, Vec<Keyword>)],
) -> Option<TopicScore> {
    let mut best: Option<TopicScore> = None;
    let mut best_updated_at = None;

    for (topic, keywords) in topics {
        let mut topic_total = 0;
        let mut best_keyword: Option<(Uuid, MatchedIn, i32)> = None;

        for keyword in keywords {
            let title_hits = count_word_occurrences(&candidate.title, &keyword.value) as i32;
            let teaser_hits = count_word_occurrences(&candidate.teaser, &keyword.value) as i32;
            let keyword_score = title_hits * TITLE_WEIGHT + teaser_hits * TEASER_WEIGHT;
            topic_total += keyword_score;

            let matched_in = if title_hits > 0 {
                MatchedIn::Title
            } else {
                MatchedIn::Teaser
            };
            let replace = match &best_keyword {
                Some((_, _, score)) => keyword_score > *score,
                None => true,
            };
            if replace {
                best_keyword = Some((keyword.id, matched_in, keyword_score));
            }
        }

        if topic_total == 0 {
            continue;
        }
        let Some((keyword_id, matched_in, _)) = best_keyword else {
            continue;
        };

        let candidate_score = TopicScore {
            topic_id: topic.id,
            primary_keyword_id: keyword_id,
            matched_in,
            score: topic_total,
        };

        let take_it = match (&best, best_updated_at) {
            (None, _) => true,
            (Some(current), Some(current_updated)) => {
                topic_total > current.score || (topic_total == current.score && topic.updated_at > current_updated)
            }
            (Some(_), None) => true,
        };
        if take_it {
            best = Some(candidate_score);
            best_updated_at = Some(topic.updated_at);
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mediascout_types::candidate::ProviderTag;

    fn topic(name: &str, updated_at: chrono::DateTime<Utc>) -> Topic {
        Topic {
            id: Uuid::new_v4(),
            brand_id: Uuid::new_v4(),
            name: name.to_string(),
            is_active: true,
            query_template: None,
            updated_at,
        }
    }

    fn keyword(topic_id: Uuid, value: &str) -> Keyword {
        Keyword {
            id: Uuid::new_v4(),
            topic_id,
            value: value.to_string(),
        }
    }

    fn candidate(title: &str, teaser: &str) -> RawCandidate {
        RawCandidate::new(title, teaser, "https://ex.com/a", "Source", ProviderTag::Rss)
    }

    #[test]
    fn picks_the_highest_scoring_topic() {
        let now = Utc::now();
        let prices = topic("Prices", now);
        let prices_kw = keyword(prices.id, "rabat");
        let jobs = topic("Jobs", now);
        let jobs_kw = keyword(jobs.id, "fyret");

        let topics = vec![(prices.clone(), vec![prices_kw.clone()]), (jobs.clone(), vec![jobs_kw])];
        let candidate = candidate("Netto rabat", "store rabat continues");
        let scored = score_candidate(&candidate, &topics).unwrap();
        assert_eq!(scored.topic_id, prices.id);
        assert_eq!(scored.primary_keyword_id, prices_kw.id);
        assert_eq!(scored.score, TITLE_WEIGHT + TEASER_WEIGHT);
    }

    #[test]
    fn zero_score_on_every_topic_drops_the_candidate() {
        let now = Utc::now();
        let topic_a = topic("Prices", now);
        let kw = keyword(topic_a.id, "rabat");
        let topics = vec![(topic_a, vec![kw])];
        let candidate = candidate("Unrelated headline", "nothing relevant here");
        assert!(score_candidate(&candidate, &topics).is_none());
    }

    #[test]
    fn ties_break_on_most_recently_updated_topic() {
        let older = Utc::now() - chrono::Duration::days(5);
        let newer = Utc::now();
        let a = topic("A", older);
        let a_kw = keyword(a.id, "netto");
        let b = topic("B", newer);
        let b_kw = keyword(b.id, "netto");

        let topics = vec![(a, vec![a_kw]), (b.clone(), vec![b_kw.clone()])];
        let candidate = candidate("Netto news", "short");
        let scored = score_candidate(&candidate, &topics).unwrap();
        assert_eq!(scored.topic_id, b.id);
        assert_eq!(scored.primary_keyword_id, b_kw.id);
    }

    #[test]
    fn matched_in_prefers_title_when_title_has_a_hit() {
        let now = Utc::now();
        let t = topic("Prices", now);
        let kw = keyword(t.id, "rabat");
        let topics = vec![(t, vec![kw])];
        let candidate = candidate("Big rabat today", "unrelated teaser text");
        let scored = score_candidate(&candidate, &topics).unwrap();
        assert_eq!(scored.matched_in, MatchedIn::Title);
    }
}
