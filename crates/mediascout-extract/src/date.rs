//! Publication-date resolution: free-form parsing with a source-priority
//! order and a confidence grade, never backfilling with "now".

use chrono::{DateTime, TimeZone, Utc};
use mediascout_types::candidate::DateConfidence;

/// Every place a publication date might come from, highest priority
/// first: an RSS/Atom feed's own `published`/`updated` field, embedded
/// structured data (`datePublished`), a recipe's `date_selector` match,
/// and finally free text scanned from the article body.
#[derive(Debug, Clone, Default)]
pub struct DateSources<'a> {
    pub rss_date: Option<DateTime<Utc>>,
    pub structured_date_raw: Option<&'a str>,
    pub selector_date_raw: Option<&'a str>,
    pub free_text: Option<&'a str>,
}

pub fn resolve(sources: DateSources<'_>) -> (Option<DateTime<Utc>>, DateConfidence) {
    if let Some(dt) = sources.rss_date {
        return (Some(dt), DateConfidence::High);
    }
    if let Some(raw) = sources.structured_date_raw {
        if let Some(dt) = parse_free_form(raw) {
            return (Some(dt), DateConfidence::High);
        }
    }
    if let Some(raw) = sources.selector_date_raw {
        if let Some(dt) = parse_free_form(raw) {
            return (Some(dt), DateConfidence::Medium);
        }
    }
    if let Some(text) = sources.free_text {
        if parse_free_form(text).is_some() {
            // Low-confidence dates are nulled here unconditionally: this
            // resolver has no notion of which provider is calling it, so
            // it cannot apply the "unless the source is authoritative"
            // exception itself. The RSS provider never reaches this
            // branch (it always supplies `rss_date`), so nulling here is
            // safe for every caller that does.
            return (None, DateConfidence::Low);
        }
    }
    (None, DateConfidence::None)
}

fn parse_free_form(raw: &str) -> Option<DateTime<Utc>> {
    let (naive, offset) = dtparse::parse(raw).ok()?;
    match offset {
        Some(offset) => offset.from_local_datetime(&naive).single(),
        None => Some(Utc.from_utc_datetime(&naive)),
    }
    .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rss_date_wins_and_is_high_confidence() {
        let rss = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let (date, confidence) = resolve(DateSources {
            rss_date: Some(rss),
            structured_date_raw: Some("2025-01-01"),
            ..Default::default()
        });
        assert_eq!(date, Some(rss));
        assert_eq!(confidence, DateConfidence::High);
    }

    #[test]
    fn selector_date_is_medium_confidence() {
        let (date, confidence) = resolve(DateSources {
            selector_date_raw: Some("March 3, 2026"),
            ..Default::default()
        });
        assert!(date.is_some());
        assert_eq!(confidence, DateConfidence::Medium);
    }

    #[test]
    fn free_text_fallback_is_low_confidence_and_nulls_the_date() {
        let (date, confidence) = resolve(DateSources {
            free_text: Some("Published on 2026-02-14"),
            ..Default::default()
        });
        assert!(date.is_none());
        assert_eq!(confidence, DateConfidence::Low);
    }

    #[test]
    fn unparseable_input_never_backfills_with_now() {
        let (date, confidence) = resolve(DateSources {
            free_text: Some("not a date at all"),
            ..Default::default()
        });
        assert!(date.is_none());
        assert_eq!(confidence, DateConfidence::None);
    }
}
