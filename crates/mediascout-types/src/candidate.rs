//! Raw Candidate — the transient in-run record a provider produces.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence in a parsed publication date.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum DateConfidence {
    None,
    Low,
    Medium,
    High,
}

impl Default for DateConfidence {
    fn default() -> Self {
        DateConfidence::None
    }
}

/// Which provider variant produced a candidate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ProviderTag {
    NewsApi,
    SearchApi,
    Rss,
    ConfigurableHtml,
}

impl ProviderTag {
    /// Providers considered "authoritative" for date cutoff purposes —
    /// their publication date needs no corroboration from extraction.
    pub fn supplies_authoritative_date(&self) -> bool {
        matches!(self, ProviderTag::Rss)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderTag::NewsApi => "gnews",
            ProviderTag::SearchApi => "serpapi",
            ProviderTag::Rss => "rss",
            ProviderTag::ConfigurableHtml => "configurable_html",
        }
    }
}

/// A transient in-run record produced by a provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawCandidate {
    pub title: String,
    pub teaser: String,
    pub url: String,
    pub published_at: Option<DateTime<Utc>>,
    pub date_confidence: DateConfidence,
    pub source_name: String,
    pub provider_tag: ProviderTag,
    pub matched_keyword: Option<String>,
}

impl RawCandidate {
    pub fn new(
        title: impl Into<String>,
        teaser: impl Into<String>,
        url: impl Into<String>,
        source_name: impl Into<String>,
        provider_tag: ProviderTag,
    ) -> Self {
        Self {
            title: title.into(),
            teaser: teaser.into(),
            url: url.into(),
            published_at: None,
            date_confidence: DateConfidence::None,
            source_name: source_name.into(),
            provider_tag,
            matched_keyword: None,
        }
    }
}
