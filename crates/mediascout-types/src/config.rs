//! Runtime configuration, loaded from the environment as explicit
//! fields with typed defaults, not a dynamic config bag.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Per-profile HTTP defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpProfileConfig {
    pub timeout: Duration,
    pub rps: f64,
}

/// Which providers are enabled, via
/// `SCRAPING_PROVIDER_{GNEWS,SERPAPI,RSS,CONFIGURABLE}_ENABLED`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderToggles {
    pub gnews_enabled: bool,
    pub serpapi_enabled: bool,
    pub rss_enabled: bool,
    pub configurable_enabled: bool,
}

impl Default for ProviderToggles {
    fn default() -> Self {
        Self {
            gnews_enabled: true,
            serpapi_enabled: true,
            rss_enabled: true,
            configurable_enabled: true,
        }
    }
}

/// Top-level scraping configuration, the single source of truth every
/// crate reads from instead of calling `std::env::var` directly.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScrapingConfig {
    pub providers: ProviderToggles,

    /// `SCRAPING_MAX_KEYWORDS_PER_RUN` (default 50).
    pub max_keywords_per_run: usize,
    /// `SCRAPING_MAX_TOTAL_URLS_PER_RUN` (default 200).
    pub max_total_urls_per_run: usize,
    /// `SCRAPING_BLIND_DOMAIN_CIRCUIT_THRESHOLD` (default 8).
    pub circuit_failure_threshold: u32,
    /// Circuit breaker half-open cooldown (default 10 min).
    pub circuit_cooldown: Duration,

    /// `SCRAPING_RATE_HTML_RPS` (default 1.5).
    pub rate_html_rps: f64,
    /// `SCRAPING_RATE_API_RPS` (default 3.0).
    pub rate_api_rps: f64,
    /// `SCRAPING_RATE_RSS_RPS` (default 2.0).
    pub rate_rss_rps: f64,

    /// `SCRAPING_FUZZY_DEDUP_ENABLED` (default true).
    pub fuzzy_dedup_enabled: bool,
    /// `SCRAPING_FUZZY_DEDUP_THRESHOLD` (default 92).
    pub fuzzy_dedup_threshold: u8,
    /// `SCRAPING_FUZZY_DEDUP_DAY_WINDOW` (default 2).
    pub fuzzy_dedup_day_window: i64,

    /// `SCRAPING_DEFAULT_LANGUAGES`, used when a brand's
    /// `allowed_languages` is null.
    pub default_languages: Vec<String>,

    /// `SCRAPING_DEFAULT_LOOKBACK_HOURS` (default 72): the cutoff window
    /// used for a brand's first run, when there is no prior
    /// `last_scraped_at` to anchor the cutoff filter on.
    pub default_lookback_hours: i64,

    /// Global concurrency cap per profile.
    pub max_in_flight_per_profile: usize,
    /// Hard per-run wall-clock budget (default 15 min).
    pub run_budget: Duration,
    /// Headless tab pool size for the persistent browser session
    /// (default 3).
    pub browser_tab_pool_size: usize,
}

impl Default for ScrapingConfig {
    fn default() -> Self {
        Self {
            providers: ProviderToggles::default(),
            max_keywords_per_run: 50,
            max_total_urls_per_run: 200,
            circuit_failure_threshold: 8,
            circuit_cooldown: Duration::from_secs(600),
            rate_html_rps: 1.5,
            rate_api_rps: 3.0,
            rate_rss_rps: 2.0,
            fuzzy_dedup_enabled: true,
            fuzzy_dedup_threshold: 92,
            fuzzy_dedup_day_window: 2,
            default_languages: vec!["en".to_string()],
            default_lookback_hours: 72,
            max_in_flight_per_profile: 10,
            run_budget: Duration::from_secs(15 * 60),
            browser_tab_pool_size: 3,
        }
    }
}

impl ScrapingConfig {
    /// Load configuration from the process environment, falling back to
    /// [`Default`] for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(val) = std::env::var("SCRAPING_PROVIDER_GNEWS_ENABLED") {
            cfg.providers.gnews_enabled = parse_bool(&val, cfg.providers.gnews_enabled);
        }
        if let Ok(val) = std::env::var("SCRAPING_PROVIDER_SERPAPI_ENABLED") {
            cfg.providers.serpapi_enabled = parse_bool(&val, cfg.providers.serpapi_enabled);
        }
        if let Ok(val) = std::env::var("SCRAPING_PROVIDER_RSS_ENABLED") {
            cfg.providers.rss_enabled = parse_bool(&val, cfg.providers.rss_enabled);
        }
        if let Ok(val) = std::env::var("SCRAPING_PROVIDER_CONFIGURABLE_ENABLED") {
            cfg.providers.configurable_enabled =
                parse_bool(&val, cfg.providers.configurable_enabled);
        }

        if let Ok(val) = std::env::var("SCRAPING_MAX_KEYWORDS_PER_RUN") {
            if let Ok(parsed) = val.parse() {
                cfg.max_keywords_per_run = parsed;
            }
        }
        if let Ok(val) = std::env::var("SCRAPING_MAX_TOTAL_URLS_PER_RUN") {
            if let Ok(parsed) = val.parse() {
                cfg.max_total_urls_per_run = parsed;
            }
        }
        if let Ok(val) = std::env::var("SCRAPING_BLIND_DOMAIN_CIRCUIT_THRESHOLD") {
            if let Ok(parsed) = val.parse() {
                cfg.circuit_failure_threshold = parsed;
            }
        }
        if let Ok(val) = std::env::var("SCRAPING_RATE_HTML_RPS") {
            if let Ok(parsed) = val.parse() {
                cfg.rate_html_rps = parsed;
            }
        }
        if let Ok(val) = std::env::var("SCRAPING_RATE_API_RPS") {
            if let Ok(parsed) = val.parse() {
                cfg.rate_api_rps = parsed;
            }
        }
        if let Ok(val) = std::env::var("SCRAPING_RATE_RSS_RPS") {
            if let Ok(parsed) = val.parse() {
                cfg.rate_rss_rps = parsed;
            }
        }
        if let Ok(val) = std::env::var("SCRAPING_FUZZY_DEDUP_ENABLED") {
            cfg.fuzzy_dedup_enabled = parse_bool(&val, cfg.fuzzy_dedup_enabled);
        }
        if let Ok(val) = std::env::var("SCRAPING_FUZZY_DEDUP_THRESHOLD") {
            if let Ok(parsed) = val.parse() {
                cfg.fuzzy_dedup_threshold = parsed;
            }
        }
        if let Ok(val) = std::env::var("SCRAPING_FUZZY_DEDUP_DAY_WINDOW") {
            if let Ok(parsed) = val.parse() {
                cfg.fuzzy_dedup_day_window = parsed;
            }
        }
        if let Ok(val) = std::env::var("SCRAPING_DEFAULT_LANGUAGES") {
            cfg.default_languages = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Ok(val) = std::env::var("SCRAPING_DEFAULT_LOOKBACK_HOURS") {
            if let Ok(parsed) = val.parse() {
                cfg.default_lookback_hours = parsed;
            }
        }

        cfg
    }

    pub fn http_profile(&self, profile: HttpProfile) -> HttpProfileConfig {
        match profile {
            HttpProfile::Html => HttpProfileConfig {
                timeout: Duration::from_secs(30),
                rps: self.rate_html_rps,
            },
            HttpProfile::Api => HttpProfileConfig {
                timeout: Duration::from_secs(10),
                rps: self.rate_api_rps,
            },
            HttpProfile::Rss => HttpProfileConfig {
                timeout: Duration::from_secs(20),
                rps: self.rate_rss_rps,
            },
        }
    }
}

fn parse_bool(val: &str, default: bool) -> bool {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// The three request profiles the HTTP client and rate governor key on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HttpProfile {
    Html,
    Api,
    Rss,
}

impl HttpProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpProfile::Html => "html",
            HttpProfile::Api => "api",
            HttpProfile::Rss => "rss",
        }
    }
}
