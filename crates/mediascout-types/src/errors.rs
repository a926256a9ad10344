//! Error taxonomy shared across the scraping core.

use thiserror::Error;

/// Result alias used throughout the scraping crates.
pub type ScrapeResult<T> = Result<T, ScrapeError>;

/// Errors produced anywhere in the scraping pipeline.
///
/// Recoverable-local errors never escape a provider; `Locked` and
/// `BudgetExceeded` are run-scoped; store errors are fatal to the run.
#[derive(Error, Debug)]
pub enum ScrapeError {
    /// A request exceeded its budget (per-request, per-provider, or run-wide).
    #[error("operation timed out: {operation}")]
    Timeout { operation: String },

    /// Non-2xx response after retries were exhausted.
    #[error("http error: status {status} from {url}")]
    HttpError { status: u16, url: String },

    /// Network/DNS failure before a response was received.
    #[error("transport error fetching {url}: {message}")]
    TransportError { url: String, message: String },

    /// A response body could not be parsed (HTML, RSS/Atom, JSON, date).
    #[error("parse error: {message}")]
    ParseError { message: String },

    /// Every extraction strategy produced content below the quality gate.
    #[error("extraction produced no usable content for {url}")]
    EmptyContent { url: String },

    /// The domain's circuit breaker is open; requests fail fast.
    #[error("circuit open for domain {domain}")]
    CircuitOpen { domain: String },

    /// A brand's scrape lock is already held by another run.
    #[error("brand {brand_id} is locked, run in progress since {started_at}")]
    Locked {
        brand_id: String,
        started_at: chrono::DateTime<chrono::Utc>,
    },

    /// A guardrail truncated input; the run continues.
    #[error("guardrail {guardrail} exceeded: {reason}")]
    BudgetExceeded { guardrail: String, reason: String },

    /// The Store (persistence engine) failed on a required operation.
    #[error("store error: {message}")]
    StoreError { message: String },

    /// The requested brand does not exist.
    #[error("brand not found: {brand_id}")]
    BrandNotFound { brand_id: String },

    /// Generic configuration problem detected at startup.
    #[error("configuration error: {message}")]
    ConfigError { message: String },
}

impl ScrapeError {
    /// True for the "recoverable, local" class — these must never
    /// propagate past a single provider call.
    pub fn is_provider_local(&self) -> bool {
        matches!(
            self,
            ScrapeError::Timeout { .. }
                | ScrapeError::HttpError { .. }
                | ScrapeError::TransportError { .. }
                | ScrapeError::ParseError { .. }
                | ScrapeError::EmptyContent { .. }
                | ScrapeError::CircuitOpen { .. }
        )
    }

    /// A coarse label for the `error_type` metric dimension, kept at low
    /// cardinality.
    pub fn error_type_label(&self) -> &'static str {
        match self {
            ScrapeError::Timeout { .. } => "timeout",
            ScrapeError::HttpError { status, .. } if (500..600).contains(status) => "http_5xx",
            ScrapeError::HttpError { status, .. } if *status == 429 => "http_429",
            ScrapeError::HttpError { .. } => "http_4xx",
            ScrapeError::TransportError { .. } => "transport",
            ScrapeError::ParseError { .. } => "parse",
            ScrapeError::EmptyContent { .. } => "empty_content",
            ScrapeError::CircuitOpen { .. } => "circuit_open",
            ScrapeError::Locked { .. } => "locked",
            ScrapeError::BudgetExceeded { .. } => "budget_exceeded",
            ScrapeError::StoreError { .. } => "store_error",
            ScrapeError::BrandNotFound { .. } => "not_found",
            ScrapeError::ConfigError { .. } => "config_error",
        }
    }
}
