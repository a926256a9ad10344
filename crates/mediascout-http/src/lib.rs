//! HTTP client for the scraping core.
//!
//! A single `reqwest`-backed client with per-profile headers/timeouts and
//! retry-with-backoff on `429`/`5xx`.

mod client;
mod retry;

pub use client::{HttpClient, HttpResponse};
pub use retry::RetryPolicy;
