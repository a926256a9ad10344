use crate::retry::RetryPolicy;
use mediascout_types::config::{HttpProfile, ScrapingConfig};
use mediascout_types::errors::ScrapeError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// A successful response body plus the bits of metadata callers need
/// (status, final URL after redirects, headers).
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub url: String,
    pub body: String,
    pub etag: Option<String>,
}

/// Headered, retry-aware request engine.
pub struct HttpClient {
    client: reqwest::Client,
    config: Arc<ScrapingConfig>,
    retry: RetryPolicy,
}

impl HttpClient {
    pub fn new(config: Arc<ScrapingConfig>) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| ScrapeError::ConfigError {
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            config,
            retry: RetryPolicy::default(),
        })
    }

    /// `GET` with profile-specific headers/timeout, retrying idempotently
    /// on `429`/`5xx` with exponential backoff + jitter, honoring
    /// `Retry-After` when present.
    pub async fn get(&self, url: &str, profile: HttpProfile) -> Result<HttpResponse, ScrapeError> {
        self.get_conditional(url, profile, None).await
    }

    /// Same as [`Self::get`] but supporting `If-None-Match` for the RSS
    /// provider's ETag caching. Returns a `304` response rather than an
    /// error so callers can distinguish "unchanged" from "failed".
    pub async fn get_conditional(
        &self,
        url: &str,
        profile: HttpProfile,
        etag: Option<&str>,
    ) -> Result<HttpResponse, ScrapeError> {
        let timeout = self.config.http_profile(profile).timeout;
        let mut attempt = 0usize;

        loop {
            let mut builder = self
                .client
                .get(url)
                .timeout(timeout)
                .header("User-Agent", user_agent(profile))
                .header("Accept", accept_header(profile))
                .header("Accept-Language", "en-US,en;q=0.9,da;q=0.7");

            if let Some(etag) = etag {
                builder = builder.header("If-None-Match", etag);
            }

            let send_result = builder.send().await;

            match send_result {
                Ok(response) => {
                    let status = response.status();

                    if status.as_u16() == 304 {
                        return Ok(HttpResponse {
                            status: 304,
                            url: url.to_string(),
                            body: String::new(),
                            etag: etag.map(|e| e.to_string()),
                        });
                    }

                    if status.is_success() {
                        let response_etag = response
                            .headers()
                            .get("etag")
                            .and_then(|v| v.to_str().ok())
                            .map(|s| s.to_string());
                        let final_url = response.url().to_string();
                        let body = response.text().await.map_err(|e| ScrapeError::TransportError {
                            url: url.to_string(),
                            message: e.to_string(),
                        })?;
                        return Ok(HttpResponse {
                            status: status.as_u16(),
                            url: final_url,
                            body,
                            etag: response_etag,
                        });
                    }

                    let retryable = status.as_u16() == 429 || status.is_server_error();
                    if !retryable || attempt + 1 >= self.retry.max_attempts {
                        return Err(ScrapeError::HttpError {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }

                    let wait = if status.as_u16() == 429 || status.as_u16() == 503 {
                        retry_after(&response, &self.retry)
                    } else {
                        self.retry.backoff_duration(attempt)
                    };
                    warn!(url, status = %status, attempt, wait_ms = wait.as_millis(), "retrying request");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
                Err(err) => {
                    if attempt + 1 >= self.retry.max_attempts {
                        return Err(classify_reqwest_err(url, err));
                    }
                    let wait = self.retry.backoff_duration(attempt);
                    debug!(url, attempt, wait_ms = wait.as_millis(), error = %err, "retrying after transport error");
                    tokio::time::sleep(wait).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn retry_after(response: &reqwest::Response, policy: &RetryPolicy) -> Duration {
    let header_secs = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u64>().ok());
    match header_secs {
        Some(secs) => policy.clamp_retry_after(Duration::from_secs(secs)),
        None => policy.clamp_retry_after(policy.base),
    }
}

fn classify_reqwest_err(url: &str, err: reqwest::Error) -> ScrapeError {
    if err.is_timeout() {
        ScrapeError::Timeout {
            operation: format!("GET {url}"),
        }
    } else {
        ScrapeError::TransportError {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

fn user_agent(profile: HttpProfile) -> &'static str {
    match profile {
        HttpProfile::Html => {
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
             Chrome/124.0.0.0 Safari/537.36"
        }
        HttpProfile::Api => "mediascout-scraper/0.1 (+https://mediascout.example/bot)",
        HttpProfile::Rss => "mediascout-feed-reader/0.1",
    }
}

fn accept_header(profile: HttpProfile) -> &'static str {
    match profile {
        HttpProfile::Html => "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        HttpProfile::Api => "application/json",
        HttpProfile::Rss => "application/rss+xml, application/atom+xml, application/xml;q=0.9, */*;q=0.8",
    }
}
