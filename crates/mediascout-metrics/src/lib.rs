//! Prometheus metrics for the scraping core: owns a private [`Registry`]
//! and exposes typed `record_*`/`observe_*` methods rather than letting
//! callers touch counters directly.
//!
//! Label sets are kept deliberately low cardinality: `provider`, `domain`
//! (registrable domain, not full URL), `status`, `result`, `stage`, and
//! `guardrail`/`reason` are all small closed or slow-growing sets.

use prometheus::{
    CounterVec, Encoder, Histogram, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};

pub struct ScrapeMetrics {
    registry: Registry,

    runs_total: CounterVec,
    http_errors_total: CounterVec,
    extractions_total: CounterVec,
    duplicates_removed_total: CounterVec,
    guardrail_events_total: CounterVec,
    playwright_fallback_total: CounterVec,

    run_duration_seconds: Histogram,
    provider_duration_seconds: HistogramVec,
    request_duration_seconds: HistogramVec,
    extraction_content_length: HistogramVec,
}

impl ScrapeMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let runs_total = CounterVec::new(
            Opts::new("scrape_runs_total", "Completed scrape runs"),
            &["status"],
        )?;
        let http_errors_total = CounterVec::new(
            Opts::new("scrape_http_errors_total", "Provider HTTP/transport errors"),
            &["provider", "error_type"],
        )?;
        let extractions_total = CounterVec::new(
            Opts::new("scrape_extractions_total", "Extraction attempts by outcome"),
            &["domain", "result"],
        )?;
        let duplicates_removed_total = CounterVec::new(
            Opts::new("scrape_duplicates_removed_total", "Candidates removed by dedup stage"),
            &["stage"],
        )?;
        let guardrail_events_total = CounterVec::new(
            Opts::new("scrape_guardrail_events_total", "Guardrail trips"),
            &["guardrail", "provider", "reason"],
        )?;
        let playwright_fallback_total = CounterVec::new(
            Opts::new("scrape_playwright_fallback_total", "Headless-browser fallback fetches"),
            &["domain", "result"],
        )?;

        let run_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "scrape_run_duration_seconds",
            "Wall-clock duration of a full scrape run",
        ).buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 900.0]))?;

        let provider_duration_seconds = HistogramVec::new(
            HistogramOpts::new("scrape_provider_duration_seconds", "Time a single provider spent fetching")
                .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["provider"],
        )?;
        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new("scrape_request_duration_seconds", "Single outbound HTTP request duration")
                .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
            &["provider", "domain"],
        )?;
        let extraction_content_length = HistogramVec::new(
            HistogramOpts::new("scrape_extraction_content_length", "Extracted content length in bytes")
                .buckets(vec![256.0, 1024.0, 4096.0, 16384.0, 65536.0, 262144.0]),
            &["domain"],
        )?;

        registry.register(Box::new(runs_total.clone()))?;
        registry.register(Box::new(http_errors_total.clone()))?;
        registry.register(Box::new(extractions_total.clone()))?;
        registry.register(Box::new(duplicates_removed_total.clone()))?;
        registry.register(Box::new(guardrail_events_total.clone()))?;
        registry.register(Box::new(playwright_fallback_total.clone()))?;
        registry.register(Box::new(run_duration_seconds.clone()))?;
        registry.register(Box::new(provider_duration_seconds.clone()))?;
        registry.register(Box::new(request_duration_seconds.clone()))?;
        registry.register(Box::new(extraction_content_length.clone()))?;

        Ok(Self {
            registry,
            runs_total,
            http_errors_total,
            extractions_total,
            duplicates_removed_total,
            guardrail_events_total,
            playwright_fallback_total,
            run_duration_seconds,
            provider_duration_seconds,
            request_duration_seconds,
            extraction_content_length,
        })
    }

    pub fn record_run(&self, status: &str) {
        self.runs_total.with_label_values(&[status]).inc();
    }

    pub fn record_http_error(&self, provider: &str, error_type: &str) {
        self.http_errors_total.with_label_values(&[provider, error_type]).inc();
    }

    pub fn record_extraction(&self, domain: &str, result: &str) {
        self.extractions_total.with_label_values(&[domain, result]).inc();
    }

    pub fn record_duplicates_removed(&self, stage: &str, count: usize) {
        self.duplicates_removed_total
            .with_label_values(&[stage])
            .inc_by(count as f64);
    }

    pub fn record_guardrail_event(&self, guardrail: &str, provider: &str, reason: &str) {
        self.guardrail_events_total
            .with_label_values(&[guardrail, provider, reason])
            .inc();
    }

    pub fn record_playwright_fallback(&self, domain: &str, result: &str) {
        self.playwright_fallback_total.with_label_values(&[domain, result]).inc();
    }

    pub fn observe_run_duration(&self, seconds: f64) {
        self.run_duration_seconds.observe(seconds);
    }

    pub fn observe_provider_duration(&self, provider: &str, seconds: f64) {
        self.provider_duration_seconds.with_label_values(&[provider]).observe(seconds);
    }

    pub fn observe_request_duration(&self, provider: &str, domain: &str, seconds: f64) {
        self.request_duration_seconds
            .with_label_values(&[provider, domain])
            .observe(seconds);
    }

    pub fn observe_extraction_content_length(&self, domain: &str, bytes: usize) {
        self.extraction_content_length
            .with_label_values(&[domain])
            .observe(bytes as f64);
    }

    /// Renders the registry in Prometheus text exposition format, for the
    /// `/metrics` HTTP handler.
    pub fn gather(&self) -> prometheus::Result<String> {
        let families = self.registry.gather();
        let mut buf = Vec::new();
        TextEncoder::new().encode(&families, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap_or_default())
    }
}

impl Default for ScrapeMetrics {
    fn default() -> Self {
        Self::new().expect("metric registration cannot fail with this fixed, non-duplicated set of names")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_the_gathered_output() {
        let metrics = ScrapeMetrics::new().unwrap();
        metrics.record_run("success");
        metrics.record_http_error("gnews", "http_5xx");
        metrics.record_guardrail_event("max_keywords_per_run", "", "dropped 3 keywords");

        let output = metrics.gather().unwrap();
        assert!(output.contains("scrape_runs_total"));
        assert!(output.contains("scrape_http_errors_total"));
        assert!(output.contains("scrape_guardrail_events_total"));
    }

    #[test]
    fn histograms_accumulate_observations() {
        let metrics = ScrapeMetrics::new().unwrap();
        metrics.observe_run_duration(12.5);
        metrics.observe_provider_duration("rss", 0.8);
        metrics.observe_request_duration("rss", "example.com", 0.3);
        metrics.observe_extraction_content_length("example.com", 4096);

        let output = metrics.gather().unwrap();
        assert!(output.contains("scrape_run_duration_seconds"));
        assert!(output.contains("scrape_provider_duration_seconds"));
        assert!(output.contains("scrape_extraction_content_length"));
    }
}
