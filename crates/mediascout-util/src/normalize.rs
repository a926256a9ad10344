//! `normalize_url`: an idempotent canonical form used as the dedup key
//! across providers.

use once_cell::sync::Lazy;
use std::collections::HashSet;
use url::Url;

/// Query parameters that exist purely for attribution/tracking and carry
/// no identity for the underlying article.
static TRACKING_PARAMS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["utm", "fbclid", "gclid", "mc_eid", "ref", "source"]
        .into_iter()
        .collect()
});

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(key)
}

/// Normalize a URL for deduplication purposes:
/// - lowercase host
/// - strip the default port for the scheme
/// - drop the fragment
/// - drop tracking params (`utm_*`, `fbclid`, `gclid`, `mc_eid`, `ref`, `source`)
/// - sort the remaining query params
/// - strip a trailing slash from the path
///
/// Unparsable input is returned unchanged (lowercased/trimmed) so the
/// function never panics or errors; callers treat it as best-effort.
/// `normalize_url(normalize_url(u)) == normalize_url(u)` for all `u`.
pub fn normalize_url(raw: &str) -> String {
    let Ok(mut parsed) = Url::parse(raw.trim()) else {
        return raw.trim().to_lowercase();
    };

    if let Some(host) = parsed.host_str() {
        let lower = host.to_lowercase();
        let _ = parsed.set_host(Some(&lower));
    }

    if let Some(port) = parsed.port() {
        let is_default =
            (parsed.scheme() == "http" && port == 80) || (parsed.scheme() == "https" && port == 443);
        if is_default {
            let _ = parsed.set_port(None);
        }
    }

    parsed.set_fragment(None);

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(k, _)| !is_tracking_param(k))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    params.sort();
    if params.is_empty() {
        parsed.set_query(None);
    } else {
        let query = params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&");
        parsed.set_query(Some(&query));
    }

    let path = parsed.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_host() {
        assert_eq!(
            normalize_url("https://Example.COM/a"),
            "https://example.com/a"
        );
    }

    #[test]
    fn strips_default_port() {
        assert_eq!(
            normalize_url("https://example.com:443/a"),
            "https://example.com/a"
        );
        assert_eq!(
            normalize_url("http://example.com:80/a"),
            "http://example.com/a"
        );
    }

    #[test]
    fn keeps_non_default_port() {
        assert_eq!(
            normalize_url("https://example.com:8443/a"),
            "https://example.com:8443/a"
        );
    }

    #[test]
    fn strips_fragment() {
        assert_eq!(
            normalize_url("https://example.com/a#section"),
            "https://example.com/a"
        );
    }

    #[test]
    fn drops_tracking_params_and_sorts_rest() {
        assert_eq!(
            normalize_url("https://ex.com/a?utm_source=x&b=2&fbclid=y&a=1"),
            "https://ex.com/a?a=1&b=2"
        );
    }

    #[test]
    fn strips_trailing_slash() {
        assert_eq!(normalize_url("https://ex.com/a/"), "https://ex.com/a");
        // root path is left alone
        assert_eq!(normalize_url("https://ex.com/"), "https://ex.com/");
    }

    #[test]
    fn matches_exact_duplicate_urls() {
        let a = normalize_url("https://ex.com/a?utm=foo");
        let b = normalize_url("https://ex.com/a");
        assert_eq!(a, b);
    }

    #[test]
    fn is_idempotent() {
        let once = normalize_url("https://Example.com:443/a/?utm_source=x&b=2#frag");
        let twice = normalize_url(&once);
        assert_eq!(once, twice);
    }
}
