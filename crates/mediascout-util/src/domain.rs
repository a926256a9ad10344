//! `effective_tld_plus_one` — the registrable-domain key used for rate
//! limiting, circuit breaking, and near-dedup blocking.

use tracing::warn;

/// Returns the registrable domain (eTLD+1) for `url_or_host`, using the
/// bundled public-suffix list via the `addr` crate. Falls back to the
/// last two dot-separated labels if PSL-based parsing fails, so callers
/// never see an error from this function.
pub fn effective_tld_plus_one(url_or_host: &str) -> String {
    let host = extract_host(url_or_host);

    match addr::parse_domain_name(&host) {
        Ok(name) => match name.root() {
            Some(root) => root.to_string(),
            None => fallback_last_two_labels(&host),
        },
        Err(err) => {
            warn!(host = %host, error = %err, "PSL parse failed, falling back to last two labels");
            fallback_last_two_labels(&host)
        }
    }
}

/// Accept either a bare host or a full URL.
fn extract_host(input: &str) -> String {
    if let Ok(parsed) = url::Url::parse(input) {
        if let Some(host) = parsed.host_str() {
            return host.to_lowercase();
        }
    }
    input.trim().to_lowercase()
}

fn fallback_last_two_labels(host: &str) -> String {
    let labels: Vec<&str> = host.split('.').filter(|s| !s.is_empty()).collect();
    if labels.len() <= 2 {
        host.to_string()
    } else {
        labels[labels.len() - 2..].join(".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_host() {
        assert_eq!(effective_tld_plus_one("example.com"), "example.com");
    }

    #[test]
    fn subdomain_collapses_to_etld1() {
        assert_eq!(effective_tld_plus_one("www.example.com"), "example.com");
        assert_eq!(
            effective_tld_plus_one("news.politiken.dk"),
            "politiken.dk"
        );
    }

    #[test]
    fn full_url_extracts_host() {
        assert_eq!(
            effective_tld_plus_one("https://www.reuters.com/business/article-1"),
            "reuters.com"
        );
    }

    #[test]
    fn deeply_nested_subdomain() {
        assert_eq!(
            effective_tld_plus_one("a.b.c.example.co.uk"),
            "example.co.uk"
        );
    }

    #[test]
    fn malformed_host_falls_back_to_last_two_labels() {
        // Not a registrable name the PSL recognizes, but still two labels.
        assert_eq!(effective_tld_plus_one("localhost.invalid-tld-zzz"), "localhost.invalid-tld-zzz");
    }

    #[test]
    fn single_label_host_is_returned_as_is() {
        assert_eq!(effective_tld_plus_one("localhost"), "localhost");
    }
}
