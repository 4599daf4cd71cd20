//! Scholar URL validation and search-query construction.

use url::Url;

/// Default Scholar host, used when no base URL is configured.
pub const SCHOLAR_BASE: &str = "https://scholar.google.com";

/// Whether `s` is an http(s) URL on a Google Scholar host.
///
/// Reference URLs are taken from third-party page markup, and the fetch side
/// runs without same-origin restrictions, so anything that is not plainly a
/// Scholar endpoint is refused. Accepts `scholar.google.com` and country
/// variants like `scholar.google.de` or `scholar.google.co.uk`.
pub fn is_scholar_url(s: &str) -> bool {
    let Ok(url) = Url::parse(s) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    let Some(host) = url.host_str() else {
        return false;
    };
    match host.strip_prefix("scholar.google.") {
        Some(suffix) => {
            // Country suffixes are one or two short alphabetic labels; a
            // longer tail means some other domain is squatting the prefix.
            let labels: Vec<&str> = suffix.split('.').collect();
            labels.len() <= 2
                && labels
                    .iter()
                    .all(|l| !l.is_empty() && l.len() <= 3 && l.chars().all(|c| c.is_ascii_alphabetic()))
        }
        None => false,
    }
}

/// Build a Scholar search URL for a paper title and its first author.
///
/// The title is quoted for exact-phrase matching; the author narrows the
/// result set so the top hit is the right paper.
pub fn search_url(base: &str, title: &str, first_author: &str) -> String {
    let query = if first_author.trim().is_empty() {
        format!("\"{}\"", title.trim())
    } else {
        format!("\"{}\" author:{}", title.trim(), first_author.trim())
    };
    format!(
        "{}/scholar?q={}",
        base.trim_end_matches('/'),
        urlencoding::encode(&query)
    )
}
