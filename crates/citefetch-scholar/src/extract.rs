//! Citation-count extraction from Scholar result HTML.
//!
//! Scholar marks the "cited by" link on a result with a `cites=` query
//! parameter in its href, which is the most stable marker the page offers.
//! The markup is unversioned and externally controlled, so extraction fails
//! soft: any miss yields 0, never an error.

use once_cell::sync::Lazy;
use regex::Regex;

/// Anchors whose href carries a `cites=` parameter, capturing the link text.
/// Linear pattern only, no nested quantifiers, so cost stays proportional
/// to input length even on adversarial input.
static CITE_LINK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"href="[^"]*cites=[^"]*"[^>]*>([^<]*)</a>"#).expect("static regex")
});

static DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("static regex"));

/// Extract the citation count from a Scholar result page.
///
/// Returns the first run of digits inside the first `cites=`-bearing anchor
/// that contains any. Total: 0 when no such anchor exists, when none of them
/// carries digits, or when the digits do not fit a `u32`.
pub fn extract_citation_count(html: &str) -> u32 {
    for link in CITE_LINK.captures_iter(html) {
        let text = &link[1];
        if let Some(digits) = DIGITS.find(text)
            && let Ok(count) = digits.as_str().parse::<u32>()
        {
            return count;
        }
    }
    0
}
