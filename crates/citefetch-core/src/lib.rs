//! Citation lookup pipeline: the TTL cache, the cache-backed fetch service,
//! the typed request/response contract, and the arXiv page pipeline that
//! drives them.

use thiserror::Error;

pub mod agent;
pub mod cache;
pub mod config_file;
pub mod page;
pub mod protocol;
pub mod service;

// Re-export for convenience
pub use agent::{CitationRow, PageAgent};
pub use cache::{CitationCache, Clock, DEFAULT_TTL, SystemClock};
pub use page::{AbstractPage, is_abstract_url};
pub use protocol::{CitationRequest, CitationResponse, handle_request};
pub use service::{CitationService, CountSource};

/// How a citation lookup is addressed: a Scholar reference URL taken from
/// the page, or a search synthesized from the paper's title and first
/// author. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationQuery {
    /// A direct "cited by" / profile reference URL found on the page.
    Reference(String),
    /// A result-page search built from paper metadata.
    Search {
        title: String,
        first_author: String,
    },
}

impl CitationQuery {
    /// The Scholar endpoint this query resolves to. `base` only matters for
    /// searches; a reference URL already names its host.
    pub fn url(&self, base: &str) -> String {
        match self {
            Self::Reference(url) => url.clone(),
            Self::Search {
                title,
                first_author,
            } => citefetch_scholar::search_url(base, title, first_author),
        }
    }
}

/// Outcome of a citation lookup.
///
/// `Unavailable` is a rendered state, not an error: by the time a caller
/// sees it, whatever failed has already been logged and discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationCount {
    /// A parsed count. Zero is a legitimate value (no "cited by" link on
    /// the result page), not a failure.
    Count(u32),
    /// The lookup failed somewhere between the socket and the parser.
    Unavailable,
}

impl CitationCount {
    pub fn as_count(&self) -> Option<u32> {
        match self {
            Self::Count(n) => Some(*n),
            Self::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Count(_))
    }
}

/// Failures in the arXiv page pipeline. These stay diagnostic: the page
/// agent logs them and renders nothing rather than surfacing detail.
#[derive(Error, Debug)]
pub enum PageError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("not an arXiv abstract URL: {0}")]
    NotAbstractUrl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_query_ignores_base() {
        let q = CitationQuery::Reference("https://scholar.google.com/scholar?cites=1".into());
        assert_eq!(
            q.url("https://scholar.google.de"),
            "https://scholar.google.com/scholar?cites=1"
        );
    }

    #[test]
    fn search_query_builds_on_base() {
        let q = CitationQuery::Search {
            title: "Deep Learning".into(),
            first_author: "LeCun".into(),
        };
        let url = q.url(citefetch_scholar::SCHOLAR_BASE);
        assert!(url.starts_with("https://scholar.google.com/scholar?q="));
        assert!(url.contains("LeCun"));
    }

    #[test]
    fn count_accessors() {
        assert_eq!(CitationCount::Count(42).as_count(), Some(42));
        assert_eq!(CitationCount::Unavailable.as_count(), None);
        assert!(CitationCount::Count(0).is_available());
        assert!(!CitationCount::Unavailable.is_available());
    }
}
