//! Google Scholar adapter: query-URL handling, citation-count extraction,
//! and the HTTP client that fetches Scholar result pages.
//!
//! Scholar has no public API for citation counts, so this crate scrapes the
//! HTML result page. The extraction step is deliberately hidden behind
//! [`extract_citation_count`] so the scraping strategy can change without
//! touching any caller.

use thiserror::Error;

pub mod client;
pub mod extract;
pub mod query;

pub use client::ScholarClient;
pub use extract::extract_citation_count;
pub use query::{SCHOLAR_BASE, is_scholar_url, search_url};

/// Largest response body the extractor will be asked to scan (1 MB).
/// Bigger bodies are rejected before parsing to bound worst-case cost.
pub const MAX_BODY_BYTES: usize = 1_000_000;

#[derive(Error, Debug)]
pub enum ScholarError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {0}")]
    Status(u16),
    #[error("response body of {len} bytes exceeds the {max}-byte bound")]
    OversizedResponse { len: usize, max: usize },
    #[error("not a Google Scholar URL: {0}")]
    InvalidUrl(String),
}
