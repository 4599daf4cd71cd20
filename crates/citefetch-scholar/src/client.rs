//! HTTP client for Scholar result pages.

use std::time::Duration;

use crate::extract::extract_citation_count;
use crate::query::is_scholar_url;
use crate::{MAX_BODY_BYTES, ScholarError};

/// Browser-like identification. Scholar serves a block page to clients that
/// do not look like one.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches a Scholar page and extracts its citation count.
pub struct ScholarClient {
    client: reqwest::Client,
    timeout: Duration,
    max_body_bytes: usize,
    user_agent: String,
}

impl Default for ScholarClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ScholarClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: DEFAULT_TIMEOUT,
            max_body_bytes: MAX_BODY_BYTES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Per-request timeout (default 10 s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the browser-like `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Override the response-body size bound (default [`MAX_BODY_BYTES`]).
    pub fn with_max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }

    /// Fetch `url` and extract the citation count from the returned page.
    ///
    /// Rejects non-Scholar URLs, non-2xx statuses, and bodies above the size
    /// bound; the extractor is never run over a rejected body.
    pub async fn fetch_count(&self, url: &str) -> Result<u32, ScholarError> {
        if !is_scholar_url(url) {
            return Err(ScholarError::InvalidUrl(url.to_string()));
        }

        tracing::debug!(url, "fetching Scholar page");
        let resp = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ScholarError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        count_from_body(&body, self.max_body_bytes)
    }
}

/// Size-check the body, then extract. Split out so the oversized-body guard
/// is testable without a network round trip.
fn count_from_body(body: &str, max_body_bytes: usize) -> Result<u32, ScholarError> {
    if body.len() > max_body_bytes {
        return Err(ScholarError::OversizedResponse {
            len: body.len(),
            max: max_body_bytes,
        });
    }
    Ok(extract_citation_count(body))
}
