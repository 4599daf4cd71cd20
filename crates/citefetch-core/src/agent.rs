//! Page agent: drives one page load from eligibility check to rendered row.
//!
//! State machine per page load:
//! `NotEligible → Eligible → Loading → Rendered(count | unavailable)`.
//! Both `Rendered` states are terminal: there is no retry path, and a
//! second run on the same agent renders nothing.

use std::fmt;
use std::time::Duration;

use crate::page::{self, AbstractPage};
use crate::service::CitationService;
use crate::{CitationCount, PageError};

/// Label of the rendered metadata row, matching the page's own
/// `Label:`-style convention.
pub const CITATION_LABEL: &str = "Citations:";
/// Attribution appended after a successful count.
pub const SOURCE_LABEL: &str = "Google Scholar";
/// Value rendered when the lookup failed. Static text only, no error
/// detail ever reaches the page.
pub const UNAVAILABLE_TEXT: &str = "Service unavailable";
/// Placeholder value shown between insertion and the fetch completing.
pub const LOADING_TEXT: &str = "Loading...";

/// One metadata row: a label cell and a value cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationRow {
    pub label: &'static str,
    pub value: String,
}

impl CitationRow {
    /// The placeholder row inserted at the anchor point while the count is
    /// being fetched.
    pub fn loading() -> Self {
        Self {
            label: CITATION_LABEL,
            value: LOADING_TEXT.to_string(),
        }
    }

    pub fn from_count(count: CitationCount) -> Self {
        let value = match count {
            CitationCount::Count(n) => format!("{} ({})", n, SOURCE_LABEL),
            CitationCount::Unavailable => UNAVAILABLE_TEXT.to_string(),
        };
        Self {
            label: CITATION_LABEL,
            value,
        }
    }
}

impl fmt::Display for CitationRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.label, self.value)
    }
}

/// Lifecycle of one page load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentState {
    /// Not yet run, or the page is not an arXiv abstract page.
    NotEligible,
    /// Recognized page, pipeline not yet started.
    Eligible,
    /// Placeholder up, fetch in flight.
    Loading,
    /// Terminal: a row was rendered (or found already present).
    Rendered(CitationCount),
}

/// Runs the citation pipeline for a single page load.
pub struct PageAgent<'a> {
    service: &'a CitationService,
    state: AgentState,
}

impl<'a> PageAgent<'a> {
    pub fn new(service: &'a CitationService) -> Self {
        Self {
            service,
            state: AgentState::NotEligible,
        }
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    /// Run the pipeline over a fetched page. Returns the row to append to
    /// the metadata table, or `None` when nothing should be inserted: an
    /// ineligible URL, a page without the metadata table, a page that
    /// already carries a citation row, a page offering no usable query, or
    /// an agent that has already rendered.
    pub async fn run(&mut self, page_url: &str, html: &str) -> Option<CitationRow> {
        if let AgentState::Rendered(_) = self.state {
            tracing::debug!("citation row already rendered for this page load");
            return None;
        }

        if !page::is_abstract_url(page_url) {
            tracing::debug!(url = %page_url, "not an abstract page, skipping");
            self.state = AgentState::NotEligible;
            return None;
        }
        self.state = AgentState::Eligible;

        let page = AbstractPage::parse(html);
        if !page.has_anchor_point() {
            // Expected page structure absent; nothing to attach to.
            tracing::warn!(url = %page_url, "no metadata table on abstract page");
            return None;
        }
        if page.has_citation_row() {
            tracing::debug!(url = %page_url, "citation row already present");
            return None;
        }

        let Some(query) = page.citation_query() else {
            tracing::warn!(url = %page_url, "page offers neither a Scholar link nor a title");
            return None;
        };

        self.state = AgentState::Loading;
        let count = self.service.get_count(&query).await;
        self.state = AgentState::Rendered(count);
        Some(CitationRow::from_count(count))
    }
}

/// Fetch an arXiv abstract page over HTTP.
///
/// Unlike the Scholar fetch this identifies itself honestly; arXiv does not
/// gate plain HTML on browser sniffing.
pub async fn fetch_abstract_page(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<String, PageError> {
    if !page::is_abstract_url(url) {
        return Err(PageError::NotAbstractUrl(url.to_string()));
    }
    let resp = client
        .get(url)
        .header(
            "User-Agent",
            concat!("citefetch/", env!("CARGO_PKG_VERSION")),
        )
        .timeout(timeout)
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(PageError::Status(status.as_u16()));
    }
    Ok(resp.text().await?)
}
