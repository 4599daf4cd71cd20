//! End-to-end pipeline tests: abstract page in, rendered row (or JSON
//! reply) out, with a scripted count source standing in for Scholar.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use citefetch_core::cache::CitationCache;
use citefetch_core::service::{CitationService, CountSource};
use citefetch_core::{CitationQuery, PageAgent, protocol};
use citefetch_scholar::{ScholarError, extract_citation_count};

/// Serves a canned Scholar page body for every URL, counting requests.
struct CannedScholar {
    body: String,
    status: Option<u16>,
    requests: AtomicUsize,
}

impl CannedScholar {
    fn page(count: u32) -> Self {
        Self {
            body: format!(r#"<a href="/scholar?cites=123">Cited by {}</a>"#, count),
            status: None,
            requests: AtomicUsize::new(0),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            body: String::new(),
            status: Some(status),
            requests: AtomicUsize::new(0),
        }
    }

    fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl CountSource for CannedScholar {
    fn fetch_count<'a>(
        &'a self,
        _url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<u32, ScholarError>> + Send + 'a>> {
        Box::pin(async move {
            self.requests.fetch_add(1, Ordering::SeqCst);
            match self.status {
                Some(code) => Err(ScholarError::Status(code)),
                None => Ok(extract_citation_count(&self.body)),
            }
        })
    }
}

const ABS_URL: &str = "https://arxiv.org/abs/1706.03762";

const ABSTRACT_PAGE: &str = r#"
    <html><body>
      <h1 class="title mathjax"><span class="descriptor">Title:</span>Attention Is All You Need</h1>
      <div class="authors"><span class="descriptor">Authors:</span>
        <a href="https://arxiv.org/a/vaswani_a_1">Ashish Vaswani</a>
      </div>
      <div class="metatable"><table>
        <tr><td class="tablecell label">Subjects:</td><td class="tablecell">cs.CL</td></tr>
      </table></div>
      <a class="abs-button cite-google-scholar"
         href="https://scholar.google.com/scholar?cites=2960712678066186980">Google Scholar</a>
    </body></html>"#;

fn service(source: Arc<CannedScholar>) -> CitationService {
    CitationService::new(source, Arc::new(CitationCache::default()))
}

#[tokio::test]
async fn page_to_rendered_row() {
    let source = Arc::new(CannedScholar::page(130_069));
    let service = service(source.clone());
    let mut agent = PageAgent::new(&service);

    let row = agent.run(ABS_URL, ABSTRACT_PAGE).await.expect("row");
    assert_eq!(row.to_string(), "Citations: 130069 (Google Scholar)");
    assert_eq!(source.requests(), 1);
}

#[tokio::test]
async fn two_page_loads_share_the_cache() {
    let source = Arc::new(CannedScholar::page(7));
    let service = service(source.clone());

    let mut first = PageAgent::new(&service);
    let mut second = PageAgent::new(&service);
    assert!(first.run(ABS_URL, ABSTRACT_PAGE).await.is_some());
    assert!(second.run(ABS_URL, ABSTRACT_PAGE).await.is_some());

    // Same reference URL on both loads: one network round trip.
    assert_eq!(source.requests(), 1);
}

#[tokio::test]
async fn outage_renders_unavailable_everywhere() {
    let source = Arc::new(CannedScholar::failing(503));
    let service = service(source.clone());

    let mut agent = PageAgent::new(&service);
    let row = agent.run(ABS_URL, ABSTRACT_PAGE).await.expect("row");
    assert_eq!(row.to_string(), "Citations: Service unavailable");

    // The same outage over the message contract: opaque failure reply.
    let reply = protocol::handle_line(
        &service,
        r#"{"action":"fetchCitations","scholarUrl":"https://scholar.google.com/scholar?cites=1"}"#,
    )
    .await;
    assert_eq!(reply, r#"{"success":false,"error":"Citation fetch failed"}"#);
}

#[tokio::test]
async fn protocol_serves_counts_from_the_shared_cache() {
    let source = Arc::new(CannedScholar::page(42));
    let service = service(source.clone());

    let line = r#"{"action":"fetchCitations","scholarUrl":"https://scholar.google.com/scholar?cites=9"}"#;
    assert_eq!(
        protocol::handle_line(&service, line).await,
        r#"{"success":true,"count":42}"#
    );
    assert_eq!(
        protocol::handle_line(&service, line).await,
        r#"{"success":true,"count":42}"#
    );
    assert_eq!(source.requests(), 1);
}

#[tokio::test]
async fn search_fallback_reaches_the_source() {
    let page_without_link = r##"
        <h1 class="title"><span class="descriptor">Title:</span>Deep Learning</h1>
        <div class="authors"><a href="#">Yann LeCun</a></div>
        <div class="metatable"><table></table></div>"##;

    let source = Arc::new(CannedScholar::page(5));
    let service = service(source.clone());
    let mut agent = PageAgent::new(&service);

    let row = agent.run(ABS_URL, page_without_link).await.expect("row");
    assert_eq!(row.to_string(), "Citations: 5 (Google Scholar)");
    assert_eq!(source.requests(), 1);

    // The cache key for the search is its synthesized URL.
    let query = CitationQuery::Search {
        title: "Deep Learning".into(),
        first_author: "Yann LeCun".into(),
    };
    assert!(
        service
            .cache()
            .get(&query.url(citefetch_scholar::SCHOLAR_BASE))
            .is_some()
    );
}
