//! The cache-backed fetch service.
//!
//! [`CitationService::get_count`] is the trust boundary of the pipeline: it
//! consults the cache, falls through to the network, and collapses every
//! internal failure (network error, bad status, oversized body) into
//! [`CitationCount::Unavailable`]. Error detail is logged here and never
//! crosses to the caller.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use citefetch_scholar::{SCHOLAR_BASE, ScholarClient, ScholarError};

use crate::cache::CitationCache;
use crate::{CitationCount, CitationQuery};

/// Something that resolves a Scholar URL to a citation count.
///
/// The production implementation is [`ScholarClient`]; tests substitute a
/// counting mock to observe how often the network is consulted.
pub trait CountSource: Send + Sync {
    fn fetch_count<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<u32, ScholarError>> + Send + 'a>>;
}

impl CountSource for ScholarClient {
    fn fetch_count<'a>(
        &'a self,
        url: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<u32, ScholarError>> + Send + 'a>> {
        Box::pin(ScholarClient::fetch_count(self, url))
    }
}

/// Cache-backed citation lookup service.
///
/// Requests are handled independently: two concurrent lookups for the same
/// uncached URL both hit the network. At this request volume the duplicate
/// fetch is cheaper than in-flight de-duplication.
pub struct CitationService {
    source: Arc<dyn CountSource>,
    cache: Arc<CitationCache>,
    scholar_base: String,
}

impl CitationService {
    pub fn new(source: Arc<dyn CountSource>, cache: Arc<CitationCache>) -> Self {
        Self {
            source,
            cache,
            scholar_base: SCHOLAR_BASE.to_string(),
        }
    }

    /// Use a different Scholar host for synthesized search queries.
    pub fn with_scholar_base(mut self, base: impl Into<String>) -> Self {
        self.scholar_base = base.into();
        self
    }

    pub fn cache(&self) -> &CitationCache {
        &self.cache
    }

    /// Resolve a query to its citation count.
    ///
    /// Never fails from the caller's point of view. A live cache entry
    /// short-circuits the network entirely; otherwise the count source is
    /// consulted, a successful parse is cached and the cache swept, and any
    /// failure degrades to [`CitationCount::Unavailable`].
    pub async fn get_count(&self, query: &CitationQuery) -> CitationCount {
        let url = query.url(&self.scholar_base);

        if let Some(count) = self.cache.get(&url) {
            return CitationCount::Count(count);
        }

        match self.source.fetch_count(&url).await {
            Ok(count) => {
                self.cache.insert(url, count);
                self.cache.sweep_expired();
                CitationCount::Count(count)
            }
            Err(err) => {
                // Detail stops here; the caller only learns "unavailable".
                tracing::warn!(url = %url, error = %err, "citation fetch failed");
                CitationCount::Unavailable
            }
        }
    }
}

impl std::fmt::Debug for CitationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CitationService")
            .field("cache", &self.cache)
            .field("scholar_base", &self.scholar_base)
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A [`CountSource`] returning scripted responses, one per call, with
    /// the last repeated when the script runs out. Counts its calls.
    pub struct MockSource {
        responses: Mutex<Vec<Result<u32, ScholarError>>>,
        calls: AtomicUsize,
    }

    impl MockSource {
        pub fn always(count: u32) -> Self {
            Self::sequence(vec![Ok(count)])
        }

        pub fn sequence(responses: Vec<Result<u32, ScholarError>>) -> Self {
            assert!(!responses.is_empty());
            Self {
                responses: Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn next(&self) -> Result<u32, ScholarError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.len() > 1 {
                responses.remove(0)
            } else {
                clone_response(&responses[0])
            }
        }
    }

    // ScholarError is not Clone (reqwest::Error isn't); rebuild the variants
    // the mock actually uses.
    fn clone_response(r: &Result<u32, ScholarError>) -> Result<u32, ScholarError> {
        match r {
            Ok(n) => Ok(*n),
            Err(ScholarError::Status(code)) => Err(ScholarError::Status(*code)),
            Err(ScholarError::OversizedResponse { len, max }) => {
                Err(ScholarError::OversizedResponse {
                    len: *len,
                    max: *max,
                })
            }
            Err(ScholarError::InvalidUrl(url)) => Err(ScholarError::InvalidUrl(url.clone())),
            Err(ScholarError::Http(_)) => panic!("mock cannot replay reqwest errors"),
        }
    }

    impl CountSource for MockSource {
        fn fetch_count<'a>(
            &'a self,
            _url: &'a str,
        ) -> Pin<Box<dyn Future<Output = Result<u32, ScholarError>> + Send + 'a>> {
            Box::pin(async move { self.next() })
        }
    }
}
