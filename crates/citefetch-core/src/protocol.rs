//! Typed request/response contract for the fetch service.
//!
//! Requests arrive as JSON messages of the shape
//! `{"action": "fetchCitations", "scholarUrl": "..."}` and are answered
//! with `{"success": true, "count": N}` or
//! `{"success": false, "error": "..."}`. The API side is a pair of tagged
//! unions; the wire's `success` bool is confined to a conversion struct.
//!
//! Every failure (unparseable request, non-Scholar target, fetch failure)
//! answers with the same opaque [`FETCH_FAILED`] string. Callers on the
//! far side of this boundary are untrusted and learn nothing about which
//! step failed.

use serde::{Deserialize, Serialize};

use citefetch_scholar::is_scholar_url;

use crate::service::CitationService;
use crate::{CitationCount, CitationQuery};

/// The one error string that ever crosses the message boundary.
pub const FETCH_FAILED: &str = "Citation fetch failed";

/// Incoming request, tagged by its `action` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action")]
pub enum CitationRequest {
    #[serde(rename = "fetchCitations", rename_all = "camelCase")]
    FetchCitations { scholar_url: String },
}

/// Outcome of a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CitationResponse {
    Success { count: u32 },
    Failure { error: String },
}

impl CitationResponse {
    pub fn failure() -> Self {
        Self::Failure {
            error: FETCH_FAILED.to_string(),
        }
    }
}

/// Wire shape of a response: `success` discriminant plus optional fields.
#[derive(Serialize, Deserialize)]
struct WireResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Serialize for CitationResponse {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Self::Success { count } => WireResponse {
                success: true,
                count: Some(*count),
                error: None,
            },
            Self::Failure { error } => WireResponse {
                success: false,
                count: None,
                error: Some(error.clone()),
            },
        };
        wire.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CitationResponse {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = WireResponse::deserialize(deserializer)?;
        if wire.success {
            let count = wire
                .count
                .ok_or_else(|| serde::de::Error::missing_field("count"))?;
            Ok(Self::Success { count })
        } else {
            Ok(Self::Failure {
                error: wire.error.unwrap_or_default(),
            })
        }
    }
}

/// Handle one request against the service.
///
/// The target URL is validated before it reaches the network: the fetch
/// side runs unrestricted, so only Scholar endpoints are accepted.
pub async fn handle_request(
    service: &CitationService,
    request: CitationRequest,
) -> CitationResponse {
    match request {
        CitationRequest::FetchCitations { scholar_url } => {
            if !is_scholar_url(&scholar_url) {
                tracing::warn!(url = %scholar_url, "rejected non-Scholar fetch target");
                return CitationResponse::failure();
            }
            match service
                .get_count(&CitationQuery::Reference(scholar_url))
                .await
            {
                CitationCount::Count(count) => CitationResponse::Success { count },
                CitationCount::Unavailable => CitationResponse::failure(),
            }
        }
    }
}

/// Handle one raw JSON line, returning the JSON reply line.
pub async fn handle_line(service: &CitationService, line: &str) -> String {
    let response = match serde_json::from_str::<CitationRequest>(line) {
        Ok(request) => handle_request(service, request).await,
        Err(err) => {
            tracing::warn!(error = %err, "unparseable request");
            CitationResponse::failure()
        }
    };
    serde_json::to_string(&response)
        .unwrap_or_else(|_| format!(r#"{{"success":false,"error":"{}"}}"#, FETCH_FAILED))
}
