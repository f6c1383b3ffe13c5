//! DTOs for `GET /api/extract-shadowlands`.

use serde::{Deserialize, Serialize};

use crate::domain::entities::extraction_result::{ChainSummary, ExtractionResult, StreamType};
use crate::domain::value_objects::ErrorKind;

/// Raw query parameters. `tmdb_id` failing to parse as `u64` is rejected
/// by axum's extractor before the handler body ever runs; everything
/// else (missing season/episode pairing, zero ids) is a domain-level
/// validation handled inside the handler.
#[derive(Debug, Deserialize)]
pub struct ExtractQuery {
    #[serde(rename = "tmdbId")]
    pub tmdb_id: u64,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    pub server: Option<String>,
}

/// Always returned with HTTP 200 — `success` distinguishes a resolved
/// stream from a classified failure, per the extraction endpoint's own
/// contract (malformed parameters are the one case a client will see a
/// non-200 status, raised by the query extractor itself).
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(rename = "streamUrl", skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
    #[serde(rename = "streamType", skip_serializing_if = "Option::is_none")]
    pub stream_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(rename = "extractionMethod", skip_serializing_if = "Option::is_none")]
    pub extraction_method: Option<&'static str>,
    #[serde(rename = "requiresProxy", skip_serializing_if = "Option::is_none")]
    pub requires_proxy: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain: Option<ChainSummary>,
    pub error: Option<String>,
}

impl ExtractResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            stream_url: None,
            stream_type: None,
            server: None,
            extraction_method: None,
            requires_proxy: None,
            chain: None,
            error: Some(message.into()),
        }
    }

    pub fn from_result(result: &ExtractionResult, proxy_base: &str) -> Self {
        Self {
            success: true,
            stream_url: Some(result.client_facing_url(proxy_base)),
            stream_type: Some(match result.stream_type {
                StreamType::Hls => "hls",
                StreamType::Direct => "direct",
            }),
            server: Some(result.server.clone()),
            extraction_method: Some(match result.extraction_method {
                crate::domain::entities::extraction_session::ExtractionMode::Browser => "browser",
                crate::domain::entities::extraction_session::ExtractionMode::Http => "http",
            }),
            requires_proxy: Some(result.requires_proxy),
            chain: Some(result.chain.clone()),
            error: None,
        }
    }

    pub fn from_error(kind: ErrorKind) -> Self {
        let mut response = Self::failure(kind.message());
        if let Some(suggestion) = kind.suggestion() {
            response.error = Some(format!("{} ({})", kind.message(), suggestion));
        }
        response
    }
}
