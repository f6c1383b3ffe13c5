// Extraction Engine Interface
//
// Port onto whatever drives a single iframe chain walk to a final stream
// URL: a headless browser in the stealth/browser case, a plain HTTP
// client plus HTML scraping in the cheaper http case. Both concrete
// adapters implement this same trait so the controller that retries and
// falls back between them never has to know which one it is holding.

use async_trait::async_trait;

use crate::domain::entities::extraction_session::{ExtractionMode, IframeStep};
use crate::domain::value_objects::stealth_fingerprint::SessionStealthContext;
use crate::shared::error::ExtractionError;

/// Everything an extraction engine needs to walk one iframe chain for one
/// title on one server, independent of how many times the controller has
/// already retried.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub vidsrc_url: String,
    pub server: String,
    pub stealth: SessionStealthContext,
}

/// The outcome of a full iframe-chain walk: the final playable URL plus
/// the per-step trail used for diagnostics.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub final_url: String,
    pub requires_proxy: bool,
    pub proxy_source: Option<String>,
    pub steps: Vec<IframeStep>,
}

/// Port onto a single extraction strategy (browser-driven or HTTP-only).
#[async_trait]
pub trait ExtractionEngine: Send + Sync {
    /// Which mode this engine implements. Used by the controller to label
    /// sessions and to decide what to alternate to on retry.
    fn mode(&self) -> ExtractionMode;

    /// Walks the iframe chain for one request to completion or failure.
    /// Implementations report progress via the session's stage as they go
    /// rather than returning intermediate state.
    async fn extract(&self, request: ExtractionRequest) -> Result<ExtractionOutcome, ExtractionError>;
}
