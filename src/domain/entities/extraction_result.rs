//! ExtractionResult entity
//!
//! The cached output of a successful extraction. Keyed within
//! CacheLayer by `(CatalogRef, server)`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::extraction_session::ExtractionMode;
use crate::domain::value_objects::CatalogRef;

/// Media container format of the final manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamType {
    Hls,
    Direct,
}

/// Chain of iframe URLs visited en route to the final manifest, surfaced
/// to clients for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChainSummary {
    pub vidsrc: Option<String>,
    pub cloudnestra: Option<String>,
    pub prorcp: Option<String>,
    pub shadowlands: Option<String>,
}

/// Cached, fully-resolved extraction output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub catalog_ref: CatalogRef,
    pub final_url: String,
    pub stream_type: StreamType,
    pub requires_proxy: bool,
    /// Proxy source tag (e.g. `shadowlands`, `vidsrc`, `embed.su`), present
    /// whenever `requires_proxy` is true.
    pub proxy_source: Option<String>,
    pub server: String,
    pub extraction_method: ExtractionMode,
    pub chain: ChainSummary,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ExtractionResult {
    /// TTL for cached extraction results: manifests embed
    /// short-lived signed tokens, so a 5 minute cache window is used.
    pub const TTL_SECONDS: i64 = 5 * 60;

    pub fn new(
        catalog_ref: CatalogRef,
        final_url: String,
        stream_type: StreamType,
        requires_proxy: bool,
        proxy_source: Option<String>,
        server: impl Into<String>,
        extraction_method: ExtractionMode,
        chain: ChainSummary,
    ) -> Self {
        let created_at = Utc::now();
        Self {
            catalog_ref,
            final_url,
            stream_type,
            requires_proxy,
            proxy_source,
            server: server.into(),
            extraction_method,
            chain,
            created_at,
            expires_at: created_at + chrono::Duration::seconds(Self::TTL_SECONDS),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// When `requires_proxy` is true, the URL the client receives must
    /// embed the upstream URL and source tag rather than the raw upstream URL.
    pub fn client_facing_url(&self, proxy_base: &str) -> String {
        if self.requires_proxy {
            let source = self.proxy_source.as_deref().unwrap_or("unknown");
            format!(
                "{}?url={}&source={}",
                proxy_base,
                crate::infrastructure::proxy::manifest_rewrite::percent_encode(&self.final_url),
                source
            )
        } else {
            self.final_url.clone()
        }
    }
}
