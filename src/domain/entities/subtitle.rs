//! SubtitleDescriptor and SubtitleBlob entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata describing the best available subtitle for one language,
/// returned to the client before the body itself is downloaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleDescriptor {
    /// ISO 639-2 language code, e.g. "eng".
    pub language_code: String,
    /// Human-readable language name, e.g. "English".
    pub language_name: String,
    /// Rank among candidates returned by the catalog for this language (1 = best).
    pub quality_rank: u32,
    /// Opaque id into SubtitleBlobs once downloaded; absent until first download.
    pub content_handle: Option<String>,
    /// Upstream download reference, used lazily on first client selection.
    pub download_reference: String,
}

/// WebVTT body cached under the content hash of its normalized text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleBlob {
    pub content_hash: String,
    pub vtt_body: String,
    pub fetched_at: DateTime<Utc>,
}

impl SubtitleBlob {
    /// TTL for cached subtitle bodies.
    pub const TTL_SECONDS: i64 = 60 * 60;

    pub fn new(content_hash: impl Into<String>, vtt_body: impl Into<String>) -> Self {
        Self {
            content_hash: content_hash.into(),
            vtt_body: vtt_body.into(),
            fetched_at: Utc::now(),
        }
    }

    /// True if the body starts with `WEBVTT` and has at least one well-formed cue.
    pub fn is_well_formed(&self) -> bool {
        self.vtt_body.starts_with("WEBVTT") && crate::infrastructure::subtitle::converter::cue_count(&self.vtt_body) > 0
    }
}
