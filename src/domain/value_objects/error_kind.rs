//! ErrorKind value object
//!
//! The single error taxonomy propagated across the core. Every
//! public operation resolves to exactly one of these on failure; the
//! controller consults `retryable()`/`retry_delay_ms()` to drive backoff.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified failure reason, shared across extraction, proxying, and
/// subtitle resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidRequest,
    UpstreamNotFound,
    UpstreamRateLimited,
    UpstreamServerError,
    NetworkError,
    ProviderStructureChanged,
    PlayButtonClickFailed,
    NoStreamUrlFound,
    Cancelled,
    NoFingerprintAvailable,
    SubtitleFormatError,
}

impl ErrorKind {
    /// Whether the controller should retry an attempt that failed with this kind.
    pub fn retryable(&self) -> bool {
        !matches!(
            self,
            ErrorKind::InvalidRequest
                | ErrorKind::UpstreamNotFound
                | ErrorKind::Cancelled
                | ErrorKind::SubtitleFormatError
        )
    }

    /// Fixed backoff override in milliseconds, if this kind mandates one
    /// regardless of attempt number (rate limiting uses a fixed delay).
    pub fn fixed_retry_delay_ms(&self) -> Option<u64> {
        match self {
            ErrorKind::UpstreamRateLimited => Some(60_000),
            _ => None,
        }
    }

    /// Human-readable message surfaced in the `error` field of client responses.
    pub fn message(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRequest => "the request was malformed",
            ErrorKind::UpstreamNotFound => "the provider reported that this title is unavailable",
            ErrorKind::UpstreamRateLimited => "the provider is rate-limiting requests",
            ErrorKind::UpstreamServerError => "the provider returned a server error",
            ErrorKind::NetworkError => "a network error occurred while reaching the provider",
            ErrorKind::ProviderStructureChanged => "the provider's page structure has changed",
            ErrorKind::PlayButtonClickFailed => "the play button did not produce a stream",
            ErrorKind::NoStreamUrlFound => "no stream URL could be found",
            ErrorKind::Cancelled => "the request was cancelled",
            ErrorKind::NoFingerprintAvailable => "no stealth fingerprint was available in time",
            ErrorKind::SubtitleFormatError => "the subtitle could not be converted",
        }
    }

    /// An optional follow-up suggestion surfaced alongside `message()`.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ErrorKind::UpstreamRateLimited => Some("try again in a minute"),
            ErrorKind::NoStreamUrlFound => Some("try switching to the alternate server"),
            ErrorKind::ProviderStructureChanged => Some("try switching to the alternate server"),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}
