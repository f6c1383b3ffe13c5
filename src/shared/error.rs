//! Shared error types for the application
//!
//! This module defines all error types used across the application,
//! following domain-driven design principles.

use thiserror::Error;

/// Domain errors - errors that occur in the domain layer. The core's
/// only domain-level validation is the `CatalogRef` construction rules
/// (§4.1's "well-formed" constraint).
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Subtitle processing errors
#[derive(Debug, Clone, Error)]
pub enum SubtitleError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Subtitle file not found: {0}")]
    FileNotFound(String),

    #[error("Invalid subtitle format: {0}")]
    InvalidFormat(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Index out of bounds: {0}")]
    IndexOutOfBounds(usize),
}

/// Errors raised while walking the embed-provider iframe chain.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    #[error("the provider reported no stream for this title")]
    NotFound,

    #[error("provider rate limited the request")]
    RateLimited,

    #[error("provider returned server error {0}")]
    UpstreamServerError(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("expected element was absent at stage {0}")]
    StructureChanged(String),

    #[error("play button click produced no new iframe")]
    PlayButtonClickFailed,

    #[error("reached the terminal iframe without finding a manifest URL")]
    NoStreamUrlFound,

    #[error("no stealth fingerprint became available in time")]
    NoFingerprintAvailable,

    #[error("extraction was cancelled")]
    Cancelled,
}

impl ExtractionError {
    /// Maps to the shared error taxonomy so the controller can classify uniformly.
    pub fn kind(&self) -> crate::domain::value_objects::ErrorKind {
        use crate::domain::value_objects::ErrorKind;
        match self {
            ExtractionError::NotFound => ErrorKind::UpstreamNotFound,
            ExtractionError::RateLimited => ErrorKind::UpstreamRateLimited,
            ExtractionError::UpstreamServerError(_) => ErrorKind::UpstreamServerError,
            ExtractionError::Network(_) => ErrorKind::NetworkError,
            ExtractionError::StructureChanged(_) => ErrorKind::ProviderStructureChanged,
            ExtractionError::PlayButtonClickFailed => ErrorKind::PlayButtonClickFailed,
            ExtractionError::NoStreamUrlFound => ErrorKind::NoStreamUrlFound,
            ExtractionError::NoFingerprintAvailable => ErrorKind::NoFingerprintAvailable,
            ExtractionError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl From<reqwest::Error> for ExtractionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            ExtractionError::Network(err.to_string())
        } else if let Some(status) = err.status() {
            if status.as_u16() == 429 {
                ExtractionError::RateLimited
            } else if status.is_server_error() {
                ExtractionError::UpstreamServerError(status.as_u16())
            } else {
                ExtractionError::Network(err.to_string())
            }
        } else {
            ExtractionError::Network(err.to_string())
        }
    }
}

/// Errors raised by the stream proxy.
#[derive(Debug, Clone, Error)]
pub enum ProxyError {
    #[error("url parameter must be an absolute http(s) URL")]
    InvalidUrl,

    #[error("upstream returned an error")]
    UpstreamError { status: Option<u16> },

    #[error("network error reaching upstream: {0}")]
    Network(String),
}

/// Errors raised by the stealth fingerprint pool.
#[derive(Debug, Clone, Error)]
pub enum StealthPoolError {
    #[error("no fingerprint became available within the wait bound")]
    Exhausted,
}

/// Errors raised by the extraction result / subtitle caches.
#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache entry serialization failed: {0}")]
    Serialization(String),
}

/// The crate-wide error returned from the public surface of every
/// component. Carries a classified `ErrorKind` plus enough
/// context to produce the client-facing JSON `error` field and to log
/// full detail server-side.
#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("proxy error: {0}")]
    Proxy(#[from] ProxyError),

    #[error("subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    #[error("stealth pool error: {0}")]
    StealthPool(#[from] StealthPoolError),

    #[error("cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("metadata provider error: {0}")]
    Metadata(String),
}

impl CoreError {
    pub fn kind(&self) -> crate::domain::value_objects::ErrorKind {
        use crate::domain::value_objects::ErrorKind;
        match self {
            CoreError::InvalidRequest(_) => ErrorKind::InvalidRequest,
            CoreError::Extraction(e) => e.kind(),
            CoreError::Proxy(_) => ErrorKind::NetworkError,
            CoreError::Subtitle(_) => ErrorKind::SubtitleFormatError,
            CoreError::StealthPool(_) => ErrorKind::NoFingerprintAvailable,
            CoreError::Cache(_) => ErrorKind::NetworkError,
            CoreError::Metadata(_) => ErrorKind::UpstreamServerError,
        }
    }
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        CoreError::InvalidRequest(err.to_string())
    }
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
    suggestion: Option<&'static str>,
}

/// Default HTTP mapping for handlers that propagate with `?` rather
/// than build an endpoint-specific success/failure body. The
/// extract-shadowlands handler does not use this — it always returns
/// 200 with `success`/`error` fields in the body, per its own contract.
impl axum::response::IntoResponse for CoreError {
    fn into_response(self) -> axum::response::Response {
        use crate::domain::value_objects::ErrorKind;
        let kind = self.kind();
        let status = match kind {
            ErrorKind::InvalidRequest => axum::http::StatusCode::BAD_REQUEST,
            ErrorKind::UpstreamNotFound => axum::http::StatusCode::NOT_FOUND,
            ErrorKind::UpstreamRateLimited => axum::http::StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::Cancelled => axum::http::StatusCode::BAD_REQUEST,
            _ => axum::http::StatusCode::BAD_GATEWAY,
        };
        let body = ErrorBody { error: kind.message().to_string(), suggestion: kind.suggestion() };
        (status, axum::Json(body)).into_response()
    }
}
