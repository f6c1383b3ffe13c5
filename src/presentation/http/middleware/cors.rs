//! CORS Middleware
//!
//! The client-facing playback UI lives on a different origin than this
//! core; every route here — extraction, subtitles, catalog passthrough —
//! needs to be reachable cross-origin. The stream proxy route sets its
//! own permissive headers directly (§4.3) since it also needs to answer
//! preflight for arbitrary upstream hosts; this layer covers the rest.

use axum::http::{header, Method};
use tower_http::cors::{Any, CorsLayer};

/// Creates the CORS layer applied to the whole router.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS, Method::HEAD])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::RANGE])
}
