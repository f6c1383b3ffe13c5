//! Stream proxy axum handler.
//!
//! Mediates CORS and hotlink restrictions between the client and an
//! upstream CDN, passing bytes through unchanged except when the
//! response is an HLS manifest, in which case its URIs are rewritten to
//! loop back through this same handler. Grounded in the byte-range
//! parsing style of `presentation::http::handlers::streaming_handlers::
//! stream_media`, generalized from local-file ranges to upstream
//! range-request passthrough, and in `proxy_handlers::proxy_image`'s
//! CORS-bypass shape, generalized from a single allow-listed host to a
//! validated arbitrary upstream.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use url::Url;

use super::header_policy::policy_for;
use super::manifest_rewrite::{looks_like_manifest, rewrite_manifest};

#[derive(Debug, Deserialize)]
pub struct StreamProxyQuery {
    pub url: String,
    pub source: String,
}

#[derive(Debug, Serialize)]
struct UpstreamErrorBody {
    error: &'static str,
    upstream_status: Option<u16>,
}

const FORWARDED_RESPONSE_HEADERS: [header::HeaderName; 6] = [
    header::CONTENT_TYPE,
    header::CONTENT_LENGTH,
    header::CONTENT_RANGE,
    header::ACCEPT_RANGES,
    header::LAST_MODIFIED,
    header::ETAG,
];

/// `GET|HEAD /api/stream-proxy?url=<encoded>&source=<tag>`.
pub async fn stream_proxy_handler(
    State(client): State<Arc<reqwest::Client>>,
    Query(query): Query<StreamProxyQuery>,
    method: Method,
    headers: HeaderMap,
) -> Response {
    let upstream_url = match Url::parse(&query.url) {
        Ok(u) if u.scheme() == "http" || u.scheme() == "https" => u,
        _ => {
            return (StatusCode::BAD_REQUEST, "url parameter must be an absolute http(s) URL").into_response();
        }
    };

    let policy = policy_for(&query.source);

    let mut request = client.request(
        if method == Method::HEAD { reqwest::Method::HEAD } else { reqwest::Method::GET },
        upstream_url.clone(),
    );
    request = request
        .header(header::ORIGIN.as_str(), policy.origin)
        .header(header::REFERER.as_str(), policy.referer)
        .header(header::USER_AGENT.as_str(), super::header_policy::PROXY_USER_AGENT);

    for forwarded in [header::RANGE, header::IF_MODIFIED_SINCE, header::IF_NONE_MATCH] {
        if let Some(value) = headers.get(&forwarded) {
            request = request.header(forwarded.as_str(), value.as_bytes());
        }
    }

    let upstream_response = match request.send().await {
        Ok(resp) => resp,
        Err(err) => return upstream_error_response(err.status().map(|s| s.as_u16())),
    };

    let status = upstream_response.status();
    if status.is_client_error() {
        let forwarded_status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_REQUEST);
        let body = upstream_response.bytes().await.unwrap_or_default();
        return (forwarded_status, body).into_response();
    }
    if status.is_server_error() {
        return upstream_error_response(Some(status.as_u16()));
    }

    let response_status = StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::OK);
    let content_type = upstream_response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut response_headers = HeaderMap::new();
    for name in FORWARDED_RESPONSE_HEADERS {
        if let Some(value) = upstream_response.headers().get(&name) {
            response_headers.insert(name, value.clone());
        }
    }
    response_headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response_headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static("GET, HEAD, OPTIONS"));

    if method == Method::HEAD {
        return (response_status, response_headers, Body::empty()).into_response();
    }

    // Sniffs the first chunk to decide between the manifest-rewrite path
    // (needs the whole body as text) and the passthrough path (streamed
    // straight to the client without buffering, so large video segments
    // never sit fully in memory).
    let mut upstream_stream = upstream_response.bytes_stream();
    let first_chunk = match upstream_stream.next().await {
        Some(Ok(chunk)) => chunk,
        Some(Err(err)) => return upstream_error_response(err.status().map(|s| s.as_u16())),
        None => Bytes::new(),
    };

    let body_prefix = String::from_utf8_lossy(&first_chunk[..first_chunk.len().min(16)]);
    if looks_like_manifest(content_type.as_deref(), &body_prefix) {
        let mut full = first_chunk.to_vec();
        while let Some(chunk) = upstream_stream.next().await {
            match chunk {
                Ok(c) => full.extend_from_slice(&c),
                Err(err) => return upstream_error_response(err.status().map(|s| s.as_u16())),
            }
        }
        let original = String::from_utf8_lossy(&full);
        let proxy_base = "/api/stream-proxy";
        let rewritten = rewrite_manifest(&original, upstream_url.as_str(), proxy_base, &query.source);
        response_headers.insert(header::CONTENT_LENGTH, HeaderValue::from_str(&rewritten.len().to_string()).unwrap());
        return (response_status, response_headers, rewritten).into_response();
    }

    let remainder = upstream_stream.map(|chunk| chunk.map_err(axum::Error::new));
    let body = Body::from_stream(stream::once(async move { Ok::<Bytes, axum::Error>(first_chunk) }).chain(remainder));
    (response_status, response_headers, body).into_response()
}

fn upstream_error_response(upstream_status: Option<u16>) -> Response {
    let body = UpstreamErrorBody { error: "upstream_error", upstream_status };
    (StatusCode::BAD_GATEWAY, axum::Json(body)).into_response()
}
