//! `GET /api/extract-shadowlands` handler.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use tracing::debug;

use crate::application::use_cases::extract_stream::{ClientOptions, ExtractStreamUseCase};
use crate::domain::value_objects::CatalogRef;
use crate::infrastructure::progress::progress_channel;
use crate::presentation::http::dto::extraction_dto::{ExtractQuery, ExtractResponse};

const STREAM_PROXY_PATH: &str = "/api/stream-proxy";

/// `GET /api/extract-shadowlands?tmdbId=<n>[&season=<n>&episode=<n>]`.
///
/// A non-numeric `tmdbId` is rejected by the `Query` extractor itself
/// (400, before this body runs). Every other malformed combination —
/// a lone `season` without `episode`, or the reverse — is a domain
/// validation handled here, and always comes back as HTTP 200 with
/// `success: false` so the client doesn't need two different error
/// paths for "bad request" vs. "extraction failed".
pub async fn extract_shadowlands(
    State(use_case): State<Arc<ExtractStreamUseCase>>,
    Query(query): Query<ExtractQuery>,
) -> impl IntoResponse {
    let catalog_ref = match CatalogRef::from_query(query.tmdb_id, query.season, query.episode) {
        Ok(catalog_ref) => catalog_ref,
        Err(err) => return Json(ExtractResponse::failure(err.to_string())),
    };

    let options = ClientOptions {
        preferred_server: query.server.unwrap_or_else(|| "shadowlands".to_string()),
        force_proxy: false,
    };

    let (progress_tx, progress_rx) = progress_channel();
    tokio::spawn(async move {
        while let Some(event) = progress_rx.recv().await {
            debug!(stage = ?event.stage, percent = event.progress_percent, "extraction progress");
        }
    });

    match use_case.extract(catalog_ref, options, progress_tx).await {
        Ok(result) => Json(ExtractResponse::from_result(&result, STREAM_PROXY_PATH)),
        Err(kind) => Json(ExtractResponse::from_error(kind)),
    }
}
