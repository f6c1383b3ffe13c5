//! `GET /api/subtitles` and `POST /api/subtitles/download` handlers.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;

use crate::application::use_cases::resolve_subtitles::ResolveSubtitlesUseCase;
use crate::presentation::http::dto::subtitle_dto::{
    SubtitleDownloadRequest, SubtitleDownloadResponse, SubtitleEntryDto, SubtitleListQuery, SubtitleListResponse,
};
use crate::shared::error::CoreError;

/// `GET /api/subtitles?imdbId=<id>&languageId=<code>[&season=<n>&episode=<n>]`.
pub async fn list_subtitles(
    State(use_case): State<Arc<ResolveSubtitlesUseCase>>,
    Query(query): Query<SubtitleListQuery>,
) -> Result<Json<SubtitleListResponse>, CoreError> {
    let languages = [query.language_id];
    let descriptors = use_case.resolve(&query.imdb_id, &languages, query.season, query.episode).await?;

    Ok(Json(SubtitleListResponse {
        success: true,
        subtitles: descriptors.iter().map(SubtitleEntryDto::from).collect(),
    }))
}

/// `POST /api/subtitles/download` with body `{ "download_link": url }`.
pub async fn download_subtitle(
    State(use_case): State<Arc<ResolveSubtitlesUseCase>>,
    Json(body): Json<SubtitleDownloadRequest>,
) -> Result<Json<SubtitleDownloadResponse>, CoreError> {
    let blob = use_case.download(&body.download_link).await?;
    Ok(Json(SubtitleDownloadResponse { vtt: blob.vtt_body }))
}
