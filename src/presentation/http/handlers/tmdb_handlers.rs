//! `GET /api/tmdb` handler: thin passthrough of catalog metadata.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;

use crate::interfaces::external_services::MetadataService;
use crate::presentation::http::dto::tmdb_dto::{TmdbAction, TmdbQuery, TmdbResponse};
use crate::shared::error::CoreError;

/// `GET /api/tmdb?action=(getMovieDetails|getShowDetails)&movieId=<id>`.
pub async fn tmdb_passthrough(
    State(metadata): State<Arc<dyn MetadataService>>,
    Query(query): Query<TmdbQuery>,
) -> Result<Json<TmdbResponse>, CoreError> {
    match query.action {
        TmdbAction::GetMovieDetails => {
            let details = metadata
                .get_movie_details(query.movie_id)
                .await?
                .ok_or_else(|| CoreError::Metadata(format!("no movie found for id {}", query.movie_id)))?;
            Ok(Json(TmdbResponse::Movie(details)))
        }
        TmdbAction::GetShowDetails => {
            let (season, episode) = match (query.season, query.episode) {
                (Some(s), Some(e)) => (s, e),
                _ => {
                    return Err(CoreError::InvalidRequest(
                        "getShowDetails requires season and episode".to_string(),
                    ))
                }
            };
            let details = metadata
                .get_episode_details(query.movie_id, season, episode)
                .await?
                .ok_or_else(|| CoreError::Metadata(format!("no episode found for id {}", query.movie_id)))?;
            Ok(Json(TmdbResponse::Episode(details)))
        }
    }
}
