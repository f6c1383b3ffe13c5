//! DTOs for `GET /api/tmdb`, a thin passthrough of catalog metadata.

use serde::{Deserialize, Serialize};

use crate::interfaces::external_services::{EpisodeMetadata, MovieMetadata};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TmdbAction {
    GetMovieDetails,
    GetShowDetails,
}

#[derive(Debug, Deserialize)]
pub struct TmdbQuery {
    pub action: TmdbAction,
    #[serde(rename = "movieId")]
    pub movie_id: u64,
    /// Only meaningful for `getShowDetails`: this core's `MetadataService`
    /// is keyed by episode, so a show lookup needs a season/episode pair
    /// even though the minimal endpoint signature only names `movieId`.
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum TmdbResponse {
    Movie(MovieMetadata),
    Episode(EpisodeMetadata),
}
