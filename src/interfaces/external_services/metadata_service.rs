// Metadata Service Interface
//
// Thin port onto a third-party movie/TV catalog API. Returns just enough
// to drive extraction and subtitle lookup: title, runtime, and the IMDB
// id the subtitle catalog indexes by.

use async_trait::async_trait;
use crate::shared::error::CoreError;

/// Catalog details for a movie, trimmed to what the core needs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MovieMetadata {
    pub tmdb_id: u64,
    pub title: String,
    pub runtime_minutes: Option<u32>,
    pub imdb_id: Option<String>,
}

/// Catalog details for a single show episode, trimmed to what the core needs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct EpisodeMetadata {
    pub tmdb_id: u64,
    pub season: u32,
    pub episode: u32,
    pub show_title: String,
    pub episode_title: Option<String>,
    pub runtime_minutes: Option<u32>,
    /// The show's IMDB id, not the episode's own (the subtitle catalog
    /// indexes shows by IMDB id plus season/episode).
    pub imdb_id: Option<String>,
}

/// Port onto the external catalog API.
#[async_trait]
pub trait MetadataService: Send + Sync {
    async fn get_movie_details(&self, tmdb_id: u64) -> Result<Option<MovieMetadata>, CoreError>;

    async fn get_episode_details(
        &self,
        tmdb_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<Option<EpisodeMetadata>, CoreError>;
}
