//! Metadata client adapter.
//!
//! Thin `MetadataService` implementation backed by the same catalog API
//! the teacher's `TmdbClient` talks to, reusing its rate-limited
//! `reqwest::Client` shape (`RateLimiter`, one token per request) rather
//! than the teacher's fuzzy-matching search strategies, which this core
//! has no use for: extraction always already has a numeric catalog id.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Semaphore;

use crate::interfaces::external_services::{EpisodeMetadata, MetadataService, MovieMetadata};
use crate::shared::error::CoreError;

struct RateLimiter {
    semaphore: Arc<Semaphore>,
    requests_per_second: usize,
}

impl RateLimiter {
    fn new(requests_per_second: usize) -> Self {
        Self { semaphore: Arc::new(Semaphore::new(requests_per_second)), requests_per_second }
    }

    async fn acquire(&self) {
        let _permit = self.semaphore.acquire().await;
        tokio::time::sleep(Duration::from_millis(1000) / self.requests_per_second as u32).await;
    }
}

pub struct MetadataClient {
    api_key: String,
    http_client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
}

impl MetadataClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, CoreError> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(CoreError::Metadata("metadata provider api key is empty".to_string()));
        }

        Ok(Self {
            api_key,
            http_client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .map_err(|e| CoreError::Metadata(e.to_string()))?,
            base_url: "https://api.themoviedb.org/3".to_string(),
            rate_limiter: RateLimiter::new(4),
        })
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>, CoreError> {
        self.rate_limiter.acquire().await;

        let url = format!("{}{}?api_key={}", self.base_url, path, self.api_key);
        let response = self.http_client.get(&url).send().await.map_err(|e| CoreError::Metadata(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(CoreError::Metadata(format!("catalog returned status {}", response.status())));
        }

        let data = response.json().await.map_err(|e| CoreError::Metadata(e.to_string()))?;
        Ok(Some(data))
    }
}

#[derive(Debug, Deserialize)]
struct MovieResponse {
    id: u64,
    title: String,
    runtime: Option<u32>,
    imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvExternalIdsResponse {
    imdb_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TvResponse {
    name: String,
}

#[derive(Debug, Deserialize)]
struct EpisodeResponse {
    name: Option<String>,
    runtime: Option<u32>,
}

#[async_trait::async_trait]
impl MetadataService for MetadataClient {
    async fn get_movie_details(&self, tmdb_id: u64) -> Result<Option<MovieMetadata>, CoreError> {
        let movie: Option<MovieResponse> = self.get(&format!("/movie/{tmdb_id}")).await?;
        Ok(movie.map(|m| MovieMetadata {
            tmdb_id: m.id,
            title: m.title,
            runtime_minutes: m.runtime,
            imdb_id: m.imdb_id,
        }))
    }

    async fn get_episode_details(
        &self,
        tmdb_id: u64,
        season: u32,
        episode: u32,
    ) -> Result<Option<EpisodeMetadata>, CoreError> {
        let show: Option<TvResponse> = self.get(&format!("/tv/{tmdb_id}")).await?;
        let Some(show) = show else { return Ok(None) };

        let external_ids: Option<TvExternalIdsResponse> =
            self.get(&format!("/tv/{tmdb_id}/external_ids")).await?;
        let imdb_id = external_ids.and_then(|ids| ids.imdb_id);

        let episode_details: Option<EpisodeResponse> =
            self.get(&format!("/tv/{tmdb_id}/season/{season}/episode/{episode}")).await?;

        Ok(Some(EpisodeMetadata {
            tmdb_id,
            season,
            episode,
            show_title: show.name,
            episode_title: episode_details.as_ref().and_then(|e| e.name.clone()),
            runtime_minutes: episode_details.and_then(|e| e.runtime),
            imdb_id,
        }))
    }
}
