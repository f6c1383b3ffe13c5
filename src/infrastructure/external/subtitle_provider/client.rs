//! HTTP client for the external subtitle catalog.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::interfaces::external_services::{DownloadedSubtitle, SubtitleCatalogEntry, SubtitleProvider};
use crate::shared::error::CoreError;

pub struct SubtitleProviderClient {
    api_key: String,
    http_client: Client,
    base_url: String,
}

impl SubtitleProviderClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, CoreError> {
        Ok(Self {
            api_key: api_key.into(),
            http_client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .map_err(|e| CoreError::Metadata(e.to_string()))?,
            base_url: base_url.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponseEntry {
    id: String,
    language_name: String,
    #[serde(rename = "score")]
    quality_rank: u32,
    download_link: String,
}

#[async_trait::async_trait]
impl SubtitleProvider for SubtitleProviderClient {
    async fn search(
        &self,
        imdb_id: &str,
        language_code: &str,
        season: Option<u32>,
        episode: Option<u32>,
    ) -> Result<Vec<SubtitleCatalogEntry>, CoreError> {
        let mut url = format!(
            "{}/search?imdbId={}&languageId={}&apiKey={}",
            self.base_url, imdb_id, language_code, self.api_key
        );
        if let Some(season) = season {
            url.push_str(&format!("&season={season}"));
        }
        if let Some(episode) = episode {
            url.push_str(&format!("&episode={episode}"));
        }

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::Metadata(format!("subtitle catalog request failed: {e}")))?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let entries: Vec<SearchResponseEntry> = response
            .json()
            .await
            .map_err(|e| CoreError::Metadata(format!("subtitle catalog response malformed: {e}")))?;

        let mut results: Vec<SubtitleCatalogEntry> = entries
            .into_iter()
            .map(|e| SubtitleCatalogEntry {
                id: e.id,
                language_code: language_code.to_string(),
                language_name: e.language_name,
                quality_rank: e.quality_rank,
                download_link: e.download_link,
            })
            .collect();

        results.sort_by(|a, b| b.quality_rank.cmp(&a.quality_rank));
        results.truncate(1);
        Ok(results)
    }

    async fn download(&self, download_link: &str) -> Result<DownloadedSubtitle, CoreError> {
        let response = self
            .http_client
            .get(download_link)
            .send()
            .await
            .map_err(|e| CoreError::Metadata(format!("subtitle download failed: {e}")))?;

        let is_gzip = download_link.ends_with(".gz")
            || response
                .headers()
                .get(reqwest::header::CONTENT_ENCODING)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.eq_ignore_ascii_case("gzip"))
                .unwrap_or(false);

        let body = response
            .bytes()
            .await
            .map_err(|e| CoreError::Metadata(format!("subtitle body read failed: {e}")))?
            .to_vec();

        Ok(DownloadedSubtitle { body, is_gzip })
    }
}
