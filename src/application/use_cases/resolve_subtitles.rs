//! Resolve Subtitles Use Case
//!
//! For a given IMDB id (and optional season/episode), fetches the best
//! subtitle per requested language from the external catalog, and lazily
//! downloads/converts the chosen entry's body on first client selection.
//! Grounded in the same use-case shape as `ExtractStreamUseCase` (a
//! struct holding `Arc<dyn Trait>` ports plus a cache, one async entry
//! point per public operation).

use std::sync::Arc;

use flate2::read::GzDecoder;
use sha2::{Digest, Sha256};
use std::io::Read;
use tracing::{debug, warn};

use crate::domain::entities::subtitle::{SubtitleBlob, SubtitleDescriptor};
use crate::infrastructure::cache::lru_ttl_cache::LruTtlCache;
use crate::infrastructure::subtitle::converter::convert_srt_to_vtt;
use crate::interfaces::external_services::subtitle_provider::SubtitleProvider;
use crate::shared::error::{CoreError, SubtitleError};

/// Resolves subtitle descriptors and, lazily, their WebVTT bodies.
pub struct ResolveSubtitlesUseCase {
    provider: Arc<dyn SubtitleProvider>,
    blobs_cache: Arc<LruTtlCache<String, SubtitleBlob>>,
}

impl ResolveSubtitlesUseCase {
    pub fn new(provider: Arc<dyn SubtitleProvider>, blobs_cache: Arc<LruTtlCache<String, SubtitleBlob>>) -> Self {
        Self { provider, blobs_cache }
    }

    /// Looks up the best subtitle per requested language, in request
    /// order. Languages with no catalog results are silently omitted —
    /// this is not an error per language.
    pub async fn resolve(
        &self,
        imdb_id: &str,
        languages: &[String],
        season: Option<u32>,
        episode: Option<u32>,
    ) -> Result<Vec<SubtitleDescriptor>, CoreError> {
        let mut descriptors = Vec::with_capacity(languages.len());

        for language_code in languages {
            let mut entries = self.provider.search(imdb_id, language_code, season, episode).await?;
            let Some(top) = entries.pop() else {
                debug!(imdb_id, language_code, "no subtitle candidates for language");
                continue;
            };

            descriptors.push(SubtitleDescriptor {
                language_code: top.language_code,
                language_name: top.language_name,
                quality_rank: top.quality_rank,
                content_handle: None,
                download_reference: top.download_link,
            });
        }

        Ok(descriptors)
    }

    /// Downloads and converts the subtitle behind `download_reference`,
    /// caching the WebVTT body under the content hash of its normalized
    /// text. Safe to call repeatedly — a cache hit skips the network
    /// round trip and conversion entirely.
    pub async fn download(&self, download_reference: &str) -> Result<SubtitleBlob, CoreError> {
        let downloaded = self.provider.download(download_reference).await?;

        let raw_text = if downloaded.is_gzip {
            decompress_gzip(&downloaded.body)?
        } else {
            String::from_utf8(downloaded.body)
                .map_err(|e| SubtitleError::EncodingError(e.to_string()))?
        };

        let content_hash = hash_body(&raw_text);
        if let Some(cached) = self.blobs_cache.get(&content_hash).await {
            return Ok(cached);
        }

        let vtt_body = if raw_text.trim_start().starts_with("WEBVTT") {
            raw_text
        } else {
            convert_srt_to_vtt(&raw_text)?
        };

        let blob = SubtitleBlob::new(content_hash.clone(), vtt_body);
        if !blob.is_well_formed() {
            warn!(content_hash, "converted subtitle failed the well-formed invariant");
            return Err(SubtitleError::InvalidFormat("converted body has no cues".to_string()).into());
        }

        self.blobs_cache.put(content_hash, blob.clone()).await;
        Ok(blob)
    }
}

fn decompress_gzip(body: &[u8]) -> Result<String, SubtitleError> {
    let mut decoder = GzDecoder::new(body);
    let mut text = String::new();
    decoder.read_to_string(&mut text).map_err(|e| SubtitleError::Io(e.to_string()))?;
    Ok(text)
}

fn hash_body(body: &str) -> String {
    let normalized = body.replace("\r\n", "\n");
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::external_services::subtitle_provider::{DownloadedSubtitle, SubtitleCatalogEntry};
    use async_trait::async_trait;
    use std::time::Duration;

    struct StubProvider {
        search_results: Vec<Vec<SubtitleCatalogEntry>>,
        download_body: Vec<u8>,
        is_gzip: bool,
    }

    #[async_trait]
    impl SubtitleProvider for StubProvider {
        async fn search(
            &self,
            _imdb_id: &str,
            language_code: &str,
            _season: Option<u32>,
            _episode: Option<u32>,
        ) -> Result<Vec<SubtitleCatalogEntry>, CoreError> {
            Ok(self
                .search_results
                .iter()
                .flatten()
                .filter(|e| e.language_code == language_code)
                .cloned()
                .collect())
        }

        async fn download(&self, _download_link: &str) -> Result<DownloadedSubtitle, CoreError> {
            Ok(DownloadedSubtitle { body: self.download_body.clone(), is_gzip: self.is_gzip })
        }
    }

    fn entry(language_code: &str, rank: u32) -> SubtitleCatalogEntry {
        SubtitleCatalogEntry {
            id: format!("{language_code}-{rank}"),
            language_code: language_code.to_string(),
            language_name: "English".to_string(),
            quality_rank: rank,
            download_link: format!("https://subs.example/{language_code}.srt"),
        }
    }

    #[tokio::test]
    async fn omits_languages_with_no_results() {
        let provider = Arc::new(StubProvider {
            search_results: vec![vec![entry("eng", 3)]],
            download_body: Vec::new(),
            is_gzip: false,
        });
        let cache = Arc::new(LruTtlCache::new(10, Duration::from_secs(60)));
        let use_case = ResolveSubtitlesUseCase::new(provider, cache);

        let descriptors = use_case
            .resolve("tt0137523", &["eng".to_string(), "fre".to_string()], None, None)
            .await
            .unwrap();

        assert_eq!(descriptors.len(), 1);
        assert_eq!(descriptors[0].language_code, "eng");
    }

    #[tokio::test]
    async fn download_converts_srt_and_caches_by_content_hash() {
        let srt = "1\n00:00:01,000 --> 00:00:03,000\nHello\n";
        let provider = Arc::new(StubProvider {
            search_results: vec![],
            download_body: srt.as_bytes().to_vec(),
            is_gzip: false,
        });
        let cache = Arc::new(LruTtlCache::new(10, Duration::from_secs(60)));
        let use_case = ResolveSubtitlesUseCase::new(provider, cache);

        let blob = use_case.download("https://subs.example/eng.srt").await.unwrap();
        assert!(blob.vtt_body.starts_with("WEBVTT"));
        assert!(blob.is_well_formed());

        let cached = use_case.download("https://subs.example/eng.srt").await.unwrap();
        assert_eq!(blob.content_hash, cached.content_hash);
    }

    #[tokio::test]
    async fn passthrough_when_already_webvtt() {
        let vtt = "WEBVTT\n\n1\n00:00:01.000 --> 00:00:02.000\nHi\n\n";
        let provider =
            Arc::new(StubProvider { search_results: vec![], download_body: vtt.as_bytes().to_vec(), is_gzip: false });
        let cache = Arc::new(LruTtlCache::new(10, Duration::from_secs(60)));
        let use_case = ResolveSubtitlesUseCase::new(provider, cache);

        let blob = use_case.download("https://subs.example/eng.vtt").await.unwrap();
        assert_eq!(blob.vtt_body, vtt);
    }
}
