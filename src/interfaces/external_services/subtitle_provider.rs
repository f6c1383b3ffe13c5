// Subtitle Provider Interface
//
// Port onto the external subtitle catalog used by subtitle resolution.

use async_trait::async_trait;
use crate::shared::error::CoreError;

/// One ranked result from the subtitle catalog for a single language.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SubtitleCatalogEntry {
    pub id: String,
    pub language_code: String,
    pub language_name: String,
    pub quality_rank: u32,
    pub download_link: String,
}

/// Port onto the external subtitle database.
#[async_trait]
pub trait SubtitleProvider: Send + Sync {
    /// Looks up ranked subtitle candidates for one language. Returns an
    /// empty vec (not an error) when the catalog has nothing for this
    /// language.
    async fn search(
        &self,
        imdb_id: &str,
        language_code: &str,
        season: Option<u32>,
        episode: Option<u32>,
    ) -> Result<Vec<SubtitleCatalogEntry>, CoreError>;

    /// Downloads the raw subtitle body (possibly gzip-compressed) for a
    /// chosen catalog entry.
    async fn download(&self, download_link: &str) -> Result<DownloadedSubtitle, CoreError>;
}

/// Raw bytes fetched from a subtitle download link, plus enough of the
/// response to decide the decompression/decoding path.
#[derive(Debug, Clone)]
pub struct DownloadedSubtitle {
    pub body: Vec<u8>,
    pub is_gzip: bool,
}
