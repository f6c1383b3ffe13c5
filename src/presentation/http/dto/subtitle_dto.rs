//! DTOs for `GET /api/subtitles` and `POST /api/subtitles/download`.

use serde::{Deserialize, Serialize};

use crate::domain::entities::subtitle::SubtitleDescriptor;

#[derive(Debug, Deserialize)]
pub struct SubtitleListQuery {
    #[serde(rename = "imdbId")]
    pub imdb_id: String,
    #[serde(rename = "languageId")]
    pub language_id: String,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SubtitleEntryDto {
    pub id: String,
    pub language: String,
    pub langcode: String,
    #[serde(rename = "downloadLink")]
    pub download_link: String,
}

impl From<&SubtitleDescriptor> for SubtitleEntryDto {
    fn from(descriptor: &SubtitleDescriptor) -> Self {
        Self {
            id: descriptor.download_reference.clone(),
            language: descriptor.language_name.clone(),
            langcode: descriptor.language_code.clone(),
            download_link: descriptor.download_reference.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SubtitleListResponse {
    pub success: bool,
    pub subtitles: Vec<SubtitleEntryDto>,
}

#[derive(Debug, Deserialize)]
pub struct SubtitleDownloadRequest {
    pub download_link: String,
}

#[derive(Debug, Serialize)]
pub struct SubtitleDownloadResponse {
    pub vtt: String,
}
