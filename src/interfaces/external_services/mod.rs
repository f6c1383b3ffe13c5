// External Service Interfaces
//
// This module defines the ports onto external services the core
// depends on. Following the Interface Segregation Principle, each
// service gets its own focused trait.
//
// Interfaces:
// - metadata_service: catalog lookup port used by extraction and subtitles
// - subtitle_provider: external subtitle catalog port
// - extraction_engine: iframe-chain walking port (browser or HTTP strategy)

pub mod metadata_service;
pub mod subtitle_provider;
pub mod extraction_engine;

pub use metadata_service::{MetadataService, MovieMetadata, EpisodeMetadata};
pub use subtitle_provider::{SubtitleProvider, SubtitleCatalogEntry, DownloadedSubtitle};
pub use extraction_engine::{ExtractionEngine, ExtractionRequest, ExtractionOutcome};
