// External Service Adapters
//
// This module contains the outbound adapters the core talks to:
// - the catalog (metadata) client
// - the subtitle catalog client
// - the two extraction engine strategies (headless browser, HTTP fallback)

pub mod metadata_client;
pub mod subtitle_provider;
pub mod extraction;

pub use metadata_client::MetadataClient;
pub use subtitle_provider::SubtitleProviderClient;
pub use extraction::{BrowserExtractionEngine, HttpExtractionEngine};
