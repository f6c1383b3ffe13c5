// Subtitle Provider Adapter
//
// HTTP client for the external subtitle catalog: search by IMDB id plus
// language (and optional season/episode), download the chosen entry's
// body. Same rate-limited reqwest::Client shape as the metadata client.

pub mod client;

pub use client::SubtitleProviderClient;
