//! Application Layer
//!
//! This layer contains the use cases that orchestrate domain and
//! infrastructure objects into the two public operations the core
//! exposes: stream extraction and subtitle resolution.

pub mod use_cases;

pub use use_cases::extract_stream::ExtractStreamUseCase;
pub use use_cases::resolve_subtitles::ResolveSubtitlesUseCase;
