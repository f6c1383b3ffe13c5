//! Domain Entities - Core business objects with identity
//!
//! Entities are objects that have an identity (ID) and lifecycle.

pub mod extraction_result;
pub mod extraction_session;
pub mod subtitle;

pub use extraction_result::{ChainSummary, ExtractionResult, StreamType};
pub use extraction_session::{ExtractionMode, ExtractionSession, IframeKind, IframeStep, StepOutcome};
pub use subtitle::{SubtitleBlob, SubtitleDescriptor};
