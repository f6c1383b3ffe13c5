//! Domain Layer - Pure business logic and domain models
//!
//! This layer contains:
//! - Entities: Core business objects with identity
//! - Value Objects: Immutable objects defined by their attributes

pub mod entities;
pub mod value_objects;

pub use entities::{ExtractionResult, ExtractionSession, SubtitleBlob, SubtitleDescriptor};
pub use value_objects::{CatalogRef, ErrorKind, ExtractionStage, StealthFingerprint};
