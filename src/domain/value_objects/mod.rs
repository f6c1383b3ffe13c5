//! Value Objects - Immutable objects defined by their attributes
//!
//! Value objects are identified by their attributes rather than an identity.
//! They are immutable and have no lifecycle.

pub mod catalog_ref;
pub mod error_kind;
pub mod extraction_stage;
pub mod stealth_fingerprint;

pub use catalog_ref::CatalogRef;
pub use error_kind::ErrorKind;
pub use extraction_stage::ExtractionStage;
pub use stealth_fingerprint::{BehaviorPlan, MouseMove, ScrollEvent, SessionStealthContext, StealthFingerprint};
