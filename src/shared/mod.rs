//! Shared types and utilities used across the application

pub mod di;
pub mod error;

pub use di::{DIError, DIResult, ServiceContainer, ServiceLifetime, ServiceRegistry};
pub use error::{
    CacheError,
    CoreError,
    DomainError,
    ExtractionError,
    ProxyError,
    StealthPoolError,
    SubtitleError,
};
