//! streamcore
//!
//! Stream acquisition and delivery core for a media streaming front door.
//! Exposes the extraction, proxy, subtitle, and caching modules for
//! integration tests and for `main.rs`'s HTTP server binary.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod presentation;
pub mod shared;

