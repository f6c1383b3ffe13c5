//! Route handlers for the client-facing HTTP surface.

pub mod extract_handlers;
pub mod health_handlers;
pub mod subtitle_handlers;
pub mod tmdb_handlers;
