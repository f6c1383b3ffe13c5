//! HTTP presentation layer: DTOs, handlers, and middleware.

pub mod http;
