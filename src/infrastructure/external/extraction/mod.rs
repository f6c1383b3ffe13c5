//! Iframe-chain extraction engines.
//!
//! Two engines implement the same `ExtractionEngine` port: the browser
//! engine (primary) drives a real WebDriver session, the HTTP engine
//! (fallback) walks the same chain via plain requests and DOM scraping.

pub mod browser_engine;
pub mod http_engine;
pub mod selectors;

pub use browser_engine::BrowserExtractionEngine;
pub use http_engine::HttpExtractionEngine;
