// Infrastructure Layer
//
// Outbound adapters and process-wide shared state: external service
// clients, the stream proxy, the stealth fingerprint pool, the
// progress-event channel, subtitle conversion, and the cache layer.

pub mod external;
pub mod cache;
pub mod subtitle;
pub mod proxy;
pub mod stealth;
pub mod progress;

pub use cache::LruTtlCache;
pub use subtitle::*;
pub use stealth::{FingerprintGuard, FingerprintPool};
