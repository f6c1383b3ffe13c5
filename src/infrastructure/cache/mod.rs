// Caching Layer
//
// Generic LRU+TTL cache backing the two tables CacheLayer owns:
// ExtractionResults and SubtitleBlobs.

pub mod lru_ttl_cache;

pub use lru_ttl_cache::LruTtlCache;
