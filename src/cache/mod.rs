//! Client-side entity cache
//!
//! Exam-by-id, questions-by-exam and answers-by-exam, each an LRU map bounded
//! by `Config::cache_capacity`. No TTL; entries leave only by eviction or an
//! explicit invalidate.

pub mod entity_cache;
pub mod lru;

pub use entity_cache::EntityCache;
pub use lru::LruMap;
