//! In-memory LRU caches and the on-disk hit cache

mod hit_cache;
mod lru;

pub use hit_cache::HitCache;
pub use lru::LruCache;
