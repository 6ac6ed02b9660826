//! Cache module for storing fetched entities
//!
//! `CacheManager` persists serializable data to the filesystem with an expiry
//! timestamp and keeps serving expired entries, so the application can fall back
//! to stale data when the content API is unavailable. `DiskCache` and
//! `MemoryCache` expose keyed entity collections to the content loader.

mod manager;
mod store;

pub use manager::{CacheManager, CachedData};
pub use store::{canonicalize, CacheError, DiskCache, EntityCache, MemoryCache};
