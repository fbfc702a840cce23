//! Cache module for storing API responses to disk
//!
//! This module provides a cache manager that persists API responses to the filesystem
//! with per-entry TTLs. Expired entries are never evicted automatically, so the fetch
//! client can fall back to them when the upstream API rate limits us.

mod manager;

pub use manager::{CacheDuration, CacheInfo, CacheManager, CachedData, NEWS_KEY_PREFIX};
