//! Cache manager for persisting API responses to disk
//!
//! Provides a `CacheManager` that stores serializable data as one JSON file per
//! key. Each entry records when it was written and how long it stays fresh, and
//! expired entries are kept on disk so they can still be served when the
//! upstream API is rate limiting us.

use chrono::{DateTime, TimeZone, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, de::IgnoredAny, Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Key substring shared by every news cache entry
pub const NEWS_KEY_PREFIX: &str = "news-";

/// Freshness classes used by the fetch client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDuration {
    /// 30 minutes, for fast-moving feeds such as breaking news
    Short,
    /// 2 hours, for region and category listings
    Medium,
    /// 24 hours
    Long,
    /// 1 hour
    Hour,
}

impl CacheDuration {
    /// Returns the TTL as a `Duration`
    pub fn as_duration(self) -> Duration {
        match self {
            CacheDuration::Short => Duration::from_secs(30 * 60),
            CacheDuration::Medium => Duration::from_secs(2 * 60 * 60),
            CacheDuration::Long => Duration::from_secs(24 * 60 * 60),
            CacheDuration::Hour => Duration::from_secs(60 * 60),
        }
    }
}

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CacheEntry<T> {
    /// The cached data
    data: T,
    /// When the data was cached, in milliseconds since the Unix epoch
    timestamp: i64,
    /// How long the entry stays fresh, in milliseconds
    expires_in: u64,
}

impl<T> CacheEntry<T> {
    fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms.saturating_sub(self.timestamp)
    }

    fn is_expired(&self, now_ms: i64) -> bool {
        self.age_ms(now_ms) > i64::try_from(self.expires_in).unwrap_or(i64::MAX)
    }
}

/// Result of reading from cache, including metadata about cache freshness
#[derive(Debug)]
pub struct CachedData<T> {
    /// The cached data
    pub data: T,
    /// When the data was originally cached
    pub cached_at: DateTime<Utc>,
    /// Whether the cache entry has expired
    pub is_expired: bool,
}

/// Diagnostic snapshot of everything in the cache directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheInfo {
    /// Sum of serialized entry lengths in bytes
    pub total_size: u64,
    /// Every key currently stored
    pub items: Vec<String>,
}

/// Manages reading and writing cached data to disk
///
/// Entries live in an XDG-compliant cache directory (`~/.cache/newsdesk/` on
/// Linux). The cache never evicts on its own: expired entries stay readable
/// through `get(key, true)` until `clear`, `clear_pattern` or `prune` removes
/// them.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "newsdesk")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory holding the cache files
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to a cache file for the given key
    ///
    /// Keys are percent-encoded so arbitrary strings map to valid file names.
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", urlencoding::encode(key)))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Writes data to the cache with the given TTL
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if directory creation, serialization or file writing fails
    pub fn write<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) -> io::Result<()> {
        self.ensure_dir()?;

        let entry = CacheEntry {
            data,
            timestamp: Utc::now().timestamp_millis(),
            expires_in: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
        };

        let json = serde_json::to_string(&entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(self.cache_path(key), json)
    }

    /// Reads data from the cache
    ///
    /// Returns `Ok(None)` if the entry doesn't exist. Expired entries are
    /// returned with `is_expired = true`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> io::Result<Option<CachedData<T>>> {
        let content = match fs::read_to_string(self.cache_path(key)) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let entry: CacheEntry<T> = serde_json::from_str(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let is_expired = entry.is_expired(Utc::now().timestamp_millis());
        let cached_at = Utc
            .timestamp_millis_opt(entry.timestamp)
            .single()
            .unwrap_or_default();

        Ok(Some(CachedData {
            data: entry.data,
            cached_at,
            is_expired,
        }))
    }

    /// Saves data under `key`, logging instead of failing
    ///
    /// A failed cache write must never fail the fetch that produced the data.
    pub fn save<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) {
        match self.write(key, data, ttl) {
            Ok(()) => debug!(key, ttl_secs = ttl.as_secs(), "Saved to cache"),
            Err(e) => warn!(key, error = %e, "Error saving to cache"),
        }
    }

    /// Gets cached data for `key`
    ///
    /// Returns `None` when the entry is missing, unreadable, or expired and
    /// `ignore_expiration` is false. Expired entries are left in place.
    pub fn get<T: DeserializeOwned>(&self, key: &str, ignore_expiration: bool) -> Option<T> {
        match self.read::<T>(key) {
            Ok(Some(cached)) if cached.is_expired && !ignore_expiration => {
                debug!(key, "Cache expired but keeping for fallback");
                None
            }
            Ok(Some(cached)) => Some(cached.data),
            Ok(None) => None,
            Err(e) => {
                warn!(key, error = %e, "Error reading from cache");
                None
            }
        }
    }

    /// Removes a single cache entry
    pub fn clear(&self, key: &str) {
        match fs::remove_file(self.cache_path(key)) {
            Ok(()) => debug!(key, "Cleared cache entry"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(key, error = %e, "Error clearing cache"),
        }
    }

    /// Removes every entry whose key contains `pattern`
    pub fn clear_pattern(&self, pattern: &str) {
        for key in self.keys() {
            if key.contains(pattern) {
                self.clear(&key);
            }
        }
    }

    /// Removes all news entries
    pub fn clear_all_news(&self) {
        self.clear_pattern(NEWS_KEY_PREFIX);
    }

    /// Returns the total serialized size and the list of keys
    pub fn info(&self) -> CacheInfo {
        let mut info = CacheInfo::default();
        for key in self.keys() {
            match fs::metadata(self.cache_path(&key)) {
                Ok(meta) => {
                    info.total_size += meta.len();
                    info.items.push(key);
                }
                Err(e) => warn!(key, error = %e, "Error getting cache info"),
            }
        }
        info.items.sort();
        info
    }

    /// Deletes entries written more than `max_age` ago, fresh or not
    ///
    /// Unreadable entries are left alone. Returns how many entries were removed.
    pub fn prune(&self, max_age: Duration) -> usize {
        let now_ms = Utc::now().timestamp_millis();
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        let mut removed = 0;

        for key in self.keys() {
            let Ok(content) = fs::read_to_string(self.cache_path(&key)) else {
                continue;
            };
            let Ok(entry) = serde_json::from_str::<CacheEntry<IgnoredAny>>(&content) else {
                continue;
            };
            if entry.age_ms(now_ms) > max_age_ms {
                self.clear(&key);
                removed += 1;
            }
        }

        removed
    }

    /// Lists the keys of every cache file in the directory
    fn keys(&self) -> Vec<String> {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(dir = %self.cache_dir.display(), error = %e, "Error listing cache");
                return Vec::new();
            }
        };

        entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name();
                let stem = name.to_str()?.strip_suffix(".json")?.to_string();
                urlencoding::decode(&stem).ok().map(|key| key.into_owned())
            })
            .collect()
    }
}
