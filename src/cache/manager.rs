//! Cache manager for persisting API responses to disk
//!
//! Provides a `CacheManager` that stores serializable data to JSON files with
//! expiry timestamps. The weather client keeps its raw responses here so that a
//! restarted dashboard does not refetch a city it saw minutes ago.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
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

/// Manages reading and writing cached data to disk
///
/// Files live in an XDG-compliant cache directory (`~/.cache/wxticker/` on
/// Linux). Expired entries are still returned, flagged with `is_expired`, and
/// it is up to the caller whether stale data is acceptable.
#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a new CacheManager using XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "wxticker")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory the cache files are written to
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Turns an arbitrary key into a safe file stem
    ///
    /// Lowercase ASCII letters, digits, `-` and `_` are kept; every other byte
    /// becomes `%XX`. Distinct keys always map to distinct stems.
    fn file_stem(key: &str) -> String {
        let mut stem = String::with_capacity(key.len());
        for byte in key.bytes() {
            match byte {
                b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' => stem.push(byte as char),
                _ => stem.push_str(&format!("%{:02X}", byte)),
            }
        }
        stem
    }

    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", Self::file_stem(key)))
    }

    /// Ensures the cache directory exists
    pub fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Writes data to the cache with a TTL in seconds
    ///
    /// # Arguments
    /// * `key` - Unique identifier for the cache entry (e.g., "weather:london")
    /// * `data` - The data to cache (must implement Serialize)
    /// * `ttl_secs` - How long the cache entry should be considered fresh
    ///
    /// # Returns
    /// * `Ok(())` on success
    /// * `Err` if directory creation or file writing fails
    pub fn write<T: Serialize>(&self, key: &str, data: &T, ttl_secs: u64) -> std::io::Result<()> {
        self.ensure_dir()?;

        let now = Utc::now();
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: now + Duration::seconds(ttl_secs as i64),
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        fs::write(self.cache_path(key), json)
    }

    /// Reads data from the cache
    ///
    /// Returns `None` if the entry doesn't exist or cannot be parsed.
    /// An entry counts as expired once `now >= expires_at`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let path = self.cache_path(key);
        let content = fs::read_to_string(path).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        let is_expired = Utc::now() >= entry.expires_at;

        Some(CachedData {
            data: entry.data,
            cached_at: entry.cached_at,
            is_expired,
        })
    }

    /// Returns cached data only if it has not expired
    pub fn read_fresh<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.read(key)
            .filter(|cached: &CachedData<T>| !cached.is_expired)
            .map(|cached| cached.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    fn create_test_cache() -> (CacheManager, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let cache = CacheManager::with_dir(temp_dir.path().to_path_buf());
        (cache, temp_dir)
    }

    #[test]
    fn test_write_creates_file_with_escaped_name() {
        let (cache, temp_dir) = create_test_cache();
        let data = json!({"name": "London", "dt": 1700000000});

        cache.write("weather:london", &data, 600).expect("Write should succeed");

        let expected_path = temp_dir.path().join("weather%3Alondon.json");
        assert!(expected_path.exists(), "Cache file should exist");

        let content = fs::read_to_string(&expected_path).expect("Should read file");
        assert!(content.contains("\"London\""));
        assert!(content.contains("expires_at"));
    }

    #[test]
    fn test_file_stem_is_one_to_one() {
        let keys = [
            "weather:東京",
            "weather:北京",
            "weather:москва",
            "weather:берлин",
            "weather:london,gb",
            "weather:london gb",
            "weather:London",
            "weather:london",
            "weather_london",
            "weather%3Alondon",
        ];
        let stems: std::collections::HashSet<String> =
            keys.iter().map(|k| CacheManager::file_stem(k)).collect();
        assert_eq!(stems.len(), keys.len());

        for stem in &stems {
            assert!(stem
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '%')));
        }
    }

    #[test]
    fn test_same_length_cities_do_not_share_entries() {
        let (cache, _temp_dir) = create_test_cache();

        cache
            .write("weather:東京", &json!({"name": "Tokyo"}), 600)
            .expect("Write should succeed");

        assert!(cache.read_fresh::<Value>("weather:北京").is_none());
        assert_eq!(
            cache.read_fresh::<Value>("weather:東京"),
            Some(json!({"name": "Tokyo"}))
        );
    }

    #[test]
    fn test_read_returns_none_for_missing_key() {
        let (cache, _temp_dir) = create_test_cache();

        let result: Option<CachedData<Value>> = cache.read("nonexistent_key");

        assert!(result.is_none(), "Should return None for missing key");
    }

    #[test]
    fn test_read_fresh_entry() {
        let (cache, _temp_dir) = create_test_cache();
        let data = json!({"name": "Paris"});

        cache.write("weather:paris", &data, 600).expect("Write should succeed");

        let result: CachedData<Value> = cache.read("weather:paris").expect("Should read fresh cache");
        assert_eq!(result.data, data);
        assert!(!result.is_expired, "Fresh cache should not be expired");
        assert_eq!(cache.read_fresh::<Value>("weather:paris"), Some(data));
    }

    #[test]
    fn test_zero_ttl_is_expired_immediately() {
        let (cache, _temp_dir) = create_test_cache();
        let data = json!({"name": "Oslo"});

        cache.write("weather:oslo", &data, 0).expect("Write should succeed");

        let result: CachedData<Value> = cache.read("weather:oslo").expect("Should read expired cache");
        assert_eq!(result.data, data, "Expired data is still returned");
        assert!(result.is_expired);
        assert!(cache.read_fresh::<Value>("weather:oslo").is_none());
    }

    #[test]
    fn test_corrupt_file_reads_as_missing() {
        let (cache, temp_dir) = create_test_cache();
        fs::write(temp_dir.path().join("broken.json"), "{not json").unwrap();

        assert!(cache.read::<Value>("broken").is_none());
    }

    #[test]
    fn test_write_creates_directory_if_missing() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let nested_path = temp_dir.path().join("nested").join("cache");
        let cache = CacheManager::with_dir(nested_path.clone());

        cache.write("k", &json!(1), 60).expect("Write should succeed");

        assert!(nested_path.join("k.json").exists(), "Cache file should exist");
    }

    #[test]
    fn test_cached_at_timestamp_is_recorded() {
        let (cache, _temp_dir) = create_test_cache();

        let before = Utc::now();
        cache.write("ts", &json!("x"), 60).expect("Write should succeed");
        let after = Utc::now();

        let result: CachedData<Value> = cache.read("ts").expect("Should read cache");
        assert!(result.cached_at >= before);
        assert!(result.cached_at <= after);
    }

    #[test]
    fn test_overwrite_replaces_entry() {
        let (cache, _temp_dir) = create_test_cache();

        cache.write("k", &json!({"v": 1}), 60).unwrap();
        cache.write("k", &json!({"v": 2}), 60).unwrap();

        let result: CachedData<Value> = cache.read("k").unwrap();
        assert_eq!(result.data, json!({"v": 2}));
    }

    #[test]
    fn test_new_creates_xdg_compliant_path() {
        if let Some(cache) = CacheManager::new() {
            assert!(cache.dir().to_string_lossy().contains("wxticker"));
        }
        // new() may return None without a home directory
    }
}
