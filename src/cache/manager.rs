//! Disk-backed key-value store for the label cache
//!
//! Provides a `CacheManager` that stores each key as its own small JSON file,
//! so the label and the expiry can be written and removed independently.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::entry::{format_expiry, parse_expiry, CacheEntry, MEMBER_EXPIRES_KEY, MEMBER_LABEL_KEY};
use super::LabelCache;

/// Wrapper struct for a value stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct StoredValue {
    /// The stored string
    value: String,
    /// When the value was written
    written_at: DateTime<Utc>,
}

/// Manages reading and writing cache keys to disk
///
/// Keys are stored as JSON files in an XDG-compliant cache directory
/// (`~/.cache/ackbanner/` on Linux). A file that cannot be read or parsed is
/// treated as a missing key.
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
        let project_dirs = ProjectDirs::from("", "", "ackbanner")?;
        let cache_dir = project_dirs.cache_dir().to_path_buf();
        Some(Self { cache_dir })
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Directory this manager reads and writes
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns the path to a cache file for the given key
    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Ensures the cache directory exists
    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.cache_dir)
    }

    /// Writes a raw string value for `key`
    pub fn write_raw(&self, key: &str, value: &str) -> std::io::Result<()> {
        self.ensure_dir()?;

        let stored = StoredValue {
            value: value.to_string(),
            written_at: Utc::now(),
        };

        let json = serde_json::to_string_pretty(&stored)
            .map_err(|e| std::io::Error::new(ErrorKind::InvalidData, e))?;

        fs::write(self.cache_path(key), json)
    }

    /// Reads the raw string value for `key`
    ///
    /// Returns `None` if the key doesn't exist or its file cannot be parsed.
    pub fn read_raw(&self, key: &str) -> Option<String> {
        let content = fs::read_to_string(self.cache_path(key)).ok()?;
        let stored: StoredValue = match serde_json::from_str(&content) {
            Ok(stored) => stored,
            Err(e) => {
                tracing::debug!(key, error = %e, "ignoring unreadable cache file");
                return None;
            }
        };
        Some(stored.value)
    }

    /// Removes `key`. Removing a missing key is not an error.
    pub fn remove(&self, key: &str) -> std::io::Result<()> {
        match fs::remove_file(self.cache_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}

impl LabelCache for CacheManager {
    fn get(&self) -> CacheEntry {
        CacheEntry {
            label: self.read_raw(MEMBER_LABEL_KEY),
            expires_at: self
                .read_raw(MEMBER_EXPIRES_KEY)
                .and_then(|raw| parse_expiry(&raw)),
        }
    }

    fn put(&self, entry: &CacheEntry) -> std::io::Result<()> {
        if let Some(label) = &entry.label {
            self.write_raw(MEMBER_LABEL_KEY, label)?;
        }
        if let Some(expires_at) = entry.expires_at {
            self.write_raw(MEMBER_EXPIRES_KEY, &format_expiry(expires_at))?;
        }
        Ok(())
    }

    fn clear(&self) -> std::io::Result<()> {
        // Attempt both removals; report the first failure
        let label = self.remove(MEMBER_LABEL_KEY);
        let expires = self.remove(MEMBER_EXPIRES_KEY);
        label.and(expires)
    }
}
