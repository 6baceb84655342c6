//! In-memory label cache, used for `--no-persist` runs and in tests

use std::collections::HashMap;

use parking_lot::Mutex;

use super::entry::{format_expiry, parse_expiry, CacheEntry, MEMBER_EXPIRES_KEY, MEMBER_LABEL_KEY};
use super::LabelCache;

/// A key-value store held in process memory
///
/// Values are kept as strings, exactly as the disk store keeps them, so an
/// unparseable expiry behaves the same way in both.
#[derive(Debug, Default)]
pub struct MemoryCache {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a raw key
    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    /// Writes a raw key, bypassing expiry formatting
    pub fn set_raw(&self, key: &str, value: impl Into<String>) {
        self.values.lock().insert(key.to_string(), value.into());
    }
}

impl LabelCache for MemoryCache {
    fn get(&self) -> CacheEntry {
        let values = self.values.lock();
        CacheEntry {
            label: values.get(MEMBER_LABEL_KEY).cloned(),
            expires_at: values.get(MEMBER_EXPIRES_KEY).and_then(|raw| parse_expiry(raw)),
        }
    }

    fn put(&self, entry: &CacheEntry) -> std::io::Result<()> {
        let mut values = self.values.lock();
        if let Some(label) = &entry.label {
            values.insert(MEMBER_LABEL_KEY.to_string(), label.clone());
        }
        if let Some(expires_at) = entry.expires_at {
            values.insert(MEMBER_EXPIRES_KEY.to_string(), format_expiry(expires_at));
        }
        Ok(())
    }

    fn clear(&self) -> std::io::Result<()> {
        let mut values = self.values.lock();
        values.remove(MEMBER_LABEL_KEY);
        values.remove(MEMBER_EXPIRES_KEY);
        Ok(())
    }
}
