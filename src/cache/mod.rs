//! Cache module for the institutional label
//!
//! The label and its expiry live in two keys of a small key-value store. The
//! resolver only sees the [`LabelCache`] trait, so the backing store can be the
//! disk-backed [`CacheManager`] or the in-memory [`MemoryCache`].

mod entry;
mod manager;
mod memory;

pub use entry::{format_expiry, parse_expiry, CacheEntry, MEMBER_EXPIRES_KEY, MEMBER_LABEL_KEY};
pub use manager::CacheManager;
pub use memory::MemoryCache;

/// Storage for the single cached label entry
pub trait LabelCache {
    /// Reads both keys. Missing keys come back as `None`.
    fn get(&self) -> CacheEntry;

    /// Writes the entry's present fields.
    ///
    /// A `None` label leaves the stored label untouched; only `clear` removes it.
    fn put(&self, entry: &CacheEntry) -> std::io::Result<()>;

    /// Removes both keys
    fn clear(&self) -> std::io::Result<()>;
}

impl<C: LabelCache + ?Sized> LabelCache for std::sync::Arc<C> {
    fn get(&self) -> CacheEntry {
        (**self).get()
    }

    fn put(&self, entry: &CacheEntry) -> std::io::Result<()> {
        (**self).put(entry)
    }

    fn clear(&self) -> std::io::Result<()> {
        (**self).clear()
    }
}

impl<C: LabelCache + ?Sized> LabelCache for Box<C> {
    fn get(&self) -> CacheEntry {
        (**self).get()
    }

    fn put(&self, entry: &CacheEntry) -> std::io::Result<()> {
        (**self).put(entry)
    }

    fn clear(&self) -> std::io::Result<()> {
        (**self).clear()
    }
}
