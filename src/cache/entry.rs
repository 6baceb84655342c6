//! The cached label entry and the expiry string format

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Store key holding the institution label
pub const MEMBER_LABEL_KEY: &str = "member_label";

/// Store key holding the expiry timestamp
pub const MEMBER_EXPIRES_KEY: &str = "member_expires";

/// Browser `Date.toString()` layout, once the trailing zone name is dropped
const BROWSER_DATE_FORMAT: &str = "%a %b %d %Y %H:%M:%S GMT%z";

/// The label and expiry as they currently sit in the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheEntry {
    /// Cached institution label
    pub label: Option<String>,
    /// When the entry stops being fresh. `None` if missing or unparseable.
    pub expires_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Creates an entry with both fields set
    pub fn new(label: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            label: Some(label.into()),
            expires_at: Some(expires_at),
        }
    }

    /// An entry carrying only an expiry, used after a failed lookup
    pub fn expiry_only(expires_at: DateTime<Utc>) -> Self {
        Self {
            label: None,
            expires_at: Some(expires_at),
        }
    }

    /// Returns true only when an expiry is present and strictly after `now`
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(expires_at) if expires_at > now)
    }
}

/// Formats an expiry for storage (RFC 3339, millisecond precision, UTC)
pub fn format_expiry(expires_at: DateTime<Utc>) -> String {
    expires_at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses a stored expiry string
///
/// Accepts RFC 3339, RFC 2822 and the browser date-to-string form
/// (`Sun Oct 18 2026 12:00:00 GMT+0200 (Central European Summer Time)`).
/// Returns `None` for anything else, which callers treat as expired.
pub fn parse_expiry(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    let without_zone_name = match raw.find(" (") {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    DateTime::parse_from_str(without_zone_name, BROWSER_DATE_FORMAT)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
