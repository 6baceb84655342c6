//! Remote label lookup
//!
//! This module contains the banner API client and the transient result type
//! it hands to the resolver.

pub mod banner;

pub use banner::{BannerClient, BannerError, LabelSource, DEFAULT_BASE_URL};

use serde::Serialize;

/// Outcome of one remote lookup
///
/// Produced by a [`LabelSource`] and consumed immediately by the resolver;
/// it is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LookupResult {
    /// The label, if the endpoint returned a non-empty one
    pub label: Option<String>,
    /// False for transport failures and non-success statuses
    pub succeeded: bool,
}

impl LookupResult {
    /// A lookup where the server responded, with or without a label
    pub fn found(label: Option<String>) -> Self {
        Self {
            label,
            succeeded: true,
        }
    }

    /// A lookup that never got a usable response
    pub fn failed() -> Self {
        Self {
            label: None,
            succeeded: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_found_with_label() {
        let result = LookupResult::found(Some("Example University".to_string()));
        assert!(result.succeeded);
        assert_eq!(result.label.as_deref(), Some("Example University"));
    }

    #[test]
    fn test_failed_has_no_label() {
        let result = LookupResult::failed();
        assert!(!result.succeeded);
        assert!(result.label.is_none());
    }
}
