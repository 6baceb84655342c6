//! Cache-first resolution of the institution label
//!
//! A [`Resolver`] reads the cached label, refreshes it from the banner
//! endpoint when the cache is stale, and renders the acknowledgement into a
//! [`Document`]. Nothing here returns an error: lookup and cache failures are
//! logged and degrade to "no label".
//!
//! There is no coordination between concurrent resolvers sharing one cache.
//! Two stale cycles that overlap will both call the endpoint.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::cache::{CacheEntry, LabelCache};
use crate::data::{LabelSource, LookupResult};
use crate::page::{ack_message, Document, SUPPORT_ACK_ID};

/// Freshness of the cache when a resolver runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheState {
    /// Expiry is in the future; nothing is fetched
    Fresh,
    /// Expiry is missing, unparseable or past; a refresh cycle runs
    Stale,
}

/// Expiry policy for refreshed entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryPolicy {
    /// Lifetime after a lookup where the server responded
    pub success_ttl: Duration,
    /// Lifetime after a failed lookup
    pub failure_ttl: Duration,
}

impl Default for ExpiryPolicy {
    fn default() -> Self {
        Self {
            success_ttl: Duration::days(30),
            failure_ttl: Duration::hours(1),
        }
    }
}

/// What a single resolver invocation did
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Cache state observed at the start
    pub state: CacheState,
    /// Label available for display, from the cache or a fresh lookup
    pub label: Option<String>,
    /// The remote lookup, if one was made
    pub lookup: Option<LookupResult>,
    /// Expiry written by this invocation, if any
    pub expires_at: Option<DateTime<Utc>>,
    /// Whether a document element was updated
    pub rendered: bool,
}

impl Resolution {
    /// The acknowledgement fragment for the resolved label
    pub fn message(&self) -> Option<String> {
        self.label.as_deref().map(ack_message)
    }
}

/// Resolves the institution label against a cache and a label source
pub struct Resolver<C, S> {
    cache: C,
    source: S,
    policy: ExpiryPolicy,
    target_id: String,
}

impl<C: LabelCache, S: LabelSource> Resolver<C, S> {
    /// Creates a resolver with the default expiry policy and target id
    pub fn new(cache: C, source: S) -> Self {
        Self {
            cache,
            source,
            policy: ExpiryPolicy::default(),
            target_id: SUPPORT_ACK_ID.to_string(),
        }
    }

    /// Overrides the expiry policy
    pub fn with_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overrides the id of the element that receives the message
    pub fn with_target_id(mut self, target_id: impl Into<String>) -> Self {
        self.target_id = target_id.into();
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Reports the cache state without touching the network
    pub fn status(&self) -> (CacheState, CacheEntry) {
        let entry = self.cache.get();
        (state_of(&entry, Utc::now()), entry)
    }

    /// Resolves the label, refreshing the cache if it is stale
    pub async fn resolve(&self) -> Resolution {
        let entry = self.cache.get();
        let state = state_of(&entry, Utc::now());

        if state == CacheState::Fresh {
            tracing::debug!(label = ?entry.label, "label cache is fresh");
            return Resolution {
                state,
                label: entry.label,
                lookup: None,
                expires_at: None,
                rendered: false,
            };
        }

        tracing::debug!("label cache is stale, refreshing");
        // Another writer may have filled the label since the clear. If the
        // clear failed, the stored label is the stale one and must not count.
        let mut label = match self.cache.clear() {
            Ok(()) => self.cache.get().label,
            Err(e) => {
                tracing::warn!(error = %e, "failed to clear label cache");
                None
            }
        };
        let mut lookup = None;
        let mut lookup_failed = false;

        if label.is_none() {
            let result = self.source.lookup().await;
            lookup_failed = !result.succeeded;
            label = result.label.clone();
            if let Some(found) = &label {
                let written = self.cache.put(&CacheEntry {
                    label: Some(found.clone()),
                    expires_at: None,
                });
                if let Err(e) = written {
                    tracing::warn!(error = %e, "failed to store label");
                }
            }
            lookup = Some(result);
        } else {
            tracing::debug!("label refilled concurrently, skipping lookup");
        }

        let ttl = if lookup_failed {
            self.policy.failure_ttl
        } else {
            self.policy.success_ttl
        };
        let expires_at = Utc::now() + ttl;
        if let Err(e) = self.cache.put(&CacheEntry::expiry_only(expires_at)) {
            tracing::warn!(error = %e, "failed to store label expiry");
        }
        tracing::info!(label = ?label, %expires_at, lookup_failed, "label cache refreshed");

        Resolution {
            state,
            label,
            lookup,
            expires_at: Some(expires_at),
            rendered: false,
        }
    }

    /// Resolves the label and renders the acknowledgement into `doc`
    ///
    /// The document is left untouched when no label is available or the
    /// target element is missing.
    pub async fn run<D: Document + ?Sized>(&self, doc: &mut D) -> Resolution {
        let mut resolution = self.resolve().await;
        if let Some(message) = resolution.message() {
            resolution.rendered = doc.set_inner_html(&self.target_id, &message);
            if !resolution.rendered {
                tracing::debug!(target_id = %self.target_id, "target element not found");
            }
        }
        resolution
    }
}

fn state_of(entry: &CacheEntry, now: DateTime<Utc>) -> CacheState {
    if entry.is_fresh(now) {
        CacheState::Fresh
    } else {
        CacheState::Stale
    }
}
