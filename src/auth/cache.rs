// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Time-bounded, single-slot cache of the provider's key set.
//!
//! ## Behaviour
//!
//! - A fresh entry is served without touching the network
//! - An absent or expired entry triggers a refresh; concurrent callers join the
//!   refresh already in flight instead of starting their own
//! - Refreshes run on a spawned task, so a caller that gives up (request
//!   cancelled, timeout) does not abort the fetch other callers are waiting on
//! - Fail-closed: an expired entry is never served, even when its refresh fails
//! - Refreshes forced by an unknown `kid` are limited to one per
//!   [`DEFAULT_MIN_REFRESH_INTERVAL`] (configurable); inside that window the
//!   current set is returned as is
//!
//! The cache is an explicit instance owned by the authenticator; there is no
//! process-global key store.

use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::jwks::{FetchError, KeySet, KeySetFetcher};

/// Default key-set lifetime (1 hour).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Minimum spacing between refreshes forced by an unknown `kid` (30 seconds).
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// No usable key set could be obtained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("no usable key set available: {0}")]
    Unavailable(#[from] FetchError),
}

type RefreshFuture = Shared<BoxFuture<'static, Result<Arc<KeySet>, FetchError>>>;

/// The single cached key set and when it was fetched.
struct CacheEntry {
    key_set: Arc<KeySet>,
    fetched_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn new(key_set: Arc<KeySet>, ttl: Duration) -> Self {
        Self {
            key_set,
            fetched_at: Instant::now(),
            ttl,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) > self.ttl
    }
}

#[derive(Default)]
struct CacheSlot {
    entry: Option<CacheEntry>,
    in_flight: Option<RefreshFuture>,
    /// Stamped when a fetch starts, whatever its outcome.
    last_attempt: Option<Instant>,
}

impl CacheSlot {
    fn attempted_within(&self, interval: Duration) -> bool {
        self.last_attempt
            .is_some_and(|at| Instant::now().saturating_duration_since(at) < interval)
    }

    fn fresh_key_set(&self) -> Option<Arc<KeySet>> {
        self.entry
            .as_ref()
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| Arc::clone(&entry.key_set))
    }
}

/// Key-set cache with coalesced refresh.
pub struct KeySetCache {
    jwks_url: String,
    ttl: Duration,
    min_refresh_interval: Duration,
    fetcher: Arc<dyn KeySetFetcher>,
    slot: Arc<Mutex<CacheSlot>>,
}

impl KeySetCache {
    pub fn new(jwks_url: impl Into<String>, ttl: Duration, fetcher: Arc<dyn KeySetFetcher>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            ttl,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            fetcher,
            slot: Arc::new(Mutex::new(CacheSlot::default())),
        }
    }

    /// Set the minimum spacing between unknown-`kid` refreshes. Zero disables it.
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Return the cached key set, fetching a new one if absent or expired.
    pub async fn get_or_refresh(&self) -> Result<Arc<KeySet>, CacheError> {
        let refresh = {
            let mut slot = self.slot.lock().await;
            if let Some(key_set) = slot.fresh_key_set() {
                tracing::trace!(target: "auth.cache", "JWKS cache hit");
                return Ok(key_set);
            }
            tracing::debug!(target: "auth.cache", "JWKS cache miss or expired");
            self.join_or_start_refresh(&mut slot)
        };

        refresh.await.map_err(CacheError::from)
    }

    /// Obtain a key set newer than `stale`, which was found to lack a key id.
    ///
    /// If another caller already replaced `stale`, the replacement is returned
    /// without a fetch. If a fetch started less than the minimum refresh
    /// interval ago, `stale` itself is returned. Otherwise a refresh is
    /// started (or joined).
    pub async fn refresh_after_miss(&self, stale: &Arc<KeySet>) -> Result<Arc<KeySet>, CacheError> {
        let refresh = {
            let mut slot = self.slot.lock().await;
            if let Some(current) = slot.fresh_key_set() {
                if !Arc::ptr_eq(&current, stale) {
                    tracing::debug!(target: "auth.cache", "Key set already replaced by a concurrent refresh");
                    return Ok(current);
                }
                if slot.in_flight.is_none() && slot.attempted_within(self.min_refresh_interval) {
                    tracing::debug!(
                        target: "auth.cache",
                        min_interval_secs = self.min_refresh_interval.as_secs(),
                        "Unknown-kid refresh suppressed; key set fetched too recently"
                    );
                    return Ok(current);
                }
            }
            self.join_or_start_refresh(&mut slot)
        };

        refresh.await.map_err(CacheError::from)
    }

    /// Whether a non-expired key set is currently held.
    pub async fn is_fresh(&self) -> bool {
        self.slot.lock().await.fresh_key_set().is_some()
    }

    /// Must be called with the slot locked; the spawned task needs the same
    /// lock to publish its result, which orders it after `in_flight` is set.
    fn join_or_start_refresh(&self, slot: &mut CacheSlot) -> RefreshFuture {
        if let Some(in_flight) = &slot.in_flight {
            tracing::debug!(target: "auth.cache", "Joining in-flight JWKS refresh");
            return in_flight.clone();
        }

        let fetcher = Arc::clone(&self.fetcher);
        let shared_slot = Arc::clone(&self.slot);
        let url = self.jwks_url.clone();
        let ttl = self.ttl;
        slot.last_attempt = Some(Instant::now());

        let task = tokio::spawn(async move {
            let result = fetcher.fetch(&url).await.map(Arc::new);

            let mut slot = shared_slot.lock().await;
            slot.in_flight = None;
            match &result {
                Ok(key_set) => {
                    slot.entry = Some(CacheEntry::new(Arc::clone(key_set), ttl));
                    tracing::info!(
                        target: "auth.cache",
                        key_count = key_set.len(),
                        ttl_secs = ttl.as_secs(),
                        "JWKS cache refreshed"
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        target: "auth.cache",
                        error = %e,
                        kind = e.kind(),
                        had_entry = slot.entry.is_some(),
                        "JWKS refresh failed; rejecting until a fetch succeeds"
                    );
                }
            }
            result
        });

        let refresh = async move {
            task.await
                .unwrap_or_else(|e| Err(FetchError::Network(format!("refresh task failed: {e}"))))
        }
        .boxed()
        .shared();

        slot.in_flight = Some(refresh.clone());
        refresh
    }
}
