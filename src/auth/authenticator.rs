// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer-token authenticator: key-set cache plus signature verifier.
//!
//! A token whose `kid` is missing from the cached key set triggers one refresh
//! and one retry, so a key rotated in at the provider is accepted on the first
//! request that presents it. Those refreshes are rate limited by the cache; a
//! `kid` that is still unknown inside the window is rejected without a fetch.

use std::sync::Arc;

use tracing::instrument;

use super::cache::KeySetCache;
use super::claims::VerifiedClaims;
use super::error::AuthError;
use super::jwks::{HttpKeySetFetcher, KeySetFetcher};
use super::verifier::{SignatureVerifier, TokenError};
use crate::config::Config;

/// Verifies bearer tokens against the provider's published keys.
pub struct TokenAuthenticator {
    cache: KeySetCache,
    verifier: SignatureVerifier,
}

impl TokenAuthenticator {
    pub fn new(cache: KeySetCache, verifier: SignatureVerifier) -> Self {
        Self { cache, verifier }
    }

    /// Build the production authenticator from configuration.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let fetcher = HttpKeySetFetcher::new(config.fetch_timeout)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    /// Build an authenticator with a caller-supplied key-set source.
    pub fn with_fetcher(config: &Config, fetcher: Arc<dyn KeySetFetcher>) -> Self {
        let cache = KeySetCache::new(config.jwks_url(), config.cache_ttl, fetcher)
            .with_min_refresh_interval(config.min_refresh_interval);
        let verifier =
            SignatureVerifier::new(config.expected_issuer()).with_leeway(config.leeway_secs);
        Self::new(cache, verifier)
    }

    pub fn cache(&self) -> &KeySetCache {
        &self.cache
    }

    pub fn expected_issuer(&self) -> &str {
        self.verifier.expected_issuer()
    }

    /// Authenticate a bearer token.
    #[instrument(skip_all)]
    pub async fn authenticate(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        if token.trim().is_empty() {
            return Err(TokenError::MissingToken.into());
        }

        let key_set = self.cache.get_or_refresh().await?;

        match self.verifier.verify(token, &key_set) {
            Err(TokenError::UnknownKey(kid)) => {
                let refreshed = self.cache.refresh_after_miss(&key_set).await?;
                if Arc::ptr_eq(&refreshed, &key_set) {
                    return Err(TokenError::UnknownKey(kid).into());
                }
                Ok(self.verifier.verify(token, &refreshed)?)
            }
            result => Ok(result?),
        }
    }
}
