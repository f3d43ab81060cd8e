// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) documents and their retrieval.
//!
//! ## Security
//!
//! - Each fetch is a single GET with a bounded timeout; no retries here
//! - Keys without a `kid` are ignored, so every usable key is addressable
//! - A document with no usable keys is rejected as a parse failure
//!
//! Caching lives in [`super::cache`]; this module only knows how to turn one
//! HTTP response into a [`KeySet`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::jwk::Jwk;
use serde::Deserialize;
use thiserror::Error;

/// Default timeout for one key-set fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Failure to obtain a key set from the provider.
///
/// `Clone` so a single refresh result can be handed to every waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failure, timeout, or non-success HTTP status.
    #[error("key set fetch failed: {0}")]
    Network(String),
    /// The response body is not a usable key set.
    #[error("key set document is invalid: {0}")]
    Parse(String),
}

impl FetchError {
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Network(_) => "network_error",
            FetchError::Parse(_) => "parse_error",
        }
    }
}

/// Raw document shape; keys stay untyped so one unsupported entry does not
/// invalidate the whole set.
#[derive(Deserialize)]
struct RawKeySet {
    keys: Vec<serde_json::Value>,
}

/// Public keys published by the identity provider, indexed by key id.
///
/// Never mutated after construction; a refresh replaces the whole set.
#[derive(Debug, Clone, Default)]
pub struct KeySet {
    keys: HashMap<String, Jwk>,
}

impl KeySet {
    /// Parse a JWKS document body.
    pub fn parse(body: &[u8]) -> Result<Self, FetchError> {
        let raw: RawKeySet =
            serde_json::from_slice(body).map_err(|e| FetchError::Parse(e.to_string()))?;

        let mut keys = HashMap::with_capacity(raw.keys.len());
        for value in raw.keys {
            let jwk: Jwk = match serde_json::from_value(value) {
                Ok(jwk) => jwk,
                Err(e) => {
                    tracing::debug!(target: "auth.jwks", error = %e, "Skipping unsupported key in JWKS");
                    continue;
                }
            };
            match jwk.common.key_id.clone() {
                Some(kid) => {
                    keys.insert(kid, jwk);
                }
                None => {
                    tracing::debug!(target: "auth.jwks", "Skipping key without kid in JWKS");
                }
            }
        }

        let key_set = Self { keys };
        if key_set.is_empty() {
            return Err(FetchError::Parse("no usable keys".to_string()));
        }
        Ok(key_set)
    }

    pub fn get(&self, kid: &str) -> Option<&Jwk> {
        self.keys.get(kid)
    }

    pub fn contains(&self, kid: &str) -> bool {
        self.keys.contains_key(kid)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn key_ids(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }
}

/// Source of key sets.
///
/// The production implementation is [`HttpKeySetFetcher`]; tests substitute
/// in-process fakes.
#[async_trait]
pub trait KeySetFetcher: Send + Sync {
    /// Retrieve the key set published at `url`. Exactly one attempt.
    async fn fetch(&self, url: &str) -> Result<KeySet, FetchError>;
}

/// Fetches key sets over HTTPS with reqwest.
#[derive(Clone)]
pub struct HttpKeySetFetcher {
    client: reqwest::Client,
}

impl HttpKeySetFetcher {
    /// Create a fetcher whose requests are bounded by `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl KeySetFetcher for HttpKeySetFetcher {
    async fn fetch(&self, url: &str) -> Result<KeySet, FetchError> {
        tracing::debug!(target: "auth.jwks", url = %url, "Fetching JWKS");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Network(format!(
                "HTTP {} from JWKS endpoint",
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let key_set = KeySet::parse(&body)?;
        tracing::info!(
            target: "auth.jwks",
            key_count = key_set.len(),
            kids = ?key_set.key_ids().collect::<Vec<_>>(),
            "JWKS fetched"
        );
        Ok(key_set)
    }
}
