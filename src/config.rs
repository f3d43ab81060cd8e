// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is loaded from the environment once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `SUPABASE_URL` | Supabase project URL (identity provider base) | Required |
//! | `SUPABASE_JWKS_URL` | Explicit JWKS endpoint | `{SUPABASE_URL}/auth/v1/.well-known/jwks.json` |
//! | `JWKS_CACHE_TTL_SECONDS` | How long a fetched key set is trusted | `3600` |
//! | `JWKS_FETCH_TIMEOUT_SECONDS` | Timeout for one JWKS request | `5` |
//! | `JWT_LEEWAY_SECONDS` | Clock skew tolerance for `exp` | `60` |
//! | `JWKS_MIN_REFRESH_INTERVAL_SECONDS` | Minimum spacing of unknown-`kid` refreshes (`0` disables) | `30` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::auth::cache::{DEFAULT_CACHE_TTL, DEFAULT_MIN_REFRESH_INTERVAL};
use crate::auth::jwks::DEFAULT_FETCH_TIMEOUT;
use crate::auth::verifier::DEFAULT_LEEWAY_SECS;

pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_JWKS_URL_ENV: &str = "SUPABASE_JWKS_URL";
pub const JWKS_CACHE_TTL_ENV: &str = "JWKS_CACHE_TTL_SECONDS";
pub const JWKS_FETCH_TIMEOUT_ENV: &str = "JWKS_FETCH_TIMEOUT_SECONDS";
pub const JWT_LEEWAY_ENV: &str = "JWT_LEEWAY_SECONDS";
pub const JWKS_MIN_REFRESH_INTERVAL_ENV: &str = "JWKS_MIN_REFRESH_INTERVAL_SECONDS";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Path of the auth service below the project URL; also the issuer suffix.
pub const AUTH_PATH: &str = "/auth/v1";

/// Well-known JWKS location below [`AUTH_PATH`].
pub const JWKS_PATH: &str = "/.well-known/jwks.json";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} is not a valid http(s) URL: {reason}")]
    InvalidUrl { var: &'static str, reason: String },
    #[error("{var} must be a positive integer, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }
}

/// Server and authentication settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Supabase project URL without trailing slash
    pub provider_base_url: String,
    /// Explicit JWKS URL, overriding the derived one
    pub jwks_url_override: Option<String>,
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
    pub leeway_secs: u64,
    /// Minimum spacing of refreshes forced by an unknown `kid`
    pub min_refresh_interval: Duration,
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
}

impl Config {
    /// Configuration with defaults for everything except the provider URL.
    pub fn new(provider_base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            provider_base_url: normalize_url(SUPABASE_URL_ENV, provider_base_url)?,
            jwks_url_override: None,
            cache_ttl: DEFAULT_CACHE_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            leeway_secs: DEFAULT_LEEWAY_SECS,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_format: LogFormat::default(),
        })
    }

    /// Load from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load using `lookup` to resolve variable names. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let base = get(SUPABASE_URL_ENV).ok_or(ConfigError::Missing(SUPABASE_URL_ENV))?;
        let mut config = Self::new(&base)?;

        if let Some(url) = get(SUPABASE_JWKS_URL_ENV) {
            config.jwks_url_override = Some(normalize_url(SUPABASE_JWKS_URL_ENV, &url)?);
        }
        if let Some(value) = get(JWKS_CACHE_TTL_ENV) {
            config = config
                .with_cache_ttl(Duration::from_secs(parse_positive(JWKS_CACHE_TTL_ENV, &value)?));
        }
        if let Some(value) = get(JWKS_FETCH_TIMEOUT_ENV) {
            config = config.with_fetch_timeout(Duration::from_secs(parse_positive(
                JWKS_FETCH_TIMEOUT_ENV,
                &value,
            )?));
        }
        if let Some(value) = get(JWT_LEEWAY_ENV) {
            config = config.with_leeway(parse_u64(JWT_LEEWAY_ENV, &value)?);
        }
        if let Some(value) = get(JWKS_MIN_REFRESH_INTERVAL_ENV) {
            config = config.with_min_refresh_interval(Duration::from_secs(parse_u64(
                JWKS_MIN_REFRESH_INTERVAL_ENV,
                &value,
            )?));
        }
        if let Some(host) = get(HOST_ENV) {
            config.host = host;
        }
        if let Some(value) = get(PORT_ENV) {
            config.port = value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
                var: PORT_ENV,
                value: value.clone(),
            })?;
        }
        if let Some(value) = get(LOG_FORMAT_ENV) {
            config.log_format = LogFormat::parse(&value);
        }

        Ok(config)
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// JWKS endpoint: the override if set, else the well-known path.
    pub fn jwks_url(&self) -> String {
        self.jwks_url_override
            .clone()
            .unwrap_or_else(|| format!("{}{AUTH_PATH}{JWKS_PATH}", self.provider_base_url))
    }

    /// Issuer that Supabase writes into `iss`.
    pub fn expected_issuer(&self) -> String {
        format!("{}{AUTH_PATH}", self.provider_base_url)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn normalize_url(var: &'static str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl {
        var,
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            var,
            reason: format!("unsupported scheme {:?}", parsed.scheme()),
        });
    }
    Ok(trimmed.to_string())
}

fn parse_u64(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
        var,
        value: value.to_string(),
    })
}

fn parse_positive(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    match parse_u64(var, value)? {
        0 => Err(ConfigError::InvalidNumber {
            var,
            value: value.to_string(),
        }),
        n => Ok(n),
    }
}
