// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::TokenAuthenticator;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub authenticator: Arc<TokenAuthenticator>,
}

impl AppState {
    pub fn new(authenticator: TokenAuthenticator) -> Self {
        Self {
            authenticator: Arc::new(authenticator),
        }
    }

    /// State backed by the production HTTP key-set fetcher.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self::new(TokenAuthenticator::from_config(config)?))
    }
}
