// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::middleware::bearer_token;
use super::{AuthError, AuthenticatedUser, TokenError};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Behind [`require_bearer`](super::middleware::require_bearer) this reads the
/// user the middleware already verified. On routes without the middleware it
/// verifies the bearer token itself.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let token = bearer_token(&parts.headers).ok_or(TokenError::MissingToken)?;
        let claims = state.authenticator.authenticate(token).await?;
        let user = AuthenticatedUser::from_claims(claims);

        parts.extensions.insert(user.clone());
        Ok(Auth(user))
    }
}
