// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied to a router subtree with
//! `axum::middleware::from_fn_with_state(state, require_bearer)`. Requests
//! that pass carry an [`AuthenticatedUser`] in their extensions; all others
//! are answered with `401` before reaching a handler.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AuthError, AuthenticatedUser, TokenError};
use crate::state::AppState;

/// Extract the token from an `Authorization: Bearer <token>` header.
///
/// The scheme is matched case-insensitively. Returns `None` for a missing
/// header, another scheme, or an empty token.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Reject the request unless it carries a valid bearer token.
pub async fn require_bearer(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()).map(str::to_owned) else {
        let error = AuthError::from(TokenError::MissingToken);
        log_rejection(&request, &error);
        return error.into_response();
    };

    match state.authenticator.authenticate(&token).await {
        Ok(claims) => {
            let user = AuthenticatedUser::from_claims(claims);
            tracing::debug!(target: "auth.middleware", user_id = %user.user_id, "Request authenticated");
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(error) => {
            log_rejection(&request, &error);
            error.into_response()
        }
    }
}

fn log_rejection(request: &Request, error: &AuthError) {
    let path = request.uri().path();
    match error {
        // The verifier logs token failures with their kid on `auth.verify`.
        AuthError::Token(_) => {
            tracing::debug!(
                target: "auth.middleware",
                path = %path,
                code = error.error_code(),
                "Request rejected"
            );
        }
        _ => {
            tracing::warn!(
                target: "auth.middleware",
                path = %path,
                code = error.error_code(),
                error = %error,
                "Request rejected"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer   abc.def.ghi  ")), Some("abc.def.ghi"));
    }

    #[test]
    fn rejects_missing_or_other_schemes() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
        assert_eq!(bearer_token(&headers("")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&headers("Bearer    ")), None);
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("abc.def.ghi")), None);
    }
}
