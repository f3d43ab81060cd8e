// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use super::cache::CacheError;
use super::verifier::TokenError;

/// Message for requests without a usable bearer token.
pub const MISSING_TOKEN_MESSAGE: &str = "Missing bearer token";

/// Message for every other rejection.
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid token";

/// Authentication failure at the request boundary.
///
/// Every variant renders as `401` with a `{"message": ...}` body. The specific
/// cause is only available through [`AuthError::error_code`] for logging.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error(transparent)]
    Token(#[from] TokenError),
    /// Key set could not be obtained; the request is rejected (fail-closed).
    #[error(transparent)]
    KeysUnavailable(#[from] CacheError),
}

#[derive(Serialize)]
struct AuthErrorBody {
    message: &'static str,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::Token(e) => e.kind(),
            AuthError::KeysUnavailable(_) => "jwks_unavailable",
        }
    }

    /// Get the client-facing message for this error.
    pub fn public_message(&self) -> &'static str {
        match self {
            AuthError::Token(TokenError::MissingToken) => MISSING_TOKEN_MESSAGE,
            _ => INVALID_TOKEN_MESSAGE,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(AuthErrorBody {
            message: self.public_message(),
        });
        let mut response = (self.status_code(), body).into_response();
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwks::FetchError;
    use axum::body::to_bytes;

    async fn body_of(error: AuthError) -> (StatusCode, String) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn missing_token_has_distinct_message() {
        let (status, body) = body_of(TokenError::MissingToken.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, r#"{"message":"Missing bearer token"}"#);
    }

    #[tokio::test]
    async fn token_failures_collapse_to_generic_message() {
        let failures = [
            TokenError::MalformedToken("bad base64".into()),
            TokenError::UnknownKey("kid-9".into()),
            TokenError::BadSignature,
            TokenError::IssuerMismatch("https://evil.example/auth/v1".into()),
            TokenError::Expired,
        ];
        for failure in failures {
            let (status, body) = body_of(failure.into()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body, r#"{"message":"Invalid token"}"#);
        }
    }

    #[tokio::test]
    async fn unavailable_keys_reject_with_401() {
        let error = AuthError::from(CacheError::Unavailable(FetchError::Network(
            "connection refused".into(),
        )));
        assert_eq!(error.error_code(), "jwks_unavailable");
        let (status, body) = body_of(error).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(!body.contains("connection refused"));
    }

    #[test]
    fn response_carries_bearer_challenge() {
        let response = AuthError::from(TokenError::Expired).into_response();
        assert_eq!(response.headers()[WWW_AUTHENTICATE], "Bearer");
    }

    #[test]
    fn error_code_exposes_subtype() {
        assert_eq!(
            AuthError::from(TokenError::IssuerMismatch("x".into())).error_code(),
            "issuer_mismatch"
        );
    }
}
