// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token signature and claim verification against a [`KeySet`].
//!
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. token present
//! 2. header parses, declares an asymmetric `alg` and a `kid`
//! 3. `kid` is in the key set
//! 4. signature verifies with that key
//! 5. `exp`, when present, is not in the past (with leeway)
//! 6. `iss` equals the expected issuer
//!
//! The issuer check is independent of the signature: a valid signature from a
//! key that happens to share a `kid` with another issuer is still rejected.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{Jwk, KeyAlgorithm};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use thiserror::Error;

use super::claims::{TokenClaims, VerifiedClaims};
use super::jwks::KeySet;

/// Clock skew tolerance applied to `exp` (60 seconds).
pub const DEFAULT_LEEWAY_SECS: u64 = 60;

/// Why a token was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("bearer token is missing")]
    MissingToken,
    #[error("token is malformed: {0}")]
    MalformedToken(String),
    /// Key rotation is the usual cause; callers may refresh keys and retry once.
    #[error("no key with id {0:?} in the key set")]
    UnknownKey(String),
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token issuer {0:?} is not trusted")]
    IssuerMismatch(String),
    #[error("token has expired")]
    Expired,
}

impl TokenError {
    /// Stable identifier used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            TokenError::MissingToken => "missing_token",
            TokenError::MalformedToken(_) => "malformed_token",
            TokenError::UnknownKey(_) => "unknown_key",
            TokenError::BadSignature => "bad_signature",
            TokenError::IssuerMismatch(_) => "issuer_mismatch",
            TokenError::Expired => "expired",
        }
    }
}

/// Verifies tokens for a single trusted issuer.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    expected_issuer: String,
    leeway_secs: u64,
}

impl SignatureVerifier {
    pub fn new(expected_issuer: impl Into<String>) -> Self {
        Self {
            expected_issuer: expected_issuer.into(),
            leeway_secs: DEFAULT_LEEWAY_SECS,
        }
    }

    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    pub fn expected_issuer(&self) -> &str {
        &self.expected_issuer
    }

    /// Verify `token` against `key_set` and return its claims.
    ///
    /// Rejections are logged on `auth.verify` with their code and the token's `kid`.
    pub fn verify(&self, token: &str, key_set: &KeySet) -> Result<VerifiedClaims, TokenError> {
        let result = self.check(token, key_set);
        if let Err(error) = &result {
            log_rejection(token, error);
        }
        result
    }

    fn check(&self, token: &str, key_set: &KeySet) -> Result<VerifiedClaims, TokenError> {
        if token.trim().is_empty() {
            return Err(TokenError::MissingToken);
        }

        let header =
            decode_header(token).map_err(|e| TokenError::MalformedToken(e.to_string()))?;

        if is_symmetric(header.alg) {
            return Err(TokenError::MalformedToken(format!(
                "unsupported algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| TokenError::MalformedToken("header has no kid".to_string()))?;

        let jwk = key_set
            .get(&kid)
            .ok_or_else(|| TokenError::UnknownKey(kid.clone()))?;

        let decoding_key = decoding_key_for(jwk, header.alg)?;

        let mut validation = Validation::new(header.alg);
        validation.leeway = self.leeway_secs;
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let claims = decode::<TokenClaims>(token, &decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidEcdsaKey => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::MalformedToken(e.to_string()),
            })?
            .claims;

        if let Some(exp) = claims.exp {
            let leeway = i64::try_from(self.leeway_secs).unwrap_or(i64::MAX);
            if exp.saturating_add(leeway) < chrono::Utc::now().timestamp() {
                return Err(TokenError::Expired);
            }
        }

        if claims.iss != self.expected_issuer {
            return Err(TokenError::IssuerMismatch(claims.iss));
        }

        Ok(VerifiedClaims::from(claims))
    }
}

fn is_symmetric(alg: Algorithm) -> bool {
    matches!(alg, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)
}

fn log_rejection(token: &str, error: &TokenError) {
    let kid = decode_header(token).ok().and_then(|header| header.kid);
    let kid = kid.as_deref().unwrap_or("none");
    match error {
        TokenError::MissingToken | TokenError::Expired | TokenError::UnknownKey(_) => {
            tracing::debug!(target: "auth.verify", code = error.kind(), kid, "Token rejected");
        }
        _ => {
            tracing::warn!(
                target: "auth.verify",
                code = error.kind(),
                kid,
                error = %error,
                "Token rejected"
            );
        }
    }
}

/// Signing algorithm a JWK `alg` pins its key to. `None` for encryption algorithms.
fn signing_algorithm(key_alg: &KeyAlgorithm) -> Option<Algorithm> {
    match key_alg {
        KeyAlgorithm::HS256 => Some(Algorithm::HS256),
        KeyAlgorithm::HS384 => Some(Algorithm::HS384),
        KeyAlgorithm::HS512 => Some(Algorithm::HS512),
        KeyAlgorithm::ES256 => Some(Algorithm::ES256),
        KeyAlgorithm::ES384 => Some(Algorithm::ES384),
        KeyAlgorithm::RS256 => Some(Algorithm::RS256),
        KeyAlgorithm::RS384 => Some(Algorithm::RS384),
        KeyAlgorithm::RS512 => Some(Algorithm::RS512),
        KeyAlgorithm::PS256 => Some(Algorithm::PS256),
        KeyAlgorithm::PS384 => Some(Algorithm::PS384),
        KeyAlgorithm::PS512 => Some(Algorithm::PS512),
        KeyAlgorithm::EdDSA => Some(Algorithm::EdDSA),
        _ => None,
    }
}

/// Build a verification key, refusing keys pinned to a different algorithm.
fn decoding_key_for(jwk: &Jwk, alg: Algorithm) -> Result<DecodingKey, TokenError> {
    if let Some(key_alg) = &jwk.common.key_algorithm {
        if signing_algorithm(key_alg) != Some(alg) {
            tracing::debug!(
                target: "auth.verify",
                key_alg = ?key_alg,
                token_alg = ?alg,
                "Token algorithm does not match key"
            );
            return Err(TokenError::BadSignature);
        }
    }

    DecodingKey::from_jwk(jwk).map_err(|e| {
        tracing::warn!(target: "auth.verify", error = %e, "Unusable key material in JWKS");
        TokenError::BadSignature
    })
}
