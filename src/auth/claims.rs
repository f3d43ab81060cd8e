// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};

/// Claims as decoded from a Supabase access token.
///
/// Registered claims used for verification are typed; everything else
/// (`role`, `email`, `aud`, `app_metadata`, ...) lands in `extra`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenClaims {
    /// Subject (Supabase user UUID)
    pub sub: String,

    /// Issuer (`{project_url}/auth/v1`)
    #[serde(default)]
    pub iss: String,

    /// Expiration timestamp, truncated to whole seconds
    #[serde(default, deserialize_with = "numeric_date")]
    pub exp: Option<i64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// RFC 7519 NumericDate: integer or fractional seconds since the epoch.
fn numeric_date<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Number>::deserialize(deserializer)?;
    Ok(value.and_then(|n| n.as_i64().or_else(|| n.as_f64().map(|secs| secs.trunc() as i64))))
}

/// Outcome of a successful token verification.
///
/// Immutable; shared with handlers behind an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedClaims {
    /// `sub` claim
    pub subject: String,
    /// `iss` claim
    pub issuer: String,
    /// `exp` claim, if the token carried one
    pub expires_at: Option<i64>,
    /// Every claim other than `sub`, `iss` and `exp`
    pub extra: Map<String, Value>,
}

impl VerifiedClaims {
    /// Look up a claim outside the typed fields.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Supabase `role` claim (`authenticated`, `anon`, `service_role`).
    pub fn role(&self) -> Option<&str> {
        self.get("role").and_then(Value::as_str)
    }

    pub fn email(&self) -> Option<&str> {
        self.get("email").and_then(Value::as_str)
    }

    /// The full claim set as it appeared in the token, with `exp` in whole seconds.
    pub fn raw_claims(&self) -> Map<String, Value> {
        let mut claims = self.extra.clone();
        claims.insert("sub".to_string(), Value::String(self.subject.clone()));
        claims.insert("iss".to_string(), Value::String(self.issuer.clone()));
        if let Some(exp) = self.expires_at {
            claims.insert("exp".to_string(), Value::from(exp));
        }
        claims
    }
}

impl From<TokenClaims> for VerifiedClaims {
    fn from(claims: TokenClaims) -> Self {
        Self {
            subject: claims.sub,
            issuer: claims.iss,
            expires_at: claims.exp,
            extra: claims.extra,
        }
    }
}

/// Authenticated caller, attached to request extensions by the middleware.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Canonical user ID (`sub` claim)
    pub user_id: String,

    /// Full verified claim set
    pub claims: Arc<VerifiedClaims>,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: VerifiedClaims) -> Self {
        Self {
            user_id: claims.subject.clone(),
            claims: Arc::new(claims),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(value: Value) -> Result<TokenClaims, serde_json::Error> {
        serde_json::from_value(value)
    }

    #[test]
    fn typed_fields_and_extras_are_split() {
        let claims = decode(json!({
            "sub": "4b1c9f0e-user",
            "iss": "https://project.supabase.co/auth/v1",
            "exp": 1900000000,
            "role": "authenticated",
            "email": "ada@example.com",
            "aud": "authenticated"
        }))
        .unwrap();

        let verified = VerifiedClaims::from(claims);
        assert_eq!(verified.subject, "4b1c9f0e-user");
        assert_eq!(verified.expires_at, Some(1900000000));
        assert_eq!(verified.role(), Some("authenticated"));
        assert_eq!(verified.email(), Some("ada@example.com"));
        assert!(verified.get("sub").is_none());
        assert_eq!(verified.extra.len(), 3);
    }

    #[test]
    fn raw_claims_restores_full_set() {
        let original = json!({
            "sub": "user_123",
            "iss": "https://project.supabase.co/auth/v1",
            "exp": 1900000000,
            "app_metadata": {"provider": "email"}
        });
        let verified = VerifiedClaims::from(decode(original.clone()).unwrap());
        assert_eq!(Value::Object(verified.raw_claims()), original);
    }

    #[test]
    fn missing_iss_and_exp_default() {
        let verified = VerifiedClaims::from(decode(json!({"sub": "user_123"})).unwrap());
        assert_eq!(verified.issuer, "");
        assert_eq!(verified.expires_at, None);
        assert!(!verified.raw_claims().contains_key("exp"));
    }

    #[test]
    fn fractional_exp_is_truncated() {
        let verified = VerifiedClaims::from(
            decode(json!({"sub": "user_123", "exp": 1792036424.5})).unwrap(),
        );
        assert_eq!(verified.expires_at, Some(1792036424));
        assert_eq!(verified.raw_claims()["exp"], 1792036424);
    }

    #[test]
    fn non_numeric_exp_is_rejected() {
        assert!(decode(json!({"sub": "user_123", "exp": "tomorrow"})).is_err());
    }

    #[test]
    fn missing_sub_is_rejected() {
        assert!(decode(json!({"iss": "x"})).is_err());
        assert!(decode(json!({"sub": 42})).is_err());
    }

    #[test]
    fn authenticated_user_takes_subject() {
        let verified = VerifiedClaims::from(decode(json!({"sub": "user_123"})).unwrap());
        let user = AuthenticatedUser::from_claims(verified);
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.claims.subject, "user_123");
    }
}
