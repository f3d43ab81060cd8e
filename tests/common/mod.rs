// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for integration tests: signing keys, token minting and a
//! mocked Supabase JWKS endpoint.

#![allow(dead_code)]

use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use crm_auth_server::config::Config;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const JWKS_PATH: &str = "/auth/v1/.well-known/jwks.json";

pub const ES256_KID: &str = "es256-key-a";
pub const RS256_KID: &str = "rs256-key-b";

const ES256_PRIVATE: &str = include_str!("../fixtures/es256_private.pem");
const ES256_ROGUE_PRIVATE: &str = include_str!("../fixtures/es256_rogue_private.pem");
const RS256_PRIVATE: &str = include_str!("../fixtures/rs256_private.pem");
const ES256_JWK: &str = include_str!("../fixtures/es256_public.jwk.json");
const RS256_JWK: &str = include_str!("../fixtures/rs256_public.jwk.json");

#[derive(Clone, Copy)]
pub enum SigningKey {
    Es256,
    Rs256,
    /// Valid P-256 key that no JWKS publishes.
    Rogue,
}

impl SigningKey {
    fn algorithm(self) -> Algorithm {
        match self {
            SigningKey::Es256 | SigningKey::Rogue => Algorithm::ES256,
            SigningKey::Rs256 => Algorithm::RS256,
        }
    }

    fn encoding_key(self) -> EncodingKey {
        match self {
            SigningKey::Es256 => EncodingKey::from_ec_pem(ES256_PRIVATE.as_bytes()),
            SigningKey::Rogue => EncodingKey::from_ec_pem(ES256_ROGUE_PRIVATE.as_bytes()),
            SigningKey::Rs256 => EncodingKey::from_rsa_pem(RS256_PRIVATE.as_bytes()),
        }
        .expect("fixture key must parse")
    }
}

/// A JWKS document publishing the given fixture keys.
pub fn jwks(with_es256: bool, with_rs256: bool) -> Value {
    let mut keys = Vec::new();
    if with_es256 {
        keys.push(serde_json::from_str::<Value>(ES256_JWK).expect("fixture JWK"));
    }
    if with_rs256 {
        keys.push(serde_json::from_str::<Value>(RS256_JWK).expect("fixture JWK"));
    }
    json!({ "keys": keys })
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub fn issuer(server: &MockServer) -> String {
    format!("{}/auth/v1", server.uri())
}

/// Claims as Supabase issues them for a signed-in user.
pub fn user_claims(server: &MockServer, sub: &str) -> Value {
    json!({
        "sub": sub,
        "iss": issuer(server),
        "aud": "authenticated",
        "exp": now() + 3600,
        "iat": now(),
        "role": "authenticated",
        "email": "ada@example.com"
    })
}

pub fn sign(key: SigningKey, kid: &str, claims: &Value) -> String {
    let mut header = Header::new(key.algorithm());
    header.kid = Some(kid.to_string());
    encode(&header, claims, &key.encoding_key()).expect("fixture token must sign")
}

/// An unsigned token declaring `alg: none`.
pub fn unsigned(kid: &str, claims: &Value) -> String {
    let header = json!({ "alg": "none", "typ": "JWT", "kid": kid });
    format!(
        "{}.{}.",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

/// Flip one character in the middle of the signature segment.
pub fn tamper_signature(token: &str) -> String {
    let (signed, signature) = token.rsplit_once('.').expect("token has three segments");
    let mut chars: Vec<char> = signature.chars().collect();
    let middle = chars.len() / 2;
    chars[middle] = if chars[middle] == 'A' { 'B' } else { 'A' };
    format!("{signed}.{}", chars.into_iter().collect::<String>())
}

/// Serve `body` from the JWKS path. `times` limits how often this mock answers.
pub async fn mount_jwks(server: &MockServer, body: Value, times: Option<u64>) {
    let mock = Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body));
    match times {
        Some(n) => mock.up_to_n_times(n).mount(server).await,
        None => mock.mount(server).await,
    }
}

/// Number of JWKS requests the mock server has received.
pub async fn jwks_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == JWKS_PATH)
        .count()
}

pub fn config(server: &MockServer) -> Config {
    Config::new(&server.uri())
        .expect("mock server URI is a valid base URL")
        .with_fetch_timeout(Duration::from_secs(2))
}
