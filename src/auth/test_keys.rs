// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signing keys and token minting for unit tests.

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;

use super::jwks::KeySet;

pub const ISSUER: &str = "https://project.supabase.co/auth/v1";

pub const ES256_KID: &str = "es256-key-a";
pub const RS256_KID: &str = "rs256-key-b";

const ES256_PRIVATE: &str = include_str!("../../tests/fixtures/es256_private.pem");
const ES256_ROGUE_PRIVATE: &str = include_str!("../../tests/fixtures/es256_rogue_private.pem");
const RS256_PRIVATE: &str = include_str!("../../tests/fixtures/rs256_private.pem");
const ES256_JWK: &str = include_str!("../../tests/fixtures/es256_public.jwk.json");
const RS256_JWK: &str = include_str!("../../tests/fixtures/rs256_public.jwk.json");

pub enum TestKey {
    Es256,
    Rs256,
    /// P-256 key absent from every key set.
    Rogue,
}

impl TestKey {
    fn encoding_key(&self) -> EncodingKey {
        match self {
            TestKey::Es256 => EncodingKey::from_ec_pem(ES256_PRIVATE.as_bytes()),
            TestKey::Rogue => EncodingKey::from_ec_pem(ES256_ROGUE_PRIVATE.as_bytes()),
            TestKey::Rs256 => EncodingKey::from_rsa_pem(RS256_PRIVATE.as_bytes()),
        }
        .expect("fixture key must parse")
    }
}

/// Key set holding the public halves of the requested fixtures.
pub fn key_set(with_es256: bool, with_rs256: bool) -> KeySet {
    let mut keys = Vec::new();
    if with_es256 {
        keys.push(ES256_JWK);
    }
    if with_rs256 {
        keys.push(RS256_JWK);
    }
    KeySet::parse(format!(r#"{{"keys":[{}]}}"#, keys.join(",")).as_bytes())
        .expect("fixture key set must parse")
}

/// The RS256 fixture with its JWK `alg` replaced by `alg`.
pub fn rs256_key_set_pinned_to(alg: &str) -> KeySet {
    let jwk = RS256_JWK.replace(r#""alg": "RS256""#, &format!(r#""alg": "{alg}""#));
    assert_ne!(jwk, RS256_JWK, "fixture JWK must declare RS256");
    KeySet::parse(format!(r#"{{"keys":[{jwk}]}}"#).as_bytes()).expect("fixture key set must parse")
}

pub fn sign(key: TestKey, alg: Algorithm, kid: Option<&str>, claims: &Value) -> String {
    let mut header = Header::new(alg);
    header.kid = kid.map(str::to_string);
    encode(&header, claims, &key.encoding_key()).expect("fixture token must sign")
}

pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Flip one character in the middle of the signature segment.
pub fn tamper_signature(token: &str) -> String {
    let (signed, signature) = token.rsplit_once('.').expect("token has three segments");
    let mut chars: Vec<char> = signature.chars().collect();
    let middle = chars.len() / 2;
    chars[middle] = if chars[middle] == 'A' { 'B' } else { 'A' };
    format!("{signed}.{}", chars.into_iter().collect::<String>())
}
