// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Supabase JWT authentication for the CRM API.
//!
//! ## Auth Flow
//!
//! 1. Frontend signs the user in with Supabase Auth
//! 2. Frontend sends `Authorization: Bearer <access token>`
//! 3. Server:
//!    - Gets the project JWKS from the cache (fetching on miss or expiry)
//!    - Verifies the token signature, expiry and issuer
//!    - Exposes `sub` as `user_id` plus the full claim set to handlers
//!
//! ## Security
//!
//! - All CRM endpoints require authentication
//! - JWKS is cached for a configurable TTL and refreshed once on unknown `kid`
//! - Fail-closed: without a fresh key set, requests are rejected
//! - Clients only ever see "Missing bearer token" or "Invalid token"

pub mod authenticator;
pub mod cache;
pub mod claims;
pub mod error;
pub mod extractor;
pub mod jwks;
pub mod middleware;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_keys;

pub use authenticator::TokenAuthenticator;
pub use cache::{CacheError, KeySetCache};
pub use claims::{AuthenticatedUser, VerifiedClaims};
pub use error::AuthError;
pub use extractor::Auth;
pub use jwks::{FetchError, HttpKeySetFetcher, KeySet, KeySetFetcher};
pub use verifier::{SignatureVerifier, TokenError};
