// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the public and identity endpoints. All
//! types derive `ToSchema` for the OpenAPI document.
//!
//! ## Model Categories
//!
//! - **Health**: liveness, readiness and ping payloads
//! - **Account**: placeholder register/login echoes (sign-up and sign-in
//!   happen against Supabase Auth directly)
//! - **Identity**: the caller as seen by the token gate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::auth::AuthenticatedUser;

// =============================================================================
// Health Models
// =============================================================================

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Readiness response with individual component status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct ReadyResponse {
    /// Overall status ("ok" or "degraded").
    pub status: String,
    pub checks: HealthChecks,
}

/// Individual readiness check results.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct HealthChecks {
    /// Whether the service process is running.
    pub service: String,
    /// JWKS (authentication keys) status: "ok" or "unavailable".
    pub jwks: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PingResponse {
    pub pong: bool,
    /// Server time (RFC 3339).
    pub ts: DateTime<Utc>,
}

// =============================================================================
// Account Models
// =============================================================================

/// Registration payload. Unknown fields are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
pub struct RegisterRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
pub struct LoginRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Echo of the accepted registration fields.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct RegisterResponse {
    pub ok: bool,
    pub saw: RegisterRequest,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LoginResponse {
    pub ok: bool,
    pub saw: LoginRequest,
}

// =============================================================================
// Identity Models
// =============================================================================

/// The authenticated caller.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    /// Supabase user ID (`sub` claim).
    pub user_id: String,
    /// Every claim in the verified token.
    #[schema(value_type = Object)]
    pub claims: Map<String, Value>,
}

impl From<&AuthenticatedUser> for MeResponse {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            user_id: user.user_id.clone(),
            claims: user.claims.raw_claims(),
        }
    }
}
