// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::Json;

use crate::{auth::Auth, models::MeResponse};

/// Return the authenticated caller and every claim in their token.
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Identity",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Caller identity", body = MeResponse),
        (status = 401, description = "Missing or invalid bearer token")
    )
)]
pub async fn me(Auth(user): Auth) -> Json<MeResponse> {
    tracing::debug!(user_id = %user.user_id, role = ?user.claims.role(), "Serving caller identity");
    Json(MeResponse::from(&user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use serde_json::{json, Map};

    use crate::auth::{AuthenticatedUser, VerifiedClaims};

    #[tokio::test]
    async fn returns_subject_and_all_claims() {
        let mut extra = Map::new();
        extra.insert("role".into(), json!("authenticated"));
        extra.insert("email".into(), json!("ada@example.com"));
        let user = AuthenticatedUser {
            user_id: "user-1".into(),
            claims: Arc::new(VerifiedClaims {
                subject: "user-1".into(),
                issuer: "https://project.supabase.co/auth/v1".into(),
                expires_at: Some(2_000_000_000),
                extra,
            }),
        };

        let Json(response) = me(Auth(user)).await;
        assert_eq!(response.user_id, "user-1");
        assert_eq!(response.claims["sub"], "user-1");
        assert_eq!(response.claims["iss"], "https://project.supabase.co/auth/v1");
        assert_eq!(response.claims["exp"], 2_000_000_000);
        assert_eq!(response.claims["role"], "authenticated");
        assert_eq!(response.claims["email"], "ada@example.com");
    }
}
