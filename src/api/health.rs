// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::models::{HealthChecks, HealthResponse, PingResponse, ReadyResponse};
use crate::state::AppState;

/// Check whether the key set is usable, fetching it if the cache is cold.
async fn check_jwks(state: &AppState) -> &'static str {
    let cache = state.authenticator.cache();
    if cache.is_fresh().await {
        return "ok";
    }
    match cache.get_or_refresh().await {
        Ok(_) => "ok",
        Err(_) => "unavailable",
    }
}

/// Liveness handler.
///
/// Always returns 200 if the process is running.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is alive", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}

/// Readiness handler.
///
/// Returns 200 only if the signing keys can be obtained.
#[utoipa::path(
    get,
    path = "/api/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadyResponse),
        (status = 503, description = "Service is not ready", body = ReadyResponse)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let jwks = check_jwks(&state).await;
    let ready = jwks == "ok";

    let response = ReadyResponse {
        status: if ready { "ok" } else { "degraded" }.to_string(),
        checks: HealthChecks {
            service: "ok".to_string(),
            jwks: jwks.to_string(),
        },
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

#[utoipa::path(
    get,
    path = "/api/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Pong with server time", body = PingResponse)
    )
)]
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        pong: true,
        ts: Utc::now(),
    })
}
