// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Placeholder account endpoints.
//!
//! Sign-up and sign-in happen against Supabase Auth directly; these only echo
//! the fields they recognise.

use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};

use crate::{
    error::ApiError,
    models::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
};

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::new(rejection.status(), rejection.body_text()))
}

#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    tag = "Account",
    responses(
        (status = 201, body = RegisterResponse),
        (status = 422, description = "Body is not a valid registration payload")
    )
)]
pub async fn register(
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let saw = body(payload)?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { ok: true, saw })))
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    tag = "Account",
    responses(
        (status = 200, body = LoginResponse),
        (status = 422, description = "Body is not a valid login payload")
    )
)]
pub async fn login(
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let saw = body(payload)?;
    Ok(Json(LoginResponse { ok: true, saw }))
}
