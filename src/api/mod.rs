// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::middleware::require_bearer,
    models::{
        HealthChecks, HealthResponse, LoginRequest, LoginResponse, MeResponse, PingResponse,
        ReadyResponse, RegisterRequest, RegisterResponse,
    },
    state::AppState,
};

pub mod account;
pub mod health;
pub mod me;

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/me", get(me::me))
        .route_layer(from_fn_with_state(state.clone(), require_bearer));

    let api_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/ping", get(health::ping))
        .route("/register", post(account::register))
        .route("/login", post(account::login))
        .merge(protected)
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::readiness,
        health::ping,
        account::register,
        account::login,
        me::me
    ),
    components(
        schemas(
            HealthResponse,
            ReadyResponse,
            HealthChecks,
            PingResponse,
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            LoginResponse,
            MeResponse
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Health", description = "Liveness, readiness and ping"),
        (name = "Account", description = "Placeholder registration and login"),
        (name = "Identity", description = "The authenticated caller")
    )
)]
struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
