// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
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
    auth::{
        authentication_gate, authorization_gate,
        keys::{PublicJwk, PublicJwkSet},
    },
    error::ApiError,
    models::{CreateProvinceRequest, CreateRegionRequest, Province, Region},
    state::AppState,
};

pub mod auth;
pub mod health;
pub mod profile;
pub mod provinces;
pub mod regions;
pub mod users;

/// Build the application router.
///
/// Every route, the docs and the fallback sit behind the authentication
/// gate and the authorization policy; which paths are public is decided by
/// the policy alone.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/auth/authenticate", post(auth::authenticate))
        .route("/api/auth/jwks", get(auth::jwks))
        .route("/api/profile", get(profile::get_profile))
        .route("/api/users", get(users::list_users))
        .route(
            "/api/regions",
            get(regions::list_regions).post(regions::create_region),
        )
        .route("/api/regions/{region_id}", get(regions::get_region))
        .route(
            "/api/provinces",
            get(provinces::list_provinces).post(provinces::create_province),
        )
        .route("/api/provinces/{province_id}", get(provinces::get_province))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive())
                .layer(from_fn_with_state(state.clone(), authentication_gate))
                .layer(from_fn_with_state(state.clone(), authorization_gate)),
        )
        .with_state(state)
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::authenticate,
        auth::jwks,
        profile::get_profile,
        users::list_users,
        regions::list_regions,
        regions::get_region,
        regions::create_region,
        provinces::list_provinces,
        provinces::get_province,
        provinces::create_province
    ),
    components(
        schemas(
            health::HealthResponse,
            auth::AuthenticationRequest,
            auth::AuthenticationResponse,
            profile::ProfileResponse,
            PublicJwk,
            PublicJwkSet,
            Region,
            CreateRegionRequest,
            Province,
            CreateProvinceRequest
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Auth", description = "Token issuance and verification keys"),
        (name = "Profile", description = "Current principal"),
        (name = "Users", description = "Account administration"),
        (name = "Regions", description = "Region catalog"),
        (name = "Provinces", description = "Province catalog")
    ),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

/// Registers the `bearer` scheme that protected paths reference.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
