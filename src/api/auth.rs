// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and public key endpoints. Both are public.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::keys::PublicJwkSet;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /api/auth/authenticate
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AuthenticationRequest {
    pub username: String,
    pub password: String,
}

/// Response for POST /api/auth/authenticate
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticationResponse {
    /// Signed RS256 access token
    pub token: String,
    pub message: String,
}

/// Exchange username and password for an access token.
#[utoipa::path(
    post,
    path = "/api/auth/authenticate",
    tag = "Auth",
    request_body = AuthenticationRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = AuthenticationResponse),
        (status = 400, description = "Username or password missing"),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn authenticate(
    State(state): State<AppState>,
    payload: Result<Json<AuthenticationRequest>, JsonRejection>,
) -> Result<Json<AuthenticationResponse>, ApiError> {
    let Json(request) = payload?;
    if request.username.trim().is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("username and password are required"));
    }

    let authentication = state
        .authenticator
        .authenticate(request.username.trim(), &request.password)
        .await?;

    Ok(Json(AuthenticationResponse {
        token: authentication.token,
        message: authentication.message,
    }))
}

/// Public verification key as a JWK set.
#[utoipa::path(
    get,
    path = "/api/auth/jwks",
    tag = "Auth",
    responses(
        (status = 200, description = "Token verification keys", body = PublicJwkSet),
    )
)]
pub async fn jwks(State(state): State<AppState>) -> Json<PublicJwkSet> {
    Json(PublicJwkSet {
        keys: vec![state.tokens.keys().public_jwk().clone()],
    })
}
