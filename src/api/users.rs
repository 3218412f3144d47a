// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account listing, ADMIN only.

use axum::{extract::State, Json};

use crate::api::profile::ProfileResponse;
use crate::state::AppState;

/// List enabled accounts. Password hashes are never returned.
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Enabled accounts", body = [ProfileResponse]),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - ADMIN role required"),
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Json<Vec<ProfileResponse>> {
    Json(
        state
            .credentials
            .principals()
            .into_iter()
            .map(ProfileResponse::from)
            .collect(),
    )
}
