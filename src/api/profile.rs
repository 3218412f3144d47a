// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Current principal endpoint.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{Auth, Principal};

/// Response for GET /api/profile
#[derive(Debug, Serialize, ToSchema)]
pub struct ProfileResponse {
    /// Username the token was issued to
    pub username: String,
    /// Roles carried by the token
    pub roles: Vec<String>,
}

impl From<Principal> for ProfileResponse {
    fn from(principal: Principal) -> Self {
        Self {
            username: principal.subject().to_string(),
            roles: principal.roles().iter().cloned().collect(),
        }
    }
}

/// Get the identity and roles of the caller.
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller's profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 403, description = "Forbidden - USER role required"),
    )
)]
pub async fn get_profile(Auth(principal): Auth) -> Json<ProfileResponse> {
    Json(principal.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_response_from_principal() {
        let principal = Principal::new("ana@example.com", ["ROLE_USER", "ROLE_MANAGER"]);
        let response: ProfileResponse = principal.into();
        assert_eq!(response.username, "ana@example.com");
        assert_eq!(response.roles, vec!["ROLE_MANAGER", "ROLE_USER"]);
    }
}
