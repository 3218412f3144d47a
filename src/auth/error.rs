// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::token::TokenError;

/// Authentication and authorization failures.
///
/// The variant is for logs only. Clients see one of three fixed bodies:
/// `Unauthorized`, `Forbidden` or `Internal Server Error`.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Authorization header present but not `Bearer <token>`
    #[error("invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,

    /// Token failed verification
    #[error(transparent)]
    Token(#[from] TokenError),

    /// No principal on a path that requires one
    #[error("authentication is required")]
    Unauthenticated,

    /// Credential store rejected the username/password pair
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Principal present but lacking the required role(s)
    #[error("insufficient permissions for this path")]
    Forbidden,

    /// Unexpected failure inside the auth pipeline
    #[error("internal authentication error: {0}")]
    Internal(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: &'static str,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::Token(err) => err.error_code(),
            AuthError::Unauthenticated => "authentication_required",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::Forbidden => "insufficient_permissions",
            AuthError::Internal(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidAuthHeader
            | AuthError::Token(_)
            | AuthError::Unauthenticated
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden => StatusCode::FORBIDDEN,
            AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients.
    pub fn client_message(&self) -> &'static str {
        match self.status_code() {
            StatusCode::UNAUTHORIZED => "Unauthorized",
            StatusCode::FORBIDDEN => "Forbidden",
            _ => "Internal Server Error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::Internal(detail) = &self {
            tracing::error!(error = %detail, "authentication pipeline failure");
        }
        let body = Json(AuthErrorBody {
            error: self.client_message(),
        });
        (self.status_code(), body).into_response()
    }
}
