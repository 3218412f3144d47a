// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication gate and authorization policy middleware for Axum.
//!
//! Both are installed once, at the root of the router, in this order:
//!
//! 1. [`authentication_gate`] reads the `Authorization` header, verifies the
//!    bearer token and stores an [`AuthContext`] in the request extensions.
//!    A bad header or token ends the request with 401.
//! 2. [`authorization_gate`] reads that context and consults the
//!    [`AuthorizationPolicy`](super::AuthorizationPolicy). Deny ends the
//!    request with 401 (anonymous) or 403 (authenticated).
//!
//! Handlers only ever see requests that passed both.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .route("/api/profile", get(get_profile))
//!     .layer(
//!         ServiceBuilder::new()
//!             .layer(from_fn_with_state(state.clone(), authentication_gate))
//!             .layer(from_fn_with_state(state, authorization_gate)),
//!     );
//! ```

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::{AuthError, AuthorizationRule, Decision, Principal, TokenService};
use crate::state::AppState;

/// Outcome of the authentication gate, carried in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    principal: Option<Principal>,
}

impl AuthContext {
    pub fn anonymous() -> Self {
        Self { principal: None }
    }

    pub fn authenticated(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }
}

/// Run the gate state machine over the request headers.
///
/// - no header: anonymous context
/// - header that is not `Bearer <token>`: `InvalidAuthHeader`
/// - token that fails verification: `Token(..)`
/// - verified token: context with the principal from its claims
pub fn authenticate_headers(
    headers: &HeaderMap,
    tokens: &TokenService,
) -> Result<AuthContext, AuthError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(AuthContext::anonymous());
    };

    let raw = value.to_str().map_err(|_| AuthError::InvalidAuthHeader)?;
    let token = bearer_token(raw)?;
    let claims = tokens.verify(token)?;

    Ok(AuthContext::authenticated(Principal::from(claims)))
}

fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let (scheme, token) = header
        .trim()
        .split_once(' ')
        .ok_or(AuthError::InvalidAuthHeader)?;

    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(AuthError::InvalidAuthHeader);
    }

    let token = token.trim();
    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Authentication gate middleware.
pub async fn authentication_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if request.extensions().get::<AuthContext>().is_some() {
        return AuthError::Internal("authentication gate ran twice".to_string()).into_response();
    }

    match authenticate_headers(request.headers(), &state.tokens) {
        Ok(context) => {
            if let Some(principal) = context.principal() {
                debug!(subject = %principal.subject(), "request authenticated");
            }
            request.extensions_mut().insert(context);
            next.run(request).await
        }
        Err(err) => {
            warn!(
                path = %request.uri().path(),
                error_code = err.error_code(),
                reason = %err,
                "rejected request credentials"
            );
            err.into_response()
        }
    }
}

/// Authorization policy middleware. Must run after [`authentication_gate`].
pub async fn authorization_gate(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(context) = request.extensions().get::<AuthContext>() else {
        return AuthError::Internal("authorization ran before authentication".to_string())
            .into_response();
    };

    let path = request.uri().path();
    let rejection = match state.policy.authorize(path, context.principal()) {
        Decision::Admit => None,
        Decision::Deny => Some(match context.principal() {
            Some(principal) => {
                let rule = state.policy.matching_rule(path).map(AuthorizationRule::pattern);
                warn!(
                    path = %path,
                    subject = %principal.subject(),
                    rule = rule.unwrap_or("<none>"),
                    "access denied"
                );
                AuthError::Forbidden
            }
            None => {
                debug!(path = %path, "anonymous request to protected path");
                AuthError::Unauthenticated
            }
        }),
    };

    match rejection {
        None => next.run(request).await,
        Some(err) => err.into_response(),
    }
}
