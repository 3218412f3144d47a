// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the authenticated principal.
//!
//! Use the `Auth` extractor in handlers behind the gate:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(principal): Auth) -> impl IntoResponse {
//!     // principal was verified by the authentication gate
//! }
//! ```
//!
//! The extractor never looks at headers itself; it only reads the
//! [`AuthContext`] the gate left in the request extensions.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{AuthContext, AuthError, Principal};

/// Extractor for authenticated principals.
pub struct Auth(pub Principal);

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .and_then(AuthContext::principal)
            .cloned()
            .map(Auth)
            .ok_or(AuthError::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts() -> Parts {
        Request::builder().uri("/test").body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn reads_principal_from_context() {
        let mut parts = parts();
        parts
            .extensions
            .insert(AuthContext::authenticated(Principal::new("ana", ["USER"])));

        let Auth(principal) = Auth::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(principal.subject(), "ana");
    }

    #[tokio::test]
    async fn anonymous_context_is_rejected() {
        let mut parts = parts();
        parts.extensions.insert(AuthContext::anonymous());
        let result = Auth::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn missing_context_is_rejected() {
        let result = Auth::from_request_parts(&mut parts(), &()).await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }
}
