// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential exchange: username/password in, access token out.

use std::sync::Arc;

use tracing::{info, warn};

use super::credentials::CredentialStore;
use super::error::AuthError;
use super::principal::Principal;
use super::token::TokenService;

/// Status message returned alongside a freshly minted token.
pub const AUTHENTICATION_SUCCESS_MESSAGE: &str = "Authentication successful";

/// Result of a successful credential exchange.
#[derive(Debug, Clone)]
pub struct Authentication {
    pub token: String,
    pub message: String,
    pub principal: Principal,
}

/// Verifies credentials through the store and mints tokens.
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
}

impl Authenticator {
    pub fn new(credentials: Arc<dyn CredentialStore>, tokens: Arc<TokenService>) -> Self {
        Self {
            credentials,
            tokens,
        }
    }

    /// Exchange credentials for a token.
    ///
    /// Store failures come back as `InvalidCredentials` regardless of cause.
    /// The password check runs on the blocking pool.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Authentication, AuthError> {
        let credentials = Arc::clone(&self.credentials);
        let (username, password) = (username.to_owned(), password.to_owned());

        let principal = tokio::task::spawn_blocking(move || {
            credentials.authenticate(&username, &password)
        })
        .await
        .map_err(|e| AuthError::Internal(format!("credential check aborted: {e}")))?
        .inspect_err(|_| warn!("credential check failed"))?;

        let roles: Vec<String> = principal.roles().iter().cloned().collect();
        let token = self
            .tokens
            .issue(principal.subject(), &roles)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        info!(
            subject = %principal.subject(),
            roles = roles.len(),
            ttl_secs = self.tokens.ttl().as_secs(),
            "issued access token"
        );

        Ok(Authentication {
            token,
            message: AUTHENTICATION_SUCCESS_MESSAGE.to_string(),
            principal,
        })
    }
}
