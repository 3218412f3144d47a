// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::{AuthorizationPolicy, Authenticator, CredentialStore, TokenService};
use crate::store::InMemoryStore;

/// Process-wide handles, built once at startup and cloned into every request.
#[derive(Clone)]
pub struct AppState {
    pub tokens: Arc<TokenService>,
    pub authenticator: Arc<Authenticator>,
    pub credentials: Arc<dyn CredentialStore>,
    pub policy: Arc<AuthorizationPolicy>,
    pub store: Arc<RwLock<InMemoryStore>>,
}

impl AppState {
    pub fn new(
        tokens: TokenService,
        credentials: Arc<dyn CredentialStore>,
        policy: AuthorizationPolicy,
        store: InMemoryStore,
    ) -> Self {
        let tokens = Arc::new(tokens);
        let authenticator = Authenticator::new(Arc::clone(&credentials), Arc::clone(&tokens));
        Self {
            tokens,
            authenticator: Arc::new(authenticator),
            credentials,
            policy: Arc::new(policy),
            store: Arc::new(RwLock::new(store)),
        }
    }
}
