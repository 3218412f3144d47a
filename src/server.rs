// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Startup: build the process state from [`AppConfig`] and serve the router.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tracing::{info, warn};

use crate::api::router;
use crate::auth::credentials::CredentialError;
use crate::auth::keys::KeyError;
use crate::auth::policy::PolicyError;
use crate::auth::{AuthorizationPolicy, InMemoryCredentialStore, KeyMaterial, TokenService};
use crate::config::{AppConfig, ConfigError};
use crate::state::AppState;
use crate::store::InMemoryStore;

/// In-flight requests get this long to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Anything that stops the server from starting. All of these are fatal.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("signing key: {0}")]
    Keys(#[from] KeyError),

    #[error("user store: {0}")]
    Credentials(#[from] CredentialError),

    #[error("authorization rules: {0}")]
    Policy(#[from] PolicyError),

    #[error("failed to install the rustls crypto provider")]
    CryptoProvider,

    #[error("failed to load TLS certificate: {0}")]
    Tls(#[source] std::io::Error),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Load keys, accounts and rules, then assemble the shared state.
pub fn build_state(config: &AppConfig) -> Result<AppState, StartupError> {
    let keys = match &config.private_key_path {
        Some(path) => {
            let keys = KeyMaterial::from_pem_file(path)?;
            info!(path = %path.display(), kid = %keys.key_id(), "loaded signing key");
            keys
        }
        None => {
            let keys = KeyMaterial::generate()?;
            warn!(kid = %keys.key_id(), "no signing key configured, generated an ephemeral key");
            keys
        }
    };
    let tokens = TokenService::new(Arc::new(keys)).with_ttl(config.token_ttl);

    let credentials = match &config.users_path {
        Some(path) => {
            let store = InMemoryCredentialStore::from_json_file(path)?;
            info!(path = %path.display(), accounts = store.len(), "loaded user accounts");
            store
        }
        None => {
            warn!("no user file configured, every login will fail");
            InMemoryCredentialStore::new()?
        }
    };

    let policy = match &config.rules_path {
        Some(path) => AuthorizationPolicy::from_json_file(path)?,
        None => AuthorizationPolicy::standard()?,
    };
    info!(rules = policy.rules().len(), "authorization policy ready");

    Ok(AppState::new(
        tokens,
        Arc::new(credentials),
        policy,
        InMemoryStore::new(),
    ))
}

/// Serve until Ctrl-C or SIGTERM.
pub async fn run(config: AppConfig) -> Result<(), StartupError> {
    let state = build_state(&config)?;
    let app = router(state);

    let handle: Handle<SocketAddr> = Handle::new();
    tokio::spawn(shutdown_on_signal(handle.clone()));

    match &config.tls {
        Some(tls) => {
            rustls::crypto::ring::default_provider()
                .install_default()
                .map_err(|_| StartupError::CryptoProvider)?;
            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path)
                .await
                .map_err(StartupError::Tls)?;

            info!(addr = %config.bind, "listening on https (docs at /docs)");
            axum_server::bind_rustls(config.bind, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(StartupError::Serve)
        }
        None => {
            info!(addr = %config.bind, "listening on http (docs at /docs)");
            axum_server::bind(config.bind)
                .handle(handle)
                .serve(app.into_make_service())
                .await
                .map_err(StartupError::Serve)
        }
    }
}

async fn shutdown_on_signal(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!(grace_secs = SHUTDOWN_GRACE.as_secs(), "shutting down");
    handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::credentials::hash_password;
    use crate::config::{AUTHZ_RULES_PATH_ENV, JWT_TTL_SECS_ENV, USERS_PATH_ENV};
    use std::collections::HashMap;

    fn config(vars: &[(&str, String)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned()).unwrap()
    }

    #[test]
    fn defaults_build_a_usable_state() {
        let state = build_state(&config(&[])).unwrap();
        assert_eq!(state.tokens.ttl(), Duration::from_secs(3600));
        assert!(state.credentials.principals().is_empty());
        assert!(!state.policy.rules().is_empty());
    }

    #[test]
    fn files_from_config_are_loaded() {
        let users = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            users.path(),
            serde_json::json!([{
                "username": "root@example.com",
                "password_hash": hash_password("pw").unwrap(),
                "roles": ["ADMIN"]
            }])
            .to_string(),
        )
        .unwrap();

        let rules = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            rules.path(),
            r#"[{ "pattern": "/**", "access": "authenticated" }]"#,
        )
        .unwrap();

        let state = build_state(&config(&[
            (USERS_PATH_ENV, users.path().display().to_string()),
            (AUTHZ_RULES_PATH_ENV, rules.path().display().to_string()),
            (JWT_TTL_SECS_ENV, "120".to_string()),
        ]))
        .unwrap();

        assert_eq!(state.credentials.principals().len(), 1);
        assert_eq!(state.policy.rules().len(), 1);
        assert_eq!(state.tokens.ttl(), Duration::from_secs(120));
    }

    #[test]
    fn unreadable_key_file_is_fatal() {
        let result = build_state(&config(&[(
            crate::config::JWT_PRIVATE_KEY_PATH_ENV,
            "/nonexistent/jwt.pem".to_string(),
        )]));
        assert!(matches!(result, Err(StartupError::Keys(_))));
    }

    #[tokio::test]
    async fn graceful_shutdown_stops_a_listening_server() {
        let handle: Handle<SocketAddr> = Handle::new();
        let server = tokio::spawn(
            axum_server::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
                .handle(handle.clone())
                .serve(router(crate::test_support::test_state()).into_make_service()),
        );

        let addr = handle.listening().await.expect("server never started");
        assert!(addr.ip().is_loopback());
        assert_ne!(addr.port(), 0);

        handle.graceful_shutdown(Some(Duration::from_secs(1)));
        let result = tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server did not stop")
            .unwrap();
        assert!(result.is_ok());
    }
}
