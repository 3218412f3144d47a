// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the [`AppConfig`] read from them
//! once at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `JWT_PRIVATE_KEY_PATH` | RSA private key PEM (PKCS#8 or PKCS#1) | Fresh 2048-bit key per process |
//! | `JWT_TTL_SECS` | Access token lifetime in seconds, at most 30 days | `3600` |
//! | `AUTHZ_RULES_PATH` | JSON route authorization table | Built-in table |
//! | `USERS_PATH` | JSON account seed file (Argon2 PHC hashes) | No accounts |
//! | `TLS_CERT_PATH` | PEM certificate chain; enables HTTPS with `TLS_KEY_PATH` | Plain HTTP |
//! | `TLS_KEY_PATH` | PEM private key for `TLS_CERT_PATH` | Plain HTTP |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::token::{DEFAULT_TOKEN_TTL, MAX_TOKEN_TTL};
use crate::logging::LogFormat;

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Path to the token signing key.
///
/// When unset a key is generated at startup, so tokens do not survive a
/// restart and cannot be verified by other instances.
pub const JWT_PRIVATE_KEY_PATH_ENV: &str = "JWT_PRIVATE_KEY_PATH";
pub const JWT_TTL_SECS_ENV: &str = "JWT_TTL_SECS";
pub const AUTHZ_RULES_PATH_ENV: &str = "AUTHZ_RULES_PATH";
pub const USERS_PATH_ENV: &str = "USERS_PATH";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("HOST is not an IP address: {0}")]
    InvalidHost(String),

    #[error("PORT is not a port number: {0}")]
    InvalidPort(String),

    #[error("JWT_TTL_SECS must be between 1 and 2592000 seconds, got {0}")]
    InvalidTtl(String),

    #[error("TLS_CERT_PATH and TLS_KEY_PATH must be set together")]
    IncompleteTls,

    #[error("LOG_FORMAT must be json or pretty, got {0}")]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub private_key_path: Option<PathBuf>,
    pub token_ttl: Duration,
    pub rules_path: Option<PathBuf>,
    pub users_path: Option<PathBuf>,
    pub tls: Option<TlsConfig>,
    pub log_format: LogFormat,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let path = |name: &str| get(name).map(PathBuf::from);

        let host = get(HOST_ENV).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host: IpAddr = host
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidHost(host.clone()))?;

        let port = match get(PORT_ENV) {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let token_ttl = match get(JWT_TTL_SECS_ENV) {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 && secs <= MAX_TOKEN_TTL.as_secs() => {
                    Duration::from_secs(secs)
                }
                _ => return Err(ConfigError::InvalidTtl(raw)),
            },
            None => DEFAULT_TOKEN_TTL,
        };

        let tls = match (path(TLS_CERT_PATH_ENV), path(TLS_KEY_PATH_ENV)) {
            (Some(cert_path), Some(key_path)) => Some(TlsConfig {
                cert_path,
                key_path,
            }),
            (None, None) => None,
            _ => return Err(ConfigError::IncompleteTls),
        };

        let log_format = match get(LOG_FORMAT_ENV) {
            Some(raw) => raw
                .parse()
                .map_err(|_| ConfigError::InvalidLogFormat(raw))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind: SocketAddr::new(host, port),
            private_key_path: path(JWT_PRIVATE_KEY_PATH_ENV),
            token_ttl,
            rules_path: path(AUTHZ_RULES_PATH_ENV),
            users_path: path(USERS_PATH_ENV),
            tls,
            log_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config(&[]).unwrap();
        assert_eq!(config.bind, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.token_ttl, Duration::from_secs(3600));
        assert_eq!(config.private_key_path, None);
        assert_eq!(config.tls, None);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn explicit_values_are_used() {
        let config = config(&[
            (HOST_ENV, "127.0.0.1"),
            (PORT_ENV, "9443"),
            (JWT_TTL_SECS_ENV, "60"),
            (JWT_PRIVATE_KEY_PATH_ENV, "/etc/api/jwt.pem"),
            (TLS_CERT_PATH_ENV, "/etc/api/cert.pem"),
            (TLS_KEY_PATH_ENV, "/etc/api/key.pem"),
            (LOG_FORMAT_ENV, "json"),
        ])
        .unwrap();

        assert_eq!(config.bind, "127.0.0.1:9443".parse().unwrap());
        assert_eq!(config.token_ttl, Duration::from_secs(60));
        assert_eq!(
            config.private_key_path,
            Some(PathBuf::from("/etc/api/jwt.pem"))
        );
        assert!(config.tls.is_some());
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn invalid_values_are_startup_errors() {
        assert_eq!(
            config(&[(PORT_ENV, "http")]),
            Err(ConfigError::InvalidPort("http".to_string()))
        );
        assert_eq!(
            config(&[(JWT_TTL_SECS_ENV, "0")]),
            Err(ConfigError::InvalidTtl("0".to_string()))
        );
        assert_eq!(
            config(&[(JWT_TTL_SECS_ENV, "18446744073709551615")]),
            Err(ConfigError::InvalidTtl("18446744073709551615".to_string()))
        );
        assert_eq!(
            config(&[(JWT_TTL_SECS_ENV, "2592001")]),
            Err(ConfigError::InvalidTtl("2592001".to_string()))
        );
        assert_eq!(
            config(&[(TLS_CERT_PATH_ENV, "/cert.pem")]),
            Err(ConfigError::IncompleteTls)
        );
        assert!(matches!(
            config(&[(LOG_FORMAT_ENV, "xml")]),
            Err(ConfigError::InvalidLogFormat(_))
        ));
    }

    #[test]
    fn longest_accepted_ttl_mints_live_tokens() {
        let config = config(&[(JWT_TTL_SECS_ENV, "2592000")]).unwrap();
        assert_eq!(config.token_ttl, MAX_TOKEN_TTL);

        let tokens = crate::auth::TokenService::new(crate::test_support::shared_keys())
            .with_ttl(config.token_ttl);
        let token = tokens.issue("ana", &[]).unwrap();
        assert!(tokens.verify(&token).is_ok());
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = config(&[(PORT_ENV, "  "), (USERS_PATH_ENV, "")]).unwrap();
        assert_eq!(config.bind.port(), DEFAULT_PORT);
        assert_eq!(config.users_path, None);
    }
}
