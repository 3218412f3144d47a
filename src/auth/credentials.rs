// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential store boundary and its in-memory implementation.
//!
//! Password checks are CPU-bound (Argon2id), so the trait is synchronous and
//! callers run it on the blocking pool.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::Deserialize;

use super::error::AuthError;
use super::principal::Principal;

/// Resolves username/password pairs to principals.
pub trait CredentialStore: Send + Sync {
    /// Verify the credentials and return the account's principal.
    ///
    /// Every failure is `AuthError::InvalidCredentials`, whether the account is
    /// unknown, disabled, or the password is wrong.
    fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError>;

    /// All enabled accounts, for administrative listing.
    fn principals(&self) -> Vec<Principal>;
}

/// Errors while building or seeding a store.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("user {0} already exists")]
    Duplicate(String),

    #[error("user {0} has an invalid password hash")]
    InvalidHash(String),

    #[error("failed to read users file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse users file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Stored account.
#[derive(Debug, Clone, Deserialize)]
pub struct UserRecord {
    pub username: String,
    /// Argon2 PHC string (`$argon2id$v=19$...`)
    pub password_hash: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

/// Hash a password into an Argon2id PHC string.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hash(e.to_string()))
}

/// Accounts held in memory, keyed by username.
pub struct InMemoryCredentialStore {
    users: HashMap<String, UserRecord>,
    /// Verified against when the username is unknown, so that unknown and
    /// known accounts cost the same.
    dummy_hash: String,
}

impl InMemoryCredentialStore {
    pub fn new() -> Result<Self, CredentialError> {
        Ok(Self {
            users: HashMap::new(),
            dummy_hash: hash_password("not-a-real-password")?,
        })
    }

    /// Load accounts from a JSON array of [`UserRecord`]s.
    pub fn from_json_file(path: &Path) -> Result<Self, CredentialError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CredentialError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CredentialError> {
        let records: Vec<UserRecord> = serde_json::from_str(raw)?;
        let mut store = Self::new()?;
        for record in records {
            store.insert_record(record)?;
        }
        Ok(store)
    }

    /// Add an account from an already-hashed record.
    pub fn insert_record(&mut self, record: UserRecord) -> Result<(), CredentialError> {
        if PasswordHash::new(&record.password_hash).is_err() {
            return Err(CredentialError::InvalidHash(record.username));
        }
        if self.users.contains_key(&record.username) {
            return Err(CredentialError::Duplicate(record.username));
        }
        self.users.insert(record.username.clone(), record);
        Ok(())
    }

    /// Add an enabled account, hashing `password`.
    pub fn insert_user<I, R>(
        &mut self,
        username: impl Into<String>,
        password: &str,
        roles: I,
    ) -> Result<(), CredentialError>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.insert_record(UserRecord {
            username: username.into(),
            password_hash: hash_password(password)?,
            roles: roles.into_iter().map(Into::into).collect(),
            enabled: true,
        })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn password_matches(password: &str, phc: &str) -> bool {
    match PasswordHash::new(phc) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn authenticate(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        let Some(record) = self.users.get(username) else {
            password_matches(password, &self.dummy_hash);
            return Err(AuthError::InvalidCredentials);
        };

        if password_matches(password, &record.password_hash) && record.enabled {
            Ok(Principal::new(record.username.clone(), record.roles.clone()))
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    fn principals(&self) -> Vec<Principal> {
        let mut principals: Vec<Principal> = self
            .users
            .values()
            .filter(|record| record.enabled)
            .map(|record| Principal::new(record.username.clone(), record.roles.clone()))
            .collect();
        principals.sort_by(|a, b| a.subject().cmp(b.subject()));
        principals
    }
}
