// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed token payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Claims carried in the payload segment of an access token.
///
/// Timestamps are Unix epoch seconds. Claims are never mutated after issuance;
/// a new token is always minted from fresh claims.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (unique account identifier, usually the email)
    pub sub: String,

    /// Role names in the order the credential store returned them
    #[serde(default)]
    pub roles: Vec<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,
}

impl Claims {
    /// Build claims valid from `issued_at` until `expires_at` (exclusive).
    pub fn new(
        subject: impl Into<String>,
        roles: Vec<String>,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: subject.into(),
            roles,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.sub
    }

    /// Whether the token is dead at `now`. A token expires at `exp`, not after it.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}
