// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Stateless RS256 bearer tokens for the ticket logger API.
//!
//! ## Auth Flow
//!
//! 1. Client posts username/password to `/api/auth/authenticate`
//! 2. The credential store checks the password and returns a principal
//! 3. The server signs `{sub, roles, iat, exp}` with its private key and
//!    returns the token
//! 4. Client sends `Authorization: Bearer <token>` on every request
//! 5. The authentication gate verifies the token with the public key and
//!    attaches the principal; the policy then admits or denies the path
//!
//! ## Security
//!
//! - No server-side sessions; a token dies at `exp`
//! - Signature, structure and expiry failures are all a plain 401 to the client
//! - The gate and the policy run once per request, before any handler

pub mod authenticator;
pub mod claims;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod keys;
pub mod middleware;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod token;

pub use authenticator::{Authentication, Authenticator};
pub use claims::Claims;
pub use credentials::{CredentialStore, InMemoryCredentialStore};
pub use error::AuthError;
pub use extractor::Auth;
pub use keys::KeyMaterial;
pub use middleware::{authentication_gate, authorization_gate, AuthContext};
pub use policy::{Access, AuthorizationPolicy, AuthorizationRule, Decision};
pub use principal::Principal;
pub use token::{TokenError, TokenService};
