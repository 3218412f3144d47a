// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authenticated identity attached to a request.

use std::collections::BTreeSet;

use serde::Serialize;
use utoipa::ToSchema;

use super::claims::Claims;
use super::roles;

/// An authenticated identity and its role set.
///
/// Produced either by the credential store at login time or from verified
/// token claims. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct Principal {
    subject: String,
    roles: BTreeSet<String>,
}

impl Principal {
    pub fn new<I, R>(subject: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        Self {
            subject: subject.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Check if the principal holds `role`.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|held| roles::same_role(held, role))
    }

    /// True if at least one of `required` is held.
    pub fn has_any_role<'a>(&self, required: impl IntoIterator<Item = &'a String>) -> bool {
        required.into_iter().any(|role| self.has_role(role))
    }

    /// True if every one of `required` is held.
    pub fn has_all_roles<'a>(&self, required: impl IntoIterator<Item = &'a String>) -> bool {
        required.into_iter().all(|role| self.has_role(role))
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self::new(claims.sub, claims.roles)
    }
}
