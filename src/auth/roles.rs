// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Role names used for authorization.
//!
//! Roles travel as plain strings inside tokens so that roles unknown to this
//! service pass through untouched. Comparison ignores ASCII case and the
//! conventional `ROLE_` prefix, so `ROLE_ADMIN`, `admin` and `ADMIN` all name
//! the same role.

/// Full administrative access (user management, API docs).
pub const ADMIN: &str = "ADMIN";

/// Regional management (regions and provinces).
pub const MANAGER: &str = "MANAGER";

/// Regular account holder (own profile).
pub const USER: &str = "USER";

const ROLE_PREFIX: &str = "ROLE_";

/// Strip surrounding whitespace and the `ROLE_` prefix from a role name.
pub fn normalize(role: &str) -> &str {
    let trimmed = role.trim();
    match trimmed.get(..ROLE_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(ROLE_PREFIX) => &trimmed[ROLE_PREFIX.len()..],
        _ => trimmed,
    }
}

/// Check whether two role names refer to the same role.
pub fn same_role(left: &str, right: &str) -> bool {
    let left = normalize(left);
    !left.is_empty() && left.eq_ignore_ascii_case(normalize(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_prefix() {
        assert_eq!(normalize("ROLE_ADMIN"), "ADMIN");
        assert_eq!(normalize("role_manager"), "manager");
        assert_eq!(normalize("  USER "), "USER");
        assert_eq!(normalize("ROLE"), "ROLE");
    }

    #[test]
    fn same_role_ignores_case_and_prefix() {
        assert!(same_role("ROLE_ADMIN", ADMIN));
        assert!(same_role("admin", "ROLE_Admin"));
        assert!(!same_role("ADMIN", "MANAGER"));
    }

    #[test]
    fn empty_roles_never_match() {
        assert!(!same_role("", ""));
        assert!(!same_role("ROLE_", "ROLE_"));
    }
}
