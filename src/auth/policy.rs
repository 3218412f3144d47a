// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Route-to-role authorization table.
//!
//! ## Matching
//!
//! Patterns are `/`-separated segments: a literal, `*` (exactly one segment)
//! or `**` (zero or more segments). `/api/users/**` therefore matches both
//! `/api/users` and `/api/users/42/roles`.
//!
//! Of all matching rules the highest ranked decides, ranked by explicit
//! `match_priority`, then specificity (more literal segments, fewer
//! wildcards), then declaration order.
//!
//! ## Defaults
//!
//! With no matching rule, any authenticated principal is admitted and
//! anonymous requests are denied.

use std::cmp::Reverse;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::principal::Principal;
use super::roles;

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Admit,
    Deny,
}

/// What a rule requires of the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    /// Anyone, with or without a token
    Public,
    /// Any verified principal
    Authenticated,
    /// Principal holding at least one of the roles
    AnyOf(BTreeSet<String>),
    /// Principal holding every one of the roles
    AllOf(BTreeSet<String>),
}

impl Access {
    fn admits(&self, principal: Option<&Principal>) -> bool {
        match (self, principal) {
            (Access::Public, _) => true,
            (_, None) => false,
            (Access::Authenticated, Some(_)) => true,
            (Access::AnyOf(required), Some(principal)) => principal.has_any_role(required),
            (Access::AllOf(required), Some(principal)) => {
                !required.is_empty() && principal.has_all_roles(required)
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("pattern {0:?} must start with '/'")]
    InvalidPattern(String),

    #[error("rule for {0:?} lists no roles")]
    EmptyRoles(String),

    #[error("failed to read rules file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rules file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Single,
    Rest,
}

/// Ant-style path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Ordering key: more literals first, then fewer `**`, then fewer `*`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Specificity {
    literals: usize,
    rests: Reverse<usize>,
    singles: Reverse<usize>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, PolicyError> {
        if !raw.starts_with('/') {
            return Err(PolicyError::InvalidPattern(raw.to_string()));
        }
        let segments = raw
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s {
                "**" => Segment::Rest,
                "*" => Segment::Single,
                literal => Segment::Literal(literal.to_string()),
            })
            .collect();
        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn matches(&self, path: &[&str]) -> bool {
        matches_from(&self.segments, path)
    }

    fn specificity(&self) -> Specificity {
        let count = |wanted: fn(&Segment) -> bool| {
            self.segments.iter().filter(|s| wanted(*s)).count()
        };
        Specificity {
            literals: count(|s| matches!(s, Segment::Literal(_))),
            rests: Reverse(count(|s| matches!(s, Segment::Rest))),
            singles: Reverse(count(|s| matches!(s, Segment::Single))),
        }
    }
}

fn matches_from(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::Rest, rest)) => (0..=path.len()).any(|skip| matches_from(rest, &path[skip..])),
        Some((segment, rest)) => match path.split_first() {
            Some((head, tail)) => {
                let head_matches = match segment {
                    Segment::Literal(literal) => literal.as_str() == *head,
                    _ => true,
                };
                head_matches && matches_from(rest, tail)
            }
            None => false,
        },
    }
}

/// One row of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRule {
    pattern: PathPattern,
    access: Access,
    match_priority: i32,
}

impl AuthorizationRule {
    pub fn new(pattern: &str, access: Access) -> Result<Self, PolicyError> {
        match &access {
            Access::AnyOf(required) | Access::AllOf(required)
                if required.iter().all(|r| roles::normalize(r).is_empty()) =>
            {
                return Err(PolicyError::EmptyRoles(pattern.to_string()));
            }
            _ => {}
        }
        Ok(Self {
            pattern: PathPattern::parse(pattern)?,
            access,
            match_priority: 0,
        })
    }

    pub fn public(pattern: &str) -> Result<Self, PolicyError> {
        Self::new(pattern, Access::Public)
    }

    pub fn authenticated(pattern: &str) -> Result<Self, PolicyError> {
        Self::new(pattern, Access::Authenticated)
    }

    pub fn any_of(pattern: &str, required: &[&str]) -> Result<Self, PolicyError> {
        Self::new(pattern, Access::AnyOf(role_set(required)))
    }

    pub fn all_of(pattern: &str, required: &[&str]) -> Result<Self, PolicyError> {
        Self::new(pattern, Access::AllOf(role_set(required)))
    }

    /// Rank this rule above (positive) or below (negative) specificity order.
    pub fn with_priority(mut self, match_priority: i32) -> Self {
        self.match_priority = match_priority;
        self
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn access(&self) -> &Access {
        &self.access
    }

    fn rank(&self) -> (i32, Specificity) {
        (self.match_priority, self.pattern.specificity())
    }
}

fn role_set(required: &[&str]) -> BTreeSet<String> {
    required.iter().map(|r| r.to_string()).collect()
}

/// Rule as written in a rules file.
#[derive(Debug, Deserialize)]
struct RuleSpec {
    pattern: String,
    access: Access,
    #[serde(default)]
    priority: i32,
}

/// Ordered route table, evaluated most specific first.
#[derive(Debug, Clone)]
pub struct AuthorizationPolicy {
    rules: Vec<AuthorizationRule>,
}

impl AuthorizationPolicy {
    pub fn new(mut rules: Vec<AuthorizationRule>) -> Self {
        // Stable sort keeps declaration order between equally ranked rules.
        rules.sort_by(|a, b| b.rank().cmp(&a.rank()));
        Self { rules }
    }

    /// The ticket logger route table.
    pub fn standard() -> Result<Self, PolicyError> {
        Ok(Self::new(vec![
            AuthorizationRule::public("/api/auth/**")?,
            AuthorizationRule::public("/health/**")?,
            AuthorizationRule::any_of("/docs/**", &[roles::ADMIN])?,
            AuthorizationRule::any_of("/api-doc/**", &[roles::ADMIN])?,
            AuthorizationRule::any_of("/api/users/**", &[roles::ADMIN])?,
            AuthorizationRule::any_of("/api/regions/**", &[roles::ADMIN, roles::MANAGER])?,
            AuthorizationRule::any_of("/api/provinces/**", &[roles::MANAGER])?,
            AuthorizationRule::any_of("/api/profile/**", &[roles::USER])?,
            AuthorizationRule::authenticated("/api/**")?,
        ]))
    }

    /// Parse a JSON array of `{ "pattern", "access", "priority"? }` objects.
    ///
    /// `access` is `"public"`, `"authenticated"`, `{"any_of": [..]}` or
    /// `{"all_of": [..]}`.
    pub fn from_json(raw: &str) -> Result<Self, PolicyError> {
        let specs: Vec<RuleSpec> = serde_json::from_str(raw)?;
        let rules = specs
            .into_iter()
            .map(|spec| {
                AuthorizationRule::new(&spec.pattern, spec.access)
                    .map(|rule| rule.with_priority(spec.priority))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, PolicyError> {
        let raw = std::fs::read_to_string(path).map_err(|source| PolicyError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn rules(&self) -> &[AuthorizationRule] {
        &self.rules
    }

    /// Rule that governs `path`, if any.
    pub fn matching_rule(&self, path: &str) -> Option<&AuthorizationRule> {
        let segments = path_segments(path)?;
        self.rule_for(&segments)
    }

    fn rule_for(&self, segments: &[&str]) -> Option<&AuthorizationRule> {
        self.rules.iter().find(|rule| rule.pattern.matches(segments))
    }

    /// Decide whether `principal` may access `path`.
    ///
    /// Pure: the same inputs always give the same decision.
    pub fn authorize(&self, path: &str, principal: Option<&Principal>) -> Decision {
        let Some(segments) = path_segments(path) else {
            return Decision::Deny;
        };
        let admitted = match self.rule_for(&segments) {
            Some(rule) => rule.access().admits(principal),
            None => principal.is_some(),
        };
        if admitted {
            Decision::Admit
        } else {
            Decision::Deny
        }
    }
}

/// Split a request path for matching. `None` for paths with dot segments.
fn path_segments(path: &str) -> Option<Vec<&str>> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.iter().any(|s| is_dot_segment(s)) {
        None
    } else {
        Some(segments)
    }
}

fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == "." || decoded == ".."
}
