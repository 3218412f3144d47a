// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ticket Logger API - stateless token authentication and route authorization
//!
//! Clients trade a username and password for an RS256-signed access token,
//! then present it as a bearer token. One authentication gate verifies the
//! token and one route policy decides access, before any handler runs.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers and router (Axum)
//! - `auth` - Keys, tokens, credentials, gate and route policy
//! - `config` - Environment configuration
//! - `server` - Startup and graceful shutdown

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod server;
pub mod state;
pub mod store;
