// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response structures for the catalog endpoints. All types
//! derive `Serialize`, `Deserialize`, and `ToSchema` for JSON handling and
//! OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Regions**: top-level administrative areas, unique by `code`
//! - **Provinces**: areas that belong to exactly one region, unique by `code`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// =============================================================================
// Region Models
// =============================================================================

/// An administrative region.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Region {
    /// Unique identifier for this region.
    pub id: Uuid,
    /// Short code, unique across regions (e.g. "01").
    pub code: String,
    /// Display name.
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Request to create a region.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateRegionRequest {
    pub code: String,
    pub name: String,
}

// =============================================================================
// Province Models
// =============================================================================

/// A province and the region it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Province {
    /// Unique identifier for this province.
    pub id: Uuid,
    /// Short code, unique across provinces.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Owning region.
    pub region_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Request to create a province under an existing region.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateProvinceRequest {
    pub code: String,
    pub name: String,
    pub region_id: Uuid,
}
