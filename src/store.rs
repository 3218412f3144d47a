// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory catalog of regions and provinces.

use std::collections::HashMap;

use chrono::Utc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{CreateProvinceRequest, CreateRegionRequest, Province, Region};

#[derive(Default)]
pub struct InMemoryStore {
    regions: HashMap<Uuid, Region>,
    provinces: HashMap<Uuid, Province>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regions ordered by code.
    pub fn list_regions(&self) -> Vec<Region> {
        let mut regions: Vec<Region> = self.regions.values().cloned().collect();
        regions.sort_by(|a, b| a.code.cmp(&b.code));
        regions
    }

    pub fn region(&self, region_id: Uuid) -> Result<Region, ApiError> {
        self.regions
            .get(&region_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Region not found"))
    }

    pub fn create_region(&mut self, request: CreateRegionRequest) -> Result<Region, ApiError> {
        let (code, name) = validate_code_and_name(&request.code, &request.name)?;
        if self.regions.values().any(|region| region.code == code) {
            return Err(ApiError::conflict(format!(
                "A region with code {code} already exists."
            )));
        }

        let region = Region {
            id: Uuid::new_v4(),
            code,
            name,
            created_at: Utc::now(),
        };
        self.regions.insert(region.id, region.clone());
        Ok(region)
    }

    /// Provinces ordered by code.
    pub fn list_provinces(&self) -> Vec<Province> {
        let mut provinces: Vec<Province> = self.provinces.values().cloned().collect();
        provinces.sort_by(|a, b| a.code.cmp(&b.code));
        provinces
    }

    pub fn province(&self, province_id: Uuid) -> Result<Province, ApiError> {
        self.provinces
            .get(&province_id)
            .cloned()
            .ok_or_else(|| ApiError::not_found("Province not found"))
    }

    pub fn create_province(
        &mut self,
        request: CreateProvinceRequest,
    ) -> Result<Province, ApiError> {
        let (code, name) = validate_code_and_name(&request.code, &request.name)?;
        if !self.regions.contains_key(&request.region_id) {
            return Err(ApiError::unprocessable("Region does not exist."));
        }
        if self.provinces.values().any(|province| province.code == code) {
            return Err(ApiError::conflict(format!(
                "A province with code {code} already exists."
            )));
        }

        let province = Province {
            id: Uuid::new_v4(),
            code,
            name,
            region_id: request.region_id,
            created_at: Utc::now(),
        };
        self.provinces.insert(province.id, province.clone());
        Ok(province)
    }
}

fn validate_code_and_name(code: &str, name: &str) -> Result<(String, String), ApiError> {
    let (code, name) = (code.trim(), name.trim());
    if code.is_empty() {
        return Err(ApiError::bad_request("code must not be empty"));
    }
    if name.is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }
    Ok((code.to_string(), name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn region_request(code: &str) -> CreateRegionRequest {
        CreateRegionRequest {
            code: code.to_string(),
            name: format!("Region {code}"),
        }
    }

    #[test]
    fn regions_are_listed_by_code() {
        let mut store = InMemoryStore::new();
        store.create_region(region_request("02")).unwrap();
        store.create_region(region_request("01")).unwrap();

        let codes: Vec<String> = store.list_regions().into_iter().map(|r| r.code).collect();
        assert_eq!(codes, vec!["01", "02"]);
    }

    #[test]
    fn duplicate_region_code_conflicts() {
        let mut store = InMemoryStore::new();
        store.create_region(region_request("01")).unwrap();
        let err = store.create_region(region_request("01")).unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[test]
    fn blank_fields_are_bad_requests() {
        let mut store = InMemoryStore::new();
        let err = store.create_region(region_request("  ")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn unknown_ids_are_not_found() {
        let store = InMemoryStore::new();
        assert_eq!(
            store.region(Uuid::new_v4()).unwrap_err().status,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            store.province(Uuid::new_v4()).unwrap_err().status,
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn province_requires_existing_region() {
        let mut store = InMemoryStore::new();
        let err = store
            .create_province(CreateProvinceRequest {
                code: "41".to_string(),
                name: "Sevilla".to_string(),
                region_id: Uuid::new_v4(),
            })
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn province_is_created_under_region() {
        let mut store = InMemoryStore::new();
        let region = store.create_region(region_request("01")).unwrap();
        let province = store
            .create_province(CreateProvinceRequest {
                code: "41".to_string(),
                name: "Sevilla".to_string(),
                region_id: region.id,
            })
            .unwrap();

        assert_eq!(store.province(province.id).unwrap().region_id, region.id);

        let dup = store
            .create_province(CreateProvinceRequest {
                code: "41".to_string(),
                name: "Other".to_string(),
                region_id: region.id,
            })
            .unwrap_err();
        assert_eq!(dup.status, StatusCode::CONFLICT);
    }
}
