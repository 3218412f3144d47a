// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{CreateRegionRequest, Region},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/regions",
    tag = "Regions",
    security(("bearer" = [])),
    responses((status = 200, body = [Region]))
)]
pub async fn list_regions(State(state): State<AppState>) -> Json<Vec<Region>> {
    let store = state.store.read().await;
    Json(store.list_regions())
}

#[utoipa::path(
    get,
    path = "/api/regions/{region_id}",
    params(
        ("region_id" = Uuid, Path, description = "Identifier of the region")
    ),
    tag = "Regions",
    security(("bearer" = [])),
    responses((status = 200, body = Region), (status = 404))
)]
pub async fn get_region(
    Path(region_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Region>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.region(region_id)?))
}

#[utoipa::path(
    post,
    path = "/api/regions",
    request_body = CreateRegionRequest,
    tag = "Regions",
    security(("bearer" = [])),
    responses((status = 201, body = Region), (status = 409))
)]
pub async fn create_region(
    State(state): State<AppState>,
    payload: Result<Json<CreateRegionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Region>), ApiError> {
    let Json(request) = payload?;
    let mut store = state.store.write().await;
    let region = store.create_region(request)?;
    tracing::info!(region_id = %region.id, code = %region.code, "region created");
    Ok((StatusCode::CREATED, Json(region)))
}
