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
    models::{CreateProvinceRequest, Province},
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/api/provinces",
    tag = "Provinces",
    security(("bearer" = [])),
    responses((status = 200, body = [Province]))
)]
pub async fn list_provinces(State(state): State<AppState>) -> Json<Vec<Province>> {
    let store = state.store.read().await;
    Json(store.list_provinces())
}

#[utoipa::path(
    get,
    path = "/api/provinces/{province_id}",
    params(
        ("province_id" = Uuid, Path, description = "Identifier of the province")
    ),
    tag = "Provinces",
    security(("bearer" = [])),
    responses((status = 200, body = Province), (status = 404))
)]
pub async fn get_province(
    Path(province_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Province>, ApiError> {
    let store = state.store.read().await;
    Ok(Json(store.province(province_id)?))
}

#[utoipa::path(
    post,
    path = "/api/provinces",
    request_body = CreateProvinceRequest,
    tag = "Provinces",
    security(("bearer" = [])),
    responses((status = 201, body = Province), (status = 409), (status = 422))
)]
pub async fn create_province(
    State(state): State<AppState>,
    payload: Result<Json<CreateProvinceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Province>), ApiError> {
    let Json(request) = payload?;
    let mut store = state.store.write().await;
    let province = store.create_province(request)?;
    tracing::info!(province_id = %province.id, region_id = %province.region_id, "province created");
    Ok((StatusCode::CREATED, Json(province)))
}
