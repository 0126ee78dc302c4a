//! Driver administration handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::AdminActor;
use crate::models::ApiResponse;
use crate::services::auth::RegisterDriverInput;
use crate::services::driver::{SetActiveInput, SetVerifiedInput};
use crate::services::DriverService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct DriverListQuery {
    pub available: Option<bool>,
}

/// POST /admin/drivers
pub async fn create_driver(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterDriverInput>,
) -> AppResult<impl IntoResponse> {
    let driver = DriverService::new(state.store.clone())
        .create_driver(body)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(driver, "Driver created successfully")),
    ))
}

/// GET /admin/drivers?available=
pub async fn list_drivers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DriverListQuery>,
) -> AppResult<impl IntoResponse> {
    let drivers = DriverService::new(state.store.clone())
        .list_drivers(query.available.unwrap_or(false))
        .await?;
    Ok(Json(ApiResponse::ok(drivers)))
}

/// PATCH /admin/drivers/:id/verify
pub async fn set_verified(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<SetVerifiedInput>,
) -> AppResult<impl IntoResponse> {
    let driver = DriverService::new(state.store.clone())
        .set_verified(id, body.is_verified)
        .await?;
    Ok(Json(ApiResponse::ok(driver)))
}

/// PATCH /admin/drivers/:id/active
pub async fn set_active(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<SetActiveInput>,
) -> AppResult<impl IntoResponse> {
    let driver = DriverService::new(state.store.clone())
        .set_active(id, body.is_active)
        .await?;
    Ok(Json(ApiResponse::ok(driver)))
}

/// DELETE /admin/drivers/:id
pub async fn delete_driver(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminActor>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    DriverService::new(state.store.clone())
        .delete_driver(id, admin.role)
        .await?;
    Ok(Json(ApiResponse::with_message(id, "Driver deleted successfully")))
}
