//! Hotel handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::models::ApiResponse;
use crate::services::hotel::{CreateHotelInput, UpdateHotelInput};
use crate::services::HotelService;
use crate::AppState;

/// GET /hotels (public, active only)
pub async fn list_active_hotels(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let hotels = HotelService::new(state.store.clone()).list_hotels(true).await?;
    Ok(Json(ApiResponse::ok(hotels)))
}

/// GET /admin/hotels
pub async fn list_hotels(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let hotels = HotelService::new(state.store.clone()).list_hotels(false).await?;
    Ok(Json(ApiResponse::ok(hotels)))
}

/// POST /admin/hotels
pub async fn create_hotel(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateHotelInput>,
) -> AppResult<impl IntoResponse> {
    let hotel = HotelService::new(state.store.clone()).create_hotel(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(hotel, "Hotel created successfully")),
    ))
}

/// PATCH /admin/hotels/:id
pub async fn update_hotel(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateHotelInput>,
) -> AppResult<impl IntoResponse> {
    let hotel = HotelService::new(state.store.clone())
        .update_hotel(id, body)
        .await?;
    Ok(Json(ApiResponse::ok(hotel)))
}
