//! Customer-facing booking handlers (no authentication)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::models::ApiResponse;
use crate::services::booking::{BookingService, EditBookingInput};
use crate::AppState;
use shared::BookingDraft;

fn service(state: &AppState) -> BookingService {
    BookingService::new(state.store.clone(), state.notifier.clone())
}

/// POST /booking
pub async fn create_booking(
    State(state): State<AppState>,
    ApiJson(draft): ApiJson<BookingDraft>,
) -> AppResult<impl IntoResponse> {
    let booking = service(&state).create_booking(draft).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(booking, "Booking created successfully")),
    ))
}

/// GET /booking/:id
pub async fn get_booking(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let booking = service(&state).get_booking(id).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// GET /booking/device/:device_id
pub async fn device_bookings(
    State(state): State<AppState>,
    ApiPath(device_id): ApiPath<String>,
) -> AppResult<impl IntoResponse> {
    let bookings = service(&state).bookings_for_device(&device_id).await?;
    Ok(Json(ApiResponse::ok(bookings)))
}

/// PATCH /booking/:id/edit
pub async fn edit_booking(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(patch): ApiJson<EditBookingInput>,
) -> AppResult<impl IntoResponse> {
    let booking = service(&state).edit_booking(id, patch).await?;
    Ok(Json(ApiResponse::with_message(booking, "Booking updated successfully")))
}

/// PATCH /booking/:id/cancel
pub async fn cancel_booking(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let booking = service(&state).cancel_booking(id).await?;
    Ok(Json(ApiResponse::with_message(booking, "Booking cancelled successfully")))
}
