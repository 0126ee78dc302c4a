//! Admin booking management handlers

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::AdminActor;
use crate::models::{ApiResponse, BookingType};
use crate::services::booking::{parse_status, BookingService, UpdateBookingInput};
use crate::services::ReportingService;
use crate::store::BookingFilter;
use crate::AppState;
use shared::Pagination;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingListQuery {
    pub status: Option<String>,
    pub booking_type: Option<String>,
    pub hotel_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl TryFrom<BookingListQuery> for BookingFilter {
    type Error = AppError;

    fn try_from(query: BookingListQuery) -> Result<Self, Self::Error> {
        let status = query
            .status
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(parse_status)
            .transpose()
            .map_err(AppError::BadRequest)?;
        let booking_type = query
            .booking_type
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|t| t.parse::<BookingType>())
            .transpose()
            .map_err(|_| AppError::BadRequest("Booking type must be either airport or other".to_string()))?;

        Ok(BookingFilter {
            status,
            booking_type,
            hotel_id: query.hotel_id,
            driver_id: query.driver_id,
            search: query.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
            pagination: Pagination::from_query(query.page, query.limit),
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignDriverRequest {
    pub driver_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNotesRequest {
    pub notes: Option<String>,
}

fn service(state: &AppState) -> BookingService {
    BookingService::new(state.store.clone(), state.notifier.clone())
}

/// GET /admin/bookings
pub async fn list_bookings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BookingListQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = BookingFilter::try_from(query)?;
    let page = service(&state).list_bookings(&filter).await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /admin/bookings/:id
pub async fn get_booking(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let booking = service(&state).get_booking(id).await?;
    Ok(Json(ApiResponse::ok(booking)))
}

/// PATCH /admin/bookings/:id/confirm
pub async fn confirm_booking(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminActor>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let booking = service(&state).confirm_booking(id, admin.id).await?;
    Ok(Json(ApiResponse::with_message(booking, "Booking confirmed successfully")))
}

/// PATCH /admin/bookings/:id/assign-driver
pub async fn assign_driver(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<AssignDriverRequest>,
) -> AppResult<impl IntoResponse> {
    let booking = service(&state).assign_driver(id, body.driver_id).await?;
    Ok(Json(ApiResponse::with_message(booking, "Driver assigned successfully")))
}

/// PATCH /admin/bookings/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminActor>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let status = parse_status(&body.status).map_err(AppError::validation)?;
    let booking = service(&state).update_status(id, status, admin.id).await?;
    Ok(Json(ApiResponse::with_message(booking, "Booking status updated successfully")))
}

/// PUT /admin/bookings/:id
pub async fn update_booking(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminActor>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateBookingInput>,
) -> AppResult<impl IntoResponse> {
    let booking = service(&state).update_booking(id, body, admin.id).await?;
    Ok(Json(ApiResponse::with_message(booking, "Booking updated successfully")))
}

/// PATCH /admin/bookings/:id/notes
pub async fn update_notes(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<UpdateNotesRequest>,
) -> AppResult<impl IntoResponse> {
    let booking = service(&state).update_notes(id, body.notes).await?;
    Ok(Json(ApiResponse::with_message(booking, "Notes updated successfully")))
}

/// GET /admin/bookings/export
pub async fn export_bookings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BookingListQuery>,
) -> AppResult<impl IntoResponse> {
    let filter = BookingFilter::try_from(query)?;
    let csv = ReportingService::new(state.store.clone())
        .export_bookings(filter)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"bookings.csv\""),
        ],
        csv,
    ))
}

/// GET /admin/bookings/stats
pub async fn booking_stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let stats = ReportingService::new(state.store.clone())
        .booking_stats()
        .await?;
    Ok(Json(ApiResponse::ok(stats)))
}
