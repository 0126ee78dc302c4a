//! Driver-facing booking handlers

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        State,
    },
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::DriverActor;
use crate::models::ApiResponse;
use crate::services::driver::PushTokenInput;
use crate::services::uploads::IncomingImage;
use crate::services::{BookingService, DriverService};
use crate::AppState;

const IMAGES_FIELD: &str = "images";

fn service(state: &AppState) -> BookingService {
    BookingService::new(state.store.clone(), state.notifier.clone())
}

/// GET /bookings/driver/assigned
pub async fn assigned_bookings(
    State(state): State<AppState>,
    Extension(driver): Extension<DriverActor>,
) -> AppResult<impl IntoResponse> {
    let bookings = service(&state).driver_bookings(driver.id, false).await?;
    Ok(Json(ApiResponse::ok(bookings)))
}

/// GET /bookings/driver/history
pub async fn booking_history(
    State(state): State<AppState>,
    Extension(driver): Extension<DriverActor>,
) -> AppResult<impl IntoResponse> {
    let bookings = service(&state).driver_bookings(driver.id, true).await?;
    Ok(Json(ApiResponse::ok(bookings)))
}

/// PATCH /bookings/driver/push-token
pub async fn update_push_token(
    State(state): State<AppState>,
    Extension(driver): Extension<DriverActor>,
    ApiJson(body): ApiJson<PushTokenInput>,
) -> AppResult<impl IntoResponse> {
    let driver = DriverService::new(state.store.clone())
        .set_push_token(driver.id, body.push_token)
        .await?;
    Ok(Json(ApiResponse::with_message(driver, "Push token updated")))
}

/// PATCH /bookings/driver/:id/picked-up
pub async fn mark_picked_up(
    State(state): State<AppState>,
    Extension(driver): Extension<DriverActor>,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<impl IntoResponse> {
    let booking = service(&state).mark_picked_up(id, driver.id).await?;
    Ok(Json(ApiResponse::with_message(booking, "Booking marked as picked up")))
}

/// PATCH /bookings/driver/:id/completed (multipart, `images` field)
///
/// Images are validated as a batch, written, and then handed to the
/// lifecycle; if completion is refused the written files are removed.
/// A request without a multipart body completes with no images.
pub async fn mark_completed(
    State(state): State<AppState>,
    Extension(driver): Extension<DriverActor>,
    ApiPath(id): ApiPath<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<impl IntoResponse> {
    let images = match multipart {
        Ok(multipart) => read_images(multipart).await?,
        Err(MultipartRejection::InvalidBoundary(_)) => Vec::new(),
        Err(rejection) => return Err(rejection.into()),
    };
    state.uploads.validate(&images)?;

    let stored = state.uploads.store_all(id, images).await?;
    let references = stored.iter().map(|s| s.reference.clone()).collect();

    match service(&state).mark_completed(id, driver.id, references).await {
        Ok(booking) => Ok(Json(ApiResponse::with_message(
            booking,
            "Booking marked as completed",
        ))),
        Err(e) => {
            state.uploads.remove_all(&stored).await;
            Err(e)
        }
    }
}

async fn read_images(mut multipart: Multipart) -> AppResult<Vec<IncomingImage>> {
    let mut images = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGES_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;
        // Empty file inputs still submit a part
        if bytes.is_empty() {
            continue;
        }
        images.push(IncomingImage {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Ok(images)
}
