//! Authentication handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};

use crate::error::AppResult;
use crate::extract::ApiJson;
use crate::middleware::Account;
use crate::models::ApiResponse;
use crate::services::auth::{AdminLoginInput, DriverLoginInput, RegisterDriverInput};
use crate::services::AuthService;
use crate::AppState;

fn service(state: &AppState) -> AuthService {
    AuthService::new(state.store.clone(), &state.config)
}

/// POST /auth/admin/login
pub async fn admin_login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<AdminLoginInput>,
) -> AppResult<impl IntoResponse> {
    let session = service(&state).admin_login(body).await?;
    Ok(Json(ApiResponse::with_message(session, "Login successful")))
}

/// POST /auth/driver/login
pub async fn driver_login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<DriverLoginInput>,
) -> AppResult<impl IntoResponse> {
    let session = service(&state).driver_login(body).await?;
    Ok(Json(ApiResponse::with_message(session, "Login successful")))
}

/// POST /auth/driver/register
///
/// Self-registered drivers stay inactive and unverified until an admin
/// approves them.
pub async fn register_driver(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterDriverInput>,
) -> AppResult<impl IntoResponse> {
    let driver = service(&state).register_driver(body).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            driver,
            "Registration received, awaiting admin approval",
        )),
    ))
}

/// GET /auth/me
pub async fn me(Extension(account): Extension<Account>) -> impl IntoResponse {
    match account {
        Account::Admin(admin) => Json(ApiResponse::ok(serde_json::json!({
            "kind": "admin",
            "account": admin,
        }))),
        Account::Driver(driver) => Json(ApiResponse::ok(serde_json::json!({
            "kind": "driver",
            "account": driver,
        }))),
    }
}
