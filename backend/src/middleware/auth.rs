//! Authentication middleware
//!
//! Bearer token authentication for admin and driver routes. The account is
//! re-loaded on every request so a disabled account loses access before its
//! token expires.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Admin, AdminRole, Driver};
use crate::services::auth::{AccountKind, AuthService, Claims};
use crate::AppState;

/// Authenticated admin, inserted into request extensions
#[derive(Clone, Debug)]
pub struct AdminActor {
    pub id: Uuid,
    pub role: AdminRole,
}

/// Authenticated driver, inserted into request extensions
#[derive(Clone, Debug)]
pub struct DriverActor {
    pub id: Uuid,
}

/// Either kind of account
#[derive(Clone, Debug)]
pub enum Account {
    Admin(Admin),
    Driver(Driver),
}

/// Admin-only routes
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = bearer_token(request.headers())?;
    let admin = resolve_admin(&state, token).await?;

    request.extensions_mut().insert(AdminActor {
        id: admin.id,
        role: admin.role,
    });
    Ok(next.run(request).await)
}

/// Driver-only routes
pub async fn require_driver(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = bearer_token(request.headers())?;
    let driver = resolve_driver(&state, token).await?;

    request.extensions_mut().insert(DriverActor { id: driver.id });
    Ok(next.run(request).await)
}

/// Routes open to any signed-in account
pub async fn authenticate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = bearer_token(request.headers())?;
    let claims = decode(&state, token)?;
    let account = match claims.kind {
        AccountKind::Admin => Account::Admin(load_admin(&state, &claims).await?),
        AccountKind::Driver => Account::Driver(load_driver(&state, &claims).await?),
    };

    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

/// Resolve an admin token; also used by the event stream, which takes the
/// token from the query string
pub async fn resolve_admin(state: &AppState, token: &str) -> AppResult<Admin> {
    let claims = decode(state, token)?;
    if claims.kind != AccountKind::Admin {
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }
    load_admin(state, &claims).await
}

async fn resolve_driver(state: &AppState, token: &str) -> AppResult<Driver> {
    let claims = decode(state, token)?;
    if claims.kind != AccountKind::Driver {
        return Err(AppError::Forbidden("Driver access required".to_string()));
    }
    load_driver(state, &claims).await
}

fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::Unauthorized("Missing or invalid Authorization header".to_string())
        })
}

fn decode(state: &AppState, token: &str) -> AppResult<Claims> {
    AuthService::new(state.store.clone(), &state.config).validate_token(token)
}

fn account_id(claims: &Claims) -> AppResult<Uuid> {
    Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::Unauthorized("Invalid account ID in token".to_string()))
}

async fn load_admin(state: &AppState, claims: &Claims) -> AppResult<Admin> {
    let admin = state
        .store
        .find_admin(account_id(claims)?)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account not found".to_string()))?;
    if !admin.is_active {
        return Err(AppError::Unauthorized("Account is disabled".to_string()));
    }
    Ok(admin)
}

async fn load_driver(state: &AppState, claims: &Claims) -> AppResult<Driver> {
    let driver = state
        .store
        .find_driver(account_id(claims)?)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Account not found".to_string()))?;
    if !driver.is_active {
        return Err(AppError::Unauthorized("Account is disabled".to_string()));
    }
    Ok(driver)
}
