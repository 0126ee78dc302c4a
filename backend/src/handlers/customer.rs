//! Customer handlers

use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use crate::error::AppResult;
use crate::extract::ApiQuery;
use crate::models::ApiResponse;
use crate::services::CustomerService;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub search: Option<String>,
}

/// GET /admin/customers?search=
pub async fn list_customers(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CustomerQuery>,
) -> AppResult<impl IntoResponse> {
    let customers = CustomerService::new(state.store.clone())
        .list_customers(query.search.as_deref())
        .await?;
    Ok(Json(ApiResponse::ok(customers)))
}

/// POST /admin/customers/reconcile
pub async fn reconcile_customers(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let report = CustomerService::new(state.store.clone()).reconcile().await?;
    Ok(Json(ApiResponse::with_message(report, "Customer counters reconciled")))
}
