//! Route definitions for the luggage pickup booking platform

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, patch, post},
    Router,
};

use crate::{
    handlers,
    middleware::{authenticate, require_admin, require_driver},
    AppState,
};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Customer booking flow (public)
        .nest("/booking", booking_routes())
        .route("/hotels", get(handlers::hotel::list_active_hotels))
        // Auth routes (public, plus /me)
        .nest("/auth", auth_routes(&state))
        // Admin realtime events authenticate with a query token
        .route("/admin/events", get(handlers::events::admin_events))
        // Protected routes - admin console
        .nest("/admin", admin_routes(&state))
        // Protected routes - driver app
        .nest("/bookings/driver", driver_routes(&state))
}

/// Customer booking routes (public)
fn booking_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::booking::create_booking))
        .route("/:id", get(handlers::booking::get_booking))
        .route("/device/:device_id", get(handlers::booking::device_bookings))
        .route("/:id/edit", patch(handlers::booking::edit_booking))
        .route("/:id/cancel", patch(handlers::booking::cancel_booking))
}

/// Authentication routes
fn auth_routes(state: &AppState) -> Router<AppState> {
    let me = Router::new()
        .route("/me", get(handlers::auth::me))
        .route_layer(middleware::from_fn_with_state(state.clone(), authenticate));

    Router::new()
        .route("/admin/login", post(handlers::auth::admin_login))
        .route("/driver/login", post(handlers::auth::driver_login))
        .route("/driver/register", post(handlers::auth::register_driver))
        .merge(me)
}

/// Admin routes (protected)
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/bookings", get(handlers::admin_booking::list_bookings))
        .route("/bookings/export", get(handlers::admin_booking::export_bookings))
        .route("/bookings/stats", get(handlers::admin_booking::booking_stats))
        .route(
            "/bookings/:id",
            get(handlers::admin_booking::get_booking).put(handlers::admin_booking::update_booking),
        )
        .route(
            "/bookings/:id/confirm",
            patch(handlers::admin_booking::confirm_booking),
        )
        .route(
            "/bookings/:id/assign-driver",
            patch(handlers::admin_booking::assign_driver),
        )
        .route(
            "/bookings/:id/status",
            patch(handlers::admin_booking::update_status),
        )
        .route(
            "/bookings/:id/notes",
            patch(handlers::admin_booking::update_notes),
        )
        .route(
            "/drivers",
            get(handlers::driver::list_drivers).post(handlers::driver::create_driver),
        )
        .route("/drivers/:id", delete(handlers::driver::delete_driver))
        .route("/drivers/:id/verify", patch(handlers::driver::set_verified))
        .route("/drivers/:id/active", patch(handlers::driver::set_active))
        .route(
            "/hotels",
            get(handlers::hotel::list_hotels).post(handlers::hotel::create_hotel),
        )
        .route("/hotels/:id", patch(handlers::hotel::update_hotel))
        .route("/customers", get(handlers::customer::list_customers))
        .route(
            "/customers/reconcile",
            post(handlers::customer::reconcile_customers),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin))
}

/// Driver app routes (protected)
fn driver_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/assigned", get(handlers::driver_booking::assigned_bookings))
        .route("/history", get(handlers::driver_booking::booking_history))
        .route(
            "/push-token",
            patch(handlers::driver_booking::update_push_token),
        )
        .route(
            "/:id/picked-up",
            patch(handlers::driver_booking::mark_picked_up),
        )
        .route(
            "/:id/completed",
            patch(handlers::driver_booking::mark_completed)
                .layer(DefaultBodyLimit::max(state.uploads.body_limit())),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_driver))
}
