//! Luggage Pickup Booking Platform - Backend
//!
//! Hotel guests book luggage pickups, admins confirm them and assign
//! drivers, and drivers pick up and complete them with photo evidence.
//! Every lifecycle step is published to connected admins in real time.

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use services::{BroadcastSink, NotificationSink, UploadStore};
use store::DataStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn DataStore>,
    /// Where lifecycle events are published
    pub notifier: Arc<dyn NotificationSink>,
    /// Channel admin WebSocket connections subscribe to
    pub events: BroadcastSink,
    pub uploads: UploadStore,
}

impl AppState {
    /// State whose lifecycle events fan out to admin WebSocket subscribers
    pub fn new(config: Config, store: Arc<dyn DataStore>) -> Self {
        let events = BroadcastSink::new(config.notifications.channel_capacity);
        Self {
            uploads: UploadStore::new(&config.uploads),
            notifier: Arc::new(events.clone()),
            events,
            store,
            config: Arc::new(config),
        }
    }

    /// Replace the sink lifecycle events are published to
    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let uploads = ServeDir::new(state.uploads.dir());

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api", routes::api_routes(state.clone()))
        .nest_service(&state.config.uploads.public_path, uploads)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Luggage Pickup Booking API v1.0"
}
