//! Shared harness for router-level integration tests

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use luggage_booking::{
    create_app,
    models::{AdminRole, Driver, Hotel, HotelZone, VehicleInfo},
    services::{auth::AccountKind, AuthService, RecordingSink},
    store::{DataStore, MemoryStore, NewAdmin, NewDriver, NewHotel},
    AppState, Config,
};

pub const JWT_SECRET: &str = "integration-test-secret";
pub const MULTIPART_BOUNDARY: &str = "luggage-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub sink: Arc<RecordingSink>,
    pub hotel: Hotel,
    pub admin_id: Uuid,
    pub admin_token: String,
    // Dropped with the app
    pub uploads: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_admin_role(AdminRole::SuperAdmin).await
    }

    pub async fn with_admin_role(role: AdminRole) -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let config = Config::in_memory(JWT_SECRET, uploads.path().to_str().unwrap());

        let store = Arc::new(MemoryStore::new());
        let sink = Arc::new(RecordingSink::new());
        let state = AppState::new(config, store.clone()).with_notifier(sink.clone());

        let hotel = store
            .insert_hotel(NewHotel {
                name: "Riverside Hotel".to_string(),
                address: "12 Ton Duc Thang, District 1".to_string(),
                zone: HotelZone::District1,
            })
            .await
            .unwrap();

        let admin = store
            .insert_admin(NewAdmin {
                name: "Operator".to_string(),
                email: "ops@example.com".to_string(),
                password_hash: "not-used".to_string(),
                role,
            })
            .await
            .unwrap();
        let admin_token = issue(&state, admin.id, AccountKind::Admin, Some(role.as_str()));

        Self {
            router: create_app(state.clone()),
            state,
            store,
            sink,
            hotel,
            admin_id: admin.id,
            admin_token,
            uploads,
        }
    }

    pub async fn insert_driver(
        &self,
        phone_number: &str,
        license_number: &str,
        is_active: bool,
        is_verified: bool,
    ) -> Driver {
        self.store
            .insert_driver(NewDriver {
                name: format!("Driver {license_number}"),
                phone_number: phone_number.to_string(),
                license_number: license_number.to_string(),
                password_hash: "not-used".to_string(),
                vehicle: VehicleInfo::default(),
                is_active,
                is_verified,
            })
            .await
            .unwrap()
    }

    pub fn driver_token(&self, driver_id: Uuid) -> String {
        issue(&self.state, driver_id, AccountKind::Driver, None)
    }

    /// Send a JSON request and decode the JSON response
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let (status, _, bytes) = self.send(request).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, bytes)
    }

    /// Create a booking through the public endpoint and return its JSON
    pub async fn create_booking(&self, body: Value) -> Value {
        let (status, body) = self.request(Method::POST, "/api/booking", None, Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"].clone()
    }

    pub fn airport_booking(&self, phone: &str, device_id: &str) -> Value {
        json!({
            "fullName": "A",
            "phoneNumber": phone,
            "hotelId": self.hotel.id,
            "bookingType": "Airport",
            "arrivalTime": "14:00",
            "numberOfBags": 3,
            "deviceId": device_id,
        })
    }
}

fn issue(state: &AppState, id: Uuid, kind: AccountKind, role: Option<&str>) -> String {
    AuthService::new(state.store.clone(), &state.config)
        .issue_token(id, kind, role, 3600)
        .unwrap()
}

/// Multipart body with one `images` part per (file name, content type, bytes)
pub fn multipart_images(images: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (file_name, content_type, bytes) in images {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(uri: &str, token: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(Method::PATCH)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
