//! Booking lifecycle tests
//!
//! Drives the full router against the in-memory store:
//! - Customer create / read / edit / cancel
//! - Admin confirm / assign
//! - Driver pickup and completion with photo uploads
//! - Events published along the way

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{multipart_images, multipart_request, TestApp};

// ============================================================================
// End-to-end scenario
// ============================================================================

#[tokio::test]
async fn test_pickup_scenario_from_booking_to_completion() {
    let app = TestApp::new().await;
    let d1 = app.insert_driver("+84900000001", "B2-0001", false, true).await;
    let d2 = app.insert_driver("+84900000002", "B2-0002", true, true).await;

    let booking = app.create_booking(app.airport_booking("+84912345678", "d1")).await;
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["bookingType"], "airport");
    let id = booking["id"].as_str().unwrap().to_string();

    // Inactive driver cannot be assigned
    let assign = json!({ "driverId": d1.id });
    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/admin/bookings/{id}/assign-driver"),
            Some(&app.admin_token),
            Some(assign.clone()),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Driver is not active");

    let (_, body) = app
        .request(Method::GET, &format!("/api/booking/{id}"), None, None)
        .await;
    assert_eq!(body["data"]["status"], "pending");

    // Activate and assign
    let (status, _) = app
        .request(
            Method::PATCH,
            &format!("/api/admin/drivers/{}/active", d1.id),
            Some(&app.admin_token),
            Some(json!({ "isActive": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/admin/bookings/{id}/assign-driver"),
            Some(&app.admin_token),
            Some(assign),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "assigned");

    // Another driver cannot pick it up
    let d2_token = app.driver_token(d2.id);
    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/bookings/driver/{id}/picked-up"),
            Some(&d2_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You are not assigned to this booking");

    let (_, body) = app
        .request(Method::GET, &format!("/api/booking/{id}"), None, None)
        .await;
    assert_eq!(body["data"]["status"], "assigned");
    assert_eq!(body["data"]["isPickedUp"], false);
    assert!(body["data"]["pickedUpAt"].is_null());

    // Assigned driver picks up
    let d1_token = app.driver_token(d1.id);
    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/bookings/driver/{id}/picked-up"),
            Some(&d1_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "in_progress");
    assert_eq!(body["data"]["isPickedUp"], true);
    assert!(body["data"]["pickedUpAt"].is_string());

    // Completion with two photos
    let multipart = multipart_images(&[
        ("front.jpg", "image/jpeg", b"\xFF\xD8\xFFfront".as_slice()),
        ("back.png", "image/png", b"\x89PNGback".as_slice()),
    ]);
    let (status, _, bytes) = app
        .send(multipart_request(
            &format!("/api/bookings/driver/{id}/completed"),
            &d1_token,
            multipart,
        ))
        .await;
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "completed");
    assert!(body["data"]["completedAt"].is_string());

    let images = body["data"]["completionImages"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert!(images
        .iter()
        .all(|i| i.as_str().unwrap().starts_with("/uploads/booking-")));
    assert_eq!(std::fs::read_dir(app.uploads.path()).unwrap().count(), 2);

    // Stored photos are served back
    let (_, _, served) = app
        .send(
            axum::http::Request::builder()
                .uri(images[0].as_str().unwrap())
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(&served[..], b"\xFF\xD8\xFFfront");

    assert_eq!(
        app.sink.names(),
        vec![
            "booking:created",
            "booking:assigned",
            "booking:picked-up",
            "booking:completed",
        ]
    );

    // Driver history now holds the job
    let (_, body) = app
        .request(
            Method::GET,
            "/api/bookings/driver/history",
            Some(&d1_token),
            None,
        )
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

// ============================================================================
// Customer surface
// ============================================================================

#[tokio::test]
async fn test_created_booking_reads_back_with_hotel() {
    let app = TestApp::new().await;
    let booking = app
        .create_booking(json!({
            "fullName": "Lan",
            "phoneNumber": "0912 345 678",
            "hotelId": app.hotel.id,
            "bookingType": "other",
            "pickupLocationAddress": "45 Le Loi",
            "numberOfBags": 2,
            "deviceId": "device-lan",
        }))
        .await;
    let id = booking["id"].as_str().unwrap();

    let (status, body) = app
        .request(Method::GET, &format!("/api/booking/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bookingType"], "other");
    assert_eq!(body["data"]["pickupLocationAddress"], "45 Le Loi");
    assert_eq!(body["data"]["arrivalTime"], serde_json::Value::Null);
    assert_eq!(body["data"]["numberOfBags"], 2);
    assert_eq!(body["data"]["phoneNumber"], "0912345678");
    assert_eq!(body["data"]["hotel"]["name"], "Riverside Hotel");
}

#[tokio::test]
async fn test_create_rejects_every_invalid_field_at_once() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(
            Method::POST,
            "/api/booking",
            None,
            Some(json!({
                "fullName": "",
                "phoneNumber": "abc",
                "hotelId": app.hotel.id,
                "bookingType": "airport",
                "numberOfBags": 6,
                "deviceId": "d1",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let errors: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e.as_str().unwrap())
        .collect();
    assert!(errors.contains(&"Full name is required"));
    assert!(errors.contains(&"Arrival time is required for airport bookings"));
    assert!(errors.contains(&"Number of bags must be between 1 and 5"));
    assert!(app.sink.names().is_empty());
}

#[tokio::test]
async fn test_create_requires_active_hotel() {
    let app = TestApp::new().await;
    let (status, _) = app
        .request(
            Method::PATCH,
            &format!("/api/admin/hotels/{}", app.hotel.id),
            Some(&app.admin_token),
            Some(json!({ "isActive": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/booking",
            None,
            Some(app.airport_booking("+84912345678", "d1")),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Hotel is not active");
}

#[tokio::test]
async fn test_edit_and_cancel_only_while_pending() {
    let app = TestApp::new().await;
    let booking = app.create_booking(app.airport_booking("+84912345678", "d1")).await;
    let id = booking["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/booking/{id}/edit"),
            None,
            Some(json!({ "numberOfBags": 5, "arrivalTime": "16:30" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["numberOfBags"], 5);
    assert_eq!(body["data"]["arrivalTime"], "16:30");

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/booking/{id}/edit"),
            None,
            Some(json!({ "numberOfBags": 0 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = app
        .request(Method::PATCH, &format!("/api/booking/{id}/cancel"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "cancelled");

    let (status, _) = app
        .request(Method::PATCH, &format!("/api/booking/{id}/cancel"), None, None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .request(
            Method::PATCH,
            &format!("/api/booking/{id}/edit"),
            None,
            Some(json!({ "fullName": "Someone else" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(
        app.sink.names(),
        vec!["booking:created", "booking:cancelled"]
    );
}

#[tokio::test]
async fn test_edit_with_no_fields_is_rejected() {
    let app = TestApp::new().await;
    let booking = app.create_booking(app.airport_booking("+84912345678", "d1")).await;
    let id = booking["id"].as_str().unwrap();

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/booking/{id}/edit"),
            None,
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No valid fields provided for update");
}

#[tokio::test]
async fn test_device_bookings_newest_first() {
    let app = TestApp::new().await;
    let first = app.create_booking(app.airport_booking("+84912345678", "tablet")).await;
    let second = app.create_booking(app.airport_booking("+84912345678", "tablet")).await;
    app.create_booking(app.airport_booking("+84912345678", "other-device")).await;

    let (status, body) = app
        .request(Method::GET, "/api/booking/device/tablet", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        vec![second["id"].as_str().unwrap(), first["id"].as_str().unwrap()]
    );
}

#[tokio::test]
async fn test_unknown_booking_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/booking/{}", uuid::Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Booking not found");

    let (status, _) = app
        .request(Method::GET, "/api/booking/not-a-uuid", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Admin and driver transitions
// ============================================================================

#[tokio::test]
async fn test_confirm_only_from_pending() {
    let app = TestApp::new().await;
    let booking = app.create_booking(app.airport_booking("+84912345678", "d1")).await;
    let id = booking["id"].as_str().unwrap().to_string();
    let uri = format!("/api/admin/bookings/{id}/confirm");

    let (status, body) = app
        .request(Method::PATCH, &uri, Some(&app.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "confirmed");
    assert_eq!(body["data"]["confirmedBy"], app.admin_id.to_string());
    let confirmed_at = body["data"]["confirmedAt"].clone();

    let (status, body) = app
        .request(Method::PATCH, &uri, Some(&app.admin_token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "INVALID_STATE_TRANSITION");

    let (_, body) = app
        .request(
            Method::GET,
            &format!("/api/admin/bookings/{id}"),
            Some(&app.admin_token),
            None,
        )
        .await;
    assert_eq!(body["data"]["confirmedAt"], confirmed_at);
}

#[tokio::test]
async fn test_pickup_requires_assigned_status() {
    let app = TestApp::new().await;
    let driver = app.insert_driver("+84900000001", "B2-0001", true, true).await;
    let booking = app.create_booking(app.airport_booking("+84912345678", "d1")).await;
    let id = booking["id"].as_str().unwrap().to_string();
    let token = app.driver_token(driver.id);

    app.request(
        Method::PATCH,
        &format!("/api/admin/bookings/{id}/assign-driver"),
        Some(&app.admin_token),
        Some(json!({ "driverId": driver.id })),
    )
    .await;

    let pickup = format!("/api/bookings/driver/{id}/picked-up");
    let (status, _) = app.request(Method::PATCH, &pickup, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.request(Method::PATCH, &pickup, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["message"].as_str().unwrap().contains("in_progress"));
}

#[tokio::test]
async fn test_completion_before_pickup_keeps_no_files() {
    let app = TestApp::new().await;
    let driver = app.insert_driver("+84900000001", "B2-0001", true, true).await;
    let booking = app.create_booking(app.airport_booking("+84912345678", "d1")).await;
    let id = booking["id"].as_str().unwrap().to_string();

    app.request(
        Method::PATCH,
        &format!("/api/admin/bookings/{id}/assign-driver"),
        Some(&app.admin_token),
        Some(json!({ "driverId": driver.id })),
    )
    .await;

    let (status, _, _) = app
        .send(multipart_request(
            &format!("/api/bookings/driver/{id}/completed"),
            &app.driver_token(driver.id),
            multipart_images(&[("a.jpg", "image/jpeg", b"jpeg".as_slice())]),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(std::fs::read_dir(app.uploads.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_completion_without_photos() {
    let app = TestApp::new().await;
    let driver = app.insert_driver("+84900000001", "B2-0001", true, true).await;
    let token = app.driver_token(driver.id);
    let booking = app.create_booking(app.airport_booking("+84912345678", "d1")).await;
    let id = booking["id"].as_str().unwrap().to_string();

    app.request(
        Method::PATCH,
        &format!("/api/admin/bookings/{id}/assign-driver"),
        Some(&app.admin_token),
        Some(json!({ "driverId": driver.id })),
    )
    .await;
    let (status, _) = app
        .request(
            Method::PATCH,
            &format!("/api/bookings/driver/{id}/picked-up"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/api/bookings/driver/{id}/completed"),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["completionImages"], json!([]));
    assert_eq!(std::fs::read_dir(app.uploads.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_completion_rejects_non_images_and_too_many_files() {
    let app = TestApp::new().await;
    let driver = app.insert_driver("+84900000001", "B2-0001", true, true).await;
    let token = app.driver_token(driver.id);
    let booking = app.create_booking(app.airport_booking("+84912345678", "d1")).await;
    let id = booking["id"].as_str().unwrap().to_string();
    let uri = format!("/api/bookings/driver/{id}/completed");

    let (status, _, _) = app
        .send(multipart_request(
            &uri,
            &token,
            multipart_images(&[("notes.txt", "text/plain", b"hello".as_slice())]),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let six: Vec<(&str, &str, &[u8])> = (0..6)
        .map(|_| ("p.jpg", "image/jpeg", b"jpeg".as_slice()))
        .collect();
    let (status, _, _) = app
        .send(multipart_request(&uri, &token, multipart_images(&six)))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(std::fs::read_dir(app.uploads.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_assigned_list_only_shows_active_jobs() {
    let app = TestApp::new().await;
    let driver = app.insert_driver("+84900000001", "B2-0001", true, true).await;
    let token = app.driver_token(driver.id);

    for device in ["d1", "d2"] {
        let booking = app
            .create_booking(app.airport_booking("+84912345678", device))
            .await;
        app.request(
            Method::PATCH,
            &format!("/api/admin/bookings/{}/assign-driver", booking["id"].as_str().unwrap()),
            Some(&app.admin_token),
            Some(json!({ "driverId": driver.id })),
        )
        .await;
    }
    app.create_booking(app.airport_booking("+84912345678", "d3")).await;

    let (status, body) = app
        .request(Method::GET, "/api/bookings/driver/assigned", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}
