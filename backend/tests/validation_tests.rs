//! Booking validation and customer upsert properties
//!
//! Property-based tests over the public booking endpoint:
//! - Bag count bounds
//! - Conditional arrival time / pickup address
//! - One customer per phone number with an accurate booking count

mod common;

use axum::http::{Method, StatusCode};
use proptest::prelude::*;
use serde_json::json;

use common::TestApp;
use luggage_booking::services::booking::parse_status;
use luggage_booking::store::DataStore;

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Vietnamese mobile numbers written the way customers type them
fn phone_strategy() -> impl Strategy<Value = String> {
    (prop_oneof!["\\+84", "0"], "[35789][0-9]{8}", prop::bool::ANY).prop_map(
        |(prefix, rest, spaced)| {
            if spaced {
                format!("{prefix} {} {} {}", &rest[..3], &rest[3..6], &rest[6..])
            } else {
                format!("{prefix}{rest}")
            }
        },
    )
}

fn status_spelling_strategy() -> impl Strategy<Value = (String, String)> {
    prop_oneof![
        Just("pending"),
        Just("confirmed"),
        Just("assigned"),
        Just("in_progress"),
        Just("completed"),
        Just("cancelled"),
    ]
    .prop_flat_map(|status| {
        (
            Just(status.to_string()),
            prop_oneof![
                Just(status.to_string()),
                Just(status.to_uppercase()),
                Just(status.replace('_', "-")),
                Just(format!("  {status} ")),
            ],
        )
    })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_bag_count_bounds(bags in -3i64..10) {
        tokio_test::block_on(async {
            let app = TestApp::new().await;
            let mut body = app.airport_booking("+84912345678", "d1");
            body["numberOfBags"] = json!(bags);

            let (status, _) = app.request(Method::POST, "/api/booking", None, Some(body)).await;
            let (_, stored) = app.store.list_bookings(&Default::default()).await.unwrap();

            if (1..=5).contains(&bags) {
                assert_eq!(status, StatusCode::CREATED);
                assert_eq!(stored, 1);
            } else {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(stored, 0);
            }
        });
    }

    #[test]
    fn prop_conditional_fields(airport in prop::bool::ANY, with_arrival in prop::bool::ANY, with_address in prop::bool::ANY) {
        tokio_test::block_on(async {
            let app = TestApp::new().await;
            let mut body = json!({
                "fullName": "Khanh",
                "phoneNumber": "+84912345678",
                "hotelId": app.hotel.id,
                "bookingType": if airport { "Airport" } else { "Other" },
                "numberOfBags": 1,
                "deviceId": "d1",
            });
            if with_arrival {
                body["arrivalTime"] = json!("09:15");
            }
            if with_address {
                body["pickupLocationAddress"] = json!("1 Dong Khoi");
            }

            let (status, _) = app.request(Method::POST, "/api/booking", None, Some(body)).await;
            let required_present = if airport { with_arrival } else { with_address };
            if required_present {
                assert_eq!(status, StatusCode::CREATED);
            } else {
                assert_eq!(status, StatusCode::BAD_REQUEST);
            }
        });
    }

    #[test]
    fn prop_one_customer_per_phone(phone in phone_strategy(), count in 1usize..4) {
        tokio_test::block_on(async {
            let app = TestApp::new().await;
            for i in 0..count {
                app.create_booking(app.airport_booking(&phone, &format!("device-{i}"))).await;
            }

            let customers = app.store.list_customers(None).await.unwrap();
            assert_eq!(customers.len(), 1);
            assert_eq!(customers[0].total_bookings, count as i64);
            assert!(customers[0].phone_number.chars().all(|c| c == '+' || c.is_ascii_digit()));
        });
    }

    #[test]
    fn prop_status_spellings_parse((canonical, spelled) in status_spelling_strategy()) {
        let status = parse_status(&spelled).unwrap();
        prop_assert_eq!(status.as_str(), canonical.as_str());
    }

    #[test]
    fn prop_unknown_status_lists_choices(raw in "[a-z]{3,12}") {
        prop_assume!(parse_status(&raw).is_err());
        let message = parse_status(&raw).unwrap_err();
        prop_assert!(message.contains("in_progress"));
    }
}
