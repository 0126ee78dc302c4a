//! WebAssembly module for the Luggage Pickup Booking Platform
//!
//! Provides client-side checks for:
//! - Booking form validation before submit
//! - Phone number normalization
//! - Status labels and allowed next statuses for the admin panel

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Validate a booking form given as JSON
///
/// Returns a JSON array of error messages; `[]` means the form can be
/// submitted.
#[wasm_bindgen]
pub fn validate_booking_form(form_json: &str) -> String {
    let errors = match serde_json::from_str::<BookingDraft>(form_json) {
        Ok(draft) => match validate_booking(&draft) {
            Ok(_) => Vec::new(),
            Err(errors) => errors,
        },
        Err(e) => {
            warn(&format!("Unreadable booking form: {e}"));
            vec![format!("Invalid booking form: {e}")]
        }
    };
    serde_json::to_string(&errors).unwrap_or_else(|_| "[]".to_string())
}

/// Check a phone number as the server will
#[wasm_bindgen]
pub fn is_valid_phone(phone: &str) -> bool {
    validate_phone(phone).is_ok()
}

/// Phone number as it will be stored
#[wasm_bindgen]
pub fn normalize_phone_number(phone: &str) -> String {
    normalize_phone(phone)
}

/// Statuses the regular lifecycle can move a booking to, as a JSON array
#[wasm_bindgen]
pub fn next_statuses(status: &str) -> String {
    let next: Vec<&str> = status
        .parse::<BookingStatus>()
        .map(|s| s.next_statuses().iter().map(|n| n.as_str()).collect())
        .unwrap_or_default();
    serde_json::to_string(&next).unwrap_or_else(|_| "[]".to_string())
}

/// Whether moving between two statuses needs an admin override
#[wasm_bindgen]
pub fn is_override(from: &str, to: &str) -> bool {
    match (from.parse::<BookingStatus>(), to.parse::<BookingStatus>()) {
        (Ok(from), Ok(to)) => from.force(to).bypassed_rules,
        _ => true,
    }
}

/// Human-readable status label
#[wasm_bindgen]
pub fn booking_status_label(status: &str) -> String {
    match status.parse::<BookingStatus>() {
        Ok(BookingStatus::Pending) => "Pending",
        Ok(BookingStatus::Confirmed) => "Confirmed",
        Ok(BookingStatus::Assigned) => "Driver assigned",
        Ok(BookingStatus::InProgress) => "In progress",
        Ok(BookingStatus::Completed) => "Completed",
        Ok(BookingStatus::Cancelled) => "Cancelled",
        Err(_) => "Unknown",
    }
    .to_string()
}

fn warn(message: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&JsValue::from_str(message));
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn errors(json: &str) -> Vec<String> {
        serde_json::from_str(&validate_booking_form(json)).unwrap()
    }

    #[test]
    fn test_init_is_repeatable() {
        assert!(cfg!(feature = "console_error_panic_hook"));
        init();
        init();
    }

    #[test]
    fn test_validate_booking_form() {
        let valid = r#"{
            "fullName": "An",
            "phoneNumber": "+84 912 345 678",
            "hotelId": "9b2d7c1e-3f4a-4b5c-8d6e-7f8091a2b3c4",
            "bookingType": "Airport",
            "arrivalTime": "14:00",
            "numberOfBags": 3,
            "deviceId": "d1"
        }"#;
        assert!(errors(valid).is_empty());

        let missing = errors(r#"{"bookingType": "other", "numberOfBags": 6}"#);
        assert!(missing.contains(&"Full name is required".to_string()));
        assert!(missing.contains(&"Number of bags must be between 1 and 5".to_string()));

        let broken = errors("not json");
        assert_eq!(broken.len(), 1);
        assert!(broken[0].starts_with("Invalid booking form"));
    }

    #[test]
    fn test_phone_helpers() {
        assert!(is_valid_phone("(028) 3822-1234"));
        assert!(!is_valid_phone("12345"));
        assert_eq!(normalize_phone_number("+84 912-345.678"), "+84912345678");
    }

    #[test]
    fn test_status_helpers() {
        assert_eq!(
            next_statuses("pending"),
            r#"["confirmed","assigned","cancelled"]"#
        );
        assert_eq!(next_statuses("assigned"), r#"["in_progress"]"#);
        assert_eq!(next_statuses("completed"), "[]");
        assert_eq!(next_statuses("nonsense"), "[]");

        assert!(!is_override("assigned", "in_progress"));
        assert!(is_override("completed", "pending"));
        assert_eq!(booking_status_label("in_progress"), "In progress");
        assert_eq!(booking_status_label("??"), "Unknown");
    }
}
