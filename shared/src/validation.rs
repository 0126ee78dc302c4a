//! Validation utilities for booking and account input
//!
//! Booking validation collects every field problem into one list of
//! human-readable messages instead of stopping at the first one.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Booking, BookingType};

pub const MIN_BAGS: i64 = 1;
pub const MAX_BAGS: i64 = 5;
pub const MAX_COMPLETION_IMAGES: usize = 5;
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_NOTES_LENGTH: usize = 1000;

// ============================================================================
// Field Validations
// ============================================================================

/// Strip the separators people type into phone numbers
///
/// Keeps an optional leading `+` and every digit; removes spaces, dashes,
/// dots and parentheses. Other characters are kept so validation can reject
/// them.
pub fn normalize_phone(phone: &str) -> String {
    phone
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
        .collect()
}

/// Validate phone number format
/// Accepts: +84912345678, 0912345678, +84 912 345 678, (028) 3822-1234
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let normalized = normalize_phone(phone);
    let digits = normalized.strip_prefix('+').unwrap_or(&normalized);

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err("Phone number must be a valid international or local phone number");
    }
    if digits.len() < 9 || digits.len() > 15 {
        return Err("Phone number must be a valid international or local phone number");
    }
    Ok(())
}

/// Validate email format
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if validator::validate_email(email) {
        Ok(())
    } else {
        Err("Email must be a valid email address")
    }
}

/// Validate number of bags is in the accepted range
pub fn validate_bags(bags: i64) -> Result<(), &'static str> {
    if (MIN_BAGS..=MAX_BAGS).contains(&bags) {
        Ok(())
    } else {
        Err("Number of bags must be between 1 and 5")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < 6 {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

// ============================================================================
// Booking Validation
// ============================================================================

/// Candidate booking fields, as received or as merged from a patch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingDraft {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub hotel_id: Option<String>,
    pub booking_type: Option<String>,
    pub arrival_time: Option<String>,
    pub pickup_location_address: Option<String>,
    pub number_of_bags: Option<i64>,
    pub device_id: Option<String>,
}

impl From<&Booking> for BookingDraft {
    fn from(booking: &Booking) -> Self {
        Self {
            full_name: Some(booking.full_name.clone()),
            phone_number: Some(booking.phone_number.clone()),
            email: booking.email.clone(),
            hotel_id: Some(booking.hotel_id.to_string()),
            booking_type: Some(booking.booking_type.as_str().to_string()),
            arrival_time: booking.arrival_time.clone(),
            pickup_location_address: booking.pickup_location_address.clone(),
            number_of_bags: Some(i64::from(booking.number_of_bags)),
            device_id: Some(booking.device_id.clone()),
        }
    }
}

/// Booking fields that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidBooking {
    pub full_name: String,
    /// Normalized phone number
    pub phone_number: String,
    pub email: Option<String>,
    pub hotel_id: Uuid,
    pub booking_type: BookingType,
    pub arrival_time: Option<String>,
    pub pickup_location_address: Option<String>,
    pub number_of_bags: i32,
    pub device_id: String,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validate a booking draft
///
/// The conditional field rule uses the draft's (final) booking type: airport
/// bookings need `arrival_time`, other bookings need
/// `pickup_location_address`. The complementary field is optional.
pub fn validate_booking(draft: &BookingDraft) -> Result<ValidBooking, Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    let full_name = non_blank(&draft.full_name);
    match &full_name {
        None => errors.push("Full name is required".to_string()),
        Some(name) if name.chars().count() > MAX_NAME_LENGTH => {
            errors.push(format!("Full name must be at most {MAX_NAME_LENGTH} characters"))
        }
        Some(_) => {}
    }

    let phone_number = non_blank(&draft.phone_number);
    match &phone_number {
        None => errors.push("Phone number is required".to_string()),
        Some(phone) => {
            if let Err(msg) = validate_phone(phone) {
                errors.push(msg.to_string());
            }
        }
    }

    let email = non_blank(&draft.email);
    if let Some(email) = &email {
        if let Err(msg) = validate_email(email) {
            errors.push(msg.to_string());
        }
    }

    let hotel_id = match non_blank(&draft.hotel_id) {
        None => {
            errors.push("Hotel is required".to_string());
            None
        }
        Some(raw) => match Uuid::parse_str(&raw) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push("Hotel ID is invalid".to_string());
                None
            }
        },
    };

    let booking_type = match non_blank(&draft.booking_type) {
        None => {
            errors.push("Booking type is required".to_string());
            None
        }
        Some(raw) => match raw.parse::<BookingType>() {
            Ok(kind) => Some(kind),
            Err(_) => {
                errors.push("Booking type must be either airport or other".to_string());
                None
            }
        },
    };

    let arrival_time = non_blank(&draft.arrival_time);
    let pickup_location_address = non_blank(&draft.pickup_location_address);
    match booking_type {
        Some(BookingType::Airport) if arrival_time.is_none() => {
            errors.push("Arrival time is required for airport bookings".to_string())
        }
        Some(BookingType::Other) if pickup_location_address.is_none() => {
            errors.push("Pickup location address is required for other bookings".to_string())
        }
        _ => {}
    }

    let number_of_bags = match draft.number_of_bags {
        None => {
            errors.push("Number of bags is required".to_string());
            None
        }
        Some(bags) => match validate_bags(bags) {
            Ok(()) => i32::try_from(bags).ok(),
            Err(msg) => {
                errors.push(msg.to_string());
                None
            }
        },
    };

    let device_id = non_blank(&draft.device_id);
    if device_id.is_none() {
        errors.push("Device ID is required".to_string());
    }

    match (
        full_name,
        phone_number,
        hotel_id,
        booking_type,
        number_of_bags,
        device_id,
    ) {
        (
            Some(full_name),
            Some(phone_number),
            Some(hotel_id),
            Some(booking_type),
            Some(number_of_bags),
            Some(device_id),
        ) if errors.is_empty() => Ok(ValidBooking {
            full_name,
            phone_number: normalize_phone(&phone_number),
            email,
            hotel_id,
            booking_type,
            arrival_time,
            pickup_location_address,
            number_of_bags,
            device_id,
        }),
        _ => Err(errors),
    }
}

/// Validate admin notes
pub fn validate_notes(notes: &str) -> Result<(), &'static str> {
    if notes.chars().count() > MAX_NOTES_LENGTH {
        return Err("Notes must be at most 1000 characters");
    }
    Ok(())
}
