//! Realtime booking events pushed to the admin panel
//!
//! Events serialize as `{ "event": "<name>", "data": { ... } }` with camelCase
//! payload fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Booking, BookingStatus};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data")]
pub enum BookingEvent {
    #[serde(rename = "booking:created", rename_all = "camelCase")]
    Created {
        booking_id: Uuid,
        status: BookingStatus,
        booking: Box<Booking>,
    },

    #[serde(rename = "booking:confirmed", rename_all = "camelCase")]
    Confirmed {
        booking_id: Uuid,
        status: BookingStatus,
        confirmed_by: Uuid,
        confirmed_at: DateTime<Utc>,
        booking: Box<Booking>,
    },

    #[serde(rename = "booking:assigned", rename_all = "camelCase")]
    Assigned {
        booking_id: Uuid,
        status: BookingStatus,
        driver_id: Uuid,
        booking: Box<Booking>,
    },

    #[serde(rename = "booking:picked-up", rename_all = "camelCase")]
    PickedUp {
        booking_id: Uuid,
        status: BookingStatus,
        picked_up_at: DateTime<Utc>,
        booking: Box<Booking>,
    },

    #[serde(rename = "booking:completed", rename_all = "camelCase")]
    Completed {
        booking_id: Uuid,
        status: BookingStatus,
        completed_at: DateTime<Utc>,
        completion_images: Vec<String>,
        booking: Box<Booking>,
    },

    #[serde(rename = "booking:cancelled", rename_all = "camelCase")]
    Cancelled {
        booking_id: Uuid,
        status: BookingStatus,
        booking: Box<Booking>,
    },

    /// An admin set a status outside the regular transition table
    #[serde(rename = "booking:status-overridden", rename_all = "camelCase")]
    StatusOverridden {
        booking_id: Uuid,
        previous_status: BookingStatus,
        status: BookingStatus,
        overridden_by: Uuid,
        booking: Box<Booking>,
    },
}

impl BookingEvent {
    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            BookingEvent::Created { .. } => "booking:created",
            BookingEvent::Confirmed { .. } => "booking:confirmed",
            BookingEvent::Assigned { .. } => "booking:assigned",
            BookingEvent::PickedUp { .. } => "booking:picked-up",
            BookingEvent::Completed { .. } => "booking:completed",
            BookingEvent::Cancelled { .. } => "booking:cancelled",
            BookingEvent::StatusOverridden { .. } => "booking:status-overridden",
        }
    }

    pub fn booking_id(&self) -> Uuid {
        match self {
            BookingEvent::Created { booking_id, .. }
            | BookingEvent::Confirmed { booking_id, .. }
            | BookingEvent::Assigned { booking_id, .. }
            | BookingEvent::PickedUp { booking_id, .. }
            | BookingEvent::Completed { booking_id, .. }
            | BookingEvent::Cancelled { booking_id, .. }
            | BookingEvent::StatusOverridden { booking_id, .. } => *booking_id,
        }
    }

    pub fn picked_up(booking: &Booking, picked_up_at: DateTime<Utc>) -> Self {
        BookingEvent::PickedUp {
            booking_id: booking.id,
            status: booking.status,
            picked_up_at,
            booking: Box::new(booking.clone()),
        }
    }

    pub fn completed(booking: &Booking, completed_at: DateTime<Utc>) -> Self {
        BookingEvent::Completed {
            booking_id: booking.id,
            status: booking.status,
            completed_at,
            completion_images: booking.completion_images.clone(),
            booking: Box::new(booking.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingType;

    fn booking() -> Booking {
        let now = Utc::now();
        Booking {
            id: Uuid::new_v4(),
            full_name: "A".to_string(),
            phone_number: "+84912345678".to_string(),
            email: None,
            hotel_id: Uuid::new_v4(),
            booking_type: BookingType::Airport,
            arrival_time: Some("14:00".to_string()),
            pickup_location_address: None,
            number_of_bags: 3,
            device_id: "d1".to_string(),
            status: BookingStatus::InProgress,
            is_picked_up: true,
            assigned_driver: Some(Uuid::new_v4()),
            confirmed_by: None,
            confirmed_at: None,
            picked_up_at: Some(now),
            completed_at: None,
            completion_images: vec![],
            notes: None,
            version: 3,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_picked_up_wire_format() {
        let booking = booking();
        let at = booking.picked_up_at.unwrap();
        let event = BookingEvent::picked_up(&booking, at);
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "booking:picked-up");
        assert_eq!(json["data"]["bookingId"], booking.id.to_string());
        assert_eq!(json["data"]["status"], "in_progress");
        assert!(json["data"]["pickedUpAt"].is_string());
        assert_eq!(json["data"]["booking"]["numberOfBags"], 3);
        assert_eq!(event.name(), "booking:picked-up");
    }

    #[test]
    fn test_completed_carries_images() {
        let mut booking = booking();
        booking.status = BookingStatus::Completed;
        booking.completion_images = vec!["/uploads/a.jpg".into(), "/uploads/b.jpg".into()];
        let event = BookingEvent::completed(&booking, Utc::now());
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "booking:completed");
        assert_eq!(json["data"]["completionImages"].as_array().unwrap().len(), 2);
        assert!(json["data"]["completedAt"].is_string());
        assert_eq!(event.booking_id(), booking.id);
    }
}
