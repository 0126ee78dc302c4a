//! Booking model and lifecycle transition table

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::driver::DriverSummary;
use super::hotel::HotelSummary;

/// A customer's luggage pickup/dropoff request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub full_name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub hotel_id: Uuid,
    pub booking_type: BookingType,
    /// Required for airport bookings
    pub arrival_time: Option<String>,
    /// Required for other bookings
    pub pickup_location_address: Option<String>,
    pub number_of_bags: i32,
    /// Anonymous device identifier used for "my bookings"
    pub device_id: String,
    pub status: BookingStatus,
    pub is_picked_up: bool,
    pub assigned_driver: Option<Uuid>,
    pub confirmed_by: Option<Uuid>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub picked_up_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completion_images: Vec<String>,
    pub notes: Option<String>,
    /// Incremented on every write; used for optimistic concurrency
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    /// Whether the given driver is the one currently assigned
    pub fn is_assigned_to(&self, driver_id: Uuid) -> bool {
        self.assigned_driver == Some(driver_id)
    }
}

/// Booking with its referenced hotel and driver resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetails {
    #[serde(flatten)]
    pub booking: Booking,
    pub hotel: Option<HotelSummary>,
    pub driver: Option<DriverSummary>,
}

/// Kind of pickup
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BookingType {
    #[serde(alias = "Airport", alias = "AIRPORT")]
    Airport,
    #[serde(alias = "Other", alias = "OTHER")]
    Other,
}

impl BookingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingType::Airport => "airport",
            BookingType::Other => "other",
        }
    }
}

impl std::fmt::Display for BookingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "airport" => Ok(BookingType::Airport),
            "other" => Ok(BookingType::Other),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// Lifecycle status of a booking
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

/// Operations that move a booking through its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingAction {
    /// Admin confirms a new booking
    Confirm,
    /// Admin assigns (or reassigns) a driver
    AssignDriver,
    /// Driver collects the luggage
    PickUp,
    /// Driver delivers the luggage
    Complete,
    /// Customer edits booking details
    Edit,
    /// Customer cancels
    Cancel,
}

/// Rejected lifecycle transition
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Booking is already {current}")]
    AlreadyProcessed { current: BookingStatus },

    #[error("Cannot assign a driver to a booking that is {current}")]
    NotAssignable { current: BookingStatus },

    #[error("Booking must be assigned before pickup (current status: {current})")]
    NotAssigned { current: BookingStatus },

    #[error("Booking must be marked as picked up first (current status: {current})")]
    NotPickedUp { current: BookingStatus },

    #[error("Only pending bookings can be edited (current status: {current})")]
    NotEditable { current: BookingStatus },

    #[error("Only pending bookings can be cancelled (current status: {current})")]
    NotCancellable { current: BookingStatus },
}

impl TransitionError {
    /// Status the booking was in when the transition was refused
    pub fn current(&self) -> BookingStatus {
        match self {
            TransitionError::AlreadyProcessed { current }
            | TransitionError::NotAssignable { current }
            | TransitionError::NotAssigned { current }
            | TransitionError::NotPickedUp { current }
            | TransitionError::NotEditable { current }
            | TransitionError::NotCancellable { current } => *current,
        }
    }
}

/// Result of an administrative status override
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusOverride {
    pub previous: BookingStatus,
    pub target: BookingStatus,
    /// False when the transition table would have allowed the change
    pub bypassed_rules: bool,
}

impl BookingStatus {
    pub const ALL: [BookingStatus; 6] = [
        BookingStatus::Pending,
        BookingStatus::Confirmed,
        BookingStatus::Assigned,
        BookingStatus::InProgress,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Assigned => "assigned",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// Apply a lifecycle action and return the resulting status.
    ///
    /// This is the single transition table for the regular (non-override)
    /// paths:
    ///
    /// | from | action | to |
    /// |---|---|---|
    /// | pending | confirm | confirmed |
    /// | pending, confirmed, assigned | assign driver | assigned |
    /// | assigned | pick up | in_progress |
    /// | in_progress | complete | completed |
    /// | pending | edit | pending |
    /// | pending | cancel | cancelled |
    pub fn apply(self, action: BookingAction) -> Result<BookingStatus, TransitionError> {
        use BookingAction as A;
        use BookingStatus as S;

        match (self, action) {
            (S::Pending, A::Confirm) => Ok(S::Confirmed),
            (current, A::Confirm) => Err(TransitionError::AlreadyProcessed { current }),

            (S::Pending | S::Confirmed | S::Assigned, A::AssignDriver) => Ok(S::Assigned),
            (current, A::AssignDriver) => Err(TransitionError::NotAssignable { current }),

            (S::Assigned, A::PickUp) => Ok(S::InProgress),
            (current, A::PickUp) => Err(TransitionError::NotAssigned { current }),

            (S::InProgress, A::Complete) => Ok(S::Completed),
            (current, A::Complete) => Err(TransitionError::NotPickedUp { current }),

            (S::Pending, A::Edit) => Ok(S::Pending),
            (current, A::Edit) => Err(TransitionError::NotEditable { current }),

            (S::Pending, A::Cancel) => Ok(S::Cancelled),
            (current, A::Cancel) => Err(TransitionError::NotCancellable { current }),
        }
    }

    /// Statuses reachable from this one through the regular transition table
    pub fn next_statuses(self) -> Vec<BookingStatus> {
        const ACTIONS: [BookingAction; 5] = [
            BookingAction::Confirm,
            BookingAction::AssignDriver,
            BookingAction::PickUp,
            BookingAction::Complete,
            BookingAction::Cancel,
        ];

        let mut next: Vec<BookingStatus> = Vec::new();
        for action in ACTIONS {
            if let Ok(status) = self.apply(action) {
                if status != self && !next.contains(&status) {
                    next.push(status);
                }
            }
        }
        next
    }

    /// Whether some regular action leads from `self` to `target`
    pub fn can_reach(self, target: BookingStatus) -> bool {
        self == target || self.next_statuses().contains(&target)
    }

    /// Administrative override: any status may be set from any status.
    ///
    /// The caller is expected to log and publish the override when
    /// `bypassed_rules` is set.
    pub fn force(self, target: BookingStatus) -> StatusOverride {
        StatusOverride {
            previous: self,
            target,
            bypassed_rules: !self.can_reach(target),
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        BookingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Error for unrecognized enum text
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown value: {0}")]
pub struct UnknownVariant(pub String);
