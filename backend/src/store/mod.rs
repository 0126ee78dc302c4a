//! Data Store seam
//!
//! The booking lifecycle talks to persistence only through [`DataStore`].
//! [`PgStore`] backs production; [`MemoryStore`] backs tests and local runs.
//!
//! Booking updates are conditional on [`Booking::version`]: the store applies
//! the write only if the stored version still equals the version the caller
//! read, and bumps it. A mismatch surfaces as `AppError::Conflict`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    Admin, AdminRole, Booking, BookingStatus, BookingType, Customer, Driver, Hotel, HotelZone,
    VehicleInfo,
};
use shared::{Pagination, ValidBooking};

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub(crate) const CONCURRENT_MODIFICATION: &str = "Booking was modified by another request";

/// New booking row; lifecycle fields start empty
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub fields: ValidBooking,
    pub notes: Option<String>,
}

/// Keep the phone-keyed customer profile in sync with a booking write
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerUpsert {
    pub phone_number: String,
    pub full_name: String,
    pub email: Option<String>,
    /// When set, the booking is new to this customer: `total_bookings` is
    /// incremented and `last_booking_date` refreshed
    pub counts_booking: bool,
    pub booked_at: DateTime<Utc>,
}

/// Customer side effect of a booking update
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerChange {
    pub upsert: CustomerUpsert,
    /// Phone whose customer no longer owns the booking (phone edits)
    pub release_phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewHotel {
    pub name: String,
    pub address: String,
    pub zone: HotelZone,
}

#[derive(Debug, Clone)]
pub struct NewDriver {
    pub name: String,
    pub phone_number: String,
    pub license_number: String,
    pub password_hash: String,
    pub vehicle: VehicleInfo,
    pub is_active: bool,
    pub is_verified: bool,
}

#[derive(Debug, Clone)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: AdminRole,
}

/// Admin booking listing filter
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub booking_type: Option<BookingType>,
    pub hotel_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    /// Case-insensitive match on customer name or phone
    pub search: Option<String>,
    pub pagination: Pagination,
}

impl BookingFilter {
    /// Whether a booking passes every filter except pagination
    pub fn matches(&self, booking: &Booking) -> bool {
        if self.status.is_some_and(|s| s != booking.status) {
            return false;
        }
        if self.booking_type.is_some_and(|t| t != booking.booking_type) {
            return false;
        }
        if self.hotel_id.is_some_and(|h| h != booking.hotel_id) {
            return false;
        }
        if self.driver_id.is_some() && self.driver_id != booking.assigned_driver {
            return false;
        }
        if let Some(search) = self.search.as_deref() {
            let needle = search.to_lowercase();
            if !booking.full_name.to_lowercase().contains(&needle)
                && !booking.phone_number.contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Persistence for bookings and the entities they reference
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Connectivity check for health reporting
    async fn ping(&self) -> AppResult<()>;

    // Hotels
    async fn insert_hotel(&self, hotel: NewHotel) -> AppResult<Hotel>;
    async fn find_hotel(&self, id: Uuid) -> AppResult<Option<Hotel>>;
    async fn list_hotels(&self, active_only: bool) -> AppResult<Vec<Hotel>>;
    async fn update_hotel(&self, hotel: &Hotel) -> AppResult<Hotel>;

    // Drivers
    /// Fails with `DuplicateEntry` when phone or license number is taken
    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver>;
    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>>;
    /// Driver and password hash by phone number
    async fn find_driver_credentials(&self, phone_number: &str)
        -> AppResult<Option<(Driver, String)>>;
    async fn list_drivers(&self, assignable_only: bool) -> AppResult<Vec<Driver>>;
    async fn update_driver(&self, driver: &Driver) -> AppResult<Driver>;
    async fn delete_driver(&self, id: Uuid) -> AppResult<bool>;

    // Admins
    async fn insert_admin(&self, admin: NewAdmin) -> AppResult<Admin>;
    async fn find_admin(&self, id: Uuid) -> AppResult<Option<Admin>>;
    /// Admin and password hash by email
    async fn find_admin_credentials(&self, email: &str) -> AppResult<Option<(Admin, String)>>;

    // Customers
    async fn find_customer_by_phone(&self, phone_number: &str) -> AppResult<Option<Customer>>;
    async fn list_customers(&self, search: Option<&str>) -> AppResult<Vec<Customer>>;
    /// Recompute booking counters from the bookings table; returns customers touched
    async fn reconcile_customers(&self) -> AppResult<u64>;

    // Bookings
    /// Insert a pending booking and upsert its customer as one unit
    async fn insert_booking(
        &self,
        booking: NewBooking,
        customer: CustomerUpsert,
    ) -> AppResult<Booking>;
    async fn find_booking(&self, id: Uuid) -> AppResult<Option<Booking>>;
    /// Persist every mutable field of `booking` if its version is current
    async fn update_booking(
        &self,
        booking: &Booking,
        customer: Option<CustomerChange>,
    ) -> AppResult<Booking>;
    /// Page of bookings matching the filter (newest first) and the total count
    async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<(Vec<Booking>, u64)>;
    async fn bookings_for_device(&self, device_id: &str) -> AppResult<Vec<Booking>>;
    async fn bookings_for_driver(
        &self,
        driver_id: Uuid,
        statuses: &[BookingStatus],
    ) -> AppResult<Vec<Booking>>;
    async fn count_bookings_by_status(&self) -> AppResult<Vec<(BookingStatus, i64)>>;
}
