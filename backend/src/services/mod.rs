//! Business logic services for the luggage pickup booking platform

pub mod auth;
pub mod booking;
pub mod customer;
pub mod driver;
pub mod hotel;
pub mod notification;
pub mod reporting;
pub mod uploads;

pub use auth::AuthService;
pub use booking::BookingService;
pub use customer::CustomerService;
pub use driver::DriverService;
pub use hotel::HotelService;
pub use notification::{BroadcastSink, NotificationSink, NullSink, RecordingSink};
pub use reporting::ReportingService;
pub use uploads::UploadStore;
