//! HTTP handlers for the luggage pickup booking platform

pub mod admin_booking;
pub mod auth;
pub mod booking;
pub mod customer;
pub mod driver;
pub mod driver_booking;
pub mod events;
pub mod health;
pub mod hotel;

pub use health::health_check;
