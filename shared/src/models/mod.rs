//! Domain models for the luggage pickup booking platform

mod admin;
mod booking;
mod customer;
mod driver;
mod hotel;

pub use admin::*;
pub use booking::*;
pub use customer::*;
pub use driver::*;
pub use hotel::*;
