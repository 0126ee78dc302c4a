//! Shared types and models for the luggage pickup booking platform
//!
//! This crate contains the booking domain shared between the backend, the
//! admin panel and the customer booking form (via WASM).

pub mod events;
pub mod models;
pub mod types;
pub mod validation;

pub use events::*;
pub use models::*;
pub use types::*;
pub use validation::*;
