//! Request middleware

pub mod auth;

pub use auth::{
    authenticate, require_admin, require_driver, resolve_admin, Account, AdminActor, DriverActor,
};
