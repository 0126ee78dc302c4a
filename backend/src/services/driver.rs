//! Driver administration and self-service

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{AdminRole, BookingStatus, Driver};
use crate::services::auth::{new_driver, RegisterDriverInput};
use crate::store::DataStore;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetVerifiedInput {
    pub is_verified: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetActiveInput {
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushTokenInput {
    pub push_token: Option<String>,
}

/// Driver service
#[derive(Clone)]
pub struct DriverService {
    store: Arc<dyn DataStore>,
}

impl DriverService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    /// Admin-created drivers start active and verified
    pub async fn create_driver(&self, input: RegisterDriverInput) -> AppResult<Driver> {
        let driver = self.store.insert_driver(new_driver(input, true)?).await?;
        tracing::info!(driver_id = %driver.id, "Driver created by admin");
        Ok(driver)
    }

    pub async fn get_driver(&self, id: Uuid) -> AppResult<Driver> {
        self.store
            .find_driver(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver".to_string()))
    }

    /// All drivers, or only the ones that can take a booking
    pub async fn list_drivers(&self, available_only: bool) -> AppResult<Vec<Driver>> {
        self.store.list_drivers(available_only).await
    }

    pub async fn set_verified(&self, id: Uuid, is_verified: bool) -> AppResult<Driver> {
        let mut driver = self.get_driver(id).await?;
        driver.is_verified = is_verified;
        let driver = self.store.update_driver(&driver).await?;
        tracing::info!(driver_id = %id, is_verified, "Driver verification changed");
        Ok(driver)
    }

    pub async fn set_active(&self, id: Uuid, is_active: bool) -> AppResult<Driver> {
        let mut driver = self.get_driver(id).await?;
        driver.is_active = is_active;
        let driver = self.store.update_driver(&driver).await?;
        tracing::info!(driver_id = %id, is_active, "Driver activation changed");
        Ok(driver)
    }

    pub async fn set_push_token(&self, id: Uuid, push_token: Option<String>) -> AppResult<Driver> {
        let mut driver = self.get_driver(id).await?;
        driver.push_token = push_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        self.store.update_driver(&driver).await
    }

    /// Delete a driver with no booking in progress; super admins only
    pub async fn delete_driver(&self, id: Uuid, role: AdminRole) -> AppResult<()> {
        if role != AdminRole::SuperAdmin {
            return Err(AppError::Forbidden(
                "Only super admins can delete drivers".to_string(),
            ));
        }

        let active = self
            .store
            .bookings_for_driver(id, &[BookingStatus::Assigned, BookingStatus::InProgress])
            .await?;
        if !active.is_empty() {
            return Err(AppError::Conflict(format!(
                "Driver has {} active booking(s)",
                active.len()
            )));
        }

        if !self.store.delete_driver(id).await? {
            return Err(AppError::NotFound("Driver".to_string()));
        }
        tracing::info!(driver_id = %id, "Driver deleted");
        Ok(())
    }
}
