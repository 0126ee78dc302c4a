//! Driver model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A delivery agent executing pickups
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    /// Globally unique
    pub phone_number: String,
    /// Globally unique
    pub license_number: String,
    pub vehicle: VehicleInfo,
    pub is_active: bool,
    pub is_verified: bool,
    pub push_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Vehicle details
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VehicleInfo {
    pub vehicle_type: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub plate_number: Option<String>,
    pub color: Option<String>,
}

/// Why a driver cannot take a booking
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DriverUnavailable {
    #[error("Driver is not active")]
    Inactive,
    #[error("Driver is not verified")]
    Unverified,
}

impl Driver {
    /// A driver must be active and verified to be assigned
    pub fn check_assignable(&self) -> Result<(), DriverUnavailable> {
        if !self.is_active {
            return Err(DriverUnavailable::Inactive);
        }
        if !self.is_verified {
            return Err(DriverUnavailable::Unverified);
        }
        Ok(())
    }

    pub fn is_assignable(&self) -> bool {
        self.check_assignable().is_ok()
    }
}

/// Compact driver info embedded in booking views
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DriverSummary {
    pub id: Uuid,
    pub name: String,
    pub phone_number: String,
    pub vehicle: VehicleInfo,
}

impl From<&Driver> for DriverSummary {
    fn from(driver: &Driver) -> Self {
        Self {
            id: driver.id,
            name: driver.name.clone(),
            phone_number: driver.phone_number.clone(),
            vehicle: driver.vehicle.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(is_active: bool, is_verified: bool) -> Driver {
        Driver {
            id: Uuid::new_v4(),
            name: "Minh".to_string(),
            phone_number: "+84901234567".to_string(),
            license_number: "B2-000123".to_string(),
            vehicle: VehicleInfo::default(),
            is_active,
            is_verified,
            push_token: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_assignability() {
        assert!(driver(true, true).is_assignable());
        assert_eq!(
            driver(false, true).check_assignable(),
            Err(DriverUnavailable::Inactive)
        );
        assert_eq!(
            driver(true, false).check_assignable(),
            Err(DriverUnavailable::Unverified)
        );
    }
}
