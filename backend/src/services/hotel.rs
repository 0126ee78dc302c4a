//! Hotel management

use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{Hotel, HotelZone};
use crate::store::{DataStore, NewHotel};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHotelInput {
    #[validate(length(min = 1, max = 200, message = "Hotel name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "Hotel address is required"))]
    pub address: String,
    #[serde(default = "default_zone")]
    pub zone: HotelZone,
}

fn default_zone() -> HotelZone {
    HotelZone::Other
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateHotelInput {
    #[validate(length(min = 1, max = 200, message = "Hotel name is required"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Hotel address is required"))]
    pub address: Option<String>,
    pub zone: Option<HotelZone>,
    pub is_active: Option<bool>,
}

/// Hotel service
#[derive(Clone)]
pub struct HotelService {
    store: Arc<dyn DataStore>,
}

impl HotelService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn create_hotel(&self, input: CreateHotelInput) -> AppResult<Hotel> {
        input.validate()?;
        let hotel = self
            .store
            .insert_hotel(NewHotel {
                name: input.name.trim().to_string(),
                address: input.address.trim().to_string(),
                zone: input.zone,
            })
            .await?;
        tracing::info!(hotel_id = %hotel.id, zone = %hotel.zone, "Hotel created");
        Ok(hotel)
    }

    /// Active hotels for the booking form, or every hotel for admins
    pub async fn list_hotels(&self, active_only: bool) -> AppResult<Vec<Hotel>> {
        self.store.list_hotels(active_only).await
    }

    pub async fn update_hotel(&self, id: Uuid, input: UpdateHotelInput) -> AppResult<Hotel> {
        input.validate()?;
        let mut hotel = self
            .store
            .find_hotel(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Hotel".to_string()))?;

        if let Some(name) = input.name {
            hotel.name = name.trim().to_string();
        }
        if let Some(address) = input.address {
            hotel.address = address.trim().to_string();
        }
        if let Some(zone) = input.zone {
            hotel.zone = zone;
        }
        if let Some(is_active) = input.is_active {
            hotel.is_active = is_active;
        }

        self.store.update_hotel(&hotel).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_deactivated_hotel_leaves_public_list() {
        let service = HotelService::new(Arc::new(MemoryStore::new()));
        let hotel = service
            .create_hotel(CreateHotelInput {
                name: "Caravelle".to_string(),
                address: "19 Lam Son Square".to_string(),
                zone: HotelZone::District1,
            })
            .await
            .unwrap();

        service
            .update_hotel(
                hotel.id,
                UpdateHotelInput {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(service.list_hotels(true).await.unwrap().is_empty());
        assert_eq!(service.list_hotels(false).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let service = HotelService::new(Arc::new(MemoryStore::new()));
        let err = service
            .create_hotel(CreateHotelInput {
                name: String::new(),
                address: "somewhere".to_string(),
                zone: HotelZone::Other,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationErrors(ref e) if e == &vec!["Hotel name is required".to_string()]));
    }
}
