//! Hotel model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::booking::UnknownVariant;

/// A pickup/dropoff hotel selectable at booking time
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub zone: HotelZone,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Service zone of a hotel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum HotelZone {
    #[serde(rename = "district_1")]
    District1,
    #[serde(rename = "district_3")]
    District3,
    #[serde(rename = "district_5")]
    District5,
    #[serde(rename = "district_7")]
    District7,
    BinhThanh,
    PhuNhuan,
    TanBinh,
    ThuDuc,
    Other,
}

impl HotelZone {
    pub const ALL: [HotelZone; 9] = [
        HotelZone::District1,
        HotelZone::District3,
        HotelZone::District5,
        HotelZone::District7,
        HotelZone::BinhThanh,
        HotelZone::PhuNhuan,
        HotelZone::TanBinh,
        HotelZone::ThuDuc,
        HotelZone::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HotelZone::District1 => "district_1",
            HotelZone::District3 => "district_3",
            HotelZone::District5 => "district_5",
            HotelZone::District7 => "district_7",
            HotelZone::BinhThanh => "binh_thanh",
            HotelZone::PhuNhuan => "phu_nhuan",
            HotelZone::TanBinh => "tan_binh",
            HotelZone::ThuDuc => "thu_duc",
            HotelZone::Other => "other",
        }
    }
}

impl std::fmt::Display for HotelZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HotelZone {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        HotelZone::ALL
            .into_iter()
            .find(|zone| zone.as_str() == normalized)
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Compact hotel info embedded in booking views
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HotelSummary {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub zone: HotelZone,
}

impl From<&Hotel> for HotelSummary {
    fn from(hotel: &Hotel) -> Self {
        Self {
            id: hotel.id,
            name: hotel.name.clone(),
            address: hotel.address.clone(),
            zone: hotel.zone,
        }
    }
}
