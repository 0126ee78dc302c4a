//! Reporting service for booking statistics and CSV export

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{Booking, BookingStatus};
use crate::store::{BookingFilter, DataStore};
use shared::Pagination;

/// Booking counts per status
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStats {
    pub total: i64,
    pub by_status: Vec<StatusCount>,
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: BookingStatus,
    pub count: i64,
}

/// One exported booking line
#[derive(Debug, Serialize)]
struct BookingExportRow {
    id: Uuid,
    created_at: DateTime<Utc>,
    status: &'static str,
    booking_type: &'static str,
    full_name: String,
    phone_number: String,
    email: String,
    hotel_id: Uuid,
    arrival_time: String,
    pickup_location_address: String,
    number_of_bags: i32,
    assigned_driver: String,
    picked_up_at: String,
    completed_at: String,
    completion_images: usize,
    notes: String,
}

impl From<&Booking> for BookingExportRow {
    fn from(b: &Booking) -> Self {
        let text = |v: &Option<String>| v.clone().unwrap_or_default();
        let time = |v: &Option<DateTime<Utc>>| v.map(|t| t.to_rfc3339()).unwrap_or_default();
        Self {
            id: b.id,
            created_at: b.created_at,
            status: b.status.as_str(),
            booking_type: b.booking_type.as_str(),
            full_name: b.full_name.clone(),
            phone_number: b.phone_number.clone(),
            email: text(&b.email),
            hotel_id: b.hotel_id,
            arrival_time: text(&b.arrival_time),
            pickup_location_address: text(&b.pickup_location_address),
            number_of_bags: b.number_of_bags,
            assigned_driver: b.assigned_driver.map(|d| d.to_string()).unwrap_or_default(),
            picked_up_at: time(&b.picked_up_at),
            completed_at: time(&b.completed_at),
            completion_images: b.completion_images.len(),
            notes: text(&b.notes),
        }
    }
}

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    store: Arc<dyn DataStore>,
}

impl ReportingService {
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    pub async fn booking_stats(&self) -> AppResult<BookingStats> {
        let counts = self.store.count_bookings_by_status().await?;
        Ok(BookingStats {
            total: counts.iter().map(|(_, c)| c).sum(),
            by_status: counts
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
        })
    }

    /// Every booking matching the filter (pagination ignored) as CSV
    pub async fn export_bookings(&self, filter: BookingFilter) -> AppResult<String> {
        let mut page = Pagination {
            page: 1,
            per_page: Pagination::MAX_PER_PAGE,
        };
        let mut rows = Vec::new();
        loop {
            let filter = BookingFilter {
                pagination: page.clone(),
                ..filter.clone()
            };
            let (bookings, total) = self.store.list_bookings(&filter).await?;
            let fetched = bookings.len();
            rows.extend(bookings.iter().map(BookingExportRow::from));
            if fetched == 0 || rows.len() as u64 >= total {
                break;
            }
            page.page += 1;
        }

        tracing::info!(rows = rows.len(), "Bookings exported");
        Self::export_to_csv(&rows)
    }

    /// Export data to CSV format
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))
    }
}
