//! In-process Data Store
//!
//! Every operation runs under one mutex, so a booking write and its customer
//! upsert are applied together.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{
    BookingFilter, CustomerChange, CustomerUpsert, DataStore, NewAdmin, NewBooking, NewDriver,
    NewHotel, CONCURRENT_MODIFICATION,
};
use crate::error::{AppError, AppResult};
use crate::models::{Admin, Booking, BookingStatus, Customer, Driver, Hotel};

#[derive(Default)]
struct Tables {
    hotels: HashMap<Uuid, Hotel>,
    drivers: HashMap<Uuid, (Driver, String)>,
    admins: HashMap<Uuid, (Admin, String)>,
    customers: HashMap<String, Customer>,
    bookings: HashMap<Uuid, Booking>,
}

impl Tables {
    fn upsert_customer(&mut self, upsert: &CustomerUpsert) {
        let now = Utc::now();
        match self.customers.get_mut(&upsert.phone_number) {
            Some(customer) => {
                customer.full_name = upsert.full_name.clone();
                customer.email = upsert.email.clone();
                if upsert.counts_booking {
                    customer.total_bookings += 1;
                    customer.last_booking_date = Some(upsert.booked_at);
                } else if customer.last_booking_date.is_none() {
                    customer.last_booking_date = Some(upsert.booked_at);
                }
                customer.updated_at = now;
            }
            None => {
                self.customers.insert(
                    upsert.phone_number.clone(),
                    Customer {
                        id: Uuid::new_v4(),
                        full_name: upsert.full_name.clone(),
                        phone_number: upsert.phone_number.clone(),
                        email: upsert.email.clone(),
                        address: None,
                        notes: None,
                        is_active: true,
                        total_bookings: 1,
                        last_booking_date: Some(upsert.booked_at),
                        created_at: now,
                        updated_at: now,
                    },
                );
            }
        }
    }

    fn release_customer(&mut self, phone_number: &str) {
        if let Some(customer) = self.customers.get_mut(phone_number) {
            customer.total_bookings = (customer.total_bookings - 1).max(0);
            customer.updated_at = Utc::now();
        }
    }
}

/// Data Store kept entirely in memory
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal("memory store lock poisoned".to_string()))
    }
}

fn newest_first(bookings: &mut [Booking]) {
    bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        self.tables().map(|_| ())
    }

    async fn insert_hotel(&self, hotel: NewHotel) -> AppResult<Hotel> {
        let now = Utc::now();
        let hotel = Hotel {
            id: Uuid::new_v4(),
            name: hotel.name,
            address: hotel.address,
            zone: hotel.zone,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.tables()?.hotels.insert(hotel.id, hotel.clone());
        Ok(hotel)
    }

    async fn find_hotel(&self, id: Uuid) -> AppResult<Option<Hotel>> {
        Ok(self.tables()?.hotels.get(&id).cloned())
    }

    async fn list_hotels(&self, active_only: bool) -> AppResult<Vec<Hotel>> {
        let mut hotels: Vec<Hotel> = self
            .tables()?
            .hotels
            .values()
            .filter(|h| !active_only || h.is_active)
            .cloned()
            .collect();
        hotels.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(hotels)
    }

    async fn update_hotel(&self, hotel: &Hotel) -> AppResult<Hotel> {
        let mut tables = self.tables()?;
        let stored = tables
            .hotels
            .get_mut(&hotel.id)
            .ok_or_else(|| AppError::NotFound("Hotel".to_string()))?;
        *stored = Hotel {
            updated_at: Utc::now(),
            ..hotel.clone()
        };
        Ok(stored.clone())
    }

    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver> {
        let mut tables = self.tables()?;
        for (existing, _) in tables.drivers.values() {
            if existing.phone_number == driver.phone_number {
                return Err(AppError::DuplicateEntry("phone number".to_string()));
            }
            if existing.license_number == driver.license_number {
                return Err(AppError::DuplicateEntry("license number".to_string()));
            }
        }

        let now = Utc::now();
        let record = Driver {
            id: Uuid::new_v4(),
            name: driver.name,
            phone_number: driver.phone_number,
            license_number: driver.license_number,
            vehicle: driver.vehicle,
            is_active: driver.is_active,
            is_verified: driver.is_verified,
            push_token: None,
            created_at: now,
            updated_at: now,
        };
        tables
            .drivers
            .insert(record.id, (record.clone(), driver.password_hash));
        Ok(record)
    }

    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>> {
        Ok(self.tables()?.drivers.get(&id).map(|(d, _)| d.clone()))
    }

    async fn find_driver_credentials(
        &self,
        phone_number: &str,
    ) -> AppResult<Option<(Driver, String)>> {
        Ok(self
            .tables()?
            .drivers
            .values()
            .find(|(d, _)| d.phone_number == phone_number)
            .cloned())
    }

    async fn list_drivers(&self, assignable_only: bool) -> AppResult<Vec<Driver>> {
        let mut drivers: Vec<Driver> = self
            .tables()?
            .drivers
            .values()
            .map(|(d, _)| d)
            .filter(|d| !assignable_only || d.is_assignable())
            .cloned()
            .collect();
        drivers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(drivers)
    }

    async fn update_driver(&self, driver: &Driver) -> AppResult<Driver> {
        let mut tables = self.tables()?;
        let (stored, _) = tables
            .drivers
            .get_mut(&driver.id)
            .ok_or_else(|| AppError::NotFound("Driver".to_string()))?;
        *stored = Driver {
            updated_at: Utc::now(),
            ..driver.clone()
        };
        Ok(stored.clone())
    }

    async fn delete_driver(&self, id: Uuid) -> AppResult<bool> {
        let mut tables = self.tables()?;
        if tables.drivers.remove(&id).is_none() {
            return Ok(false);
        }
        for booking in tables.bookings.values_mut() {
            if booking.assigned_driver == Some(id) {
                booking.assigned_driver = None;
            }
        }
        Ok(true)
    }

    async fn insert_admin(&self, admin: NewAdmin) -> AppResult<Admin> {
        let mut tables = self.tables()?;
        if tables.admins.values().any(|(a, _)| a.email == admin.email) {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }
        let now = Utc::now();
        let record = Admin {
            id: Uuid::new_v4(),
            name: admin.name,
            email: admin.email,
            role: admin.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables
            .admins
            .insert(record.id, (record.clone(), admin.password_hash));
        Ok(record)
    }

    async fn find_admin(&self, id: Uuid) -> AppResult<Option<Admin>> {
        Ok(self.tables()?.admins.get(&id).map(|(a, _)| a.clone()))
    }

    async fn find_admin_credentials(&self, email: &str) -> AppResult<Option<(Admin, String)>> {
        Ok(self
            .tables()?
            .admins
            .values()
            .find(|(a, _)| a.email == email)
            .cloned())
    }

    async fn find_customer_by_phone(&self, phone_number: &str) -> AppResult<Option<Customer>> {
        Ok(self.tables()?.customers.get(phone_number).cloned())
    }

    async fn list_customers(&self, search: Option<&str>) -> AppResult<Vec<Customer>> {
        let needle = search.map(str::to_lowercase);
        let mut customers: Vec<Customer> = self
            .tables()?
            .customers
            .values()
            .filter(|c| match &needle {
                Some(n) => c.full_name.to_lowercase().contains(n) || c.phone_number.contains(n),
                None => true,
            })
            .cloned()
            .collect();
        customers.sort_by(|a, b| b.last_booking_date.cmp(&a.last_booking_date));
        Ok(customers)
    }

    async fn reconcile_customers(&self) -> AppResult<u64> {
        let mut tables = self.tables()?;
        let mut stats: HashMap<String, (i64, Option<chrono::DateTime<Utc>>)> = HashMap::new();
        for booking in tables.bookings.values() {
            let entry = stats.entry(booking.phone_number.clone()).or_default();
            entry.0 += 1;
            entry.1 = entry.1.max(Some(booking.created_at));
        }

        let mut touched = 0;
        for customer in tables.customers.values_mut() {
            let (total, last) = stats
                .get(&customer.phone_number)
                .copied()
                .unwrap_or((0, None));
            if customer.total_bookings != total || customer.last_booking_date != last {
                customer.total_bookings = total;
                customer.last_booking_date = last;
                customer.updated_at = Utc::now();
                touched += 1;
            }
        }
        Ok(touched)
    }

    async fn insert_booking(
        &self,
        booking: NewBooking,
        customer: CustomerUpsert,
    ) -> AppResult<Booking> {
        let now = Utc::now();
        let fields = booking.fields;
        let record = Booking {
            id: Uuid::new_v4(),
            full_name: fields.full_name,
            phone_number: fields.phone_number,
            email: fields.email,
            hotel_id: fields.hotel_id,
            booking_type: fields.booking_type,
            arrival_time: fields.arrival_time,
            pickup_location_address: fields.pickup_location_address,
            number_of_bags: fields.number_of_bags,
            device_id: fields.device_id,
            status: BookingStatus::Pending,
            is_picked_up: false,
            assigned_driver: None,
            confirmed_by: None,
            confirmed_at: None,
            picked_up_at: None,
            completed_at: None,
            completion_images: Vec::new(),
            notes: booking.notes,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let mut tables = self.tables()?;
        tables.bookings.insert(record.id, record.clone());
        tables.upsert_customer(&customer);
        Ok(record)
    }

    async fn find_booking(&self, id: Uuid) -> AppResult<Option<Booking>> {
        Ok(self.tables()?.bookings.get(&id).cloned())
    }

    async fn update_booking(
        &self,
        booking: &Booking,
        customer: Option<CustomerChange>,
    ) -> AppResult<Booking> {
        let mut tables = self.tables()?;
        let stored = tables
            .bookings
            .get_mut(&booking.id)
            .ok_or_else(|| AppError::NotFound("Booking".to_string()))?;
        if stored.version != booking.version {
            return Err(AppError::Conflict(CONCURRENT_MODIFICATION.to_string()));
        }

        *stored = Booking {
            version: booking.version + 1,
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..booking.clone()
        };
        let updated = stored.clone();

        if let Some(change) = customer {
            if let Some(phone) = change.release_phone.as_deref() {
                tables.release_customer(phone);
            }
            tables.upsert_customer(&change.upsert);
        }
        Ok(updated)
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<(Vec<Booking>, u64)> {
        let mut matching: Vec<Booking> = self
            .tables()?
            .bookings
            .values()
            .filter(|b| filter.matches(b))
            .cloned()
            .collect();
        newest_first(&mut matching);

        let total = matching.len() as u64;
        let offset = usize::try_from(filter.pagination.offset()).unwrap_or(usize::MAX);
        let page = matching
            .into_iter()
            .skip(offset)
            .take(filter.pagination.per_page as usize)
            .collect();
        Ok((page, total))
    }

    async fn bookings_for_device(&self, device_id: &str) -> AppResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .tables()?
            .bookings
            .values()
            .filter(|b| b.device_id == device_id)
            .cloned()
            .collect();
        newest_first(&mut bookings);
        Ok(bookings)
    }

    async fn bookings_for_driver(
        &self,
        driver_id: Uuid,
        statuses: &[BookingStatus],
    ) -> AppResult<Vec<Booking>> {
        let mut bookings: Vec<Booking> = self
            .tables()?
            .bookings
            .values()
            .filter(|b| b.is_assigned_to(driver_id) && statuses.contains(&b.status))
            .cloned()
            .collect();
        newest_first(&mut bookings);
        Ok(bookings)
    }

    async fn count_bookings_by_status(&self) -> AppResult<Vec<(BookingStatus, i64)>> {
        let tables = self.tables()?;
        Ok(BookingStatus::ALL
            .into_iter()
            .map(|status| {
                let count = tables
                    .bookings
                    .values()
                    .filter(|b| b.status == status)
                    .count() as i64;
                (status, count)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingType;
    use shared::ValidBooking;

    fn new_booking(phone: &str) -> NewBooking {
        NewBooking {
            fields: ValidBooking {
                full_name: "A".to_string(),
                phone_number: phone.to_string(),
                email: None,
                hotel_id: Uuid::new_v4(),
                booking_type: BookingType::Airport,
                arrival_time: Some("14:00".to_string()),
                pickup_location_address: None,
                number_of_bags: 2,
                device_id: "d1".to_string(),
            },
            notes: None,
        }
    }

    fn upsert(phone: &str) -> CustomerUpsert {
        CustomerUpsert {
            phone_number: phone.to_string(),
            full_name: "A".to_string(),
            email: None,
            counts_booking: true,
            booked_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_stale_version_is_rejected() {
        let store = MemoryStore::new();
        let booking = store
            .insert_booking(new_booking("+84912345678"), upsert("+84912345678"))
            .await
            .unwrap();

        let mut first = booking.clone();
        first.status = BookingStatus::Confirmed;
        let saved = store.update_booking(&first, None).await.unwrap();
        assert_eq!(saved.version, booking.version + 1);

        let mut second = booking.clone();
        second.status = BookingStatus::Cancelled;
        let err = store.update_booking(&second, None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let stored = store.find_booking(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_phone_move_releases_old_customer() {
        let store = MemoryStore::new();
        let booking = store
            .insert_booking(new_booking("+84900000001"), upsert("+84900000001"))
            .await
            .unwrap();

        let mut moved = booking.clone();
        moved.phone_number = "+84900000002".to_string();
        store
            .update_booking(
                &moved,
                Some(CustomerChange {
                    upsert: upsert("+84900000002"),
                    release_phone: Some("+84900000001".to_string()),
                }),
            )
            .await
            .unwrap();

        let old = store.find_customer_by_phone("+84900000001").await.unwrap().unwrap();
        let new = store.find_customer_by_phone("+84900000002").await.unwrap().unwrap();
        assert_eq!(old.total_bookings, 0);
        assert_eq!(new.total_bookings, 1);
    }

    #[tokio::test]
    async fn test_repeat_booking_overwrites_profile() {
        let store = MemoryStore::new();
        let first = CustomerUpsert {
            email: Some("a@example.com".to_string()),
            ..upsert("+84900000004")
        };
        store
            .insert_booking(new_booking("+84900000004"), first)
            .await
            .unwrap();
        let second = CustomerUpsert {
            full_name: "B".to_string(),
            ..upsert("+84900000004")
        };
        store
            .insert_booking(new_booking("+84900000004"), second)
            .await
            .unwrap();

        let customer = store.find_customer_by_phone("+84900000004").await.unwrap().unwrap();
        assert_eq!(customer.full_name, "B");
        assert_eq!(customer.email, None);
        assert_eq!(customer.total_bookings, 2);
    }

    #[tokio::test]
    async fn test_reconcile_repairs_counters() {
        let store = MemoryStore::new();
        store
            .insert_booking(new_booking("+84900000003"), upsert("+84900000003"))
            .await
            .unwrap();
        store
            .tables()
            .unwrap()
            .customers
            .get_mut("+84900000003")
            .unwrap()
            .total_bookings = 7;

        assert_eq!(store.reconcile_customers().await.unwrap(), 1);
        let customer = store.find_customer_by_phone("+84900000003").await.unwrap().unwrap();
        assert_eq!(customer.total_bookings, 1);
        assert_eq!(store.reconcile_customers().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_driver_phone() {
        let store = MemoryStore::new();
        let driver = NewDriver {
            name: "Minh".to_string(),
            phone_number: "+84901234567".to_string(),
            license_number: "B2-1".to_string(),
            password_hash: "hash".to_string(),
            vehicle: Default::default(),
            is_active: true,
            is_verified: true,
        };
        store.insert_driver(driver.clone()).await.unwrap();

        let err = store
            .insert_driver(NewDriver {
                license_number: "B2-2".to_string(),
                ..driver.clone()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEntry(ref f) if f == "phone number"));

        let err = store
            .insert_driver(NewDriver {
                phone_number: "+84901234999".to_string(),
                ..driver
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateEntry(ref f) if f == "license number"));
    }
}
