//! PostgreSQL Data Store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::{
    BookingFilter, CustomerChange, CustomerUpsert, DataStore, NewAdmin, NewBooking, NewDriver,
    NewHotel, CONCURRENT_MODIFICATION,
};
use crate::error::{AppError, AppResult};
use crate::models::{Admin, Booking, BookingStatus, Customer, Driver, Hotel, VehicleInfo};

const BOOKING_COLUMNS: &str = r#"
    id, full_name, phone_number, email, hotel_id, booking_type, arrival_time,
    pickup_location_address, number_of_bags, device_id, status, is_picked_up,
    assigned_driver, confirmed_by, confirmed_at, picked_up_at, completed_at,
    completion_images, notes, version, created_at, updated_at
"#;

const DRIVER_COLUMNS: &str = r#"
    id, name, phone_number, license_number, vehicle_type, vehicle_make, vehicle_model,
    vehicle_year, plate_number, vehicle_color, is_active, is_verified, push_token,
    created_at, updated_at
"#;

/// Data Store backed by a PostgreSQL pool
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(Debug, sqlx::FromRow)]
struct HotelRow {
    id: Uuid,
    name: String,
    address: String,
    zone: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<HotelRow> for Hotel {
    type Error = AppError;

    fn try_from(row: HotelRow) -> Result<Self, Self::Error> {
        Ok(Hotel {
            id: row.id,
            name: row.name,
            address: row.address,
            zone: row.zone.parse().map_err(corrupt_column)?,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DriverRow {
    id: Uuid,
    name: String,
    phone_number: String,
    license_number: String,
    vehicle_type: Option<String>,
    vehicle_make: Option<String>,
    vehicle_model: Option<String>,
    vehicle_year: Option<i32>,
    plate_number: Option<String>,
    vehicle_color: Option<String>,
    is_active: bool,
    is_verified: bool,
    push_token: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DriverRow> for Driver {
    fn from(row: DriverRow) -> Self {
        Driver {
            id: row.id,
            name: row.name,
            phone_number: row.phone_number,
            license_number: row.license_number,
            vehicle: VehicleInfo {
                vehicle_type: row.vehicle_type,
                make: row.vehicle_make,
                model: row.vehicle_model,
                year: row.vehicle_year,
                plate_number: row.plate_number,
                color: row.vehicle_color,
            },
            is_active: row.is_active,
            is_verified: row.is_verified,
            push_token: row.push_token,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DriverCredentialsRow {
    #[sqlx(flatten)]
    driver: DriverRow,
    password_hash: String,
}

#[derive(Debug, sqlx::FromRow)]
struct AdminRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AdminRow> for Admin {
    type Error = AppError;

    fn try_from(row: AdminRow) -> Result<Self, Self::Error> {
        Ok(Admin {
            id: row.id,
            name: row.name,
            email: row.email,
            role: row.role.parse().map_err(corrupt_column)?,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AdminCredentialsRow {
    #[sqlx(flatten)]
    admin: AdminRow,
    password_hash: String,
}

#[derive(Debug, sqlx::FromRow)]
struct CustomerRow {
    id: Uuid,
    full_name: String,
    phone_number: String,
    email: Option<String>,
    address: Option<String>,
    notes: Option<String>,
    is_active: bool,
    total_bookings: i64,
    last_booking_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CustomerRow> for Customer {
    fn from(row: CustomerRow) -> Self {
        Customer {
            id: row.id,
            full_name: row.full_name,
            phone_number: row.phone_number,
            email: row.email,
            address: row.address,
            notes: row.notes,
            is_active: row.is_active,
            total_bookings: row.total_bookings,
            last_booking_date: row.last_booking_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    full_name: String,
    phone_number: String,
    email: Option<String>,
    hotel_id: Uuid,
    booking_type: String,
    arrival_time: Option<String>,
    pickup_location_address: Option<String>,
    number_of_bags: i32,
    device_id: String,
    status: String,
    is_picked_up: bool,
    assigned_driver: Option<Uuid>,
    confirmed_by: Option<Uuid>,
    confirmed_at: Option<DateTime<Utc>>,
    picked_up_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    completion_images: Vec<String>,
    notes: Option<String>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            full_name: row.full_name,
            phone_number: row.phone_number,
            email: row.email,
            hotel_id: row.hotel_id,
            booking_type: row.booking_type.parse().map_err(corrupt_column)?,
            arrival_time: row.arrival_time,
            pickup_location_address: row.pickup_location_address,
            number_of_bags: row.number_of_bags,
            device_id: row.device_id,
            status: row.status.parse().map_err(corrupt_column)?,
            is_picked_up: row.is_picked_up,
            assigned_driver: row.assigned_driver,
            confirmed_by: row.confirmed_by,
            confirmed_at: row.confirmed_at,
            picked_up_at: row.picked_up_at,
            completed_at: row.completed_at,
            completion_images: row.completion_images,
            notes: row.notes,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn corrupt_column(err: impl std::fmt::Display) -> AppError {
    AppError::Internal(format!("unexpected column value: {}", err))
}

fn into_bookings(rows: Vec<BookingRow>) -> AppResult<Vec<Booking>> {
    rows.into_iter().map(Booking::try_from).collect()
}

/// Map unique constraint violations to the field that collided
fn map_unique_violation(err: sqlx::Error) -> AppError {
    let field = err
        .as_database_error()
        .and_then(|db| db.constraint())
        .and_then(|constraint| match constraint {
            "drivers_phone_number_key" => Some("phone number"),
            "drivers_license_number_key" => Some("license number"),
            "admins_email_key" => Some("email"),
            _ => None,
        });
    match field {
        Some(field) => AppError::DuplicateEntry(field.to_string()),
        None => AppError::DatabaseError(err),
    }
}

// ============================================================================
// Customer upkeep (runs inside the booking transaction)
// ============================================================================

async fn upsert_customer(conn: &mut PgConnection, upsert: &CustomerUpsert) -> AppResult<()> {
    sqlx::query(
        r#"
        INSERT INTO customers (phone_number, full_name, email, total_bookings, last_booking_date)
        VALUES ($1, $2, $3, 1, $4)
        ON CONFLICT (phone_number) DO UPDATE SET
            full_name = EXCLUDED.full_name,
            email = EXCLUDED.email,
            total_bookings = customers.total_bookings + CASE WHEN $5 THEN 1 ELSE 0 END,
            last_booking_date = CASE
                WHEN $5 THEN EXCLUDED.last_booking_date
                ELSE COALESCE(customers.last_booking_date, EXCLUDED.last_booking_date)
            END,
            updated_at = NOW()
        "#,
    )
    .bind(&upsert.phone_number)
    .bind(&upsert.full_name)
    .bind(&upsert.email)
    .bind(upsert.booked_at)
    .bind(upsert.counts_booking)
    .execute(conn)
    .await?;
    Ok(())
}

async fn release_customer(conn: &mut PgConnection, phone_number: &str) -> AppResult<()> {
    sqlx::query(
        r#"
        UPDATE customers
        SET total_bookings = GREATEST(total_bookings - 1, 0), updated_at = NOW()
        WHERE phone_number = $1
        "#,
    )
    .bind(phone_number)
    .execute(conn)
    .await?;
    Ok(())
}

#[async_trait]
impl DataStore for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    // ========================================================================
    // Hotels
    // ========================================================================

    async fn insert_hotel(&self, hotel: NewHotel) -> AppResult<Hotel> {
        let row = sqlx::query_as::<_, HotelRow>(
            r#"
            INSERT INTO hotels (name, address, zone)
            VALUES ($1, $2, $3)
            RETURNING id, name, address, zone, is_active, created_at, updated_at
            "#,
        )
        .bind(&hotel.name)
        .bind(&hotel.address)
        .bind(hotel.zone.as_str())
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    async fn find_hotel(&self, id: Uuid) -> AppResult<Option<Hotel>> {
        sqlx::query_as::<_, HotelRow>(
            r#"
            SELECT id, name, address, zone, is_active, created_at, updated_at
            FROM hotels
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .map(Hotel::try_from)
        .transpose()
    }

    async fn list_hotels(&self, active_only: bool) -> AppResult<Vec<Hotel>> {
        let rows = sqlx::query_as::<_, HotelRow>(
            r#"
            SELECT id, name, address, zone, is_active, created_at, updated_at
            FROM hotels
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY name
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(Hotel::try_from).collect()
    }

    async fn update_hotel(&self, hotel: &Hotel) -> AppResult<Hotel> {
        sqlx::query_as::<_, HotelRow>(
            r#"
            UPDATE hotels
            SET name = $2, address = $3, zone = $4, is_active = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, address, zone, is_active, created_at, updated_at
            "#,
        )
        .bind(hotel.id)
        .bind(&hotel.name)
        .bind(&hotel.address)
        .bind(hotel.zone.as_str())
        .bind(hotel.is_active)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Hotel".to_string()))?
        .try_into()
    }

    // ========================================================================
    // Drivers
    // ========================================================================

    async fn insert_driver(&self, driver: NewDriver) -> AppResult<Driver> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            r#"
            INSERT INTO drivers (
                name, phone_number, license_number, password_hash, vehicle_type,
                vehicle_make, vehicle_model, vehicle_year, plate_number, vehicle_color,
                is_active, is_verified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {DRIVER_COLUMNS}
            "#
        ))
        .bind(&driver.name)
        .bind(&driver.phone_number)
        .bind(&driver.license_number)
        .bind(&driver.password_hash)
        .bind(&driver.vehicle.vehicle_type)
        .bind(&driver.vehicle.make)
        .bind(&driver.vehicle.model)
        .bind(driver.vehicle.year)
        .bind(&driver.vehicle.plate_number)
        .bind(&driver.vehicle.color)
        .bind(driver.is_active)
        .bind(driver.is_verified)
        .fetch_one(&self.db)
        .await
        .map_err(map_unique_violation)?;

        Ok(row.into())
    }

    async fn find_driver(&self, id: Uuid) -> AppResult<Option<Driver>> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {DRIVER_COLUMNS} FROM drivers WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Driver::from))
    }

    async fn find_driver_credentials(
        &self,
        phone_number: &str,
    ) -> AppResult<Option<(Driver, String)>> {
        let row = sqlx::query_as::<_, DriverCredentialsRow>(&format!(
            "SELECT {DRIVER_COLUMNS}, password_hash FROM drivers WHERE phone_number = $1"
        ))
        .bind(phone_number)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(|r| (r.driver.into(), r.password_hash)))
    }

    async fn list_drivers(&self, assignable_only: bool) -> AppResult<Vec<Driver>> {
        let rows = sqlx::query_as::<_, DriverRow>(&format!(
            r#"
            SELECT {DRIVER_COLUMNS}
            FROM drivers
            WHERE ($1 = FALSE OR (is_active = TRUE AND is_verified = TRUE))
            ORDER BY name
            "#
        ))
        .bind(assignable_only)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Driver::from).collect())
    }

    async fn update_driver(&self, driver: &Driver) -> AppResult<Driver> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            r#"
            UPDATE drivers
            SET name = $2, vehicle_type = $3, vehicle_make = $4, vehicle_model = $5,
                vehicle_year = $6, plate_number = $7, vehicle_color = $8,
                is_active = $9, is_verified = $10, push_token = $11, updated_at = NOW()
            WHERE id = $1
            RETURNING {DRIVER_COLUMNS}
            "#
        ))
        .bind(driver.id)
        .bind(&driver.name)
        .bind(&driver.vehicle.vehicle_type)
        .bind(&driver.vehicle.make)
        .bind(&driver.vehicle.model)
        .bind(driver.vehicle.year)
        .bind(&driver.vehicle.plate_number)
        .bind(&driver.vehicle.color)
        .bind(driver.is_active)
        .bind(driver.is_verified)
        .bind(&driver.push_token)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Driver".to_string()))?;

        Ok(row.into())
    }

    async fn delete_driver(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM drivers WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ========================================================================
    // Admins
    // ========================================================================

    async fn insert_admin(&self, admin: NewAdmin) -> AppResult<Admin> {
        sqlx::query_as::<_, AdminRow>(
            r#"
            INSERT INTO admins (name, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, role, is_active, created_at, updated_at
            "#,
        )
        .bind(&admin.name)
        .bind(&admin.email)
        .bind(&admin.password_hash)
        .bind(admin.role.as_str())
        .fetch_one(&self.db)
        .await
        .map_err(map_unique_violation)?
        .try_into()
    }

    async fn find_admin(&self, id: Uuid) -> AppResult<Option<Admin>> {
        sqlx::query_as::<_, AdminRow>(
            r#"
            SELECT id, name, email, role, is_active, created_at, updated_at
            FROM admins
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .map(Admin::try_from)
        .transpose()
    }

    async fn find_admin_credentials(&self, email: &str) -> AppResult<Option<(Admin, String)>> {
        let row = sqlx::query_as::<_, AdminCredentialsRow>(
            r#"
            SELECT id, name, email, role, is_active, created_at, updated_at, password_hash
            FROM admins
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        match row {
            Some(r) => Ok(Some((r.admin.try_into()?, r.password_hash))),
            None => Ok(None),
        }
    }

    // ========================================================================
    // Customers
    // ========================================================================

    async fn find_customer_by_phone(&self, phone_number: &str) -> AppResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT id, full_name, phone_number, email, address, notes, is_active,
                   total_bookings, last_booking_date, created_at, updated_at
            FROM customers
            WHERE phone_number = $1
            "#,
        )
        .bind(phone_number)
        .fetch_optional(&self.db)
        .await?;

        Ok(row.map(Customer::from))
    }

    async fn list_customers(&self, search: Option<&str>) -> AppResult<Vec<Customer>> {
        let rows = sqlx::query_as::<_, CustomerRow>(
            r#"
            SELECT id, full_name, phone_number, email, address, notes, is_active,
                   total_bookings, last_booking_date, created_at, updated_at
            FROM customers
            WHERE ($1::text IS NULL
                   OR full_name ILIKE '%' || $1 || '%'
                   OR phone_number LIKE '%' || $1 || '%')
            ORDER BY last_booking_date DESC NULLS LAST
            "#,
        )
        .bind(search)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn reconcile_customers(&self) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            WITH stats AS (
                SELECT phone_number, COUNT(*) AS total, MAX(created_at) AS last_booking
                FROM bookings
                GROUP BY phone_number
            )
            UPDATE customers c
            SET total_bookings = COALESCE(s.total, 0),
                last_booking_date = s.last_booking,
                updated_at = NOW()
            FROM customers c2
            LEFT JOIN stats s ON s.phone_number = c2.phone_number
            WHERE c.id = c2.id
              AND (c.total_bookings IS DISTINCT FROM COALESCE(s.total, 0)
                   OR c.last_booking_date IS DISTINCT FROM s.last_booking)
            "#,
        )
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }

    // ========================================================================
    // Bookings
    // ========================================================================

    async fn insert_booking(
        &self,
        booking: NewBooking,
        customer: CustomerUpsert,
    ) -> AppResult<Booking> {
        let fields = booking.fields;
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            INSERT INTO bookings (
                full_name, phone_number, email, hotel_id, booking_type, arrival_time,
                pickup_location_address, number_of_bags, device_id, status, notes
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'pending', $10)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(&fields.full_name)
        .bind(&fields.phone_number)
        .bind(&fields.email)
        .bind(fields.hotel_id)
        .bind(fields.booking_type.as_str())
        .bind(&fields.arrival_time)
        .bind(&fields.pickup_location_address)
        .bind(fields.number_of_bags)
        .bind(&fields.device_id)
        .bind(&booking.notes)
        .fetch_one(&mut *tx)
        .await?;

        upsert_customer(&mut tx, &customer).await?;
        tx.commit().await?;

        row.try_into()
    }

    async fn find_booking(&self, id: Uuid) -> AppResult<Option<Booking>> {
        sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .map(Booking::try_from)
        .transpose()
    }

    async fn update_booking(
        &self,
        booking: &Booking,
        customer: Option<CustomerChange>,
    ) -> AppResult<Booking> {
        let mut tx = self.db.begin().await?;

        let row = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            UPDATE bookings
            SET full_name = $3, phone_number = $4, email = $5, hotel_id = $6,
                booking_type = $7, arrival_time = $8, pickup_location_address = $9,
                number_of_bags = $10, status = $11, is_picked_up = $12,
                assigned_driver = $13, confirmed_by = $14, confirmed_at = $15,
                picked_up_at = $16, completed_at = $17, completion_images = $18,
                notes = $19, version = version + 1, updated_at = NOW()
            WHERE id = $1 AND version = $2
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(booking.id)
        .bind(booking.version)
        .bind(&booking.full_name)
        .bind(&booking.phone_number)
        .bind(&booking.email)
        .bind(booking.hotel_id)
        .bind(booking.booking_type.as_str())
        .bind(&booking.arrival_time)
        .bind(&booking.pickup_location_address)
        .bind(booking.number_of_bags)
        .bind(booking.status.as_str())
        .bind(booking.is_picked_up)
        .bind(booking.assigned_driver)
        .bind(booking.confirmed_by)
        .bind(booking.confirmed_at)
        .bind(booking.picked_up_at)
        .bind(booking.completed_at)
        .bind(&booking.completion_images)
        .bind(&booking.notes)
        .fetch_optional(&mut *tx)
        .await?;

        let row = match row {
            Some(row) => row,
            None => {
                let exists: bool =
                    sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM bookings WHERE id = $1)")
                        .bind(booking.id)
                        .fetch_one(&mut *tx)
                        .await?;
                return Err(if exists {
                    AppError::Conflict(CONCURRENT_MODIFICATION.to_string())
                } else {
                    AppError::NotFound("Booking".to_string())
                });
            }
        };

        if let Some(change) = customer {
            if let Some(phone) = change.release_phone.as_deref() {
                release_customer(&mut tx, phone).await?;
            }
            upsert_customer(&mut tx, &change.upsert).await?;
        }

        tx.commit().await?;
        row.try_into()
    }

    async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<(Vec<Booking>, u64)> {
        const FILTER: &str = r#"
            ($1::text IS NULL OR status = $1)
            AND ($2::text IS NULL OR booking_type = $2)
            AND ($3::uuid IS NULL OR hotel_id = $3)
            AND ($4::uuid IS NULL OR assigned_driver = $4)
            AND ($5::text IS NULL
                 OR full_name ILIKE '%' || $5 || '%'
                 OR phone_number LIKE '%' || $5 || '%')
        "#;

        let status = filter.status.map(|s| s.as_str());
        let booking_type = filter.booking_type.map(|t| t.as_str());
        let search = filter.search.as_deref();

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM bookings WHERE {FILTER}"))
            .bind(status)
            .bind(booking_type)
            .bind(filter.hotel_id)
            .bind(filter.driver_id)
            .bind(search)
            .fetch_one(&self.db)
            .await?;

        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE {FILTER}
            ORDER BY created_at DESC
            LIMIT $6 OFFSET $7
            "#
        ))
        .bind(status)
        .bind(booking_type)
        .bind(filter.hotel_id)
        .bind(filter.driver_id)
        .bind(search)
        .bind(i64::from(filter.pagination.per_page))
        .bind(filter.pagination.offset() as i64)
        .fetch_all(&self.db)
        .await?;

        Ok((into_bookings(rows)?, total.max(0) as u64))
    }

    async fn bookings_for_device(&self, device_id: &str) -> AppResult<Vec<Booking>> {
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE device_id = $1 ORDER BY created_at DESC"
        ))
        .bind(device_id)
        .fetch_all(&self.db)
        .await?;

        into_bookings(rows)
    }

    async fn bookings_for_driver(
        &self,
        driver_id: Uuid,
        statuses: &[BookingStatus],
    ) -> AppResult<Vec<Booking>> {
        let statuses: Vec<&str> = statuses.iter().map(|s| s.as_str()).collect();
        let rows = sqlx::query_as::<_, BookingRow>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE assigned_driver = $1 AND status = ANY($2)
            ORDER BY created_at DESC
            "#
        ))
        .bind(driver_id)
        .bind(&statuses)
        .fetch_all(&self.db)
        .await?;

        into_bookings(rows)
    }

    async fn count_bookings_by_status(&self) -> AppResult<Vec<(BookingStatus, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM bookings GROUP BY status",
        )
        .fetch_all(&self.db)
        .await?;

        let mut counts: Vec<(BookingStatus, i64)> =
            BookingStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for (status, count) in rows {
            let status: BookingStatus = status.parse().map_err(corrupt_column)?;
            if let Some(entry) = counts.iter_mut().find(|(s, _)| *s == status) {
                entry.1 = count;
            }
        }
        Ok(counts)
    }
}
