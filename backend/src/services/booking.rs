//! Booking Lifecycle Manager
//!
//! Owns the booking status workflow: creation, confirmation, driver
//! assignment, pickup, completion and cancellation, plus the administrative
//! override paths. Every operation loads the booking, checks the requested
//! transition against [`BookingStatus::apply`], applies the change to a copy
//! and persists it in one version-checked write. Events are published after
//! the write succeeds; publish failures are logged and never fail the call.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{
    Booking, BookingAction, BookingDetails, BookingStatus, Driver, DriverSummary, Hotel,
    HotelSummary,
};
use crate::services::notification::NotificationSink;
use crate::store::{BookingFilter, CustomerChange, CustomerUpsert, DataStore, NewBooking};
use shared::{
    deserialize_some, validate_booking, validate_notes, BookingDraft, BookingEvent,
    PaginatedResponse, ValidBooking, MAX_COMPLETION_IMAGES,
};

const NO_FIELDS: &str = "No valid fields provided for update";
const NOT_YOUR_BOOKING: &str = "You are not assigned to this booking";

/// Customer-facing edit of a pending booking
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditBookingInput {
    pub full_name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub hotel_id: Option<String>,
    pub booking_type: Option<String>,
    pub arrival_time: Option<String>,
    pub pickup_location_address: Option<String>,
    pub number_of_bags: Option<i64>,
}

impl EditBookingInput {
    fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone_number.is_none()
            && self.email.is_none()
            && self.hotel_id.is_none()
            && self.booking_type.is_none()
            && self.arrival_time.is_none()
            && self.pickup_location_address.is_none()
            && self.number_of_bags.is_none()
    }

    /// Overlay the provided fields on an existing booking's values
    fn merge_into(self, mut draft: BookingDraft) -> BookingDraft {
        draft.full_name = self.full_name.or(draft.full_name);
        draft.phone_number = self.phone_number.or(draft.phone_number);
        draft.email = self.email.or(draft.email);
        draft.hotel_id = self.hotel_id.or(draft.hotel_id);
        draft.booking_type = self.booking_type.or(draft.booking_type);
        draft.arrival_time = self.arrival_time.or(draft.arrival_time);
        draft.pickup_location_address = self
            .pickup_location_address
            .or(draft.pickup_location_address);
        draft.number_of_bags = self.number_of_bags.or(draft.number_of_bags);
        draft
    }
}

/// Admin comprehensive update; any subset of mutable fields
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingInput {
    #[serde(flatten)]
    pub fields: EditBookingInput,
    pub status: Option<String>,
    /// `null` removes the assigned driver
    #[serde(default, deserialize_with = "deserialize_some")]
    pub assigned_driver: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub notes: Option<Option<String>>,
}

impl UpdateBookingInput {
    fn is_empty(&self) -> bool {
        self.fields.is_empty()
            && self.status.is_none()
            && self.assigned_driver.is_none()
            && self.notes.is_none()
    }
}

/// Booking lifecycle service
#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn DataStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl BookingService {
    pub fn new(store: Arc<dyn DataStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { store, notifier }
    }

    // ========================================================================
    // Customer-facing operations
    // ========================================================================

    /// Create a pending booking and upsert the customer profile for its phone
    pub async fn create_booking(&self, draft: BookingDraft) -> AppResult<Booking> {
        let fields = validate_booking(&draft).map_err(AppError::ValidationErrors)?;
        self.active_hotel(fields.hotel_id).await?;

        let customer = CustomerUpsert {
            phone_number: fields.phone_number.clone(),
            full_name: fields.full_name.clone(),
            email: fields.email.clone(),
            counts_booking: true,
            booked_at: Utc::now(),
        };
        let booking = self
            .store
            .insert_booking(
                NewBooking {
                    fields,
                    notes: None,
                },
                customer,
            )
            .await?;

        info!(
            booking_id = %booking.id,
            booking_type = %booking.booking_type,
            "Booking created"
        );
        self.publish(BookingEvent::Created {
            booking_id: booking.id,
            status: booking.status,
            booking: Box::new(booking.clone()),
        });

        Ok(booking)
    }

    /// One booking with its hotel and driver resolved
    pub async fn get_booking(&self, id: Uuid) -> AppResult<BookingDetails> {
        let booking = self.load(id).await?;

        let hotel = self
            .store
            .find_hotel(booking.hotel_id)
            .await?
            .as_ref()
            .map(HotelSummary::from);
        let driver = match booking.assigned_driver {
            Some(driver_id) => self
                .store
                .find_driver(driver_id)
                .await?
                .as_ref()
                .map(DriverSummary::from),
            None => None,
        };

        Ok(BookingDetails {
            booking,
            hotel,
            driver,
        })
    }

    /// "My bookings" for an anonymous device, newest first
    pub async fn bookings_for_device(&self, device_id: &str) -> AppResult<Vec<Booking>> {
        let device_id = device_id.trim();
        if device_id.is_empty() {
            return Err(AppError::validation("Device ID is required"));
        }
        self.store.bookings_for_device(device_id).await
    }

    /// Edit a booking that is still pending
    pub async fn edit_booking(&self, id: Uuid, patch: EditBookingInput) -> AppResult<Booking> {
        let mut booking = self.load(id).await?;
        booking.status.apply(BookingAction::Edit)?;

        if patch.is_empty() {
            return Err(AppError::BadRequest(NO_FIELDS.to_string()));
        }

        let hotel_changed = patch.hotel_id.is_some();
        let draft = patch.merge_into(BookingDraft::from(&booking));
        let fields = validate_booking(&draft).map_err(AppError::ValidationErrors)?;
        if hotel_changed && fields.hotel_id != booking.hotel_id {
            self.active_hotel(fields.hotel_id).await?;
        }

        let change = customer_change(&booking, &fields);
        apply_fields(&mut booking, fields);
        let booking = self.store.update_booking(&booking, Some(change)).await?;

        info!(booking_id = %booking.id, "Booking edited");
        Ok(booking)
    }

    /// Cancel a booking that is still pending
    pub async fn cancel_booking(&self, id: Uuid) -> AppResult<Booking> {
        let mut booking = self.load(id).await?;
        booking.status = booking.status.apply(BookingAction::Cancel)?;

        let booking = self.store.update_booking(&booking, None).await?;

        info!(booking_id = %booking.id, "Booking cancelled");
        self.publish(BookingEvent::Cancelled {
            booking_id: booking.id,
            status: booking.status,
            booking: Box::new(booking.clone()),
        });

        Ok(booking)
    }

    // ========================================================================
    // Admin operations
    // ========================================================================

    pub async fn confirm_booking(&self, id: Uuid, admin_id: Uuid) -> AppResult<Booking> {
        let mut booking = self.load(id).await?;
        booking.status = booking.status.apply(BookingAction::Confirm)?;

        let confirmed_at = Utc::now();
        booking.confirmed_by = Some(admin_id);
        booking.confirmed_at = Some(confirmed_at);
        let booking = self.store.update_booking(&booking, None).await?;

        info!(booking_id = %booking.id, admin_id = %admin_id, "Booking confirmed");
        self.publish(BookingEvent::Confirmed {
            booking_id: booking.id,
            status: booking.status,
            confirmed_by: admin_id,
            confirmed_at,
            booking: Box::new(booking.clone()),
        });

        Ok(booking)
    }

    /// Assign (or reassign) an active, verified driver
    pub async fn assign_driver(&self, id: Uuid, driver_id: Uuid) -> AppResult<Booking> {
        let mut booking = self.load(id).await?;
        self.assignable_driver(driver_id).await?;
        booking.status = booking.status.apply(BookingAction::AssignDriver)?;

        booking.assigned_driver = Some(driver_id);
        let booking = self.store.update_booking(&booking, None).await?;

        info!(booking_id = %booking.id, driver_id = %driver_id, "Driver assigned");
        self.publish(BookingEvent::Assigned {
            booking_id: booking.id,
            status: booking.status,
            driver_id,
            booking: Box::new(booking.clone()),
        });

        Ok(booking)
    }

    /// Administrative status override; any status from any status
    pub async fn update_status(
        &self,
        id: Uuid,
        status: BookingStatus,
        admin_id: Uuid,
    ) -> AppResult<Booking> {
        let mut booking = self.load(id).await?;
        let previous = booking.status;
        force_status(&mut booking, status, admin_id);

        let booking = self.store.update_booking(&booking, None).await?;
        self.publish(BookingEvent::StatusOverridden {
            booking_id: booking.id,
            previous_status: previous,
            status: booking.status,
            overridden_by: admin_id,
            booking: Box::new(booking.clone()),
        });

        Ok(booking)
    }

    /// Admin comprehensive update
    ///
    /// Every provided field is validated before anything is written. Setting a
    /// driver on a pending or confirmed booking advances it to `assigned`
    /// unless the same request names a status.
    pub async fn update_booking(
        &self,
        id: Uuid,
        input: UpdateBookingInput,
        admin_id: Uuid,
    ) -> AppResult<Booking> {
        if input.is_empty() {
            return Err(AppError::BadRequest(NO_FIELDS.to_string()));
        }
        let mut booking = self.load(id).await?;

        let hotel_changed = input.fields.hotel_id.is_some();
        let draft = input.fields.merge_into(BookingDraft::from(&booking));
        let mut errors = Vec::new();
        let fields = match validate_booking(&draft) {
            Ok(fields) => Some(fields),
            Err(mut field_errors) => {
                errors.append(&mut field_errors);
                None
            }
        };

        let status = match input.status.as_deref() {
            Some(raw) => match parse_status(raw) {
                Ok(status) => Some(status),
                Err(msg) => {
                    errors.push(msg);
                    None
                }
            },
            None => None,
        };

        let driver = match &input.assigned_driver {
            Some(Some(raw)) => match Uuid::parse_str(raw.trim()) {
                Ok(driver_id) => Some(Some(driver_id)),
                Err(_) => {
                    errors.push("Driver ID is invalid".to_string());
                    None
                }
            },
            Some(None) => Some(None),
            None => None,
        };

        let notes = match input.notes {
            Some(Some(notes)) => match validate_notes(&notes) {
                Ok(()) => Some(Some(notes)),
                Err(msg) => {
                    errors.push(msg.to_string());
                    None
                }
            },
            other => other,
        };

        let fields = match fields {
            Some(fields) if errors.is_empty() => fields,
            _ => return Err(AppError::ValidationErrors(errors)),
        };

        if hotel_changed && fields.hotel_id != booking.hotel_id {
            self.active_hotel(fields.hotel_id).await?;
        }
        if let Some(Some(driver_id)) = driver {
            self.assignable_driver(driver_id).await?;
        }

        // Everything validated; apply to the copy
        let change = customer_change(&booking, &fields);
        let change = (change.release_phone.is_some()
            || change.upsert.full_name != booking.full_name
            || change.upsert.email != booking.email)
            .then_some(change);
        apply_fields(&mut booking, fields);

        if let Some(notes) = notes {
            booking.notes = notes;
        }

        let previous = booking.status;
        if let Some(driver_id) = driver {
            booking.assigned_driver = driver_id;
        }
        let target = match (status, driver) {
            (Some(status), _) => Some(status),
            (None, Some(Some(_)))
                if matches!(previous, BookingStatus::Pending | BookingStatus::Confirmed) =>
            {
                Some(BookingStatus::Assigned)
            }
            _ => None,
        };
        if let Some(target) = target.filter(|t| *t != previous) {
            force_status(&mut booking, target, admin_id);
        }

        let booking = self.store.update_booking(&booking, change).await?;
        info!(booking_id = %booking.id, admin_id = %admin_id, "Booking updated by admin");

        if booking.status != previous {
            self.publish(BookingEvent::StatusOverridden {
                booking_id: booking.id,
                previous_status: previous,
                status: booking.status,
                overridden_by: admin_id,
                booking: Box::new(booking.clone()),
            });
        }

        Ok(booking)
    }

    /// Replace the free-text notes; status is untouched
    pub async fn update_notes(&self, id: Uuid, notes: Option<String>) -> AppResult<Booking> {
        if let Some(notes) = notes.as_deref() {
            validate_notes(notes).map_err(AppError::validation)?;
        }
        let mut booking = self.load(id).await?;
        booking.notes = notes.filter(|n| !n.trim().is_empty());
        self.store.update_booking(&booking, None).await
    }

    pub async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<PaginatedResponse<Booking>> {
        let (items, total) = self.store.list_bookings(filter).await?;
        Ok(PaginatedResponse::new(items, &filter.pagination, total))
    }

    // ========================================================================
    // Driver operations
    // ========================================================================

    pub async fn mark_picked_up(&self, id: Uuid, driver_id: Uuid) -> AppResult<Booking> {
        let mut booking = self.owned_booking(id, driver_id).await?;
        booking.status = booking.status.apply(BookingAction::PickUp)?;

        let picked_up_at = Utc::now();
        booking.is_picked_up = true;
        booking.picked_up_at = Some(picked_up_at);
        let booking = self.store.update_booking(&booking, None).await?;

        info!(booking_id = %booking.id, driver_id = %driver_id, "Luggage picked up");
        self.publish(BookingEvent::picked_up(&booking, picked_up_at));

        Ok(booking)
    }

    /// Complete a booking with stored image references (0 to 5)
    pub async fn mark_completed(
        &self,
        id: Uuid,
        driver_id: Uuid,
        images: Vec<String>,
    ) -> AppResult<Booking> {
        let mut booking = self.owned_booking(id, driver_id).await?;
        booking.status = booking.status.apply(BookingAction::Complete)?;

        if images.len() > MAX_COMPLETION_IMAGES {
            return Err(AppError::validation(format!(
                "At most {MAX_COMPLETION_IMAGES} completion images are allowed"
            )));
        }

        let completed_at = Utc::now();
        booking.completed_at = Some(completed_at);
        booking.completion_images = images;
        let booking = self.store.update_booking(&booking, None).await?;

        info!(
            booking_id = %booking.id,
            driver_id = %driver_id,
            images = booking.completion_images.len(),
            "Booking completed"
        );
        self.publish(BookingEvent::completed(&booking, completed_at));

        Ok(booking)
    }

    /// Active jobs (`history == false`) or completed jobs of a driver
    pub async fn driver_bookings(&self, driver_id: Uuid, history: bool) -> AppResult<Vec<Booking>> {
        let statuses: &[BookingStatus] = if history {
            &[BookingStatus::Completed]
        } else {
            &[BookingStatus::Assigned, BookingStatus::InProgress]
        };
        self.store.bookings_for_driver(driver_id, statuses).await
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn load(&self, id: Uuid) -> AppResult<Booking> {
        self.store
            .find_booking(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Booking".to_string()))
    }

    /// Load a booking and check the driver ownership rule
    async fn owned_booking(&self, id: Uuid, driver_id: Uuid) -> AppResult<Booking> {
        let booking = self.load(id).await?;
        if !booking.is_assigned_to(driver_id) {
            warn!(booking_id = %id, driver_id = %driver_id, "Driver acted on a booking not assigned to them");
            return Err(AppError::Forbidden(NOT_YOUR_BOOKING.to_string()));
        }
        Ok(booking)
    }

    async fn active_hotel(&self, id: Uuid) -> AppResult<Hotel> {
        let hotel = self
            .store
            .find_hotel(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Hotel".to_string()))?;
        if !hotel.is_active {
            return Err(AppError::Conflict("Hotel is not active".to_string()));
        }
        Ok(hotel)
    }

    async fn assignable_driver(&self, id: Uuid) -> AppResult<Driver> {
        let driver = self
            .store
            .find_driver(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Driver".to_string()))?;
        driver.check_assignable()?;
        Ok(driver)
    }

    fn publish(&self, event: BookingEvent) {
        if let Err(e) = self.notifier.publish(&event) {
            warn!(
                event = event.name(),
                booking_id = %event.booking_id(),
                error = %e,
                "Failed to publish booking event"
            );
        }
    }
}

/// Parse a status from request input
pub fn parse_status(raw: &str) -> Result<BookingStatus, String> {
    raw.parse::<BookingStatus>().map_err(|_| {
        format!(
            "Status must be one of: {}",
            BookingStatus::ALL.map(|s| s.as_str()).join(", ")
        )
    })
}

/// Set a status through the override path, logging when the regular table
/// would have refused it
fn force_status(booking: &mut Booking, target: BookingStatus, admin_id: Uuid) {
    let forced = booking.status.force(target);
    if forced.bypassed_rules {
        warn!(
            booking_id = %booking.id,
            admin_id = %admin_id,
            previous = %forced.previous,
            status = %forced.target,
            "Status override bypassed lifecycle rules"
        );
    } else {
        info!(
            booking_id = %booking.id,
            admin_id = %admin_id,
            previous = %forced.previous,
            status = %forced.target,
            "Status set by admin"
        );
    }

    booking.status = forced.target;
    if forced.target == BookingStatus::Completed {
        booking.is_picked_up = true;
    }
}

/// Customer side effect of rewriting a booking's customer fields
fn customer_change(booking: &Booking, fields: &ValidBooking) -> CustomerChange {
    let phone_changed = fields.phone_number != booking.phone_number;
    CustomerChange {
        upsert: CustomerUpsert {
            phone_number: fields.phone_number.clone(),
            full_name: fields.full_name.clone(),
            email: fields.email.clone(),
            counts_booking: phone_changed,
            booked_at: booking.created_at,
        },
        release_phone: phone_changed.then(|| booking.phone_number.clone()),
    }
}

fn apply_fields(booking: &mut Booking, fields: ValidBooking) {
    booking.full_name = fields.full_name;
    booking.phone_number = fields.phone_number;
    booking.email = fields.email;
    booking.hotel_id = fields.hotel_id;
    booking.booking_type = fields.booking_type;
    booking.arrival_time = fields.arrival_time;
    booking.pickup_location_address = fields.pickup_location_address;
    booking.number_of_bags = fields.number_of_bags;
}
