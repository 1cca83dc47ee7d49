use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use super::{ticket_code, BookingError, CancelError};
use crate::models::{BookingStatus, BookingWithEvent, CapacitySnapshot, NewBooking, Ticket};
use crate::notify::{BookingCancellation, BookingConfirmation, Notifier};
use crate::store::{BookingStore, StoreError};

/// Bounded retry for ticket-code collisions at insert time. Collisions are
/// improbable enough that exhausting this is treated as an infrastructure
/// failure.
const TICKET_CODE_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct ReserveRequest {
    pub event_id: Uuid,
    pub attendee_email: String,
    pub attendee_name: String,
    pub metadata: Value,
}

/// The booking core: validates reservation requests against capacity and
/// duplicate-attendee constraints, persists bookings, issues tickets and
/// emits fire-and-forget notifications.
///
/// The engine's capacity/duplicate preflight is an early exit only. The store
/// re-enforces both invariants atomically with the insert, and this engine
/// translates the store's typed violations back into user-facing rejections,
/// so two racing requests for the last slot can never both succeed.
#[derive(Clone)]
pub struct BookingEngine {
    store: Arc<dyn BookingStore>,
    notifier: Arc<dyn Notifier>,
}

impl BookingEngine {
    pub fn new(store: Arc<dyn BookingStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    pub fn store(&self) -> &Arc<dyn BookingStore> {
        &self.store
    }

    /// Reserve a spot. On success the booking is durable, a ticket projection
    /// is returned for display, and a confirmation notification is emitted in
    /// the background.
    pub async fn reserve(&self, request: ReserveRequest) -> Result<Ticket, BookingError> {
        let attendee_email = normalize_email(&request.attendee_email)?;
        let attendee_name = request.attendee_name.trim().to_string();
        if attendee_name.is_empty() {
            return Err(BookingError::InvalidInput(
                "attendee name must not be empty".into(),
            ));
        }

        let event = self
            .store
            .get_event(request.event_id)
            .await
            .map_err(booking_infra)?
            .ok_or(BookingError::EventNotFound(request.event_id))?;

        // Preflight checks. Cheap early exits for the common case; the store
        // re-validates both under its own atomicity at insert time.
        if let Some(capacity) = event.capacity {
            let booked = self
                .store
                .count_confirmed(event.id)
                .await
                .map_err(booking_infra)?;
            if booked >= i64::from(capacity) {
                return Err(BookingError::CapacityExceeded);
            }
        }
        if self
            .store
            .find_confirmed(event.id, &attendee_email)
            .await
            .map_err(booking_infra)?
            .is_some()
        {
            return Err(BookingError::DuplicateBooking);
        }

        for attempt in 1..=TICKET_CODE_ATTEMPTS {
            let code = ticket_code::generate();
            let insert = self
                .store
                .insert_booking(NewBooking {
                    event_id: event.id,
                    attendee_email: attendee_email.clone(),
                    attendee_name: attendee_name.clone(),
                    ticket_code: code,
                    metadata: request.metadata.clone(),
                })
                .await;

            match insert {
                Ok(booking) => {
                    tracing::info!(
                        booking_id = %booking.id,
                        event_id = %event.id,
                        ticket_code = %booking.ticket_code,
                        "Booking confirmed"
                    );
                    self.spawn_confirmation(BookingConfirmation {
                        attendee_email: booking.attendee_email.clone(),
                        attendee_name: booking.attendee_name.clone(),
                        event_name: event.title.clone(),
                        event_date: event.date.clone(),
                        event_time: event.time.clone(),
                        event_location: event.location.clone(),
                        ticket_code: booking.ticket_code.clone(),
                    });
                    return Ok(Ticket::project(&booking, &event));
                }
                Err(StoreError::DuplicateTicketCode) => {
                    tracing::warn!(event_id = %event.id, attempt, "Ticket code collision, regenerating");
                    continue;
                }
                // A racing request won the last slot or booked this attendee
                // first; the store's verdict is authoritative.
                Err(StoreError::CapacityExceeded) => return Err(BookingError::CapacityExceeded),
                Err(StoreError::DuplicateAttendee) => return Err(BookingError::DuplicateBooking),
                Err(StoreError::EventNotFound) => {
                    return Err(BookingError::EventNotFound(event.id))
                }
                Err(err) => return Err(booking_infra(err)),
            }
        }

        tracing::error!(event_id = %event.id, "Exhausted ticket code attempts");
        Err(BookingError::TicketGenerationFailed)
    }

    /// Cancel a booking, subject to the ownership check. Idempotent: a second
    /// cancel of the same booking succeeds without re-notifying. Capacity is
    /// freed implicitly because counts only consider confirmed rows.
    pub async fn cancel(
        &self,
        booking_id: Uuid,
        requester_email: &str,
    ) -> Result<(), CancelError> {
        let booking = self
            .store
            .get_booking(booking_id)
            .await
            .map_err(cancel_infra)?
            .ok_or(CancelError::BookingNotFound(booking_id))?;

        if !booking
            .attendee_email
            .eq_ignore_ascii_case(requester_email.trim())
        {
            return Err(CancelError::NotOwner);
        }

        if booking.status == BookingStatus::Cancelled {
            return Ok(());
        }

        match self.store.cancel_booking(booking_id).await {
            Ok(()) => {}
            Err(StoreError::BookingNotFound) => {
                return Err(CancelError::BookingNotFound(booking_id))
            }
            Err(err) => return Err(cancel_infra(err)),
        }
        tracing::info!(booking_id = %booking.id, event_id = %booking.event_id, "Booking cancelled");

        // Event lookup is only needed for the notice; a missing event must
        // not fail an already-durable cancellation.
        match self.store.get_event(booking.event_id).await {
            Ok(Some(event)) => self.spawn_cancellation(BookingCancellation {
                attendee_email: booking.attendee_email.clone(),
                attendee_name: booking.attendee_name.clone(),
                event_name: event.title,
            }),
            Ok(None) => {
                tracing::warn!(event_id = %booking.event_id, "Event gone, skipping cancellation notice");
            }
            Err(err) => {
                tracing::warn!(error = %err, "Could not load event for cancellation notice");
            }
        }
        Ok(())
    }

    /// Live availability snapshot for an event. Point-in-time: callers must
    /// not assume it still holds once a racing reservation lands.
    pub async fn capacity(&self, event_id: Uuid) -> Result<CapacitySnapshot, BookingError> {
        let event = self
            .store
            .get_event(event_id)
            .await
            .map_err(booking_infra)?
            .ok_or(BookingError::EventNotFound(event_id))?;
        let booked = self
            .store
            .count_confirmed(event_id)
            .await
            .map_err(booking_infra)?;
        Ok(CapacitySnapshot::new(event.capacity, booked))
    }

    /// All of an attendee's bookings, newest first, with event display fields
    /// for the "my tickets" view.
    pub async fn my_tickets(
        &self,
        attendee_email: &str,
    ) -> Result<Vec<BookingWithEvent>, BookingError> {
        let attendee_email = normalize_email(attendee_email)?;
        self.store
            .list_for_attendee(&attendee_email)
            .await
            .map_err(booking_infra)
    }

    fn spawn_confirmation(&self, confirmation: BookingConfirmation) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(err) = notifier.booking_confirmed(confirmation).await {
                tracing::warn!(error = %err, "Booking confirmation notification failed");
            }
        });
    }

    fn spawn_cancellation(&self, cancellation: BookingCancellation) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(err) = notifier.booking_cancelled(cancellation).await {
                tracing::warn!(error = %err, "Cancellation notification failed");
            }
        });
    }
}

/// The attendee email is the identity key for duplicate detection, so it is
/// normalized once at the boundary. Format validity is the upstream form
/// layer's job; only unusable input is rejected here.
fn normalize_email(raw: &str) -> Result<String, BookingError> {
    let email = raw.trim().to_ascii_lowercase();
    if email.is_empty() {
        return Err(BookingError::InvalidInput(
            "attendee email must not be empty".into(),
        ));
    }
    Ok(email)
}

fn booking_infra(err: StoreError) -> BookingError {
    match err {
        StoreError::Unexpected(inner) => BookingError::StoreUnavailable(inner),
        other => BookingError::StoreUnavailable(anyhow::Error::new(other)),
    }
}

fn cancel_infra(err: StoreError) -> CancelError {
    match err {
        StoreError::Unexpected(inner) => CancelError::StoreUnavailable(inner),
        other => CancelError::StoreUnavailable(anyhow::Error::new(other)),
    }
}
