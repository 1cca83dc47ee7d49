use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Booking, BookingWithEvent, EventRecord, NewBooking};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by a booking store. The constraint violations are typed so
/// the engine can translate them into user-facing rejections instead of
/// conflating them with infrastructure failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("event not found")]
    EventNotFound,

    #[error("booking not found")]
    BookingNotFound,

    #[error("event is at capacity")]
    CapacityExceeded,

    #[error("attendee already holds a confirmed booking for this event")]
    DuplicateAttendee,

    #[error("ticket code already in use")]
    DuplicateTicketCode,

    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable record of bookings, plus read access to the event catalog rows the
/// engine needs. The store is the single shared mutable resource: the engine
/// and the cancellation flow are its only writers.
///
/// `insert_booking` is the enforcement point for the two core invariants.
/// Implementations must make the capacity re-count and the duplicate check
/// atomic with the insert; the engine's own preflight checks are an early
/// exit, never the sole guarantee.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn get_event(&self, event_id: Uuid) -> StoreResult<Option<EventRecord>>;

    /// Insert a new confirmed booking, re-validating capacity and the
    /// one-confirmed-booking-per-attendee rule atomically with the write.
    /// Fails with `CapacityExceeded`, `DuplicateAttendee`,
    /// `DuplicateTicketCode` or `EventNotFound` accordingly.
    async fn insert_booking(&self, new: NewBooking) -> StoreResult<Booking>;

    async fn get_booking(&self, booking_id: Uuid) -> StoreResult<Option<Booking>>;

    /// Flip a booking to `cancelled`. Idempotent: cancelling an already
    /// cancelled booking is a no-op success. The ticket code is retained.
    async fn cancel_booking(&self, booking_id: Uuid) -> StoreResult<()>;

    /// Live count of confirmed bookings for an event. Never served from a
    /// cached counter.
    async fn count_confirmed(&self, event_id: Uuid) -> StoreResult<i64>;

    /// The attendee's confirmed booking for an event, if one exists.
    async fn find_confirmed(
        &self,
        event_id: Uuid,
        attendee_email: &str,
    ) -> StoreResult<Option<Booking>>;

    /// All bookings (confirmed and cancelled) for an attendee, newest first,
    /// joined with event display fields.
    async fn list_for_attendee(&self, attendee_email: &str)
        -> StoreResult<Vec<BookingWithEvent>>;

    async fn health_check(&self) -> StoreResult<()>;

    fn backend_name(&self) -> &'static str;
}
