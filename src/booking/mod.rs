use thiserror::Error;
use uuid::Uuid;

pub mod engine;
pub mod ticket_code;

pub use engine::{BookingEngine, ReserveRequest};

/// Outcomes of a failed reservation attempt. Capacity and duplicate
/// rejections are expected user-facing results of the normal contract, not
/// exceptional conditions; only `StoreUnavailable` and
/// `TicketGenerationFailed` indicate infrastructure trouble worth an
/// automatic retry by the caller.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Event not found: {0}")]
    EventNotFound(Uuid),

    #[error("Event is fully booked")]
    CapacityExceeded,

    #[error("You have already booked this event")]
    DuplicateBooking,

    #[error("Could not issue a ticket, please try again")]
    TicketGenerationFailed,

    #[error("Booking store unavailable")]
    StoreUnavailable(#[source] anyhow::Error),
}

/// Outcomes of a failed cancellation. `BookingNotFound` and `NotOwner` are
/// reported distinctly so a UI can tell "nothing to cancel" from "not yours
/// to cancel".
#[derive(Debug, Error)]
pub enum CancelError {
    #[error("Booking not found: {0}")]
    BookingNotFound(Uuid),

    #[error("This booking belongs to another attendee")]
    NotOwner,

    #[error("Booking store unavailable")]
    StoreUnavailable(#[source] anyhow::Error),
}
