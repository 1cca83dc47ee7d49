use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::models::event::EventRecord;

/// Lifecycle status of a booking. `Confirmed` is the only entry state;
/// `Confirmed -> Cancelled` is the only transition and `Cancelled` is
/// terminal for the row. Re-registering creates a new booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub event_id: Uuid,
    pub attendee_email: String,
    pub attendee_name: String,
    /// Assigned exactly once at creation and never reused, even after
    /// cancellation.
    pub ticket_code: String,
    pub status: BookingStatus,
    /// Free-form attendee profile fields (phone, job title, avatar URL, ...).
    /// Opaque to the engine; stored and returned verbatim for ticket display.
    pub metadata: Value,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for the store. The store assigns `id`, `created_at` and the
/// initial `confirmed` status.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub event_id: Uuid,
    pub attendee_email: String,
    pub attendee_name: String,
    pub ticket_code: String,
    pub metadata: Value,
}

/// A booking joined with its event's display fields, for the "my tickets"
/// view.
#[derive(Debug, Clone, Serialize)]
pub struct BookingWithEvent {
    #[serde(flatten)]
    pub booking: Booking,
    pub event: EventRecord,
}
