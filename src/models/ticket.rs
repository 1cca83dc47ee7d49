use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::models::booking::Booking;
use crate::models::event::EventRecord;

/// The attendee-facing ticket payload. A projection assembled from a booking
/// plus its event at response time, never persisted separately.
#[derive(Debug, Clone, Serialize)]
pub struct Ticket {
    pub booking_id: Uuid,
    pub ticket_code: String,
    /// What a client renders as the check-in QR. Scanning it yields the
    /// ticket code, same as reading the printed code aloud.
    pub qr_payload: String,
    pub event_name: String,
    pub attendee_name: String,
    pub attendee_email: String,
    pub date: String,
    pub time: String,
    pub location: String,
    pub metadata: Value,
}

impl Ticket {
    pub fn project(booking: &Booking, event: &EventRecord) -> Self {
        Self {
            booking_id: booking.id,
            ticket_code: booking.ticket_code.clone(),
            qr_payload: booking.ticket_code.clone(),
            event_name: event.title.clone(),
            attendee_name: booking.attendee_name.clone(),
            attendee_email: booking.attendee_email.clone(),
            date: event.date.clone(),
            time: event.time.clone(),
            location: event.location.clone(),
            metadata: booking.metadata.clone(),
        }
    }
}

/// Point-in-time availability for an event. `capacity` and `available` are
/// `None` for unlimited events. Computed live from confirmed bookings; the
/// snapshot may be stale the moment it is returned.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CapacitySnapshot {
    pub capacity: Option<i64>,
    pub booked: i64,
    pub available: Option<i64>,
}

impl CapacitySnapshot {
    pub fn new(capacity: Option<i32>, booked: i64) -> Self {
        let capacity = capacity.map(i64::from);
        Self {
            capacity,
            booked,
            available: capacity.map(|c| (c - booked).max(0)),
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self.available, Some(a) if a <= 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reports_available_spots() {
        let snap = CapacitySnapshot::new(Some(100), 40);
        assert_eq!(snap.capacity, Some(100));
        assert_eq!(snap.booked, 40);
        assert_eq!(snap.available, Some(60));
        assert!(!snap.is_full());
    }

    #[test]
    fn snapshot_for_unlimited_event_has_no_available_count() {
        let snap = CapacitySnapshot::new(None, 5000);
        assert_eq!(snap.capacity, None);
        assert_eq!(snap.available, None);
        assert!(!snap.is_full());
    }

    #[test]
    fn snapshot_at_capacity_is_full() {
        let snap = CapacitySnapshot::new(Some(10), 10);
        assert_eq!(snap.available, Some(0));
        assert!(snap.is_full());
    }

    #[test]
    fn snapshot_never_reports_negative_availability() {
        // Capacity can be lowered by an organizer after bookings were taken.
        let snap = CapacitySnapshot::new(Some(5), 8);
        assert_eq!(snap.available, Some(0));
        assert!(snap.is_full());
    }
}
