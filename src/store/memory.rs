//! In-memory implementation of the booking store.
//!
//! Backs tests and database-free local development. Not durable: all state is
//! lost on restart. A single `RwLock` guards the whole state so
//! `insert_booking` can hold the write lock across the capacity re-count, the
//! duplicate check and the insert, giving the same atomicity the Postgres
//! backend gets from its transaction.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BookingStore, StoreError, StoreResult};
use crate::models::{Booking, BookingStatus, BookingWithEvent, EventRecord, NewBooking};

#[derive(Default)]
struct Inner {
    events: HashMap<Uuid, EventRecord>,
    bookings: HashMap<Uuid, Booking>,
    /// Insertion order, used to break `created_at` ties in newest-first
    /// listings.
    order: Vec<Uuid>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an event. The catalog is out of scope for this service, so this
    /// is the only write path for events.
    pub async fn put_event(&self, event: EventRecord) {
        self.inner.write().await.events.insert(event.id, event);
    }
}

fn confirmed_count(inner: &Inner, event_id: Uuid) -> i64 {
    inner
        .bookings
        .values()
        .filter(|b| b.event_id == event_id && b.status == BookingStatus::Confirmed)
        .count() as i64
}

#[async_trait]
impl BookingStore for MemoryStore {
    async fn get_event(&self, event_id: Uuid) -> StoreResult<Option<EventRecord>> {
        Ok(self.inner.read().await.events.get(&event_id).cloned())
    }

    async fn insert_booking(&self, new: NewBooking) -> StoreResult<Booking> {
        let mut inner = self.inner.write().await;

        let event = inner
            .events
            .get(&new.event_id)
            .ok_or(StoreError::EventNotFound)?;
        let capacity = event.capacity;

        if inner
            .bookings
            .values()
            .any(|b| b.ticket_code == new.ticket_code)
        {
            return Err(StoreError::DuplicateTicketCode);
        }

        if inner.bookings.values().any(|b| {
            b.event_id == new.event_id
                && b.attendee_email == new.attendee_email
                && b.status == BookingStatus::Confirmed
        }) {
            return Err(StoreError::DuplicateAttendee);
        }

        if let Some(capacity) = capacity {
            if confirmed_count(&inner, new.event_id) >= i64::from(capacity) {
                return Err(StoreError::CapacityExceeded);
            }
        }

        let booking = Booking {
            id: Uuid::new_v4(),
            event_id: new.event_id,
            attendee_email: new.attendee_email,
            attendee_name: new.attendee_name,
            ticket_code: new.ticket_code,
            status: BookingStatus::Confirmed,
            metadata: new.metadata,
            created_at: Utc::now(),
        };
        inner.order.push(booking.id);
        inner.bookings.insert(booking.id, booking.clone());
        Ok(booking)
    }

    async fn get_booking(&self, booking_id: Uuid) -> StoreResult<Option<Booking>> {
        Ok(self.inner.read().await.bookings.get(&booking_id).cloned())
    }

    async fn cancel_booking(&self, booking_id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let booking = inner
            .bookings
            .get_mut(&booking_id)
            .ok_or(StoreError::BookingNotFound)?;
        booking.status = BookingStatus::Cancelled;
        Ok(())
    }

    async fn count_confirmed(&self, event_id: Uuid) -> StoreResult<i64> {
        Ok(confirmed_count(&*self.inner.read().await, event_id))
    }

    async fn find_confirmed(
        &self,
        event_id: Uuid,
        attendee_email: &str,
    ) -> StoreResult<Option<Booking>> {
        Ok(self
            .inner
            .read()
            .await
            .bookings
            .values()
            .find(|b| {
                b.event_id == event_id
                    && b.attendee_email == attendee_email
                    && b.status == BookingStatus::Confirmed
            })
            .cloned())
    }

    async fn list_for_attendee(
        &self,
        attendee_email: &str,
    ) -> StoreResult<Vec<BookingWithEvent>> {
        let inner = self.inner.read().await;
        let mut out = Vec::new();
        for id in inner.order.iter().rev() {
            let Some(booking) = inner.bookings.get(id) else {
                continue;
            };
            if booking.attendee_email != attendee_email {
                continue;
            }
            let Some(event) = inner.events.get(&booking.event_id) else {
                continue;
            };
            out.push(BookingWithEvent {
                booking: booking.clone(),
                event: event.clone(),
            });
        }
        Ok(out)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
