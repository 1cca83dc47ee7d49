//! Postgres implementation of the booking store, backed by sqlx.
//!
//! The schema (see `migrations/`) carries the real enforcement of the core
//! invariants: a unique constraint on `ticket_code` and a partial unique
//! index on `(event_id, attendee_email) WHERE status = 'confirmed'`.
//! `insert_booking` re-validates capacity inside a transaction that locks the
//! event row, so concurrent reservations against the same event serialize at
//! the store and the read-then-write check in the engine can never be the
//! deciding factor.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

use super::{BookingStore, StoreError, StoreResult};
use crate::models::{Booking, BookingStatus, BookingWithEvent, EventRecord, NewBooking};

const TICKET_CODE_CONSTRAINT: &str = "bookings_ticket_code_key";
const CONFIRMED_ATTENDEE_CONSTRAINT: &str = "bookings_event_attendee_confirmed_key";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct DbBooking {
    id: Uuid,
    event_id: Uuid,
    attendee_email: String,
    attendee_name: String,
    ticket_code: String,
    status: String,
    metadata: Value,
    created_at: DateTime<Utc>,
}

impl DbBooking {
    fn into_booking(self) -> StoreResult<Booking> {
        let status = BookingStatus::parse(&self.status)
            .ok_or_else(|| anyhow::anyhow!("unknown booking status '{}'", self.status))?;
        Ok(Booking {
            id: self.id,
            event_id: self.event_id,
            attendee_email: self.attendee_email,
            attendee_name: self.attendee_name,
            ticket_code: self.ticket_code,
            status,
            metadata: self.metadata,
            created_at: self.created_at,
        })
    }
}

/// Flattened booking + event row for the "my tickets" join.
#[derive(FromRow)]
struct DbBookingWithEvent {
    #[sqlx(flatten)]
    booking: DbBooking,
    ev_id: Uuid,
    ev_slug: String,
    ev_title: String,
    ev_description: Option<String>,
    ev_location: String,
    ev_date: String,
    ev_time: String,
    ev_capacity: Option<i32>,
    ev_created_at: DateTime<Utc>,
}

const BOOKING_COLUMNS: &str =
    "id, event_id, attendee_email, attendee_name, ticket_code, status, metadata, created_at";

fn unique_constraint(err: &sqlx::Error) -> Option<String> {
    let db_err = err.as_database_error()?;
    if db_err.code().as_deref() != Some("23505") {
        return None;
    }
    db_err.constraint().map(str::to_owned)
}

fn unexpected(err: sqlx::Error) -> StoreError {
    StoreError::Unexpected(err.into())
}

#[async_trait]
impl BookingStore for PgStore {
    async fn get_event(&self, event_id: Uuid) -> StoreResult<Option<EventRecord>> {
        sqlx::query_as::<_, EventRecord>(
            r#"
            SELECT id, slug, title, description, location, event_date, event_time,
                   capacity, created_at
            FROM events
            WHERE id = $1
            "#,
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn insert_booking(&self, new: NewBooking) -> StoreResult<Booking> {
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        // Lock the event row so racing reservations for the same event
        // serialize here, then re-count confirmed bookings under the lock.
        let capacity: Option<Option<i32>> =
            sqlx::query_scalar("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
                .bind(new.event_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(unexpected)?;
        let capacity = capacity.ok_or(StoreError::EventNotFound)?;

        if let Some(capacity) = capacity {
            let booked: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM bookings WHERE event_id = $1 AND status = 'confirmed'",
            )
            .bind(new.event_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(unexpected)?;

            if booked >= i64::from(capacity) {
                return Err(StoreError::CapacityExceeded);
            }
        }

        let inserted = sqlx::query_as::<_, DbBooking>(&format!(
            r#"
            INSERT INTO bookings (event_id, attendee_email, attendee_name, ticket_code, status, metadata)
            VALUES ($1, $2, $3, $4, 'confirmed', $5)
            RETURNING {BOOKING_COLUMNS}
            "#
        ))
        .bind(new.event_id)
        .bind(&new.attendee_email)
        .bind(&new.attendee_name)
        .bind(&new.ticket_code)
        .bind(&new.metadata)
        .fetch_one(&mut *tx)
        .await;

        let row = match inserted {
            Ok(row) => row,
            Err(err) => {
                return Err(match unique_constraint(&err).as_deref() {
                    Some(CONFIRMED_ATTENDEE_CONSTRAINT) => StoreError::DuplicateAttendee,
                    Some(TICKET_CODE_CONSTRAINT) => StoreError::DuplicateTicketCode,
                    _ => unexpected(err),
                });
            }
        };

        tx.commit().await.map_err(unexpected)?;
        row.into_booking()
    }

    async fn get_booking(&self, booking_id: Uuid) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, DbBooking>(&format!(
            "SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = $1"
        ))
        .bind(booking_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.map(DbBooking::into_booking).transpose()
    }

    async fn cancel_booking(&self, booking_id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("UPDATE bookings SET status = 'cancelled' WHERE id = $1")
            .bind(booking_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::BookingNotFound);
        }
        Ok(())
    }

    async fn count_confirmed(&self, event_id: Uuid) -> StoreResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM bookings WHERE event_id = $1 AND status = 'confirmed'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)
    }

    async fn find_confirmed(
        &self,
        event_id: Uuid,
        attendee_email: &str,
    ) -> StoreResult<Option<Booking>> {
        let row = sqlx::query_as::<_, DbBooking>(&format!(
            r#"
            SELECT {BOOKING_COLUMNS}
            FROM bookings
            WHERE event_id = $1 AND attendee_email = $2 AND status = 'confirmed'
            "#
        ))
        .bind(event_id)
        .bind(attendee_email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;

        row.map(DbBooking::into_booking).transpose()
    }

    async fn list_for_attendee(
        &self,
        attendee_email: &str,
    ) -> StoreResult<Vec<BookingWithEvent>> {
        let rows = sqlx::query_as::<_, DbBookingWithEvent>(
            r#"
            SELECT b.id, b.event_id, b.attendee_email, b.attendee_name, b.ticket_code,
                   b.status, b.metadata, b.created_at,
                   e.id AS ev_id, e.slug AS ev_slug, e.title AS ev_title,
                   e.description AS ev_description, e.location AS ev_location,
                   e.event_date AS ev_date, e.event_time AS ev_time,
                   e.capacity AS ev_capacity, e.created_at AS ev_created_at
            FROM bookings b
            JOIN events e ON e.id = b.event_id
            WHERE b.attendee_email = $1
            ORDER BY b.created_at DESC, b.id DESC
            "#,
        )
        .bind(attendee_email)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        rows.into_iter()
            .map(|row| {
                let event = EventRecord {
                    id: row.ev_id,
                    slug: row.ev_slug,
                    title: row.ev_title,
                    description: row.ev_description,
                    location: row.ev_location,
                    date: row.ev_date,
                    time: row.ev_time,
                    capacity: row.ev_capacity,
                    created_at: row.ev_created_at,
                };
                Ok(BookingWithEvent {
                    booking: row.booking.into_booking()?,
                    event,
                })
            })
            .collect()
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
