use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use super::AppState;
use crate::booking::ReserveRequest;
use crate::utils::error::AppError;
use crate::utils::extract::{ApiJson, ApiQuery};
use crate::utils::response::{empty_success, success};

#[derive(Debug, Deserialize)]
pub struct CreateBookingBody {
    pub email: String,
    pub name: String,
    /// Attendee profile fields, stored verbatim for ticket display.
    #[serde(default = "empty_metadata")]
    pub metadata: Value,
}

fn empty_metadata() -> Value {
    Value::Object(Default::default())
}

#[derive(Debug, Deserialize)]
pub struct AttendeeQuery {
    pub email: String,
}

/// POST /api/events/:id/bookings
pub async fn create_booking(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    ApiJson(body): ApiJson<CreateBookingBody>,
) -> Result<Response, AppError> {
    let event_id = parse_id(&event_id, "event")?;
    let ticket = state
        .engine
        .reserve(ReserveRequest {
            event_id,
            attendee_email: body.email,
            attendee_name: body.name,
            metadata: body.metadata,
        })
        .await?;
    Ok(success(ticket, "Booking confirmed").into_response())
}

/// GET /api/events/:id/capacity
pub async fn event_capacity(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> Result<Response, AppError> {
    let event_id = parse_id(&event_id, "event")?;
    let snapshot = state.engine.capacity(event_id).await?;
    Ok(success(snapshot, "Capacity snapshot").into_response())
}

/// GET /api/bookings?email=
pub async fn my_bookings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<AttendeeQuery>,
) -> Result<Response, AppError> {
    let bookings = state.engine.my_tickets(&query.email).await?;
    Ok(success(bookings, "Bookings retrieved").into_response())
}

/// DELETE /api/bookings/:id?email=
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<String>,
    ApiQuery(query): ApiQuery<AttendeeQuery>,
) -> Result<Response, AppError> {
    let booking_id = parse_id(&booking_id, "booking")?;
    state.engine.cancel(booking_id, &query.email).await?;
    Ok(empty_success("Booking cancelled").into_response())
}

/// Opaque path ids must parse as UUIDs; anything else is rejected as invalid
/// input rather than bubbling up as a routing failure.
fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::InvalidInput(format!("'{raw}' is not a valid {what} id")))
}
