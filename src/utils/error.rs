use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::booking::{BookingError, CancelError};
use crate::utils::response::error as error_response;

/// HTTP-facing error envelope. Business-rule rejections (capacity, duplicate,
/// ownership) are expected outcomes and logged at info; infrastructure
/// failures are logged at error and surfaced as a generic "try again" without
/// internal detail.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Event is fully booked")]
    CapacityExceeded,

    #[error("You have already booked this event")]
    DuplicateBooking,

    #[error("Could not issue a ticket")]
    TicketGenerationFailed,

    #[error("Store unavailable")]
    StoreUnavailable(#[source] anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::CapacityExceeded => StatusCode::CONFLICT,
            AppError::DuplicateBooking => StatusCode::CONFLICT,
            AppError::TicketGenerationFailed => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::CapacityExceeded => "CAPACITY_EXCEEDED",
            AppError::DuplicateBooking => "DUPLICATE_BOOKING",
            AppError::TicketGenerationFailed => "TICKET_GENERATION_FAILED",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
        }
    }

    fn log(&self) {
        match self {
            AppError::InvalidInput(msg) | AppError::NotFound(msg) | AppError::Forbidden(msg) => {
                info!(code = self.code(), message = %msg, "Request rejected");
            }
            AppError::CapacityExceeded | AppError::DuplicateBooking => {
                info!(code = self.code(), "Booking rejected");
            }
            AppError::TicketGenerationFailed => {
                warn!(code = self.code(), "Ticket generation exhausted retries");
            }
            AppError::StoreUnavailable(err) => {
                error!(error = ?err, "Booking store error");
            }
        }
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::InvalidInput(msg) => AppError::InvalidInput(msg),
            BookingError::EventNotFound(id) => {
                AppError::NotFound(format!("Event with id '{id}' was not found"))
            }
            BookingError::CapacityExceeded => AppError::CapacityExceeded,
            BookingError::DuplicateBooking => AppError::DuplicateBooking,
            BookingError::TicketGenerationFailed => AppError::TicketGenerationFailed,
            BookingError::StoreUnavailable(inner) => AppError::StoreUnavailable(inner),
        }
    }
}

impl From<CancelError> for AppError {
    fn from(err: CancelError) -> Self {
        match err {
            CancelError::BookingNotFound(id) => {
                AppError::NotFound(format!("Booking with id '{id}' was not found"))
            }
            CancelError::NotOwner => {
                AppError::Forbidden("This booking belongs to another attendee".to_string())
            }
            CancelError::StoreUnavailable(inner) => AppError::StoreUnavailable(inner),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level messages to the client
        let public_message = match &self {
            AppError::InvalidInput(msg) | AppError::NotFound(msg) | AppError::Forbidden(msg) => {
                msg.clone()
            }
            AppError::CapacityExceeded => "Event is fully booked".to_string(),
            AppError::DuplicateBooking => "You have already booked this event".to_string(),
            AppError::TicketGenerationFailed | AppError::StoreUnavailable(_) => {
                "Something went wrong, please try again".to_string()
            }
        };

        // Do not expose internal details in the API response
        let details = None;

        error_response(code, public_message, details, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_rejections_map_to_conflict() {
        let err: AppError = BookingError::CapacityExceeded.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "CAPACITY_EXCEEDED");

        let err: AppError = BookingError::DuplicateBooking.into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.code(), "DUPLICATE_BOOKING");
    }

    #[test]
    fn ownership_failures_are_distinct_from_not_found() {
        let not_owner: AppError = CancelError::NotOwner.into();
        assert_eq!(not_owner.status_code(), StatusCode::FORBIDDEN);

        let missing: AppError = CancelError::BookingNotFound(uuid::Uuid::new_v4()).into();
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn infrastructure_failures_stay_generic() {
        let err = AppError::StoreUnavailable(anyhow::anyhow!("connection refused to 10.0.0.5"));
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.to_string(), "Store unavailable");
    }
}
