use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::booking::BookingEngine;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod bookings;

pub use bookings::{cancel_booking, create_booking, event_capacity, my_bookings};

#[derive(Clone)]
pub struct AppState {
    pub engine: BookingEngine,
}

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
    store: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> Response {
    if let Err(err) = state.engine.store().health_check().await {
        return AppError::StoreUnavailable(anyhow::Error::new(err)).into_response();
    }

    let payload = HealthPayload {
        status: "ok",
        service: "devevent-api",
        store: state.engine.store().backend_name(),
    };

    success(payload, "Health check successful").into_response()
}
