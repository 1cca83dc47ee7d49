use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer};
use crate::handlers::{
    cancel_booking, create_booking, event_capacity, health_check, my_bookings, AppState,
};

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/events/:id/bookings", post(create_booking))
        .route("/api/events/:id/capacity", get(event_capacity))
        .route("/api/bookings", get(my_bookings))
        .route("/api/bookings/:id", delete(cancel_booking))
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer())
        .layer(create_cors_layer())
        .with_state(state)
}
