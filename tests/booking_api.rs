//! End-to-end tests of the booking API surface: routes, status codes and the
//! JSON envelope, driven through the router against the in-memory store.

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

use devevent_server::booking::BookingEngine;
use devevent_server::handlers::AppState;
use devevent_server::models::EventRecord;
use devevent_server::notify::LogNotifier;
use devevent_server::routes::create_routes;
use devevent_server::store::MemoryStore;

struct TestApp {
    app: Router,
    store: MemoryStore,
}

fn test_app() -> TestApp {
    let store = MemoryStore::new();
    let engine = BookingEngine::new(Arc::new(store.clone()), Arc::new(LogNotifier));
    TestApp {
        app: create_routes(AppState { engine }),
        store,
    }
}

async fn seed_event(store: &MemoryStore, capacity: Option<i32>) -> Uuid {
    let event = EventRecord {
        id: Uuid::new_v4(),
        slug: "rustconf-2026".into(),
        title: "RustConf 2026".into(),
        description: None,
        location: "Portland, OR".into(),
        date: "10th September 2026".into(),
        time: "9:00am - 5:00pm".into(),
        capacity,
        created_at: Utc::now(),
    };
    let id = event.id;
    store.put_event(event).await;
    id
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

fn delete_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn book_body(email: &str, name: &str) -> Value {
    json!({ "email": email, "name": name, "metadata": { "jobTitle": "Engineer" } })
}

#[tokio::test]
async fn health_reports_store_backend() {
    let t = test_app();
    let response = t.app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["store"], "memory");
}

#[tokio::test]
async fn booking_returns_ticket_payload() {
    let t = test_app();
    let event_id = seed_event(&t.store, Some(10)).await;

    let response = t
        .app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/events/{event_id}/bookings"),
            book_body("a@x.com", "Ada"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    let ticket = &body["data"];
    assert_eq!(ticket["event_name"], "RustConf 2026");
    assert_eq!(ticket["attendee_name"], "Ada");
    assert_eq!(ticket["date"], "10th September 2026");
    assert_eq!(ticket["location"], "Portland, OR");
    assert_eq!(ticket["metadata"]["jobTitle"], "Engineer");
    assert!(ticket["ticket_code"].as_str().unwrap().starts_with("DE-"));
    assert_eq!(ticket["qr_payload"], ticket["ticket_code"]);
}

#[tokio::test]
async fn missing_email_query_uses_error_envelope() {
    let t = test_app();
    let response = t.app.oneshot(get_request("/api/bookings")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
    assert!(body["error"]["message"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn malformed_json_body_uses_error_envelope() {
    let t = test_app();
    let event_id = seed_event(&t.store, Some(10)).await;

    let request = Request::builder()
        .method(Method::POST)
        .uri(format!("/api/events/{event_id}/bookings"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("request");
    let response = t.app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn full_event_returns_conflict_envelope() {
    let t = test_app();
    let event_id = seed_event(&t.store, Some(1)).await;
    let uri = format!("/api/events/{event_id}/bookings");

    let first = t
        .app
        .clone()
        .oneshot(json_request(Method::POST, &uri, book_body("a@x.com", "Ada")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = t
        .app
        .oneshot(json_request(Method::POST, &uri, book_body("b@x.com", "Bram")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body = read_json(second).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "CAPACITY_EXCEEDED");
    assert_eq!(body["error"]["message"], "Event is fully booked");
}

#[tokio::test]
async fn duplicate_booking_is_rejected_not_silently_accepted() {
    let t = test_app();
    let event_id = seed_event(&t.store, Some(10)).await;
    let uri = format!("/api/events/{event_id}/bookings");

    let first = t
        .app
        .clone()
        .oneshot(json_request(Method::POST, &uri, book_body("a@x.com", "Ada")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = t
        .app
        .oneshot(json_request(Method::POST, &uri, book_body("a@x.com", "Ada")))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);

    let body = read_json(second).await;
    assert_eq!(body["error"]["code"], "DUPLICATE_BOOKING");
    assert_eq!(body["error"]["message"], "You have already booked this event");
}

#[tokio::test]
async fn malformed_event_id_is_invalid_input() {
    let t = test_app();
    let response = t
        .app
        .oneshot(json_request(
            Method::POST,
            "/api/events/42/bookings",
            book_body("a@x.com", "Ada"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn unknown_event_is_not_found() {
    let t = test_app();
    let response = t
        .app
        .oneshot(json_request(
            Method::POST,
            &format!("/api/events/{}/bookings", Uuid::new_v4()),
            book_body("a@x.com", "Ada"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = read_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn capacity_endpoint_returns_live_snapshot() {
    let t = test_app();
    let event_id = seed_event(&t.store, Some(3)).await;

    t.app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/events/{event_id}/bookings"),
            book_body("a@x.com", "Ada"),
        ))
        .await
        .unwrap();

    let response = t
        .app
        .oneshot(get_request(&format!("/api/events/{event_id}/capacity")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert_eq!(body["data"]["capacity"], 3);
    assert_eq!(body["data"]["booked"], 1);
    assert_eq!(body["data"]["available"], 2);
}

#[tokio::test]
async fn capacity_for_unlimited_event_is_null() {
    let t = test_app();
    let event_id = seed_event(&t.store, None).await;

    let response = t
        .app
        .oneshot(get_request(&format!("/api/events/{event_id}/capacity")))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["data"]["capacity"], Value::Null);
    assert_eq!(body["data"]["available"], Value::Null);
}

#[tokio::test]
async fn my_bookings_lists_attendee_tickets() {
    let t = test_app();
    let event_id = seed_event(&t.store, Some(10)).await;

    t.app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/events/{event_id}/bookings"),
            book_body("a@x.com", "Ada"),
        ))
        .await
        .unwrap();

    let response = t
        .app
        .oneshot(get_request("/api/bookings?email=a@x.com"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    let bookings = body["data"].as_array().unwrap();
    assert_eq!(bookings.len(), 1);
    assert_eq!(bookings[0]["attendee_email"], "a@x.com");
    assert_eq!(bookings[0]["status"], "confirmed");
    assert_eq!(bookings[0]["event"]["title"], "RustConf 2026");
}

#[tokio::test]
async fn cancellation_flow_over_http() {
    let t = test_app();
    let event_id = seed_event(&t.store, Some(1)).await;
    let book_uri = format!("/api/events/{event_id}/bookings");

    let booked = t
        .app
        .clone()
        .oneshot(json_request(Method::POST, &book_uri, book_body("a@x.com", "Ada")))
        .await
        .unwrap();
    let booking_id = read_json(booked).await["data"]["booking_id"]
        .as_str()
        .unwrap()
        .to_string();

    // Someone else's email cannot cancel it.
    let forbidden = t
        .app
        .clone()
        .oneshot(delete_request(&format!(
            "/api/bookings/{booking_id}?email=mallory@x.com"
        )))
        .await
        .unwrap();
    assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);
    assert_eq!(read_json(forbidden).await["error"]["code"], "FORBIDDEN");

    // The owner can, and a repeat cancel is still a success.
    for _ in 0..2 {
        let cancelled = t
            .app
            .clone()
            .oneshot(delete_request(&format!(
                "/api/bookings/{booking_id}?email=a@x.com"
            )))
            .await
            .unwrap();
        assert_eq!(cancelled.status(), StatusCode::OK);
        assert_eq!(read_json(cancelled).await["success"], true);
    }

    // The freed slot is immediately bookable by someone else.
    let rebook = t
        .app
        .oneshot(json_request(Method::POST, &book_uri, book_body("b@x.com", "Bram")))
        .await
        .unwrap();
    assert_eq!(rebook.status(), StatusCode::OK);
}

#[tokio::test]
async fn cancelling_unknown_booking_is_not_found() {
    let t = test_app();
    let response = t
        .app
        .oneshot(delete_request(&format!(
            "/api/bookings/{}?email=a@x.com",
            Uuid::new_v4()
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
