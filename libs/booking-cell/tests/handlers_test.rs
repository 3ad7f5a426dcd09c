use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use booking_cell::router::booking_routes;
use booking_cell::testing::MemoryBookingStore;
use booking_cell::{BookingService, BookingState, CreateAppointmentRequest, QueueStatus};
use shared_utils::test_utils::{JwtTestUtils, TestConfig, TestUser};

async fn seeded_store() -> MemoryBookingStore {
    let store = MemoryBookingStore::new();
    store.add_patient("8501010001", "Andi Wijaya").await;
    store.add_patient("8501010002", "Budi Hartono").await;
    store
        .add_doctor(
            1,
            "Budi Santoso",
            Some(r#"{"senin":"08:00-14:00","rabu":"08:00-12:00"}"#),
        )
        .await;
    store
}

fn test_app(store: &MemoryBookingStore, config: &TestConfig) -> Router {
    booking_routes(Arc::new(BookingState {
        config: config.to_arc(),
        store: Arc::new(store.clone()),
    }))
}

fn bearer(config: &TestConfig, user: &TestUser) -> String {
    format!(
        "Bearer {}",
        JwtTestUtils::create_test_token(user, &config.jwt_secret, Some(1))
    )
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn booking_endpoint_returns_201_with_queue_number() {
    let config = TestConfig::default();
    let store = seeded_store().await;
    let app = test_app(&store, &config);
    let user = TestUser::patient("8501010001");

    let request = Request::builder()
        .method("POST")
        .uri("/appointments")
        .header("Authorization", bearer(&config, &user))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "doctor_id": 1,
                "appointment_date": "2025-01-06",
                "appointment_time": "08:30:00",
                "complaint": "Demam"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["queueNumber"], 1);
    assert_eq!(body["appointmentId"], 1);
    assert_eq!(body["availableSlots"], 19);
    assert_eq!(body["message"], "Appointment booked successfully");
}

#[tokio::test]
async fn schedule_violation_maps_to_400_with_message() {
    let config = TestConfig::default();
    let store = seeded_store().await;
    let app = test_app(&store, &config);
    let user = TestUser::patient("8501010001");

    // 2025-01-07 is a Tuesday, not a practice day
    let request = Request::builder()
        .method("POST")
        .uri("/appointments")
        .header("Authorization", bearer(&config, &user))
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "doctor_id": 1,
                "appointment_date": "2025-01-07",
                "appointment_time": "09:00:00"
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Doctor does not practice on Selasa");
}

#[tokio::test]
async fn unknown_doctor_maps_to_404() {
    let config = TestConfig::default();
    let store = seeded_store().await;
    let app = test_app(&store, &config);
    let user = TestUser::patient("8501010001");

    let request = Request::builder()
        .method("GET")
        .uri("/doctors/42/timeslots?date=2025-01-06")
        .header("Authorization", bearer(&config, &user))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn timeslots_endpoint_reports_availability() {
    let config = TestConfig::default();
    let store = seeded_store().await;
    let app = test_app(&store, &config);
    let user = TestUser::patient("8501010001");

    let request = Request::builder()
        .method("GET")
        .uri("/doctors/1/timeslots?date=2025-01-08")
        .header("Authorization", bearer(&config, &user))
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["day"], "Rabu");
    assert_eq!(body["slots"].as_array().unwrap().len(), 4);
    assert_eq!(body["slots"][0]["displayTime"], "08:00 - 09:00");
    assert_eq!(body["slots"][0]["isFull"], false);
}

#[tokio::test]
async fn appointments_and_queue_status_views() {
    let config = TestConfig::default();
    let store = seeded_store().await;
    let user = TestUser::patient("8501010001");

    let service = BookingService::new(Arc::new(store.clone()), config.slot_capacity);
    let booked = service
        .create_appointment(
            "8501010001",
            &CreateAppointmentRequest {
                doctor_id: 1,
                appointment_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
                appointment_time: chrono::NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
                complaint: None,
            },
        )
        .await
        .unwrap();

    let other = service
        .create_appointment(
            "8501010002",
            &CreateAppointmentRequest {
                doctor_id: 1,
                appointment_date: chrono::NaiveDate::from_ymd_opt(2025, 1, 6).unwrap(),
                appointment_time: chrono::NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
                complaint: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(other.queue_number, 2);

    // number 1 has been called to the counter
    let called_queue_id = store.with_state(|state| state.queue_entries[0].id).await;
    store
        .set_queue_status(called_queue_id, QueueStatus::Called)
        .await;

    let app = test_app(&store, &config);
    let request = Request::builder()
        .method("GET")
        .uri("/appointments")
        .header("Authorization", bearer(&config, &user))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let appointments = body["appointments"].as_array().unwrap();
    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0]["queueNumber"], 1);
    assert_eq!(appointments[0]["doctorName"], "Budi Santoso");

    let app = test_app(&store, &config);
    let request = Request::builder()
        .method("GET")
        .uri(format!("/appointments/{}/queue", booked.appointment_id))
        .header("Authorization", bearer(&config, &user))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["queueNumber"], 1);
    assert_eq!(body["status"], "called");
    assert_eq!(body["currentServing"], 1);
}

#[tokio::test]
async fn booking_requires_a_patient_token() {
    let config = TestConfig::default();
    let store = seeded_store().await;

    // no token at all
    let app = test_app(&store, &config);
    let request = Request::builder()
        .method("GET")
        .uri("/appointments")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // wrong role
    let app = test_app(&store, &config);
    let admin = TestUser::admin("admin-1");
    let request = Request::builder()
        .method("GET")
        .uri("/appointments")
        .header("Authorization", bearer(&config, &admin))
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
