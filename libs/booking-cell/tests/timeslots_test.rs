use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};

use booking_cell::testing::MemoryBookingStore;
use booking_cell::{BookingError, BookingService, CreateAppointmentRequest};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
}

fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn request(doctor_id: i64, time: NaiveTime) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        doctor_id,
        appointment_date: monday(),
        appointment_time: time,
        complaint: None,
    }
}

async fn seeded_store() -> MemoryBookingStore {
    let store = MemoryBookingStore::new();
    store.add_patient("8501010001", "Andi Wijaya").await;
    store.add_patient("8501010002", "Budi Hartono").await;
    store
        .add_doctor(1, "Budi Santoso", Some(r#"{"senin":"08:00-12:00"}"#))
        .await;
    store
}

#[tokio::test]
async fn lists_one_slot_per_practice_hour_with_counts() {
    let store = seeded_store().await;
    let service = BookingService::new(Arc::new(store.clone()), 20);

    service
        .create_appointment("8501010001", &request(1, t(8, 15)))
        .await
        .unwrap();
    service
        .create_appointment("8501010002", &request(1, t(8, 45)))
        .await
        .unwrap();

    let day = service.available_timeslots(1, monday()).await.unwrap();
    assert_eq!(day.day, "Senin");
    assert_eq!(day.schedule_time.as_deref(), Some("08:00 - 12:00"));
    assert!(day.message.is_none());

    // hours 08..11; closing hour is bookable but not enumerated
    assert_eq!(day.slots.len(), 4);
    assert_eq!(day.slots[0].time, "08:00");
    assert_eq!(day.slots[0].display_time, "08:00 - 09:00");
    assert_eq!(day.slots[0].current_bookings, 2);
    assert_eq!(day.slots[0].available_slots, 18);
    assert!(!day.slots[0].is_full);
    assert_eq!(day.slots[1].current_bookings, 0);
    assert_eq!(day.slots[3].time, "11:00");
}

#[tokio::test]
async fn non_practice_day_returns_empty_slots_with_message() {
    let store = seeded_store().await;
    let service = BookingService::new(Arc::new(store.clone()), 20);

    let tuesday = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
    let day = service.available_timeslots(1, tuesday).await.unwrap();
    assert!(day.slots.is_empty());
    assert_eq!(day.day, "Selasa");
    assert_eq!(
        day.message.as_deref(),
        Some("Doctor does not practice on Selasa")
    );
}

#[tokio::test]
async fn unknown_doctor_is_not_found() {
    let store = seeded_store().await;
    let service = BookingService::new(Arc::new(store.clone()), 20);

    let err = service.available_timeslots(42, monday()).await.unwrap_err();
    assert_matches!(err, BookingError::NotFound(_));
}

#[tokio::test]
async fn cancelled_bookings_free_their_seat() {
    let store = seeded_store().await;
    let service = BookingService::new(Arc::new(store.clone()), 20);

    let booked = service
        .create_appointment("8501010001", &request(1, t(9, 30)))
        .await
        .unwrap();
    store.cancel_registration(booked.appointment_id).await;

    let day = service.available_timeslots(1, monday()).await.unwrap();
    assert_eq!(day.slots[1].current_bookings, 0);
    assert_eq!(day.slots[1].available_slots, 20);
}

/// A slot the availability query reports open is a slot the allocator
/// admits, and a slot it reports full is one the allocator rejects.
#[tokio::test]
async fn availability_agrees_with_the_allocator() {
    let store = seeded_store().await;
    let service = BookingService::new(Arc::new(store.clone()), 1);

    service
        .create_appointment("8501010001", &request(1, t(8, 30)))
        .await
        .unwrap();

    let day = service.available_timeslots(1, monday()).await.unwrap();
    assert!(day.slots[0].is_full);
    assert_eq!(day.slots[0].available_slots, 0);
    assert!(!day.slots[1].is_full);

    let err = service
        .create_appointment("8501010002", &request(1, t(8, 0)))
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::CapacityExceeded { current: 1, max: 1 });

    let admitted = service
        .create_appointment("8501010002", &request(1, t(9, 0)))
        .await
        .unwrap();
    assert_eq!(admitted.queue_number, 2);
}
