use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveTime};

use booking_cell::testing::MemoryBookingStore;
use booking_cell::{
    BookingError, BookingService, CreateAppointmentRequest, QueueStatus, RegistrationStatus,
};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
}

fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn request(doctor_id: i64, date: NaiveDate, time: NaiveTime) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        doctor_id,
        appointment_date: date,
        appointment_time: time,
        complaint: Some("Demam".to_string()),
    }
}

async fn seeded_store() -> MemoryBookingStore {
    let store = MemoryBookingStore::new();
    store.add_patient("8501010001", "Andi Wijaya").await;
    store.add_patient("8501010002", "Budi Hartono").await;
    store.add_patient("8501010003", "Citra Dewi").await;
    store
        .add_doctor(
            1,
            "Budi Santoso",
            Some(r#"{"senin":"08:00-14:00","rabu":"08:00-12:00"}"#),
        )
        .await;
    store
        .add_doctor(2, "Citra Lestari", Some(r#"{"senin":"09:00-15:00"}"#))
        .await;
    store
}

fn service(store: &MemoryBookingStore, capacity: i64) -> BookingService {
    BookingService::new(Arc::new(store.clone()), capacity)
}

#[tokio::test]
async fn booking_assigns_sequential_numbers_and_writes_all_rows() {
    let store = seeded_store().await;
    let service = service(&store, 20);

    let first = service
        .create_appointment("8501010001", &request(1, monday(), t(8, 30)))
        .await
        .unwrap();
    let second = service
        .create_appointment("8501010002", &request(1, monday(), t(8, 45)))
        .await
        .unwrap();

    assert_eq!(first.queue_number, 1);
    assert_eq!(second.queue_number, 2);
    assert_eq!(first.available_slots, 19);
    assert_eq!(second.available_slots, 18);

    store
        .with_state(|state| {
            assert_eq!(state.registrations.len(), 2);
            assert_eq!(state.queue_entries.len(), 2);
            assert_eq!(state.notifications.len(), 2);

            let reg = &state.registrations[0];
            assert_eq!(reg.patient_name, "Andi Wijaya");
            assert_eq!(reg.status, RegistrationStatus::Confirmed);
            assert_eq!(reg.service_type, "general_consultation");

            let entry = &state.queue_entries[0];
            assert_eq!(entry.status, QueueStatus::Waiting);
            assert_eq!(entry.registration_id, Some(reg.id));

            let note = &state.notifications[0];
            assert_eq!(note.queue_entry_id, Some(entry.id));
            assert!(note.body.contains("queue number is 1"));
        })
        .await;
}

#[tokio::test]
async fn capacity_ceiling_is_enforced_per_hour_window() {
    let store = seeded_store().await;
    let service = service(&store, 2);

    service
        .create_appointment("8501010001", &request(1, monday(), t(8, 0)))
        .await
        .unwrap();
    service
        .create_appointment("8501010002", &request(1, monday(), t(8, 59)))
        .await
        .unwrap();

    let err = service
        .create_appointment("8501010003", &request(1, monday(), t(8, 30)))
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::CapacityExceeded { current: 2, max: 2 });

    // the next window is untouched
    let next = service
        .create_appointment("8501010003", &request(1, monday(), t(9, 0)))
        .await
        .unwrap();
    assert_eq!(next.queue_number, 3);
}

#[tokio::test]
async fn closing_time_is_bookable() {
    let store = MemoryBookingStore::new();
    store.add_patient("8501010001", "Andi Wijaya").await;
    store
        .add_doctor(1, "Budi Santoso", Some(r#"{"senin":"08:00-10:00"}"#))
        .await;
    let service = service(&store, 20);

    let booked = service
        .create_appointment("8501010001", &request(1, monday(), t(10, 0)))
        .await
        .unwrap();
    assert_eq!(booked.queue_number, 1);
}

#[tokio::test]
async fn rejects_time_outside_practice_window() {
    let store = seeded_store().await;
    let service = service(&store, 20);

    let err = service
        .create_appointment("8501010001", &request(1, monday(), t(7, 59)))
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::ScheduleViolation(ref msg) if msg.contains("08:00 - 14:00"));

    let err = service
        .create_appointment("8501010001", &request(1, monday(), t(14, 1)))
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::ScheduleViolation(_));
}

#[tokio::test]
async fn rejects_non_practice_day_by_name() {
    let store = seeded_store().await;
    let service = service(&store, 20);

    let tuesday = NaiveDate::from_ymd_opt(2025, 1, 7).unwrap();
    let err = service
        .create_appointment("8501010001", &request(1, tuesday, t(9, 0)))
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::ScheduleViolation(ref msg) if msg.contains("Selasa"));
}

#[tokio::test]
async fn malformed_schedule_reads_as_no_practice() {
    let store = MemoryBookingStore::new();
    store.add_patient("8501010001", "Andi Wijaya").await;
    store.add_doctor(1, "Budi Santoso", Some("not-json")).await;
    let service = service(&store, 20);

    let err = service
        .create_appointment("8501010001", &request(1, monday(), t(9, 0)))
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::ScheduleViolation(_));
}

#[tokio::test]
async fn missing_patient_or_doctor_is_not_found() {
    let store = seeded_store().await;
    let service = service(&store, 20);

    let err = service
        .create_appointment("9999999999", &request(1, monday(), t(9, 0)))
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::NotFound(_));

    let err = service
        .create_appointment("8501010001", &request(42, monday(), t(9, 0)))
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::NotFound(_));
}

#[tokio::test]
async fn duplicate_blocked_until_cancelled_and_numbers_are_not_reused() {
    let store = seeded_store().await;
    let service = service(&store, 20);

    let first = service
        .create_appointment("8501010001", &request(1, monday(), t(8, 30)))
        .await
        .unwrap();
    assert_eq!(first.queue_number, 1);

    let err = service
        .create_appointment("8501010001", &request(1, monday(), t(9, 30)))
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::Duplicate);

    store.cancel_registration(first.appointment_id).await;

    // rebooking works, but number 1 stays burned
    let again = service
        .create_appointment("8501010001", &request(1, monday(), t(9, 30)))
        .await
        .unwrap();
    assert_eq!(again.queue_number, 2);
}

#[tokio::test]
async fn numbers_are_shared_across_doctors_and_reset_per_date() {
    let store = seeded_store().await;
    let service = service(&store, 20);

    let a = service
        .create_appointment("8501010001", &request(1, monday(), t(8, 30)))
        .await
        .unwrap();
    let b = service
        .create_appointment("8501010002", &request(2, monday(), t(9, 30)))
        .await
        .unwrap();
    assert_eq!(a.queue_number, 1);
    assert_eq!(b.queue_number, 2);

    let next_monday = NaiveDate::from_ymd_opt(2025, 1, 13).unwrap();
    let c = service
        .create_appointment("8501010003", &request(1, next_monday, t(8, 30)))
        .await
        .unwrap();
    assert_eq!(c.queue_number, 1);
}

#[tokio::test]
async fn failed_queue_insert_rolls_back_the_whole_booking() {
    let store = seeded_store().await;
    let service = service(&store, 20);

    store.fail_next_queue_insert();
    let err = service
        .create_appointment("8501010001", &request(1, monday(), t(8, 30)))
        .await
        .unwrap_err();
    assert_matches!(err, BookingError::Store(_));

    store
        .with_state(|state| {
            assert!(state.registrations.is_empty());
            assert!(state.queue_entries.is_empty());
            assert!(state.notifications.is_empty());
        })
        .await;

    // the retry starts numbering from scratch
    let retry = service
        .create_appointment("8501010001", &request(1, monday(), t(8, 30)))
        .await
        .unwrap();
    assert_eq!(retry.queue_number, 1);
}

#[tokio::test]
async fn concurrent_bookings_get_distinct_dense_numbers() {
    let store = MemoryBookingStore::new();
    store
        .add_doctor(1, "Budi Santoso", Some(r#"{"senin":"08:00-14:00"}"#))
        .await;
    for i in 0..10 {
        store
            .add_patient(&format!("85010100{:02}", i), &format!("Pasien {}", i))
            .await;
    }
    let service = Arc::new(service(&store, 20));

    let mut handles = Vec::new();
    for i in 0..10 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service
                .create_appointment(
                    &format!("85010100{:02}", i),
                    &request(1, monday(), t(8 + (i % 6) as u32, 15)),
                )
                .await
                .unwrap()
                .queue_number
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        numbers.push(handle.await.unwrap());
    }
    numbers.sort_unstable();
    assert_eq!(numbers, (1..=10).collect::<Vec<_>>());
}
