//! In-memory store fake. A whole booking transaction holds the state mutex,
//! so concurrent allocations are serialized the same way the Postgres store
//! serializes them with its per-date advisory lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use shared_database::StoreError;

use crate::models::{
    AppointmentSummary, BookingWindow, Notification, QueueEntry, QueueStatus, Registration,
};
use crate::store::{
    BookingStore, BookingUnit, DoctorScheduleRow, NewNotification, NewQueueEntry, NewRegistration,
    QueueTicket,
};

#[derive(Debug, Clone)]
struct DoctorSeed {
    full_name: String,
    practice_schedule: Option<String>,
    is_active: bool,
}

#[derive(Default)]
pub struct MemState {
    patients: HashMap<String, String>,
    doctors: HashMap<i64, DoctorSeed>,
    pub registrations: Vec<Registration>,
    pub queue_entries: Vec<QueueEntry>,
    pub notifications: Vec<Notification>,
    next_registration_id: i64,
    next_queue_id: i64,
    next_notification_id: i64,
}

fn window_count(state: &MemState, doctor_id: i64, date: NaiveDate, window: &BookingWindow) -> i64 {
    state
        .registrations
        .iter()
        .filter(|r| {
            r.doctor_id == doctor_id
                && r.registration_date == date
                && r.status != crate::models::RegistrationStatus::Cancelled
                && window.contains(r.registration_time)
        })
        .count() as i64
}

#[derive(Clone, Default)]
pub struct MemoryBookingStore {
    state: Arc<Mutex<MemState>>,
    fail_next_queue_insert: Arc<AtomicBool>,
}

impl MemoryBookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_patient(&self, nik: &str, full_name: &str) {
        self.state
            .lock()
            .await
            .patients
            .insert(nik.to_string(), full_name.to_string());
    }

    pub async fn add_doctor(&self, id: i64, full_name: &str, schedule: Option<&str>) {
        self.add_doctor_full(id, full_name, schedule, true).await;
    }

    pub async fn add_doctor_full(
        &self,
        id: i64,
        full_name: &str,
        schedule: Option<&str>,
        is_active: bool,
    ) {
        self.state.lock().await.doctors.insert(
            id,
            DoctorSeed {
                full_name: full_name.to_string(),
                practice_schedule: schedule.map(String::from),
                is_active,
            },
        );
    }

    /// Makes the next queue-entry insert fail, for atomicity tests.
    pub fn fail_next_queue_insert(&self) {
        self.fail_next_queue_insert.store(true, Ordering::SeqCst);
    }

    /// Snapshot accessor for assertions.
    pub async fn with_state<R>(&self, f: impl FnOnce(&MemState) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }

    pub async fn cancel_registration(&self, registration_id: i64) {
        let mut state = self.state.lock().await;
        if let Some(r) = state
            .registrations
            .iter_mut()
            .find(|r| r.id == registration_id)
        {
            r.status = crate::models::RegistrationStatus::Cancelled;
        }
        if let Some(q) = state
            .queue_entries
            .iter_mut()
            .find(|q| q.registration_id == Some(registration_id))
        {
            q.status = QueueStatus::Cancelled;
        }
    }

    pub async fn set_queue_status(&self, queue_id: i64, status: QueueStatus) {
        let mut state = self.state.lock().await;
        if let Some(q) = state.queue_entries.iter_mut().find(|q| q.id == queue_id) {
            q.status = status;
        }
    }
}

#[async_trait]
impl BookingStore for MemoryBookingStore {
    async fn begin(&self) -> Result<Box<dyn BookingUnit>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let reg_snapshot = guard.registrations.len();
        let queue_snapshot = guard.queue_entries.len();
        let notif_snapshot = guard.notifications.len();
        Ok(Box::new(MemoryBookingUnit {
            guard,
            fail_next_queue_insert: self.fail_next_queue_insert.clone(),
            reg_snapshot,
            queue_snapshot,
            notif_snapshot,
            committed: false,
        }))
    }

    async fn doctor_schedule(
        &self,
        doctor_id: i64,
    ) -> Result<Option<DoctorScheduleRow>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .doctors
            .get(&doctor_id)
            .filter(|d| d.is_active)
            .map(|d| DoctorScheduleRow {
                full_name: d.full_name.clone(),
                practice_schedule: d.practice_schedule.clone(),
            }))
    }

    async fn window_booking_count(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        window: &BookingWindow,
    ) -> Result<i64, StoreError> {
        let state = self.state.lock().await;
        Ok(window_count(&state, doctor_id, date, window))
    }

    async fn patient_appointments(
        &self,
        patient_nik: &str,
    ) -> Result<Vec<AppointmentSummary>, StoreError> {
        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .registrations
            .iter()
            .filter(|r| r.patient_nik == patient_nik)
            .map(|r| {
                let doctor = state.doctors.get(&r.doctor_id);
                let entry = state
                    .queue_entries
                    .iter()
                    .find(|q| q.registration_id == Some(r.id));
                AppointmentSummary {
                    id: r.id,
                    appointment_date: r.registration_date,
                    appointment_time: r.registration_time,
                    complaint: r.complaint.clone(),
                    service_type: r.service_type.clone(),
                    status: r.status,
                    doctor_name: doctor.map(|d| d.full_name.clone()),
                    specialization: None,
                    queue_number: entry.map(|q| q.queue_number),
                    queue_status: entry.map(|q| q.status),
                    created_at: r.created_at,
                }
            })
            .collect();
        rows.sort_by(|a, b| {
            (b.appointment_date, b.appointment_time).cmp(&(a.appointment_date, a.appointment_time))
        });
        Ok(rows)
    }

    async fn registration_queue(
        &self,
        patient_nik: &str,
        registration_id: i64,
    ) -> Result<Option<QueueTicket>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .queue_entries
            .iter()
            .find(|q| q.patient_nik == patient_nik && q.registration_id == Some(registration_id))
            .map(|q| QueueTicket {
                queue_number: q.queue_number,
                queue_date: q.queue_date,
                status: q.status,
                priority: q.priority,
                doctor_name: state.doctors.get(&q.doctor_id).map(|d| d.full_name.clone()),
            }))
    }

    async fn current_serving(&self, date: NaiveDate) -> Result<Option<i32>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .queue_entries
            .iter()
            .filter(|q| {
                q.queue_date == date
                    && matches!(q.status, QueueStatus::Called | QueueStatus::InService)
            })
            .map(|q| q.queue_number)
            .min())
    }
}

pub struct MemoryBookingUnit {
    guard: OwnedMutexGuard<MemState>,
    fail_next_queue_insert: Arc<AtomicBool>,
    reg_snapshot: usize,
    queue_snapshot: usize,
    notif_snapshot: usize,
    committed: bool,
}

impl Drop for MemoryBookingUnit {
    fn drop(&mut self) {
        if !self.committed {
            self.guard.registrations.truncate(self.reg_snapshot);
            self.guard.queue_entries.truncate(self.queue_snapshot);
            self.guard.notifications.truncate(self.notif_snapshot);
        }
    }
}

#[async_trait]
impl BookingUnit for MemoryBookingUnit {
    async fn patient_name(&mut self, patient_nik: &str) -> Result<Option<String>, StoreError> {
        Ok(self.guard.patients.get(patient_nik).cloned())
    }

    async fn has_live_registration(
        &mut self,
        patient_nik: &str,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<bool, StoreError> {
        Ok(self.guard.registrations.iter().any(|r| {
            r.patient_nik == patient_nik
                && r.doctor_id == doctor_id
                && r.registration_date == date
                && r.status != crate::models::RegistrationStatus::Cancelled
        }))
    }

    async fn doctor_schedule(
        &mut self,
        doctor_id: i64,
    ) -> Result<Option<DoctorScheduleRow>, StoreError> {
        Ok(self
            .guard
            .doctors
            .get(&doctor_id)
            .filter(|d| d.is_active)
            .map(|d| DoctorScheduleRow {
                full_name: d.full_name.clone(),
                practice_schedule: d.practice_schedule.clone(),
            }))
    }

    async fn count_window_bookings(
        &mut self,
        doctor_id: i64,
        date: NaiveDate,
        window: &BookingWindow,
    ) -> Result<i64, StoreError> {
        Ok(window_count(&self.guard, doctor_id, date, window))
    }

    async fn insert_registration(&mut self, row: &NewRegistration) -> Result<i64, StoreError> {
        self.guard.next_registration_id += 1;
        let id = self.guard.next_registration_id;
        self.guard.registrations.push(Registration {
            id,
            patient_nik: row.patient_nik.clone(),
            patient_name: row.patient_name.clone(),
            doctor_id: row.doctor_id,
            registration_date: row.registration_date,
            registration_time: row.registration_time,
            complaint: row.complaint.clone(),
            service_type: row.service_type.clone(),
            status: row.status,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn next_queue_number(&mut self, date: NaiveDate) -> Result<i32, StoreError> {
        Ok(self
            .guard
            .queue_entries
            .iter()
            .filter(|q| q.queue_date == date)
            .map(|q| q.queue_number)
            .max()
            .unwrap_or(0)
            + 1)
    }

    async fn insert_queue_entry(&mut self, row: &NewQueueEntry) -> Result<i64, StoreError> {
        if self.fail_next_queue_insert.swap(false, Ordering::SeqCst) {
            return Err(StoreError("injected queue insert failure".to_string()));
        }
        self.guard.next_queue_id += 1;
        let id = self.guard.next_queue_id;
        self.guard.queue_entries.push(QueueEntry {
            id,
            queue_number: row.queue_number,
            registration_id: Some(row.registration_id),
            patient_nik: row.patient_nik.clone(),
            patient_name: row.patient_name.clone(),
            doctor_id: row.doctor_id,
            queue_date: row.queue_date,
            status: row.status,
            priority: row.priority,
            start_time: None,
            end_time: None,
        });
        Ok(id)
    }

    async fn insert_notification(&mut self, row: &NewNotification) -> Result<i64, StoreError> {
        self.guard.next_notification_id += 1;
        let id = self.guard.next_notification_id;
        self.guard.notifications.push(Notification {
            id,
            queue_entry_id: Some(row.queue_entry_id),
            patient_nik: row.patient_nik.clone(),
            title: row.title.clone(),
            body: row.body.clone(),
            kind: row.kind.clone(),
            queue_status_at_send: Some(row.queue_status_at_send),
            sent_at: Utc::now(),
        });
        Ok(id)
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        self.committed = true;
        Ok(())
    }
}
