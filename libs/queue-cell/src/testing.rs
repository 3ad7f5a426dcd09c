//! In-memory store fake for the admin queue surface. A transition holds the
//! state mutex for its whole transaction; rollback restores the snapshot
//! taken at `begin`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard};

use shared_database::StoreError;
use shared_models::status::{QueuePriority, QueueStatus, RegistrationStatus};

use crate::models::QueueBoardRow;
use crate::store::{QueueEntryRecord, QueueNotice, QueueStore, QueueUnit};

#[derive(Debug, Clone)]
pub struct SeededEntry {
    pub id: i64,
    pub queue_number: i32,
    pub registration_id: Option<i64>,
    pub patient_nik: String,
    pub patient_name: String,
    pub doctor_name: Option<String>,
    pub queue_date: NaiveDate,
    pub status: QueueStatus,
    pub priority: QueuePriority,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Default, Clone)]
pub struct MemState {
    pub entries: Vec<SeededEntry>,
    pub registration_statuses: Vec<(i64, RegistrationStatus)>,
    pub notifications: Vec<QueueNotice>,
    next_notification_id: i64,
}

#[derive(Clone, Default)]
pub struct MemoryQueueStore {
    state: Arc<Mutex<MemState>>,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_entry(&self, entry: SeededEntry) {
        let mut state = self.state.lock().await;
        if let Some(registration_id) = entry.registration_id {
            state
                .registration_statuses
                .push((registration_id, RegistrationStatus::Confirmed));
        }
        state.entries.push(entry);
    }

    pub async fn with_state<R>(&self, f: impl FnOnce(&MemState) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }
}

/// Seed helper with the fields most tests care about.
pub fn entry(
    id: i64,
    queue_number: i32,
    date: NaiveDate,
    status: QueueStatus,
    priority: QueuePriority,
) -> SeededEntry {
    SeededEntry {
        id,
        queue_number,
        registration_id: Some(id),
        patient_nik: format!("85010100{:02}", id),
        patient_name: format!("Pasien {}", id),
        doctor_name: Some("Budi Santoso".to_string()),
        queue_date: date,
        status,
        priority,
        start_time: None,
        end_time: None,
    }
}

#[async_trait]
impl QueueStore for MemoryQueueStore {
    async fn begin(&self) -> Result<Box<dyn QueueUnit>, StoreError> {
        let guard = self.state.clone().lock_owned().await;
        let snapshot = guard.clone();
        Ok(Box::new(MemoryQueueUnit {
            guard,
            snapshot,
            committed: false,
        }))
    }

    async fn board_rows(&self, date: NaiveDate) -> Result<Vec<QueueBoardRow>, StoreError> {
        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .entries
            .iter()
            .filter(|e| e.queue_date == date)
            .map(|e| QueueBoardRow {
                queue_id: e.id,
                queue_number: e.queue_number,
                patient_name: e.patient_name.clone(),
                doctor_name: e.doctor_name.clone(),
                status: e.status,
                priority: e.priority,
                start_time: e.start_time,
                end_time: e.end_time,
            })
            .collect();
        rows.sort_by_key(|row| (row.priority != QueuePriority::Urgent, row.queue_number));
        Ok(rows)
    }
}

pub struct MemoryQueueUnit {
    guard: OwnedMutexGuard<MemState>,
    snapshot: MemState,
    committed: bool,
}

impl Drop for MemoryQueueUnit {
    fn drop(&mut self) {
        if !self.committed {
            *self.guard = self.snapshot.clone();
        }
    }
}

#[async_trait]
impl QueueUnit for MemoryQueueUnit {
    async fn entry(&mut self, queue_id: i64) -> Result<Option<QueueEntryRecord>, StoreError> {
        Ok(self
            .guard
            .entries
            .iter()
            .find(|e| e.id == queue_id)
            .map(|e| QueueEntryRecord {
                id: e.id,
                queue_number: e.queue_number,
                registration_id: e.registration_id,
                patient_nik: e.patient_nik.clone(),
                patient_name: e.patient_name.clone(),
                queue_date: e.queue_date,
                status: e.status,
            }))
    }

    async fn set_status(
        &mut self,
        queue_id: i64,
        status: QueueStatus,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        if let Some(e) = self.guard.entries.iter_mut().find(|e| e.id == queue_id) {
            e.status = status;
            if start_time.is_some() {
                e.start_time = start_time;
            }
            if end_time.is_some() {
                e.end_time = end_time;
            }
        }
        Ok(())
    }

    async fn complete_registration(&mut self, registration_id: i64) -> Result<(), StoreError> {
        if let Some((_, status)) = self
            .guard
            .registration_statuses
            .iter_mut()
            .find(|(id, _)| *id == registration_id)
        {
            *status = RegistrationStatus::Completed;
        }
        Ok(())
    }

    async fn insert_notification(&mut self, notice: &QueueNotice) -> Result<i64, StoreError> {
        self.guard.next_notification_id += 1;
        let id = self.guard.next_notification_id;
        self.guard.notifications.push(notice.clone());
        Ok(id)
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        self.committed = true;
        Ok(())
    }
}
