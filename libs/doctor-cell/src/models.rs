use serde::Serialize;
use thiserror::Error;

use shared_database::StoreError;
use shared_models::error::AppError;

use crate::schedule::WeeklySchedule;

/// Doctor row as stored; `practice_schedule` is the raw JSON blob.
#[derive(Debug, Clone)]
pub struct DoctorRecord {
    pub id: i64,
    pub full_name: String,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub practice_schedule: Option<String>,
}

impl DoctorRecord {
    pub fn schedule(&self) -> WeeklySchedule {
        WeeklySchedule::parse(self.practice_schedule.as_deref())
    }
}

/// Directory view with the schedule parsed for display.
#[derive(Debug, Clone, Serialize)]
pub struct Doctor {
    pub id: i64,
    pub full_name: String,
    pub specialization: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub schedules: serde_json::Map<String, serde_json::Value>,
}

impl From<DoctorRecord> for Doctor {
    fn from(record: DoctorRecord) -> Self {
        let schedules = record.schedule().to_map();
        Self {
            id: record.id,
            full_name: record.full_name,
            specialization: record.specialization,
            phone: record.phone,
            email: record.email,
            schedules,
        }
    }
}

#[derive(Error, Debug)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::Store(e) => {
                tracing::error!("Doctor store error: {}", e);
                AppError::Database("Something went wrong, please try again".to_string())
            }
        }
    }
}
