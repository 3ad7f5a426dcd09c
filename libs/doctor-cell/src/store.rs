use async_trait::async_trait;
use sqlx::Row;

use shared_database::{Database, StoreError};

use crate::models::DoctorRecord;

/// Read seam for the doctor directory. Only active doctors are visible.
#[async_trait]
pub trait DoctorStore: Send + Sync {
    async fn active_doctors(&self) -> Result<Vec<DoctorRecord>, StoreError>;

    async fn active_doctor(&self, doctor_id: i64) -> Result<Option<DoctorRecord>, StoreError>;
}

pub struct PgDoctorStore {
    db: Database,
}

impl PgDoctorStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> Result<DoctorRecord, StoreError> {
    Ok(DoctorRecord {
        id: row.try_get("id").map_err(StoreError::from)?,
        full_name: row.try_get("full_name").map_err(StoreError::from)?,
        specialization: row.try_get("specialization").map_err(StoreError::from)?,
        phone: row.try_get("phone").map_err(StoreError::from)?,
        email: row.try_get("email").map_err(StoreError::from)?,
        practice_schedule: row.try_get("practice_schedule").map_err(StoreError::from)?,
    })
}

#[async_trait]
impl DoctorStore for PgDoctorStore {
    async fn active_doctors(&self) -> Result<Vec<DoctorRecord>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, full_name, specialization, phone, email, practice_schedule
            FROM doctors
            WHERE is_active = TRUE
            ORDER BY full_name ASC
            "#,
        )
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(record_from_row).collect()
    }

    async fn active_doctor(&self, doctor_id: i64) -> Result<Option<DoctorRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, full_name, specialization, phone, email, practice_schedule
            FROM doctors
            WHERE id = $1 AND is_active = TRUE
            "#,
        )
        .bind(doctor_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.as_ref().map(record_from_row).transpose()
    }
}
