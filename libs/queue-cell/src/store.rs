use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Postgres, Row, Transaction};

use shared_database::{Database, StoreError};
use shared_models::status::{QueuePriority, QueueStatus};

use crate::models::QueueBoardRow;

/// What a transition needs to know about the entry it is about to move.
#[derive(Debug, Clone)]
pub struct QueueEntryRecord {
    pub id: i64,
    pub queue_number: i32,
    pub registration_id: Option<i64>,
    pub patient_nik: String,
    pub patient_name: String,
    pub queue_date: NaiveDate,
    pub status: QueueStatus,
}

#[derive(Debug, Clone)]
pub struct QueueNotice {
    pub queue_entry_id: i64,
    pub patient_nik: String,
    pub title: String,
    pub body: String,
    pub kind: String,
    pub queue_status_at_send: QueueStatus,
}

#[async_trait]
pub trait QueueStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn QueueUnit>, StoreError>;

    /// Board rows for one date, urgent first, then by queue number.
    async fn board_rows(&self, date: NaiveDate) -> Result<Vec<QueueBoardRow>, StoreError>;
}

/// One status transition. A transition and the rows it drags along (the
/// call notification, the completed registration) commit or roll back
/// together.
#[async_trait]
pub trait QueueUnit: Send {
    async fn entry(&mut self, queue_id: i64) -> Result<Option<QueueEntryRecord>, StoreError>;

    /// Moves the entry and stamps the given timestamps when present.
    async fn set_status(
        &mut self,
        queue_id: i64,
        status: QueueStatus,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError>;

    async fn complete_registration(&mut self, registration_id: i64) -> Result<(), StoreError>;

    async fn insert_notification(&mut self, notice: &QueueNotice) -> Result<i64, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

// ==============================================================================
// POSTGRES IMPLEMENTATION
// ==============================================================================

pub struct PgQueueStore {
    db: Database,
}

impl PgQueueStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn parse_queue_status(value: &str) -> Result<QueueStatus, StoreError> {
    QueueStatus::parse(value).ok_or_else(|| StoreError(format!("unknown queue status '{}'", value)))
}

fn parse_priority(value: &str) -> Result<QueuePriority, StoreError> {
    QueuePriority::parse(value)
        .ok_or_else(|| StoreError(format!("unknown queue priority '{}'", value)))
}

#[async_trait]
impl QueueStore for PgQueueStore {
    async fn begin(&self) -> Result<Box<dyn QueueUnit>, StoreError> {
        let tx = self.db.pool().begin().await?;
        Ok(Box::new(PgQueueUnit { tx }))
    }

    async fn board_rows(&self, date: NaiveDate) -> Result<Vec<QueueBoardRow>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT q.id, q.queue_number, q.patient_name, q.status, q.priority,
                   q.start_time, q.end_time, d.full_name AS doctor_name
            FROM queue_entries q
            LEFT JOIN doctors d ON d.id = q.doctor_id
            WHERE q.queue_date = $1
            ORDER BY (q.priority <> 'urgent'), q.queue_number
            "#,
        )
        .bind(date)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                let status: String = row.try_get("status")?;
                let priority: String = row.try_get("priority")?;
                Ok(QueueBoardRow {
                    queue_id: row.try_get("id")?,
                    queue_number: row.try_get("queue_number")?,
                    patient_name: row.try_get("patient_name")?,
                    doctor_name: row.try_get("doctor_name")?,
                    status: parse_queue_status(&status)?,
                    priority: parse_priority(&priority)?,
                    start_time: row.try_get("start_time")?,
                    end_time: row.try_get("end_time")?,
                })
            })
            .collect()
    }
}

pub struct PgQueueUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl QueueUnit for PgQueueUnit {
    async fn entry(&mut self, queue_id: i64) -> Result<Option<QueueEntryRecord>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, queue_number, registration_id, patient_nik, patient_name,
                   queue_date, status
            FROM queue_entries
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(queue_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(|row| {
            let status: String = row.try_get("status")?;
            Ok(QueueEntryRecord {
                id: row.try_get("id")?,
                queue_number: row.try_get("queue_number")?,
                registration_id: row.try_get("registration_id")?,
                patient_nik: row.try_get("patient_nik")?,
                patient_name: row.try_get("patient_name")?,
                queue_date: row.try_get("queue_date")?,
                status: parse_queue_status(&status)?,
            })
        })
        .transpose()
    }

    async fn set_status(
        &mut self,
        queue_id: i64,
        status: QueueStatus,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE queue_entries
            SET status = $2,
                start_time = COALESCE($3, start_time),
                end_time = COALESCE($4, end_time)
            WHERE id = $1
            "#,
        )
        .bind(queue_id)
        .bind(status.as_str())
        .bind(start_time)
        .bind(end_time)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn complete_registration(&mut self, registration_id: i64) -> Result<(), StoreError> {
        sqlx::query("UPDATE registrations SET status = 'completed' WHERE id = $1")
            .bind(registration_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn insert_notification(&mut self, notice: &QueueNotice) -> Result<i64, StoreError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO notifications
                (queue_entry_id, patient_nik, title, body, kind, queue_status_at_send)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(notice.queue_entry_id)
        .bind(&notice.patient_nik)
        .bind(&notice.title)
        .bind(&notice.body)
        .bind(&notice.kind)
        .bind(notice.queue_status_at_send.as_str())
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(inserted.try_get("id")?)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
