use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Postgres, Row, Transaction};

use shared_database::{Database, StoreError};

use crate::models::{
    AppointmentSummary, BookingWindow, QueuePriority, QueueStatus, RegistrationStatus,
};

/// Row payloads for the inserts performed inside the booking transaction.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub patient_nik: String,
    pub patient_name: String,
    pub doctor_id: i64,
    pub registration_date: NaiveDate,
    pub registration_time: chrono::NaiveTime,
    pub complaint: Option<String>,
    pub service_type: String,
    pub status: RegistrationStatus,
}

#[derive(Debug, Clone)]
pub struct NewQueueEntry {
    pub queue_number: i32,
    pub registration_id: i64,
    pub patient_nik: String,
    pub patient_name: String,
    pub doctor_id: i64,
    pub queue_date: NaiveDate,
    pub status: QueueStatus,
    pub priority: QueuePriority,
}

#[derive(Debug, Clone)]
pub struct NewNotification {
    pub queue_entry_id: i64,
    pub patient_nik: String,
    pub title: String,
    pub body: String,
    pub kind: String,
    pub queue_status_at_send: QueueStatus,
}

/// What the allocator needs to know about a doctor before admitting a
/// booking. The schedule column is raw JSON text, parsed by the caller.
#[derive(Debug, Clone)]
pub struct DoctorScheduleRow {
    pub full_name: String,
    pub practice_schedule: Option<String>,
}

/// Queue ticket joined with the doctor, for the patient-facing status view.
#[derive(Debug, Clone)]
pub struct QueueTicket {
    pub queue_number: i32,
    pub queue_date: NaiveDate,
    pub status: QueueStatus,
    pub priority: QueuePriority,
    pub doctor_name: Option<String>,
}

/// Persistence seam for the booking cell. Writes go through [`BookingUnit`]
/// so that registration, queue entry and notification land atomically.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn BookingUnit>, StoreError>;

    /// Schedule lookup outside any transaction, for the availability query.
    async fn doctor_schedule(
        &self,
        doctor_id: i64,
    ) -> Result<Option<DoctorScheduleRow>, StoreError>;

    /// Non-cancelled registrations inside the window, outside any transaction.
    /// Must use the same predicate as [`BookingUnit::count_window_bookings`].
    async fn window_booking_count(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        window: &BookingWindow,
    ) -> Result<i64, StoreError>;

    async fn patient_appointments(
        &self,
        patient_nik: &str,
    ) -> Result<Vec<AppointmentSummary>, StoreError>;

    async fn registration_queue(
        &self,
        patient_nik: &str,
        registration_id: i64,
    ) -> Result<Option<QueueTicket>, StoreError>;

    /// The number currently at the counter: lowest called/in-service number
    /// for the date.
    async fn current_serving(&self, date: NaiveDate) -> Result<Option<i32>, StoreError>;
}

/// One booking transaction. Dropping the unit without `commit` rolls every
/// write back.
#[async_trait]
pub trait BookingUnit: Send {
    async fn patient_name(&mut self, patient_nik: &str) -> Result<Option<String>, StoreError>;

    /// True when a non-cancelled registration already exists for this
    /// patient/doctor/date.
    async fn has_live_registration(
        &mut self,
        patient_nik: &str,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<bool, StoreError>;

    async fn doctor_schedule(
        &mut self,
        doctor_id: i64,
    ) -> Result<Option<DoctorScheduleRow>, StoreError>;

    async fn count_window_bookings(
        &mut self,
        doctor_id: i64,
        date: NaiveDate,
        window: &BookingWindow,
    ) -> Result<i64, StoreError>;

    async fn insert_registration(&mut self, row: &NewRegistration) -> Result<i64, StoreError>;

    /// MAX(queue_number)+1 for the date, shared across all doctors. The
    /// implementation must hold off concurrent allocators for the same date
    /// until this transaction ends.
    async fn next_queue_number(&mut self, date: NaiveDate) -> Result<i32, StoreError>;

    async fn insert_queue_entry(&mut self, row: &NewQueueEntry) -> Result<i64, StoreError>;

    async fn insert_notification(&mut self, row: &NewNotification) -> Result<i64, StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

// ==============================================================================
// POSTGRES IMPLEMENTATION
// ==============================================================================

pub struct PgBookingStore {
    db: Database,
}

impl PgBookingStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

const WINDOW_COUNT_SQL: &str = r#"
    SELECT COUNT(*) FROM registrations
    WHERE doctor_id = $1
      AND registration_date = $2
      AND status <> 'cancelled'
      AND registration_time >= $3
      AND ($4::time IS NULL OR registration_time < $4)
"#;

fn parse_registration_status(value: &str) -> Result<RegistrationStatus, StoreError> {
    RegistrationStatus::parse(value)
        .ok_or_else(|| StoreError(format!("unknown registration status '{}'", value)))
}

fn parse_queue_status(value: &str) -> Result<QueueStatus, StoreError> {
    QueueStatus::parse(value).ok_or_else(|| StoreError(format!("unknown queue status '{}'", value)))
}

fn parse_priority(value: &str) -> Result<QueuePriority, StoreError> {
    QueuePriority::parse(value)
        .ok_or_else(|| StoreError(format!("unknown queue priority '{}'", value)))
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn begin(&self) -> Result<Box<dyn BookingUnit>, StoreError> {
        let tx = self.db.pool().begin().await?;
        Ok(Box::new(PgBookingUnit { tx }))
    }

    async fn doctor_schedule(
        &self,
        doctor_id: i64,
    ) -> Result<Option<DoctorScheduleRow>, StoreError> {
        let row = sqlx::query(
            "SELECT full_name, practice_schedule FROM doctors WHERE id = $1 AND is_active = TRUE",
        )
        .bind(doctor_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|row| {
            Ok(DoctorScheduleRow {
                full_name: row.try_get("full_name")?,
                practice_schedule: row.try_get("practice_schedule")?,
            })
        })
        .transpose()
    }

    async fn window_booking_count(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        window: &BookingWindow,
    ) -> Result<i64, StoreError> {
        let row = sqlx::query(WINDOW_COUNT_SQL)
            .bind(doctor_id)
            .bind(date)
            .bind(window.start)
            .bind(window.end)
            .fetch_one(self.db.pool())
            .await?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    async fn patient_appointments(
        &self,
        patient_nik: &str,
    ) -> Result<Vec<AppointmentSummary>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.registration_date, r.registration_time, r.complaint,
                   r.service_type, r.status, r.created_at,
                   d.full_name AS doctor_name, d.specialization,
                   q.queue_number, q.status AS queue_status
            FROM registrations r
            LEFT JOIN doctors d ON d.id = r.doctor_id
            LEFT JOIN queue_entries q ON q.registration_id = r.id
            WHERE r.patient_nik = $1
            ORDER BY r.registration_date DESC, r.registration_time DESC
            "#,
        )
        .bind(patient_nik)
        .fetch_all(self.db.pool())
        .await?;

        rows.iter()
            .map(|row| {
                let status: String = row.try_get("status")?;
                let queue_status: Option<String> = row.try_get("queue_status")?;
                Ok(AppointmentSummary {
                    id: row.try_get("id")?,
                    appointment_date: row.try_get("registration_date")?,
                    appointment_time: row.try_get("registration_time")?,
                    complaint: row.try_get("complaint")?,
                    service_type: row.try_get("service_type")?,
                    status: parse_registration_status(&status)?,
                    doctor_name: row.try_get("doctor_name")?,
                    specialization: row.try_get("specialization")?,
                    queue_number: row.try_get("queue_number")?,
                    queue_status: queue_status.as_deref().map(parse_queue_status).transpose()?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    async fn registration_queue(
        &self,
        patient_nik: &str,
        registration_id: i64,
    ) -> Result<Option<QueueTicket>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT q.queue_number, q.queue_date, q.status, q.priority,
                   d.full_name AS doctor_name
            FROM queue_entries q
            LEFT JOIN doctors d ON d.id = q.doctor_id
            WHERE q.patient_nik = $1 AND q.registration_id = $2
            "#,
        )
        .bind(patient_nik)
        .bind(registration_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|row| {
            let status: String = row.try_get("status")?;
            let priority: String = row.try_get("priority")?;
            Ok(QueueTicket {
                queue_number: row.try_get("queue_number")?,
                queue_date: row.try_get("queue_date")?,
                status: parse_queue_status(&status)?,
                priority: parse_priority(&priority)?,
                doctor_name: row.try_get("doctor_name")?,
            })
        })
        .transpose()
    }

    async fn current_serving(&self, date: NaiveDate) -> Result<Option<i32>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT MIN(queue_number) FROM queue_entries
            WHERE queue_date = $1 AND status IN ('called', 'in_service')
            "#,
        )
        .bind(date)
        .fetch_one(self.db.pool())
        .await?;
        Ok(row.try_get::<Option<i32>, _>(0)?)
    }
}

pub struct PgBookingUnit {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl BookingUnit for PgBookingUnit {
    async fn patient_name(&mut self, patient_nik: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query("SELECT full_name FROM patients WHERE nik = $1")
            .bind(patient_nik)
            .fetch_optional(&mut *self.tx)
            .await?;
        row.map(|row| Ok(row.try_get("full_name")?)).transpose()
    }

    async fn has_live_registration(
        &mut self,
        patient_nik: &str,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<bool, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM registrations
                WHERE patient_nik = $1
                  AND doctor_id = $2
                  AND registration_date = $3
                  AND status <> 'cancelled'
            )
            "#,
        )
        .bind(patient_nik)
        .bind(doctor_id)
        .bind(date)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row.try_get::<bool, _>(0)?)
    }

    async fn doctor_schedule(
        &mut self,
        doctor_id: i64,
    ) -> Result<Option<DoctorScheduleRow>, StoreError> {
        let row = sqlx::query(
            "SELECT full_name, practice_schedule FROM doctors WHERE id = $1 AND is_active = TRUE",
        )
        .bind(doctor_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        row.map(|row| {
            Ok(DoctorScheduleRow {
                full_name: row.try_get("full_name")?,
                practice_schedule: row.try_get("practice_schedule")?,
            })
        })
        .transpose()
    }

    async fn count_window_bookings(
        &mut self,
        doctor_id: i64,
        date: NaiveDate,
        window: &BookingWindow,
    ) -> Result<i64, StoreError> {
        let row = sqlx::query(WINDOW_COUNT_SQL)
            .bind(doctor_id)
            .bind(date)
            .bind(window.start)
            .bind(window.end)
            .fetch_one(&mut *self.tx)
            .await?;
        Ok(row.try_get::<i64, _>(0)?)
    }

    async fn insert_registration(&mut self, row: &NewRegistration) -> Result<i64, StoreError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO registrations
                (patient_nik, patient_name, doctor_id, registration_date,
                 registration_time, complaint, service_type, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(&row.patient_nik)
        .bind(&row.patient_name)
        .bind(row.doctor_id)
        .bind(row.registration_date)
        .bind(row.registration_time)
        .bind(&row.complaint)
        .bind(&row.service_type)
        .bind(row.status.as_str())
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(inserted.try_get("id")?)
    }

    async fn next_queue_number(&mut self, date: NaiveDate) -> Result<i32, StoreError> {
        // Advisory lock keyed by the date, held to transaction end. READ
        // COMMITTED alone would let two allocators read the same MAX.
        let lock_key = format!("queue_date:{}", date);
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(&lock_key)
            .execute(&mut *self.tx)
            .await?;

        let row = sqlx::query(
            "SELECT COALESCE(MAX(queue_number), 0) + 1 FROM queue_entries WHERE queue_date = $1",
        )
        .bind(date)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(row.try_get::<i32, _>(0)?)
    }

    async fn insert_queue_entry(&mut self, row: &NewQueueEntry) -> Result<i64, StoreError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO queue_entries
                (queue_number, registration_id, patient_nik, patient_name,
                 doctor_id, queue_date, status, priority)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(row.queue_number)
        .bind(row.registration_id)
        .bind(&row.patient_nik)
        .bind(&row.patient_name)
        .bind(row.doctor_id)
        .bind(row.queue_date)
        .bind(row.status.as_str())
        .bind(row.priority.as_str())
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(inserted.try_get("id")?)
    }

    async fn insert_notification(&mut self, row: &NewNotification) -> Result<i64, StoreError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO notifications
                (queue_entry_id, patient_nik, title, body, kind, queue_status_at_send)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(row.queue_entry_id)
        .bind(&row.patient_nik)
        .bind(&row.title)
        .bind(&row.body)
        .bind(&row.kind)
        .bind(row.queue_status_at_send.as_str())
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(inserted.try_get("id")?)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }
}
