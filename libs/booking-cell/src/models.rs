use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

pub use shared_models::status::{QueuePriority, QueueStatus, RegistrationStatus};

// ==============================================================================
// CORE BOOKING MODELS
// ==============================================================================

/// A patient's confirmed request to see a doctor at a date/time.
/// `patient_name` is a snapshot taken at creation and never refreshed when
/// the patient record changes later.
#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub id: i64,
    pub patient_nik: String,
    pub patient_name: String,
    pub doctor_id: i64,
    pub registration_date: NaiveDate,
    pub registration_time: NaiveTime,
    pub complaint: Option<String>,
    pub service_type: String,
    pub status: RegistrationStatus,
    pub created_at: DateTime<Utc>,
}

/// The sequential ticket issued for a registration. Numbers are dense from 1
/// per date and never reused, even after cancellation.
#[derive(Debug, Clone, Serialize)]
pub struct QueueEntry {
    pub id: i64,
    pub queue_number: i32,
    pub registration_id: Option<i64>,
    pub patient_nik: String,
    pub patient_name: String,
    pub doctor_id: i64,
    pub queue_date: NaiveDate,
    pub status: QueueStatus,
    pub priority: QueuePriority,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

/// Append-only outbox row. Delivery is out of scope; rows are written in the
/// same transaction as the state change they describe.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub id: i64,
    pub queue_entry_id: Option<i64>,
    pub patient_nik: String,
    pub title: String,
    pub body: String,
    pub kind: String,
    pub queue_status_at_send: Option<QueueStatus>,
    pub sent_at: DateTime<Utc>,
}

// ==============================================================================
// BOOKING WINDOW
// ==============================================================================

/// Fixed 1-hour capacity window. Derived from the hour component alone:
/// 08:15 and 08:45 land in the same window as 08:00. The 23:00 window has no
/// upper bound since 24:00 is not a representable time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingWindow {
    pub start: NaiveTime,
    pub end: Option<NaiveTime>,
}

impl BookingWindow {
    pub fn containing(time: NaiveTime) -> Self {
        Self::at_hour(time.hour())
    }

    pub fn at_hour(hour: u32) -> Self {
        let start = NaiveTime::from_hms_opt(hour, 0, 0).expect("hour in 0..24");
        let end = NaiveTime::from_hms_opt(hour + 1, 0, 0);
        Self { start, end }
    }

    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && self.end.map_or(true, |end| time < end)
    }

    pub fn start_label(&self) -> String {
        self.start.format("%H:%M").to_string()
    }

    pub fn end_label(&self) -> String {
        match self.end {
            Some(end) => end.format("%H:%M").to_string(),
            None => "24:00".to_string(),
        }
    }

    pub fn display(&self) -> String {
        format!("{} - {}", self.start_label(), self.end_label())
    }
}

// ==============================================================================
// REQUEST/RESPONSE MODELS
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub complaint: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfirmation {
    pub message: String,
    pub appointment_id: i64,
    pub queue_number: i32,
    /// Seats left in the window after this booking.
    pub available_slots: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub time: String,
    pub display_time: String,
    pub max_capacity: i64,
    pub current_bookings: i64,
    pub available_slots: i64,
    pub is_full: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTimeslots {
    pub slots: Vec<TimeSlot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_time: Option<String>,
    pub day: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One row of a patient's appointment history, joined with the doctor and
/// the queue entry when one exists.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSummary {
    pub id: i64,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub complaint: Option<String>,
    pub service_type: String,
    pub status: RegistrationStatus,
    pub doctor_name: Option<String>,
    pub specialization: Option<String>,
    pub queue_number: Option<i32>,
    pub queue_status: Option<QueueStatus>,
    pub created_at: DateTime<Utc>,
}

/// The queue ticket behind one registration, plus the number currently being
/// served on that date so the patient can judge how long to wait.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatusView {
    pub queue_number: i32,
    pub queue_date: NaiveDate,
    pub status: QueueStatus,
    pub priority: QueuePriority,
    pub doctor_name: Option<String>,
    pub current_serving: Option<i32>,
}
