use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

pub use shared_models::status::{QueuePriority, QueueStatus};

/// One row of the admin board, already joined with the doctor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueBoardRow {
    pub queue_id: i64,
    pub queue_number: i32,
    pub patient_name: String,
    pub doctor_name: Option<String>,
    pub status: QueueStatus,
    pub priority: QueuePriority,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BoardCounts {
    pub waiting: usize,
    pub called: usize,
    pub in_service: usize,
    pub done: usize,
    pub cancelled: usize,
}

impl BoardCounts {
    pub fn tally(rows: &[QueueBoardRow]) -> Self {
        let mut counts = Self::default();
        for row in rows {
            match row.status {
                QueueStatus::Waiting => counts.waiting += 1,
                QueueStatus::Called => counts.called += 1,
                QueueStatus::InService => counts.in_service += 1,
                QueueStatus::Done => counts.done += 1,
                QueueStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }
}

/// Result of a status transition, echoed back to the admin client.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome {
    pub queue_id: i64,
    pub queue_number: i32,
    pub status: QueueStatus,
}

/// The live queue for one date: urgent entries first, then by number.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueBoard {
    pub date: NaiveDate,
    pub entries: Vec<QueueBoardRow>,
    pub counts: BoardCounts,
    pub current_serving: Option<i32>,
}
