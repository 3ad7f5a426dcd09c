//! Queue lifecycle transitions. Each one runs in its own store transaction
//! so the side rows it writes (the call notification, the completed
//! registration) never outlive a failed status change.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use shared_models::status::QueueStatus;

use crate::error::QueueError;
use crate::models::TransitionOutcome;
use crate::store::{QueueNotice, QueueStore};

/// Waiting -> Called -> InService -> Done, with Cancelled reachable from
/// the two pre-service states. Cancelled entries keep their number.
fn allowed(from: QueueStatus, to: QueueStatus) -> bool {
    matches!(
        (from, to),
        (QueueStatus::Waiting, QueueStatus::Called)
            | (QueueStatus::Called, QueueStatus::InService)
            | (QueueStatus::InService, QueueStatus::Done)
            | (QueueStatus::Waiting, QueueStatus::Cancelled)
            | (QueueStatus::Called, QueueStatus::Cancelled)
    )
}

pub struct TransitionService {
    store: Arc<dyn QueueStore>,
}

impl TransitionService {
    pub fn new(store: Arc<dyn QueueStore>) -> Self {
        Self { store }
    }

    pub async fn call(&self, queue_id: i64) -> Result<TransitionOutcome, QueueError> {
        self.transition(queue_id, QueueStatus::Called).await
    }

    pub async fn start(&self, queue_id: i64) -> Result<TransitionOutcome, QueueError> {
        self.transition(queue_id, QueueStatus::InService).await
    }

    pub async fn finish(&self, queue_id: i64) -> Result<TransitionOutcome, QueueError> {
        self.transition(queue_id, QueueStatus::Done).await
    }

    pub async fn cancel(&self, queue_id: i64) -> Result<TransitionOutcome, QueueError> {
        self.transition(queue_id, QueueStatus::Cancelled).await
    }

    async fn transition(
        &self,
        queue_id: i64,
        to: QueueStatus,
    ) -> Result<TransitionOutcome, QueueError> {
        let mut unit = self.store.begin().await?;

        let entry = unit.entry(queue_id).await?.ok_or(QueueError::NotFound)?;
        if !allowed(entry.status, to) {
            return Err(QueueError::InvalidTransition {
                from: entry.status,
                to,
            });
        }

        let now = Utc::now();
        let (start_time, end_time) = match to {
            QueueStatus::InService => (Some(now), None),
            QueueStatus::Done => (None, Some(now)),
            _ => (None, None),
        };
        unit.set_status(queue_id, to, start_time, end_time).await?;

        if to == QueueStatus::Called {
            unit.insert_notification(&QueueNotice {
                queue_entry_id: entry.id,
                patient_nik: entry.patient_nik.clone(),
                title: "It is your turn".to_string(),
                body: format!(
                    "Queue number {}, please proceed to the consultation room.",
                    entry.queue_number
                ),
                kind: "queue_called".to_string(),
                queue_status_at_send: QueueStatus::Called,
            })
            .await?;
        }

        if to == QueueStatus::Done {
            if let Some(registration_id) = entry.registration_id {
                unit.complete_registration(registration_id).await?;
            }
        }

        unit.commit().await?;

        info!(
            queue_id,
            queue_number = entry.queue_number,
            from = %entry.status,
            to = %to,
            "Queue entry moved"
        );

        Ok(TransitionOutcome {
            queue_id,
            queue_number: entry.queue_number,
            status: to,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_table() {
        assert!(allowed(QueueStatus::Waiting, QueueStatus::Called));
        assert!(allowed(QueueStatus::Called, QueueStatus::InService));
        assert!(allowed(QueueStatus::InService, QueueStatus::Done));
        assert!(allowed(QueueStatus::Waiting, QueueStatus::Cancelled));
        assert!(allowed(QueueStatus::Called, QueueStatus::Cancelled));

        assert!(!allowed(QueueStatus::Waiting, QueueStatus::InService));
        assert!(!allowed(QueueStatus::InService, QueueStatus::Cancelled));
        assert!(!allowed(QueueStatus::Done, QueueStatus::Called));
        assert!(!allowed(QueueStatus::Cancelled, QueueStatus::Called));
    }
}
