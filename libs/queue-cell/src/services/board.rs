use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use shared_models::status::QueueStatus;

use crate::error::QueueError;
use crate::models::{BoardCounts, QueueBoard};
use crate::store::QueueStore;

pub struct BoardService {
    store: Arc<dyn QueueStore>,
}

impl BoardService {
    pub fn new(store: Arc<dyn QueueStore>) -> Self {
        Self { store }
    }

    pub async fn board(&self, date: NaiveDate) -> Result<QueueBoard, QueueError> {
        debug!(%date, "Loading queue board");
        let entries = self.store.board_rows(date).await?;

        let counts = BoardCounts::tally(&entries);
        let current_serving = entries
            .iter()
            .filter(|row| matches!(row.status, QueueStatus::Called | QueueStatus::InService))
            .map(|row| row.queue_number)
            .min();

        Ok(QueueBoard {
            date,
            entries,
            counts,
            current_serving,
        })
    }
}
