use shared_database::StoreError;
use shared_models::error::AppError;
use shared_models::status::QueueStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Queue entry not found")]
    NotFound,

    #[error("Cannot move a {from} entry to {to}")]
    InvalidTransition { from: QueueStatus, to: QueueStatus },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<QueueError> for AppError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::NotFound => AppError::NotFound(err.to_string()),
            QueueError::InvalidTransition { .. } => AppError::BadRequest(err.to_string()),
            QueueError::Store(inner) => {
                tracing::error!("queue store failure: {}", inner);
                AppError::Internal("Something went wrong, please try again".to_string())
            }
        }
    }
}
