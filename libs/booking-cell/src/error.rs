use shared_database::StoreError;
use shared_models::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{0}")]
    NotFound(String),

    #[error("You already have an active appointment. Please complete or cancel it first.")]
    Duplicate,

    #[error("{0}")]
    ScheduleViolation(String),

    #[error("This time slot is fully booked ({current}/{max}). Please choose another time.")]
    CapacityExceeded { current: i64, max: i64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        match err {
            BookingError::NotFound(message) => AppError::NotFound(message),
            BookingError::Store(inner) => {
                tracing::error!("booking store failure: {}", inner);
                AppError::Internal("Something went wrong, please try again".to_string())
            }
            other => AppError::BadRequest(other.to_string()),
        }
    }
}
