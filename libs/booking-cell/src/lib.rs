use std::sync::Arc;

use shared_config::AppConfig;

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;
pub mod testing;

pub use error::BookingError;
pub use models::{
    BookingConfirmation, BookingWindow, CreateAppointmentRequest, QueuePriority, QueueStatus,
    RegistrationStatus,
};
pub use services::allocator::BookingService;
pub use services::history::HistoryService;

/// Per-cell router state. The capacity ceiling rides along from config so
/// the allocator and the availability query always agree on it.
#[derive(Clone)]
pub struct BookingState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn store::BookingStore>,
}
